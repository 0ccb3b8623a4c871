/// # Matrix solution
/// linear solver for the per-power coefficient equations: collects the
/// unknowns, assembles the dense system matrix and right-hand side and
/// solves by matrix inversion (or LU decomposition)
///# Example#
/// ```
/// use RustedCAS::algebra::factor_tree::Factor;
/// use RustedCAS::solver::matrix_solution::MatrixSolution;
/// // a + b - 4 = 0 and a - b = 0
/// let mut solution = MatrixSolution::new();
/// solution.set_equation_system(vec![
///     Factor::Sum(vec![
///         Factor::variable("a"),
///         Factor::variable("b"),
///         Factor::constant(-4.0),
///     ]),
///     Factor::Sum(vec![
///         Factor::variable("a"),
///         Factor::Product(vec![Factor::constant(-1.0), Factor::variable("b")]),
///     ]),
/// ]);
/// solution.eq_generate().unwrap();
/// solution.solve().unwrap();
/// let result = solution.get_result().unwrap();
/// assert_eq!(result[0].0, "a");
/// assert!((result[0].1 - 2.0).abs() < 1e-12);
/// assert!((result[1].1 - 2.0).abs() < 1e-12);
/// ```
pub mod matrix_solution;
