#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// scalar arithmetic over f64 with integral-aware rendering and text
/// conversion through an optional host callback
pub mod scalar_arithmetic;
///____________________________________________________________________________________________________________________________
/// # Factor tree
/// the symbolic representation of polynomial-like expressions: constants,
/// variables, sums, products, powers and negation, with a display grammar
/// that renders reduced sums the way they are written on paper
///# Example#
/// ```
/// use RustedCAS::algebra::factor_tree::Factor;
/// use RustedCAS::algebra::manipulations::{organize_terms, reduce};
/// // x^2 + 3*x + 3*x - 5
/// let sum = Factor::Sum(vec![
///     Factor::power_of("x", 2),
///     Factor::Product(vec![Factor::constant(3.0), Factor::variable("x")]),
///     Factor::Product(vec![Factor::constant(3.0), Factor::variable("x")]),
///     Factor::constant(-5.0),
/// ]);
/// let organized = organize_terms(&reduce(&sum));
/// assert_eq!(format!("{}", organized), "( x^2 + 6*x - 5 )");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod factor_tree;
/// conversion of host parse trees (json) into factor trees, expanding
/// function calls through a catalog of definitions
pub mod tree_conversion;
///____________________________________________________________________________________________________________________________
/// reduction to canonical form: constant folding, `x*x -> x^2`, like-term
/// combination and display organization
pub mod manipulations;
///____________________________________________________________________________________________________________________________
/// # Power collection
/// bucket the terms of a reduced sum by the exponent of a designated
/// variable and query combined coefficients per power
///# Example#
/// ```
/// use RustedCAS::algebra::factor_tree::Factor;
/// use RustedCAS::algebra::manipulations::reduce;
/// use RustedCAS::algebra::power_collection::Powers;
/// let sum = reduce(&Factor::Sum(vec![
///     Factor::power_of("x", 2),
///     Factor::Product(vec![Factor::constant(6.0), Factor::variable("x")]),
///     Factor::constant(-5.0),
/// ]));
/// let powers = Powers::collect(&sum, "x");
/// assert_eq!(powers.exponents(), vec![0, 1, 2]);
/// assert_eq!(format!("{}", powers.get_term_for(1)), "6");
/// assert_eq!(format!("{}", powers.series()), "( x^2 + 6*x - 5 )");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod power_collection;
/// numeric substitution of bound symbols and full evaluation of constant
/// trees
pub mod substitution;
