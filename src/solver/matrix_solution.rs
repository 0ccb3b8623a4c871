//! # Matrix Solution Module
//!
//! Turns a list of reduced equations (each implicitly `= 0`) over unknown
//! coefficient symbols into the matrix equation `A x = b` and solves it.
//!
//! ## Purpose
//!
//! The last stage of a series expansion: after substitution every per-power
//! equation is linear in the remaining unknowns, so N equations over N
//! distinct unknowns become one `DMatrix` and one `DVector`. Each term of an
//! equation contributes either a constant (negated into the right-hand
//! side) or a `coefficient * unknown` entry; a term still referencing more
//! than one symbol is not reduced and aborts the assembly.
//!
//! ## Usage
//! ```rust, ignore
//! let mut solution = MatrixSolution::new();
//! solution.set_equation_system(equations);
//! solution.eq_generate()?;
//! solution.solve()?;
//! let resolved = solution.get_result().unwrap();
//! ```
//!
//! The default solve path inverts the matrix; `set_linear_sys_method("lu")`
//! selects LU decomposition instead.

use crate::algebra::factor_tree::Factor;
use crate::algebra::substitution::{SymbolValues, evaluate};
use log::info;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeSet;

pub struct MatrixSolution {
    pub equations: Vec<Factor>,
    pub unknowns: Vec<String>,
    pub matrix: Option<DMatrix<f64>>,
    pub vector: Option<DVector<f64>>,
    pub linear_sys_method: Option<String>, // None means "inv"
    pub result: Option<DVector<f64>>,
}

impl MatrixSolution {
    pub fn new() -> Self {
        MatrixSolution {
            equations: Vec::new(),
            unknowns: Vec::new(),
            matrix: None,
            vector: None,
            linear_sys_method: None,
            result: None,
        }
    }

    pub fn set_equation_system(&mut self, equations: Vec<Factor>) {
        assert!(!equations.is_empty(), "equation system must not be empty");
        self.equations = equations;
    }

    pub fn set_linear_sys_method(&mut self, method: &str) {
        let method = method.to_lowercase();
        assert!(
            method == "inv" || method == "lu",
            "linear system method must be inv or lu"
        );
        self.linear_sys_method = Some(method);
    }

    /// Collect the unknowns and assemble the matrix and right-hand side.
    /// Unknowns are sorted by name, so column order is deterministic.
    pub fn eq_generate(&mut self) -> Result<(), String> {
        let mut names: BTreeSet<String> = BTreeSet::new();
        for equation in &self.equations {
            equation.collect_symbols(&mut names);
        }
        let unknowns: Vec<String> = names.into_iter().collect();
        if unknowns.is_empty() {
            return Err("equation system contains no unknown symbols".to_string());
        }
        if unknowns.len() != self.equations.len() {
            return Err(format!(
                "system has {} equations but {} unknowns: {:?}",
                self.equations.len(),
                unknowns.len(),
                unknowns
            ));
        }

        let n = unknowns.len();
        let mut matrix = DMatrix::zeros(n, n);
        let mut vector = DVector::zeros(n);
        for (row, equation) in self.equations.iter().enumerate() {
            for term in equation.terms() {
                match term_contribution(term, &unknowns)? {
                    Contribution::Coefficient(col, value) => matrix[(row, col)] += value,
                    Contribution::Constant(value) => vector[row] -= value,
                }
            }
        }
        info!(
            "assembled {}x{} linear system over unknowns {:?}",
            n, n, unknowns
        );
        self.unknowns = unknowns;
        self.matrix = Some(matrix);
        self.vector = Some(vector);
        Ok(())
    }

    pub fn solve(&mut self) -> Result<DVector<f64>, String> {
        let matrix = self
            .matrix
            .as_ref()
            .ok_or("linear system is not assembled, call eq_generate first")?;
        let vector = self
            .vector
            .as_ref()
            .ok_or("linear system is not assembled, call eq_generate first")?;
        let method = self
            .linear_sys_method
            .clone()
            .unwrap_or_else(|| "inv".to_string());
        let solution = solve_linear_system(&method, matrix, vector)?;
        info!("linear system solved with method '{}'", method);
        self.result = Some(solution.clone());
        Ok(solution)
    }

    pub fn get_result(&self) -> Option<Vec<(String, f64)>> {
        self.result.as_ref().map(|values| {
            self.unknowns
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect()
        })
    }
}

impl Default for MatrixSolution {
    fn default() -> Self {
        MatrixSolution::new()
    }
}

enum Contribution {
    Coefficient(usize, f64),
    Constant(f64),
}

fn term_contribution(term: &Factor, unknowns: &[String]) -> Result<Contribution, String> {
    let refs = term.symbolic_references();
    match refs.len() {
        0 => evaluate(term, &SymbolValues::new()).map(Contribution::Constant),
        1 => {
            let symbol = refs
                .iter()
                .next()
                .cloned()
                .unwrap_or_default();
            let col = unknowns
                .iter()
                .position(|name| *name == symbol)
                .ok_or_else(|| format!("unknown symbol '{}' is not a system column", symbol))?;
            let coefficient = linear_coefficient(term, &symbol)?;
            Ok(Contribution::Coefficient(col, coefficient))
        }
        _ => Err(format!("term not reduced: {}", term)),
    }
}

/// Multiplier of the single unknown in a reduced linear term. Anything
/// nonlinear (powers of the unknown, repeated occurrences) is rejected.
fn linear_coefficient(term: &Factor, symbol: &str) -> Result<f64, String> {
    match term {
        Factor::Variable(_) => Ok(1.0),
        Factor::Negated(inner) => Ok(-linear_coefficient(inner, symbol)?),
        Factor::Product(children) => {
            let mut coefficient = 1.0;
            let mut saw_symbol = false;
            for child in children {
                match child {
                    Factor::Constant(value) => coefficient *= value.to_double(),
                    Factor::Variable(name) if name == symbol && !saw_symbol => saw_symbol = true,
                    _ => return Err(format!("term not reduced: {}", term)),
                }
            }
            if saw_symbol {
                Ok(coefficient)
            } else {
                Err(format!("term not reduced: {}", term))
            }
        }
        other => Err(format!("term not reduced: {}", other)),
    }
}

/// Solve `A x = b` with the chosen method: "inv" inverts the matrix, "lu"
/// uses LU decomposition. A singular matrix is a fatal error either way.
pub fn solve_linear_system(
    method: &str,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, String> {
    match method {
        "lu" => {
            let lu = a.clone().lu();
            lu.solve(b)
                .ok_or_else(|| "failed to solve the linear system: matrix is singular".to_string())
        }
        "inv" => {
            let a_inv = a
                .clone()
                .try_inverse()
                .ok_or_else(|| "failed to invert the system matrix: matrix is singular".to_string())?;
            Ok(a_inv * b)
        }
        other => Err(format!(
            "linear system method must be inv or lu, got '{}'",
            other
        )),
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
use approx::assert_relative_eq;

#[test]
fn test_two_unknown_system() {
    // a + b - 4 = 0 and a - b = 0 resolve to a = 2, b = 2
    let first = Factor::Sum(vec![
        Factor::variable("a"),
        Factor::variable("b"),
        Factor::constant(-4.0),
    ]);
    let second = Factor::Sum(vec![
        Factor::variable("a"),
        Factor::Product(vec![Factor::constant(-1.0), Factor::variable("b")]),
    ]);
    let mut solution = MatrixSolution::new();
    solution.set_equation_system(vec![first, second]);
    solution.eq_generate().unwrap();
    solution.solve().unwrap();
    let resolved = solution.get_result().unwrap();
    assert_eq!(resolved[0].0, "a");
    assert_eq!(resolved[1].0, "b");
    assert_relative_eq!(resolved[0].1, 2.0);
    assert_relative_eq!(resolved[1].1, 2.0);
}

#[test]
fn test_lu_method_agrees_with_inversion() {
    let first = Factor::Sum(vec![
        Factor::Product(vec![Factor::constant(2.0), Factor::variable("a")]),
        Factor::variable("b"),
        Factor::constant(-5.0),
    ]);
    let second = Factor::Sum(vec![
        Factor::variable("a"),
        Factor::Product(vec![Factor::constant(3.0), Factor::variable("b")]),
        Factor::constant(-10.0),
    ]);
    let mut by_inv = MatrixSolution::new();
    by_inv.set_equation_system(vec![first.clone(), second.clone()]);
    by_inv.eq_generate().unwrap();
    let inv = by_inv.solve().unwrap();

    let mut by_lu = MatrixSolution::new();
    by_lu.set_equation_system(vec![first, second]);
    by_lu.set_linear_sys_method("lu");
    by_lu.eq_generate().unwrap();
    let lu = by_lu.solve().unwrap();

    assert_relative_eq!(inv[0], lu[0], epsilon = 1e-12);
    assert_relative_eq!(inv[1], lu[1], epsilon = 1e-12);
}

#[test]
fn test_unreduced_term_is_fatal() {
    // a*b in one term references two unknowns
    let first = Factor::Sum(vec![
        Factor::Product(vec![Factor::variable("a"), Factor::variable("b")]),
        Factor::constant(-4.0),
    ]);
    let second = Factor::Sum(vec![Factor::variable("a"), Factor::variable("b")]);
    let mut solution = MatrixSolution::new();
    solution.set_equation_system(vec![first, second]);
    let err = solution.eq_generate().unwrap_err();
    assert!(err.contains("term not reduced"), "got: {}", err);
    assert!(err.contains("a*b"), "error should show the term: {}", err);
}

#[test]
fn test_nonlinear_term_is_fatal() {
    let equation = Factor::Sum(vec![
        Factor::Product(vec![Factor::variable("a"), Factor::variable("a")]),
        Factor::constant(-9.0),
    ]);
    let mut solution = MatrixSolution::new();
    solution.set_equation_system(vec![equation]);
    let err = solution.eq_generate().unwrap_err();
    assert!(err.contains("term not reduced"), "got: {}", err);
}

#[test]
fn test_dimension_mismatch_is_fatal() {
    let only = Factor::Sum(vec![
        Factor::variable("a"),
        Factor::variable("b"),
        Factor::constant(-1.0),
    ]);
    let mut solution = MatrixSolution::new();
    solution.set_equation_system(vec![only]);
    let err = solution.eq_generate().unwrap_err();
    assert!(err.contains("1 equations but 2 unknowns"), "got: {}", err);
}

#[test]
fn test_singular_matrix_is_fatal() {
    // a + b = 1 twice: rank deficient
    let first = Factor::Sum(vec![
        Factor::variable("a"),
        Factor::variable("b"),
        Factor::constant(-1.0),
    ]);
    let second = first.clone();
    let mut solution = MatrixSolution::new();
    solution.set_equation_system(vec![first, second]);
    solution.eq_generate().unwrap();
    let err = solution.solve().unwrap_err();
    assert!(err.contains("singular"), "got: {}", err);
}

#[test]
fn test_negated_terms_contribute_with_sign() {
    // organized form: a - b = 0, 2*a - 6 = 0 -> a = 3, b = 3
    let first = Factor::Difference(vec![
        Factor::variable("a"),
        Factor::Negated(Factor::variable("b").boxed()),
    ]);
    let second = Factor::Difference(vec![
        Factor::Product(vec![Factor::constant(2.0), Factor::variable("a")]),
        Factor::Negated(Factor::constant(6.0).boxed()),
    ]);
    let mut solution = MatrixSolution::new();
    solution.set_equation_system(vec![first, second]);
    solution.eq_generate().unwrap();
    solution.solve().unwrap();
    let resolved = solution.get_result().unwrap();
    assert_relative_eq!(resolved[0].1, 3.0);
    assert_relative_eq!(resolved[1].1, 3.0);
}
