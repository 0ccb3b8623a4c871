//! Canonical expansion problems used by the binary examples and the
//! end-to-end tests. Each variant supplies its function definitions in the
//! host parse-tree format, the values assumed known before solving, and the
//! results to check against.

use crate::algebra::substitution::SymbolValues;
use serde_json::{Value, json};
use std::collections::HashMap;
use strum_macros::EnumIter;

fn identifier(name: &str) -> Value {
    json!({"NodeType": "Identifier", "Name": name})
}

fn binary(op: &str, left: Value, right: Value) -> Value {
    json!({"NodeType": "BinaryOP", "OpName": op, "Left": left, "Right": right})
}

fn call(function: &str, parameter: Value) -> Value {
    json!({"NodeType": "UnaryOP", "OpName": function, "Parameter": parameter})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SeriesProblem {
    /// f(x) = x^2 + 3*x + 3*x - 5, the like-term collection showcase.
    Parabola,
    /// f(x) = a + b - 4 + a*x - b*x; the power equations force a = b = 2.
    TwinCoefficients,
    /// f(x) = (a - c0) + (b - c1)*x with c0, c1 known at solve time.
    ShiftedLine,
    /// F(x) = G(x^2) + x over the helper G(t) = 1 + t.
    ComposedQuadratic,
}

impl SeriesProblem {
    /// Function definitions, target last: (name, formal parameter, body).
    pub fn setup(&self) -> Vec<(String, String, Value)> {
        match self {
            SeriesProblem::Parabola => {
                let body = binary(
                    "-",
                    binary(
                        "+",
                        binary(
                            "+",
                            binary("^", identifier("x"), json!(2.0)),
                            binary("*", json!(3.0), identifier("x")),
                        ),
                        binary("*", json!(3.0), identifier("x")),
                    ),
                    json!(5.0),
                );
                vec![("f".to_string(), "x".to_string(), body)]
            }
            SeriesProblem::TwinCoefficients => {
                let body = binary(
                    "+",
                    binary(
                        "-",
                        binary("+", identifier("a"), identifier("b")),
                        json!(4.0),
                    ),
                    binary(
                        "-",
                        binary("*", identifier("a"), identifier("x")),
                        binary("*", identifier("b"), identifier("x")),
                    ),
                );
                vec![("f".to_string(), "x".to_string(), body)]
            }
            SeriesProblem::ShiftedLine => {
                let body = binary(
                    "+",
                    binary("-", identifier("a"), identifier("c0")),
                    binary(
                        "*",
                        binary("-", identifier("b"), identifier("c1")),
                        identifier("x"),
                    ),
                );
                vec![("f".to_string(), "x".to_string(), body)]
            }
            SeriesProblem::ComposedQuadratic => {
                let helper = binary("+", json!(1.0), identifier("t"));
                let body = binary(
                    "+",
                    call("G", binary("^", identifier("x"), json!(2.0))),
                    identifier("x"),
                );
                vec![
                    ("G".to_string(), "t".to_string(), helper),
                    ("F".to_string(), "x".to_string(), body),
                ]
            }
        }
    }

    /// Name of the function to expand.
    pub fn target(&self) -> String {
        match self {
            SeriesProblem::ComposedQuadratic => "F".to_string(),
            _ => "f".to_string(),
        }
    }

    /// Values assumed known before the coefficient solve.
    pub fn known_values(&self) -> SymbolValues {
        match self {
            SeriesProblem::ShiftedLine => {
                let mut known = SymbolValues::new();
                known.set("c0", 1.0).set("c1", 2.0);
                known
            }
            _ => SymbolValues::new(),
        }
    }

    pub fn expected_series(&self) -> String {
        match self {
            SeriesProblem::Parabola => "( x^2 + 6*x - 5 )".to_string(),
            SeriesProblem::TwinCoefficients => {
                "( a*x + a + b - b*x - 4 )".to_string()
            }
            SeriesProblem::ShiftedLine => {
                "( b*x + a - c1*x - c0 )".to_string()
            }
            SeriesProblem::ComposedQuadratic => "( x^2 + x + 1 )".to_string(),
        }
    }

    /// Coefficients the solve must produce; empty when the problem has no
    /// unknowns to resolve.
    pub fn expected_coefficients(&self) -> HashMap<String, f64> {
        match self {
            SeriesProblem::TwinCoefficients => HashMap::from([
                ("a".to_string(), 2.0),
                ("b".to_string(), 2.0),
            ]),
            SeriesProblem::ShiftedLine => HashMap::from([
                ("a".to_string(), 1.0),
                ("b".to_string(), 2.0),
            ]),
            _ => HashMap::new(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            SeriesProblem::Parabola => {
                "parabola with duplicate linear terms, collected by powers of x".to_string()
            }
            SeriesProblem::TwinCoefficients => {
                "per-power equations a + b - 4 = 0 and a - b = 0".to_string()
            }
            SeriesProblem::ShiftedLine => {
                "line with coefficients fixed by substituted constants".to_string()
            }
            SeriesProblem::ComposedQuadratic => {
                "function call expanded through the catalog".to_string()
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::series_expansion::SeriesEngine;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_problem_expands_to_its_series() {
        for problem in SeriesProblem::iter() {
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("off");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let rendered = engine.expand(&problem.target()).unwrap();
            assert_eq!(
                rendered,
                problem.expected_series(),
                "series mismatch for {:?}",
                problem
            );
        }
    }

    #[test]
    fn test_solvable_problems_resolve_their_coefficients() {
        for problem in SeriesProblem::iter() {
            let expected = problem.expected_coefficients();
            if expected.is_empty() {
                continue;
            }
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("off");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let target = problem.target();
            engine.expand(&target).unwrap();
            engine
                .solve("resolved", &target, "reference", &problem.known_values())
                .unwrap();
            let expansion = engine.get_expansion(&target).unwrap();
            let solution = expansion.solutions.get("reference").unwrap();
            for (name, value) in expected {
                assert_relative_eq!(
                    solution.value_of(&name).unwrap(),
                    value,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_partition_holds_for_every_problem() {
        for problem in SeriesProblem::iter() {
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("off");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let target = problem.target();
            engine.expand(&target).unwrap();
            let expansion = engine.get_expansion(&target).unwrap();
            assert!(
                expansion
                    .powers
                    .verify_partition(&expansion.reduced, 20)
                    .unwrap(),
                "partition broken for {:?}",
                problem
            );
        }
    }
}
