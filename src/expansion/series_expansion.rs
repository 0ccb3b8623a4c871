//! # Series Expansion Module
//!
//! The public façade of the engine: define functions in the host parse-tree
//! format, expand them into power series by their formal parameter, solve
//! for unknown series coefficients under known substitutions, and display
//! registered solutions.
//!
//! ## Purpose
//!
//! A `SeriesEngine` owns the explicit context the pipeline needs (function
//! catalog, scalar converter, finished expansions); nothing is global, so
//! two engines never interfere.
//!
//! ## Usage
//! ```rust, ignore
//! let mut engine = SeriesEngine::new();
//! engine.set_loglevel("info");
//! engine.define_function("J", "x", parse_tree);
//! let series = engine.expand("J")?;
//! let mut known = SymbolValues::new();
//! known.set("x", 0.0);
//! engine.solve("Jat0", "J", "firstkind", &known)?;
//! println!("{}", engine.show_solutions("J", Some("firstkind"))?);
//! ```
//!
//! `expand` always recomputes and overwrites the stored expansion; callers
//! that want memoization check `get_expansion` first.

use crate::algebra::factor_tree::Factor;
use crate::algebra::manipulations::{organize_terms, reduce};
use crate::algebra::power_collection::Powers;
use crate::algebra::scalar_arithmetic::ScalarConverter;
use crate::algebra::substitution::{SymbolValues, substitute};
use crate::algebra::tree_conversion::{FunctionCatalog, factor_from_tree};
use crate::expansion::solution_registry::{Solution, SolutionRegistry};
use crate::solver::matrix_solution::MatrixSolution;
use log::info;
use serde_json::Value;
use simplelog::*;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style};

/// Everything the engine keeps about one expanded function: the reduced
/// tree, its display form, the power buckets and the named solutions
/// derived from them.
#[derive(Debug, Clone)]
pub struct SeriesExpansion {
    pub source: String,
    pub variable: String,
    pub reduced: Factor,
    pub organized: Factor,
    pub powers: Powers,
    pub solutions: SolutionRegistry,
}

impl SeriesExpansion {
    pub fn series(&self) -> Factor {
        self.powers.series()
    }
}

/// Expansion workshop: function catalog, scalar conversion, finished
/// expansions and solver options in one explicit context object.
pub struct SeriesEngine {
    pub catalog: FunctionCatalog,
    pub converter: ScalarConverter,
    pub expansions: HashMap<String, SeriesExpansion>,
    pub loglevel: Option<String>,
    pub linear_sys_method: Option<String>,
    pub calc_statistics: HashMap<String, usize>,
}

impl SeriesEngine {
    pub fn new() -> Self {
        SeriesEngine {
            catalog: FunctionCatalog::new(),
            converter: ScalarConverter::new(),
            expansions: HashMap::new(),
            loglevel: None,
            linear_sys_method: None,
            calc_statistics: HashMap::new(),
        }
    }

    pub fn set_loglevel(&mut self, loglevel: &str) {
        self.loglevel = Some(loglevel.to_lowercase());
    }

    pub fn set_linear_sys_method(&mut self, method: &str) {
        let method = method.to_lowercase();
        assert!(
            method == "inv" || method == "lu",
            "linear system method must be inv or lu"
        );
        self.linear_sys_method = Some(method);
    }

    /// Register `name(formal_parameter) = body` with the body in the host
    /// parse-tree format.
    pub fn define_function(&mut self, name: &str, formal_parameter: &str, body: Value) {
        self.catalog.define(name, formal_parameter, body);
    }

    pub fn get_expansion(&self, function_name: &str) -> Option<&SeriesExpansion> {
        self.expansions.get(function_name)
    }

    /// Expand a defined function into a power series by its formal
    /// parameter and return the rendered series. The expansion is stored,
    /// replacing any previous one for the same function.
    pub fn expand(&mut self, function_name: &str) -> Result<String, String> {
        self.init_logger();
        let (parameter, body) = {
            let record = self.catalog.get(function_name)?;
            (record.formal_parameter.clone(), record.body.clone())
        };
        info!(
            "expanding '{}' by powers of '{}'",
            function_name, parameter
        );
        let tree = factor_from_tree(&body, &self.catalog, &self.converter)?;
        let terms_before = tree.terms().len();
        let reduced = reduce(&tree);
        let organized = organize_terms(&reduced);
        let powers = Powers::collect(&reduced, &parameter);
        let rendered = powers.series().to_string();
        info!("reduced form of '{}': {}", function_name, organized);
        info!("series of '{}': {}", function_name, rendered);

        self.calc_statistics
            .insert("terms before reduction".to_string(), terms_before);
        self.calc_statistics
            .insert("terms after reduction".to_string(), reduced.terms().len());
        self.calc_statistics
            .insert("power buckets".to_string(), powers.exponents().len());

        self.expansions.insert(
            function_name.to_string(),
            SeriesExpansion {
                source: function_name.to_string(),
                variable: parameter,
                reduced,
                organized,
                powers,
                solutions: SolutionRegistry::new(function_name),
            },
        );
        Ok(rendered)
    }

    /// Derive one equation per power bucket of an expanded function,
    /// substitute the known values, solve the resulting linear system and
    /// register the resolved coefficients under `solution_name`. The solved
    /// series itself is filed under `expanded_name`.
    pub fn solve(
        &mut self,
        expanded_name: &str,
        source_name: &str,
        solution_name: &str,
        known: &SymbolValues,
    ) -> Result<(), String> {
        self.init_logger();
        let equations = {
            let expansion = self.expansions.get(source_name).ok_or_else(|| {
                format!("function '{}' has not been expanded", source_name)
            })?;
            let mut equations: Vec<Factor> = Vec::new();
            for exponent in expansion.powers.exponents() {
                let coefficient = expansion.powers.get_term_for(exponent);
                let equation = reduce(&substitute(&coefficient, known)?);
                if let Factor::Constant(value) = &equation {
                    if value.is_zero() {
                        continue;
                    }
                    return Err(format!(
                        "power {} equation of '{}' reduced to the non-zero constant {}",
                        exponent, source_name, value
                    ));
                }
                info!("power {} equation: {} = 0", exponent, equation);
                equations.push(equation);
            }
            equations
        };
        if equations.is_empty() {
            return Err(format!(
                "no equations with unknowns remain for '{}' after substitution",
                source_name
            ));
        }

        let mut matrix_solution = MatrixSolution::new();
        matrix_solution.set_equation_system(equations);
        if let Some(method) = &self.linear_sys_method {
            matrix_solution.set_linear_sys_method(method);
        }
        matrix_solution.eq_generate()?;
        let values = matrix_solution.solve()?;

        self.calc_statistics
            .insert("equations".to_string(), matrix_solution.equations.len());
        self.calc_statistics
            .insert("unknowns".to_string(), matrix_solution.unknowns.len());
        self.log_statistics();

        let solution = Solution {
            generated_name: expanded_name.to_string(),
            solution_name: solution_name.to_string(),
            source: source_name.to_string(),
            unknowns: matrix_solution.unknowns.clone(),
            values,
        };
        info!("{}", solution.report());
        let expansion = self.expansions.get_mut(source_name).ok_or_else(|| {
            format!("function '{}' has not been expanded", source_name)
        })?;
        expansion.solutions.register(solution);
        Ok(())
    }

    /// Render one named solution, or every solution of the function when no
    /// name is given.
    pub fn show_solutions(
        &self,
        source_name: &str,
        solution_name: Option<&str>,
    ) -> Result<String, String> {
        let expansion = self.expansions.get(source_name).ok_or_else(|| {
            format!("function '{}' has not been expanded", source_name)
        })?;
        match solution_name {
            Some(name) => expansion.solutions.get(name).map(Solution::report),
            None => {
                if expansion.solutions.is_empty() {
                    return Err(format!(
                        "function '{}' has no registered solutions",
                        source_name
                    ));
                }
                Ok(expansion.solutions.report_all())
            }
        }
    }

    // logging wrapper; a second init just keeps the already-running logger
    fn init_logger(&self) {
        let is_logging_disabled = self
            .loglevel
            .as_ref()
            .map(|level| level == "off" || level == "none")
            .unwrap_or(false);
        if is_logging_disabled {
            return;
        }
        let log_option = match self.loglevel.as_deref() {
            Some("debug") => LevelFilter::Debug,
            Some("info") | None => LevelFilter::Info,
            Some("warn") => LevelFilter::Warn,
            Some("error") => LevelFilter::Error,
            Some(other) => panic!("loglevel must be debug, info, warn or error, got {}", other),
        };
        let logger_instance = CombinedLogger::init(vec![TermLogger::new(
            log_option,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )]);
        if let Ok(()) = logger_instance {
            info!("logger started with loglevel {}", log_option);
        }
    }

    fn log_statistics(&self) {
        let stats = self.calc_statistics.clone();
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n EXPANSION STATISTICS \n \n {}", table.to_string());
    }
}

impl Default for SeriesEngine {
    fn default() -> Self {
        SeriesEngine::new()
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn identifier(name: &str) -> Value {
        json!({"NodeType": "Identifier", "Name": name})
    }

    fn binary(op: &str, left: Value, right: Value) -> Value {
        json!({"NodeType": "BinaryOP", "OpName": op, "Left": left, "Right": right})
    }

    fn parabola_tree() -> Value {
        // x^2 + 3*x + 3*x - 5
        binary(
            "+",
            binary(
                "+",
                binary(
                    "+",
                    binary("^", identifier("x"), json!(2.0)),
                    binary("*", json!(3.0), identifier("x")),
                ),
                binary("*", json!(3.0), identifier("x")),
            ),
            binary("*", json!(-1.0), json!(5.0)),
        )
    }

    fn twin_coefficients_tree() -> Value {
        // a + b - 4 + a*x - b*x: power 0 gives a + b - 4, power 1 gives a - b
        binary(
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
        )
    }

    #[test]
    fn test_expand_renders_series() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        engine.define_function("f", "x", parabola_tree());
        let rendered = engine.expand("f").unwrap();
        assert_eq!(rendered, "( x^2 + 6*x - 5 )");
        let expansion = engine.get_expansion("f").unwrap();
        assert_eq!(expansion.powers.exponents(), vec![0, 1, 2]);
    }

    #[test]
    fn test_expand_unknown_function_is_fatal() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        let err = engine.expand("ghost").unwrap_err();
        assert_eq!(err, "unknown function 'ghost'");
    }

    #[test]
    fn test_solve_resolves_coefficients() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        engine.define_function("f", "x", twin_coefficients_tree());
        engine.expand("f").unwrap();
        engine
            .solve("f_resolved", "f", "balanced", &SymbolValues::new())
            .unwrap();
        let expansion = engine.get_expansion("f").unwrap();
        let solution = expansion.solutions.get("balanced").unwrap();
        assert_relative_eq!(solution.value_of("a").unwrap(), 2.0);
        assert_relative_eq!(solution.value_of("b").unwrap(), 2.0);
        assert_eq!(solution.generated_name, "f_resolved");
    }

    #[test]
    fn test_solve_before_expand_is_fatal() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        engine.define_function("f", "x", parabola_tree());
        let err = engine
            .solve("f_resolved", "f", "any", &SymbolValues::new())
            .unwrap_err();
        assert_eq!(err, "function 'f' has not been expanded");
    }

    #[test]
    fn test_show_solutions_lookup_errors_name_the_key() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        engine.define_function("f", "x", twin_coefficients_tree());
        engine.expand("f").unwrap();

        let err = engine.show_solutions("g", None).unwrap_err();
        assert!(err.contains("'g'"));

        let err = engine.show_solutions("f", None).unwrap_err();
        assert!(err.contains("no registered solutions"));

        engine
            .solve("f_resolved", "f", "balanced", &SymbolValues::new())
            .unwrap();
        let err = engine.show_solutions("f", Some("missing")).unwrap_err();
        assert_eq!(err, "function 'f' has no solution named 'missing'");

        let report = engine.show_solutions("f", Some("balanced")).unwrap();
        assert!(report.contains("balanced"));
    }

    #[test]
    fn test_multiple_solutions_coexist() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        // a - c0 + (b - c1)*x with c0, c1 supplied per solve
        let body = binary(
            "+",
            binary("-", identifier("a"), identifier("c0")),
            binary(
                "*",
                binary("-", identifier("b"), identifier("c1")),
                identifier("x"),
            ),
        );
        engine.define_function("f", "x", body);
        engine.expand("f").unwrap();

        let mut first = SymbolValues::new();
        first.set("c0", 1.0).set("c1", 2.0);
        engine.solve("f_one", "f", "one", &first).unwrap();

        let mut second = SymbolValues::new();
        second.set("c0", -3.0).set("c1", 7.0);
        engine.solve("f_two", "f", "two", &second).unwrap();

        let expansion = engine.get_expansion("f").unwrap();
        assert_relative_eq!(
            expansion.solutions.get("one").unwrap().value_of("a").unwrap(),
            1.0
        );
        assert_relative_eq!(
            expansion.solutions.get("two").unwrap().value_of("a").unwrap(),
            -3.0
        );
        assert_relative_eq!(
            expansion.solutions.get("two").unwrap().value_of("b").unwrap(),
            7.0
        );
        assert_eq!(expansion.solutions.names(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_function_composition_expands() {
        let mut engine = SeriesEngine::new();
        engine.set_loglevel("off");
        // G(t) = 1 + t, F(x) = G(x^2) + x
        engine.define_function("G", "t", binary("+", json!(1.0), identifier("t")));
        engine.define_function(
            "F",
            "x",
            binary(
                "+",
                json!({"NodeType": "UnaryOP", "OpName": "G",
                       "Parameter": binary("^", identifier("x"), json!(2.0))}),
                identifier("x"),
            ),
        );
        let rendered = engine.expand("F").unwrap();
        assert_eq!(rendered, "( x^2 + x + 1 )");
    }
}
