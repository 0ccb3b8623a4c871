//! # Solution Registry Module
//!
//! Named numeric solutions derived from one expanded function. Every solve
//! files its resolved coefficients here under a caller-chosen solution name,
//! scoped per generating equation, so several numeric instantiations of the
//! same symbolic series can coexist and be re-displayed later by name.

use itertools::Itertools;
use nalgebra::DVector;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style};

/// Resolved coefficients of one solve: the unknown names in column order and
/// their values, plus the name the derived series was registered under.
#[derive(Debug, Clone)]
pub struct Solution {
    pub generated_name: String,
    pub solution_name: String,
    pub source: String,
    pub unknowns: Vec<String>,
    pub values: DVector<f64>,
}

impl Solution {
    pub fn value_of(&self, unknown: &str) -> Option<f64> {
        self.unknowns
            .iter()
            .position(|name| name == unknown)
            .map(|i| self.values[i])
    }

    /// Tabular report: one row per unknown, `symbol = value`.
    pub fn report(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["coefficient", "=", "value"]);
        for (name, value) in self.unknowns.iter().zip(self.values.iter()) {
            builder.push_record([name.clone(), "=".to_string(), format!("{}", value)]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        format!(
            "solution '{}' of '{}' (series registered as '{}')\n{}",
            self.solution_name, self.source, self.generated_name, table
        )
    }
}

/// Per-equation solution store; lookups fail fast with the requested name.
#[derive(Debug, Clone)]
pub struct SolutionRegistry {
    pub source: String,
    pub solutions: HashMap<String, Solution>,
}

impl SolutionRegistry {
    pub fn new(source: &str) -> Self {
        SolutionRegistry {
            source: source.to_string(),
            solutions: HashMap::new(),
        }
    }

    pub fn register(&mut self, solution: Solution) {
        self.solutions
            .insert(solution.solution_name.clone(), solution);
    }

    pub fn get(&self, solution_name: &str) -> Result<&Solution, String> {
        self.solutions.get(solution_name).ok_or_else(|| {
            format!(
                "function '{}' has no solution named '{}'",
                self.source, solution_name
            )
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.solutions.keys().cloned().sorted().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Reports of every registered solution, in name order.
    pub fn report_all(&self) -> String {
        self.names()
            .iter()
            .filter_map(|name| self.solutions.get(name))
            .map(|solution| solution.report())
            .join("\n")
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////
