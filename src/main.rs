#![allow(non_snake_case)]
pub mod Utils;
pub mod algebra;
pub mod expansion;
pub mod global;
pub mod solver;

use crate::Utils::logger::{save_series_to_txt, save_solution_to_csv};
use crate::algebra::factor_tree::Factor;
use crate::algebra::manipulations::{organize_terms, reduce};
use crate::algebra::substitution::{SymbolValues, evaluate};
use crate::expansion::examples_library::SeriesProblem;
use crate::expansion::series_expansion::SeriesEngine;
use strum::IntoEnumIterator;

fn main() {
    let example = 2;
    match example {
        0 => {
            // EXPANSION OF A POLYNOMIAL BY POWERS OF ITS ARGUMENT
            // take the ready-made parabola problem f(x) = x^2 + 3*x + 3*x - 5
            let problem = SeriesProblem::Parabola;
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("info");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let series = engine.expand(&problem.target()).unwrap();
            println!("series = {}", series);
            // inspect the combined coefficient of every power bucket
            let expansion = engine.get_expansion(&problem.target()).unwrap();
            for exponent in expansion.powers.exponents() {
                println!(
                    "coefficient of power {} = {}",
                    exponent,
                    expansion.powers.get_term_for(exponent)
                );
            }
        }
        1 => {
            // FACTOR TREES WITHOUT THE ENGINE
            // construct x^2 + 3*x + 3*x - 5 by hand, reduce it and evaluate it
            let tree = Factor::Sum(vec![
                Factor::power_of("x", 2),
                Factor::Product(vec![Factor::constant(3.0), Factor::variable("x")]),
                Factor::Product(vec![Factor::constant(3.0), Factor::variable("x")]),
                Factor::constant(-5.0),
            ]);
            let reduced = reduce(&tree);
            println!("reduced = {}", organize_terms(&reduced));
            let mut known = SymbolValues::new();
            known.set("x", 2.0);
            println!("value at x = 2 is {}", evaluate(&reduced, &known).unwrap());
        }
        2 => {
            // SOLVE FOR UNKNOWN SERIES COEFFICIENTS
            // f(x) = a + b - 4 + a*x - b*x: every power bucket must vanish,
            // which forces a = 2 and b = 2
            let problem = SeriesProblem::TwinCoefficients;
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("info");
            // matrix inversion is the default; "lu" is also available
            engine.set_linear_sys_method("inv");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let target = problem.target();
            let series = engine.expand(&target).unwrap();
            println!("series = {}", series);
            engine
                .solve("f_resolved", &target, "balanced", &problem.known_values())
                .unwrap();
            println!("{}", engine.show_solutions(&target, Some("balanced")).unwrap());
        }
        3 => {
            // SEVERAL SOLUTIONS OF THE SAME EXPANSION
            // f(x) = (a - c0) + (b - c1)*x solved under two assignments of
            // the known constants c0 and c1
            let problem = SeriesProblem::ShiftedLine;
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("info");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let target = problem.target();
            engine.expand(&target).unwrap();

            engine
                .solve("f_one", &target, "one", &problem.known_values())
                .unwrap();
            let mut second = SymbolValues::new();
            second.set("c0", -3.0).set("c1", 7.0);
            engine.solve("f_two", &target, "two", &second).unwrap();

            println!("{}", engine.show_solutions(&target, None).unwrap());
        }
        4 => {
            // FUNCTION COMPOSITION THROUGH THE CATALOG
            // G(t) = 1 + t, F(x) = G(x^2) + x; the call is expanded before
            // reduction
            let problem = SeriesProblem::ComposedQuadratic;
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("info");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let series = engine.expand(&problem.target()).unwrap();
            println!("series = {}", series);
        }
        5 => {
            // SAVE RESULTS TO FILES
            let problem = SeriesProblem::TwinCoefficients;
            let mut engine = SeriesEngine::new();
            engine.set_loglevel("info");
            for (name, parameter, body) in problem.setup() {
                engine.define_function(&name, &parameter, body);
            }
            let target = problem.target();
            let series = engine.expand(&target).unwrap();
            engine
                .solve("f_resolved", &target, "balanced", &problem.known_values())
                .unwrap();
            let expansion = engine.get_expansion(&target).unwrap();
            let solution = expansion.solutions.get("balanced").unwrap();
            save_solution_to_csv(&solution.unknowns, &solution.values, "solution.csv").unwrap();
            save_series_to_txt(&target, &series, "series.txt").unwrap();
            println!("saved solution.csv and series.txt");
        }
        6 => {
            // RUN THE WHOLE PROBLEM COLLECTION
            for problem in SeriesProblem::iter() {
                let mut engine = SeriesEngine::new();
                engine.set_loglevel("off");
                for (name, parameter, body) in problem.setup() {
                    engine.define_function(&name, &parameter, body);
                }
                let series = engine.expand(&problem.target()).unwrap();
                println!("{:?}: {}", problem, problem.description());
                println!("  {} expands to {}", problem.target(), series);
            }
        }
        _ => {
            println!("example not found");
        }
    }
}
