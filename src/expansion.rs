/// # Series engine
/// the public facade: define functions in the host parse-tree format,
/// expand them into power series, solve for unknown coefficients and
/// report registered solutions
///# Example#
/// ```
/// use RustedCAS::expansion::series_expansion::SeriesEngine;
/// use serde_json::json;
/// let mut engine = SeriesEngine::new();
/// engine.set_loglevel("off");
/// // f(x) = 3*x
/// engine.define_function("f", "x", json!({
///     "NodeType": "BinaryOP", "OpName": "*",
///     "Left": 3.0,
///     "Right": {"NodeType": "Identifier", "Name": "x"},
/// }));
/// let series = engine.expand("f").unwrap();
/// assert_eq!(series, "3*x");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod series_expansion;
/// named solutions of one expanded function and their tabled reports
pub mod solution_registry;
/// enum collection of ready-made expansion problems with expected results
pub mod examples_library;
