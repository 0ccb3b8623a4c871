//! # Tree Conversion Module
//!
//! Builds factor trees from the host calculator's parse-tree format, a JSON
//! value in which numeric literals are bare numbers and every other node is
//! an object tagged with `NodeType`:
//!
//! ```json
//! {"NodeType": "BinaryOP", "OpName": "+",
//!  "Left": {"NodeType": "Identifier", "Name": "x"},
//!  "Right": 3.0}
//! ```
//!
//! `UnaryOP` nodes are function applications: the function is looked up in
//! the [`FunctionCatalog`], its body converted recursively, and the
//! converted argument substituted for the formal parameter. Unknown node
//! types, operators and function names abort with the offending tag in the
//! message.

use crate::algebra::factor_tree::Factor;
use crate::algebra::scalar_arithmetic::ScalarConverter;
use serde_json::Value;
use std::collections::HashMap;

/// Function calls nested deeper than this abort instead of recursing
/// forever on a self-referential definition.
const MAX_CALL_DEPTH: u32 = 64;

/// One user-defined function: `name(formal_parameter) = body`, with the body
/// kept in the host tree format until a conversion asks for it.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    pub name: String,
    pub formal_parameter: String,
    pub body: Value,
}

/// Name-to-definition lookup consulted while converting `UnaryOP` nodes.
/// Threaded explicitly through every conversion entry point; there is no
/// global registry.
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    pub records: HashMap<String, FunctionRecord>,
}

impl FunctionCatalog {
    pub fn new() -> Self {
        FunctionCatalog {
            records: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: &str, formal_parameter: &str, body: Value) {
        assert!(!name.is_empty(), "function name must not be empty");
        assert!(
            !formal_parameter.is_empty(),
            "formal parameter must not be empty"
        );
        self.records.insert(
            name.to_string(),
            FunctionRecord {
                name: name.to_string(),
                formal_parameter: formal_parameter.to_string(),
                body,
            },
        );
    }

    pub fn get(&self, name: &str) -> Result<&FunctionRecord, String> {
        self.records
            .get(name)
            .ok_or_else(|| format!("unknown function '{}'", name))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Convert one host parse tree into a factor tree.
pub fn factor_from_tree(
    node: &Value,
    catalog: &FunctionCatalog,
    converter: &ScalarConverter,
) -> Result<Factor, String> {
    convert_node(node, catalog, converter, 0)
}

fn convert_node(
    node: &Value,
    catalog: &FunctionCatalog,
    converter: &ScalarConverter,
    depth: u32,
) -> Result<Factor, String> {
    match node {
        Value::Number(number) => number
            .as_f64()
            .map(Factor::constant)
            .ok_or_else(|| format!("numeric literal out of range: {}", number)),
        Value::String(text) => converter.from_text(text).map(Factor::Constant),
        Value::Object(fields) => {
            let node_type = fields
                .get("NodeType")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("malformed tree node, missing NodeType: {}", node))?;
            match node_type {
                "Identifier" => {
                    let name = fields
                        .get("Name")
                        .and_then(Value::as_str)
                        .ok_or_else(|| "Identifier node without a Name field".to_string())?;
                    Ok(Factor::variable(name))
                }
                "BinaryOP" => {
                    let op = fields
                        .get("OpName")
                        .and_then(Value::as_str)
                        .ok_or_else(|| "BinaryOP node without an OpName field".to_string())?;
                    let left = convert_node(
                        required_field(fields, "Left", node_type)?,
                        catalog,
                        converter,
                        depth,
                    )?;
                    let right = convert_node(
                        required_field(fields, "Right", node_type)?,
                        catalog,
                        converter,
                        depth,
                    )?;
                    binary_operation(op, left, right)
                }
                "UnaryOP" => {
                    if depth >= MAX_CALL_DEPTH {
                        return Err(format!(
                            "function expansion exceeds depth {}, definition is likely self-referential",
                            MAX_CALL_DEPTH
                        ));
                    }
                    let op = fields
                        .get("OpName")
                        .and_then(Value::as_str)
                        .ok_or_else(|| "UnaryOP node without an OpName field".to_string())?;
                    let argument = convert_node(
                        required_field(fields, "Parameter", node_type)?,
                        catalog,
                        converter,
                        depth,
                    )?;
                    let record = catalog.get(op)?;
                    let body = convert_node(&record.body, catalog, converter, depth + 1)?;
                    Ok(body.substitute_symbol(&record.formal_parameter, &argument))
                }
                other => Err(format!("unknown NodeType '{}'", other)),
            }
        }
        other => Err(format!("malformed tree node: {}", other)),
    }
}

fn required_field<'a>(
    fields: &'a serde_json::Map<String, Value>,
    name: &str,
    node_type: &str,
) -> Result<&'a Value, String> {
    fields
        .get(name)
        .ok_or_else(|| format!("{} node without a {} field", node_type, name))
}

fn binary_operation(op: &str, left: Factor, right: Factor) -> Result<Factor, String> {
    match op {
        "+" => {
            let mut sum = Factor::Sum(vec![]);
            sum.add(left);
            sum.add(right);
            Ok(sum)
        }
        "-" => {
            // right operand carries its sign, so the difference still sums
            let mut negated = Factor::Product(vec![Factor::constant(-1.0)]);
            negated.add(right);
            let mut difference = Factor::Difference(vec![]);
            difference.add(left);
            difference.add(negated);
            Ok(difference)
        }
        "*" => {
            let mut product = Factor::Product(vec![]);
            product.add(left);
            product.add(right);
            Ok(product)
        }
        "^" => Ok(Factor::Power(left.boxed(), right.boxed())),
        other => Err(format!("unknown binary operator '{}'", other)),
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////
