//! # Substitution Module
//!
//! Numeric substitution over factor trees: bound variables are replaced by
//! their constant values, constant subtrees are folded, and powers are
//! evaluated outright. Substitution is what turns a per-power coefficient
//! equation into the linear form the matrix solver consumes.
//!
//! Unbound plain variables survive substitution untouched: they are the
//! unknown coefficients the solver is about to determine. A `Power` is the
//! exception, it must evaluate to a constant, so an unbound base symbol or a
//! composite base is a fatal error rather than a silent pass-through.

use crate::algebra::factor_tree::Factor;
use crate::algebra::scalar_arithmetic::Scalar;
use std::collections::BTreeMap;

/// Known numeric values for symbols, the right-hand side of `name = value`
/// assignments collected before a solve.
#[derive(Debug, Clone, Default)]
pub struct SymbolValues {
    pub values: BTreeMap<String, Scalar>,
}

impl SymbolValues {
    pub fn new() -> Self {
        SymbolValues {
            values: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: f64) -> &mut Self {
        self.values.insert(name.to_string(), Scalar::from(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.values.get(name)
    }

    /// Lookup that fails fast, naming the symbol that has no bound value.
    pub fn require(&self, name: &str) -> Result<Scalar, String> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| format!("no value bound for symbol '{}'", name))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for SymbolValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut values = SymbolValues::new();
        for (name, value) in iter {
            values.set(&name, value);
        }
        values
    }
}

/// Replace bound variables by constants and fold what becomes numeric.
///
/// Powers are evaluated here: the (substituted) base must be a constant or a
/// bound variable and the exponent must fold to a constant, otherwise the
/// equation cannot enter a linear system and the error says why.
pub fn substitute(factor: &Factor, known: &SymbolValues) -> Result<Factor, String> {
    match factor {
        Factor::Constant(_) => Ok(factor.clone()),
        Factor::Variable(name) => match known.get(name) {
            Some(value) => Ok(Factor::Constant(*value)),
            None => Ok(factor.clone()),
        },
        Factor::Sum(children) => substitute_list(children, known, true).map(|folded| match folded {
            Folded::Value(value) => Factor::Constant(value),
            Folded::Partial(children) => Factor::Sum(children),
        }),
        Factor::Difference(children) => {
            substitute_list(children, known, true).map(|folded| match folded {
                Folded::Value(value) => Factor::Constant(value),
                Folded::Partial(children) => Factor::Difference(children),
            })
        }
        Factor::Product(children) => {
            substitute_list(children, known, false).map(|folded| match folded {
                Folded::Value(value) => Factor::Constant(value),
                Folded::Partial(children) => Factor::Product(children),
            })
        }
        Factor::Negated(inner) => match substitute(inner, known)? {
            Factor::Constant(value) => Ok(Factor::Constant(value.negate())),
            other => Ok(Factor::Negated(other.boxed())),
        },
        Factor::Power(base, exponent) => {
            let exponent = match substitute(exponent, known)? {
                Factor::Constant(value) => value,
                other => {
                    return Err(format!("power exponent is not a constant: {}", other));
                }
            };
            let base_value = match substitute(base, known)? {
                Factor::Constant(value) => value,
                Factor::Variable(name) => known.require(&name)?,
                other => {
                    return Err(format!("power base is not a constant: {}", other));
                }
            };
            match exponent.as_exponent() {
                Some(k) => Ok(Factor::Constant(base_value.pow_int(k))),
                None => Ok(Factor::Constant(Scalar::from(
                    base_value.to_double().powf(exponent.to_double()),
                ))),
            }
        }
    }
}

enum Folded {
    Value(Scalar),
    Partial(Vec<Factor>),
}

fn substitute_list(
    children: &[Factor],
    known: &SymbolValues,
    additive: bool,
) -> Result<Folded, String> {
    let mut substituted = Vec::with_capacity(children.len());
    let mut all_constant = true;
    for child in children {
        let child = substitute(child, known)?;
        if !matches!(child, Factor::Constant(_)) {
            all_constant = false;
        }
        substituted.push(child);
    }
    if !all_constant {
        return Ok(Folded::Partial(substituted));
    }
    let mut acc = if additive {
        Scalar::zero()
    } else {
        Scalar::one()
    };
    for child in substituted {
        if let Factor::Constant(value) = child {
            acc = if additive {
                acc.plus(&value)
            } else {
                acc.times(&value)
            };
        }
    }
    Ok(Folded::Value(acc))
}

/// Fully numeric evaluation; every referenced symbol must be bound.
pub fn evaluate(factor: &Factor, known: &SymbolValues) -> Result<f64, String> {
    match factor {
        Factor::Constant(value) => Ok(value.to_double()),
        Factor::Variable(name) => known.require(name).map(|value| value.to_double()),
        Factor::Sum(children) | Factor::Difference(children) => {
            let mut acc = 0.0;
            for child in children {
                acc += evaluate(child, known)?;
            }
            Ok(acc)
        }
        Factor::Product(children) => {
            let mut acc = 1.0;
            for child in children {
                acc *= evaluate(child, known)?;
            }
            Ok(acc)
        }
        Factor::Negated(inner) => Ok(-evaluate(inner, known)?),
        Factor::Power(base, exponent) => {
            let base = evaluate(base, known)?;
            let exponent = evaluate(exponent, known)?;
            Ok(base.powf(exponent))
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_substitute_binds_and_folds() {
        let tree = Factor::Sum(vec![
            Factor::Product(vec![Factor::constant(2.0), Factor::variable("x")]),
            Factor::constant(1.0),
        ]);
        let mut known = SymbolValues::new();
        known.set("x", 3.0);
        let substituted = substitute(&tree, &known).unwrap();
        assert_eq!(substituted, Factor::constant(7.0));
    }

    #[test]
    fn test_unknowns_survive() {
        let tree = Factor::Sum(vec![
            Factor::variable("a"),
            Factor::Product(vec![Factor::variable("b"), Factor::variable("x")]),
        ]);
        let mut known = SymbolValues::new();
        known.set("x", 2.0);
        let substituted = substitute(&tree, &known).unwrap();
        let refs = substituted.symbolic_references();
        assert!(refs.contains("a") && refs.contains("b"));
        assert!(!refs.contains("x"));
    }

    #[test]
    fn test_power_of_bound_variable_evaluates() {
        let tree = Factor::power_of("x", 3);
        let mut known = SymbolValues::new();
        known.set("x", 2.0);
        assert_eq!(substitute(&tree, &known).unwrap(), Factor::constant(8.0));
    }

    #[test]
    fn test_power_of_unbound_variable_fails() {
        let tree = Factor::power_of("x", 2);
        let err = substitute(&tree, &SymbolValues::new()).unwrap_err();
        assert!(err.contains("x"), "error should name the symbol: {}", err);
    }

    #[test]
    fn test_power_of_composite_base_fails() {
        let tree = Factor::Power(
            Factor::Sum(vec![Factor::variable("a"), Factor::variable("b")]).boxed(),
            Factor::constant(2.0).boxed(),
        );
        let err = substitute(&tree, &SymbolValues::new()).unwrap_err();
        assert!(err.contains("power base is not a constant"));
    }

    #[test]
    fn test_evaluate_requires_all_symbols() {
        let tree = Factor::Sum(vec![
            Factor::power_of("x", 2),
            Factor::Product(vec![Factor::constant(6.0), Factor::variable("x")]),
            Factor::constant(-5.0),
        ]);
        let mut known = SymbolValues::new();
        known.set("x", 2.0);
        assert_relative_eq!(evaluate(&tree, &known).unwrap(), 11.0);
        assert!(evaluate(&tree, &SymbolValues::new()).is_err());
    }

    #[test]
    fn test_require_names_missing_symbol() {
        let known = SymbolValues::new();
        let err = known.require("a3").unwrap_err();
        assert_eq!(err, "no value bound for symbol 'a3'");
    }
}
