//! # Power Collection Module
//!
//! Collects the terms of a reduced sum into buckets keyed by the integer
//! exponent of a designated variable, the step that turns a flat polynomial
//! into a power series view. Each bucket can be distributed (coefficient
//! terms combined, variable factor re-attached) or queried for its combined
//! coefficient alone, which is exactly what the coefficient solver needs.
//!
//! Collection expects reduced input: every term is either a constant, a
//! variable, an integer power or a flat product of those. Anything it does
//! not recognize (a foreign symbol, an opaque sub-sum, a non-integer power)
//! counts as power 0, so the buckets always partition the original terms.

use crate::algebra::factor_tree::Factor;
use crate::algebra::manipulations::{combine_like_terms, organize_terms, reduce_product};
use crate::algebra::scalar_arithmetic::Scalar;
use crate::algebra::substitution::{SymbolValues, evaluate};
use crate::global::THRESHOLD;
use rand::Rng;
use std::collections::BTreeMap;

/// Power-series view of a reduced sum: terms bucketed by the exponent of
/// `variable`. Bucket iteration is ascending by exponent; the rendered
/// series uses the conventional descending order.
#[derive(Debug, Clone)]
pub struct Powers {
    pub variable: String,
    pub buckets: BTreeMap<i64, Vec<Factor>>,
}

impl Powers {
    /// Bucket every term of `sum` by its exponent of `variable`. Each term
    /// lands in exactly one bucket.
    pub fn collect(sum: &Factor, variable: &str) -> Powers {
        let mut powers = Powers {
            variable: variable.to_string(),
            buckets: BTreeMap::new(),
        };
        for term in sum.terms() {
            let exponent = exponent_of(term, variable);
            powers
                .buckets
                .entry(exponent)
                .or_default()
                .push(term.clone());
        }
        powers
    }

    pub fn exponents(&self) -> Vec<i64> {
        self.buckets.keys().copied().collect()
    }

    /// One bucket, distributed: the variable factor is stripped from every
    /// term, like coefficient terms are combined, and the variable power is
    /// re-attached after each coefficient (nothing is attached for exponent
    /// 0). A bucket whose coefficients cancel entirely contributes no terms.
    pub fn distribute(&self, exponent: i64) -> Vec<Factor> {
        let terms = match self.buckets.get(&exponent) {
            Some(terms) => terms,
            None => return Vec::new(),
        };
        let stripped: Vec<Factor> = terms
            .iter()
            .map(|term| strip_variable(term, &self.variable))
            .collect();
        let combined = combine_like_terms(stripped);
        if let Factor::Constant(value) = &combined {
            if value.is_zero() {
                return Vec::new();
            }
        }
        let coefficient_terms: Vec<Factor> = combined.terms().to_vec();
        if exponent == 0 {
            return coefficient_terms;
        }
        coefficient_terms
            .into_iter()
            .map(|term| {
                let mut children = match term {
                    Factor::Product(inner) => inner,
                    other => vec![other],
                };
                children.push(variable_factor(&self.variable, exponent));
                reduce_product(&children)
            })
            .collect()
    }

    /// Combined coefficient of one exponent, without the variable factor,
    /// organized for display. An absent exponent yields the constant 0.
    pub fn get_term_for(&self, exponent: i64) -> Factor {
        match self.buckets.get(&exponent) {
            None => Factor::Constant(Scalar::zero()),
            Some(terms) => {
                let stripped: Vec<Factor> = terms
                    .iter()
                    .map(|term| strip_variable(term, &self.variable))
                    .collect();
                organize_terms(&combine_like_terms(stripped))
            }
        }
    }

    /// The full series: every bucket distributed and re-summed, highest
    /// exponent first, organized for display.
    pub fn series(&self) -> Factor {
        let mut terms: Vec<Factor> = Vec::new();
        for exponent in self.buckets.keys().rev() {
            terms.extend(self.distribute(*exponent));
        }
        if terms.is_empty() {
            return Factor::Constant(Scalar::zero());
        }
        organize_terms(&Factor::Sum(terms))
    }

    /// Numeric check of the partition invariant: the re-summed series and
    /// the original tree agree at `samples` random points.
    pub fn verify_partition(&self, original: &Factor, samples: usize) -> Result<bool, String> {
        let series = self.series();
        let mut symbols = original.symbolic_references();
        symbols.extend(series.symbolic_references());
        let mut rng = rand::rng();
        for _ in 0..samples {
            let known: SymbolValues = symbols
                .iter()
                .map(|name| (name.clone(), rng.random_range(-2.0..2.0)))
                .collect();
            let expected = evaluate(original, &known)?;
            let summed = evaluate(&series, &known)?;
            if (expected - summed).abs() > THRESHOLD * (1.0 + expected.abs()) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// `Some(k)` when the factor is the collection variable itself (k = 1) or an
/// integer power of it.
fn is_variable_factor(factor: &Factor, variable: &str) -> Option<i64> {
    match factor {
        Factor::Variable(name) if name == variable => Some(1),
        Factor::Power(base, exponent) => match (&**base, &**exponent) {
            (Factor::Variable(name), Factor::Constant(e)) if name == variable => e.as_exponent(),
            _ => None,
        },
        _ => None,
    }
}

fn exponent_of(term: &Factor, variable: &str) -> i64 {
    if let Some(k) = is_variable_factor(term, variable) {
        return k;
    }
    match term {
        Factor::Product(children) => children
            .iter()
            .map(|child| exponent_of(child, variable))
            .sum(),
        Factor::Negated(inner) => exponent_of(inner, variable),
        _ => 0,
    }
}

/// Remove the variable factor from a term, leaving its coefficient; a term
/// that was nothing but the variable leaves the placeholder constant 1.
fn strip_variable(term: &Factor, variable: &str) -> Factor {
    match term {
        Factor::Negated(inner) => Factor::Negated(strip_variable(inner, variable).boxed()),
        Factor::Product(children) => {
            let kept: Vec<Factor> = children
                .iter()
                .filter(|child| is_variable_factor(child, variable).is_none())
                .cloned()
                .collect();
            if kept.is_empty() {
                Factor::Constant(Scalar::one())
            } else {
                Factor::Product(kept).reduce_single()
            }
        }
        other => {
            if is_variable_factor(other, variable).is_some() {
                Factor::Constant(Scalar::one())
            } else {
                other.clone()
            }
        }
    }
}

fn variable_factor(variable: &str, exponent: i64) -> Factor {
    if exponent == 1 {
        Factor::variable(variable)
    } else {
        Factor::power_of(variable, exponent)
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::manipulations::reduce;

    fn sample_sum() -> Factor {
        // x^2 + 3*x + 3*x - 5
        Factor::Sum(vec![
            Factor::power_of("x", 2),
            Factor::Product(vec![Factor::constant(3.0), Factor::variable("x")]),
            Factor::Product(vec![Factor::constant(3.0), Factor::variable("x")]),
            Factor::constant(-5.0),
        ])
    }

    #[test]
    fn test_buckets_partition_terms() {
        let powers = Powers::collect(&sample_sum(), "x");
        assert_eq!(powers.exponents(), vec![0, 1, 2]);
        assert_eq!(powers.buckets[&0].len(), 1);
        assert_eq!(powers.buckets[&1].len(), 2);
        assert_eq!(powers.buckets[&2].len(), 1);
    }

    #[test]
    fn test_get_term_for_combines_coefficients() {
        let powers = Powers::collect(&sample_sum(), "x");
        assert_eq!(format!("{}", powers.get_term_for(0)), "-5");
        assert_eq!(format!("{}", powers.get_term_for(1)), "6");
        assert_eq!(format!("{}", powers.get_term_for(2)), "1");
        assert_eq!(format!("{}", powers.get_term_for(7)), "0");
    }

    #[test]
    fn test_series_rendering() {
        let powers = Powers::collect(&sample_sum(), "x");
        assert_eq!(format!("{}", powers.series()), "( x^2 + 6*x - 5 )");
    }

    #[test]
    fn test_distribute_reattaches_variable() {
        let powers = Powers::collect(&sample_sum(), "x");
        let first = powers.distribute(1);
        assert_eq!(first.len(), 1);
        assert_eq!(format!("{}", first[0]), "6*x");
        let second = powers.distribute(2);
        assert_eq!(format!("{}", second[0]), "x^2");
    }

    #[test]
    fn test_symbolic_coefficients_collect_by_power() {
        // a + b - 4 + a*x - b*x collected on x
        let sum = reduce(&Factor::Sum(vec![
            Factor::variable("a"),
            Factor::variable("b"),
            Factor::constant(-4.0),
            Factor::Product(vec![Factor::variable("a"), Factor::variable("x")]),
            Factor::Product(vec![
                Factor::constant(-1.0),
                Factor::variable("b"),
                Factor::variable("x"),
            ]),
        ]));
        let powers = Powers::collect(&sum, "x");
        assert_eq!(powers.exponents(), vec![0, 1]);
        let zeroth = powers.get_term_for(0);
        let refs = zeroth.symbolic_references();
        assert!(refs.contains("a") && refs.contains("b"));
        assert_eq!(format!("{}", powers.get_term_for(1)), "( a - b )");
    }

    #[test]
    fn test_foreign_symbols_count_as_power_zero() {
        let sum = Factor::Sum(vec![
            Factor::variable("y"),
            Factor::Product(vec![Factor::constant(2.0), Factor::variable("x")]),
        ]);
        let powers = Powers::collect(&sum, "x");
        assert_eq!(powers.exponents(), vec![0, 1]);
        assert_eq!(format!("{}", powers.get_term_for(0)), "y");
    }

    #[test]
    fn test_partition_verified_numerically() {
        let reduced = reduce(&sample_sum());
        let powers = Powers::collect(&reduced, "x");
        assert!(powers.verify_partition(&reduced, 25).unwrap());

        let mixed = reduce(&Factor::Sum(vec![
            Factor::Product(vec![
                Factor::variable("a"),
                Factor::power_of("x", 2),
                Factor::variable("x"),
            ]),
            Factor::Product(vec![Factor::constant(2.0), Factor::variable("b")]),
            Factor::variable("x"),
        ]));
        let powers = Powers::collect(&mixed, "x");
        assert_eq!(powers.exponents(), vec![0, 1, 3]);
        assert!(powers.verify_partition(&mixed, 25).unwrap());
    }
}
