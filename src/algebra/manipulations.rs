//! # Manipulations Module
//!
//! Reduction of factor trees to the canonical polynomial-like form the rest
//! of the pipeline expects: constants folded, repeated symbols merged into
//! integer powers (`x*x -> x^2`), like terms combined, zero terms dropped,
//! bare constants folded into a single trailing constant, and negative terms
//! reorganized so sums display subtraction idiomatically.
//!
//! ## Purpose
//!
//! - `reduce` - composite entry point, idempotent by construction
//! - `reduce_product` - canonicalize one product into
//!   `[Constant?, Power|Variable.., opaque..]`
//! - `reduce_terms` - reduce a sum's terms and combine like terms
//! - `combine_like_terms` - the factor-analysis step: terms keyed by the
//!   string image of their non-scalar factors, scalar multipliers summed
//! - `reduced_sum_of` - fold bare constants into one trailing constant
//! - `organize_terms` - split positive/negative terms for display
//!
//! Reduction never distributes products over sums; a sum kept inside a
//! product stays an opaque factor (general expansion and factoring are out
//! of scope for this engine).

use crate::algebra::factor_tree::Factor;
use crate::algebra::scalar_arithmetic::Scalar;
use itertools::Itertools;
use std::collections::{HashMap, VecDeque};

/// Reduce a factor tree to canonical form. Running it twice yields the same
/// tree as running it once.
pub fn reduce(factor: &Factor) -> Factor {
    match factor {
        Factor::Constant(_) | Factor::Variable(_) => factor.clone(),
        Factor::Sum(_) | Factor::Difference(_) => reduce_terms(factor),
        Factor::Product(children) => reduce_product(children),
        Factor::Negated(inner) => Factor::Negated(reduce(inner).boxed()),
        Factor::Power(base, exponent) => reduce_power(base, exponent),
    }
}

fn reduce_power(base: &Factor, exponent: &Factor) -> Factor {
    let base = reduce(base);
    let exponent = reduce(exponent);
    match (&base, &exponent) {
        (Factor::Constant(b), Factor::Constant(e)) => match e.as_exponent() {
            Some(k) => Factor::Constant(b.pow_int(k)),
            None => Factor::Power(base.boxed(), exponent.boxed()),
        },
        (_, Factor::Constant(e)) if e.is_one() => base,
        (_, Factor::Constant(e)) if e.is_zero() => Factor::Constant(Scalar::one()),
        _ => Factor::Power(base.boxed(), exponent.boxed()),
    }
}

/// Canonicalize one product: fold every constant into a single leading
/// scalar, accumulate per-symbol integer exponents in first-occurrence
/// order, keep anything else (sums, non-integer powers) as opaque trailing
/// factors. A zero scalar collapses the whole product.
pub fn reduce_product(children: &[Factor]) -> Factor {
    let mut scalar = Scalar::one();
    let mut exponents: Vec<(String, i64)> = Vec::new();
    let mut opaque: Vec<Factor> = Vec::new();

    let mut queue: VecDeque<Factor> = children.iter().map(reduce).collect();
    while let Some(child) = queue.pop_front() {
        match child {
            Factor::Constant(value) => scalar = scalar.times(&value),
            Factor::Variable(name) => bump_exponent(&mut exponents, name, 1),
            Factor::Product(inner) => queue.extend(inner),
            Factor::Negated(inner) => {
                scalar = scalar.times(&Scalar::neg_one());
                queue.push_back(*inner);
            }
            Factor::Power(base, exponent) => {
                let monomial = match (&*base, &*exponent) {
                    (Factor::Variable(name), Factor::Constant(e)) => {
                        e.as_exponent().map(|k| (name.clone(), k))
                    }
                    _ => None,
                };
                match monomial {
                    Some((name, k)) => bump_exponent(&mut exponents, name, k),
                    None => opaque.push(Factor::Power(base, exponent)),
                }
            }
            other => opaque.push(other),
        }
    }

    if scalar.is_zero() {
        return Factor::Constant(Scalar::zero());
    }

    let mut rebuilt: Vec<Factor> = Vec::new();
    if !scalar.is_one() || (exponents.iter().all(|(_, k)| *k == 0) && opaque.is_empty()) {
        rebuilt.push(Factor::Constant(scalar));
    }
    for (name, k) in exponents {
        match k {
            0 => {}
            1 => rebuilt.push(Factor::Variable(name)),
            _ => rebuilt.push(Factor::power_of(&name, k)),
        }
    }
    rebuilt.extend(opaque);
    Factor::Product(rebuilt).reduce_single()
}

fn bump_exponent(exponents: &mut Vec<(String, i64)>, name: String, by: i64) {
    if let Some(entry) = exponents.iter_mut().find(|(n, _)| *n == name) {
        entry.1 += by;
    } else {
        exponents.push((name, by));
    }
}

/// Reduce every term of a sum, splice nested sums flat, drop zero terms and
/// combine like terms.
pub fn reduce_terms(sum: &Factor) -> Factor {
    let mut reduced: Vec<Factor> = Vec::new();
    for term in sum.terms() {
        let term = reduce(term);
        match term {
            Factor::Constant(value) if value.is_zero() => {}
            Factor::Sum(inner) | Factor::Difference(inner) => reduced.extend(inner),
            other => reduced.push(other),
        }
    }
    combine_like_terms(reduced)
}

/// Factor analysis over a flat term list: each term is split into a scalar
/// multiplier and its non-scalar factors, terms sharing the same factor
/// image are merged by summing multipliers, and buckets whose multiplier
/// cancelled to zero are dropped. The key sorts factor images so `x*y` and
/// `y*x` merge; the rebuilt term keeps the order of its first occurrence.
pub fn combine_like_terms(terms: Vec<Factor>) -> Factor {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, (Scalar, Vec<Factor>)> = HashMap::new();

    for term in terms {
        let (coefficient, symbols) = split_term(term);
        let key = symbols
            .iter()
            .map(|factor| factor.to_string())
            .sorted()
            .join("*");
        match buckets.get_mut(&key) {
            Some((acc, _)) => *acc = acc.plus(&coefficient),
            None => {
                order.push(key.clone());
                buckets.insert(key, (coefficient, symbols));
            }
        }
    }

    let mut rebuilt: Vec<Factor> = Vec::new();
    let mut constant = Scalar::zero();
    let mut saw_constant = false;
    for key in order {
        let (coefficient, symbols) = match buckets.remove(&key) {
            Some(bucket) => bucket,
            None => continue,
        };
        if key.is_empty() {
            constant = constant.plus(&coefficient);
            saw_constant = true;
            continue;
        }
        if coefficient.is_zero() {
            continue;
        }
        rebuilt.push(rebuild_term(coefficient, symbols));
    }
    if saw_constant && (!constant.is_zero() || rebuilt.is_empty()) {
        rebuilt.push(Factor::Constant(constant));
    }
    if rebuilt.is_empty() {
        return Factor::Constant(Scalar::zero());
    }
    Factor::Sum(rebuilt).reduce_single()
}

/// Scalar multiplier and non-scalar factor list of one reduced term.
fn split_term(term: Factor) -> (Scalar, Vec<Factor>) {
    match term {
        Factor::Constant(value) => (value, vec![]),
        Factor::Product(children) => {
            let mut coefficient = Scalar::one();
            let mut symbols = Vec::new();
            for child in children {
                match child {
                    Factor::Constant(value) => coefficient = coefficient.times(&value),
                    other => symbols.push(other),
                }
            }
            (coefficient, symbols)
        }
        Factor::Negated(inner) => {
            let (coefficient, symbols) = split_term(*inner);
            (coefficient.negate(), symbols)
        }
        other => (Scalar::one(), vec![other]),
    }
}

fn rebuild_term(coefficient: Scalar, symbols: Vec<Factor>) -> Factor {
    if coefficient.is_one() {
        return Factor::Product(symbols).reduce_single();
    }
    let mut children = vec![Factor::Constant(coefficient)];
    children.extend(symbols);
    Factor::Product(children)
}

/// Fold the bare constants of a term list into a single trailing constant,
/// omitted when it is zero and other terms remain.
pub fn reduced_sum_of(terms: &[Factor]) -> Factor {
    let mut rebuilt: Vec<Factor> = Vec::new();
    let mut constant = Scalar::zero();
    let mut saw_constant = false;
    for term in terms {
        match term {
            Factor::Constant(value) => {
                constant = constant.plus(value);
                saw_constant = true;
            }
            other => rebuilt.push(other.clone()),
        }
    }
    if saw_constant && (!constant.is_zero() || rebuilt.is_empty()) {
        rebuilt.push(Factor::Constant(constant));
    }
    if rebuilt.is_empty() {
        return Factor::Constant(Scalar::zero());
    }
    Factor::Sum(rebuilt).reduce_single()
}

/// Separate a sum's terms into positive and negative buckets and mark the
/// negatives with `Negated`, so the display shows `a - b` instead of
/// `a + -1*b`. Positives keep their order, negatives follow. Sums nested
/// inside products and powers are organized the same way.
pub fn organize_terms(factor: &Factor) -> Factor {
    match factor {
        Factor::Sum(children) | Factor::Difference(children) => {
            let mut positive: Vec<Factor> = Vec::new();
            let mut negative: Vec<Factor> = Vec::new();
            for term in children {
                let term = organize_terms(term);
                if is_negative_term(&term) {
                    match term {
                        Factor::Negated(_) => negative.push(term),
                        other => negative.push(other.negate()),
                    }
                } else {
                    positive.push(term);
                }
            }
            positive.extend(negative);
            Factor::Difference(positive).reduce_single()
        }
        Factor::Product(children) => {
            Factor::Product(children.iter().map(organize_terms).collect())
        }
        Factor::Power(base, exponent) => Factor::Power(
            organize_terms(base).boxed(),
            organize_terms(exponent).boxed(),
        ),
        Factor::Negated(inner) => Factor::Negated(organize_terms(inner).boxed()),
        other => other.clone(),
    }
}

fn is_negative_term(term: &Factor) -> bool {
    match term {
        Factor::Constant(value) => value.is_negative(),
        Factor::Negated(_) => true,
        Factor::Product(children) => {
            matches!(children.first(), Some(Factor::Constant(lead)) if lead.is_negative())
        }
        _ => false,
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn product(children: Vec<Factor>) -> Factor {
        Factor::Product(children)
    }

    #[test]
    fn test_reduce_product_merges_powers() {
        // x * x -> x^2
        let squared = reduce_product(&[Factor::variable("x"), Factor::variable("x")]);
        assert_eq!(format!("{}", squared), "x^2");

        // x^2 * x -> x^3
        let cubed = reduce_product(&[Factor::power_of("x", 2), Factor::variable("x")]);
        assert_eq!(format!("{}", cubed), "x^3");

        // 2 * x * 3 * y -> 6*x*y
        let mixed = reduce_product(&[
            Factor::constant(2.0),
            Factor::variable("x"),
            Factor::constant(3.0),
            Factor::variable("y"),
        ]);
        assert_eq!(format!("{}", mixed), "6*x*y");
    }

    #[test]
    fn test_reduce_product_zero_and_one() {
        let zero = reduce_product(&[
            Factor::constant(0.0),
            Factor::variable("x"),
            Factor::variable("y"),
        ]);
        assert_eq!(zero, Factor::constant(0.0));

        let unit = reduce_product(&[Factor::constant(1.0), Factor::variable("x")]);
        assert_eq!(unit, Factor::variable("x"));

        let lone = reduce_product(&[Factor::constant(1.0)]);
        assert_eq!(lone, Factor::constant(1.0));
    }

    #[test]
    fn test_commuted_products_combine() {
        // x*y + y*x -> 2*x*y
        let sum = Factor::Sum(vec![
            product(vec![Factor::variable("x"), Factor::variable("y")]),
            product(vec![Factor::variable("y"), Factor::variable("x")]),
        ]);
        let reduced = reduce(&sum);
        assert_eq!(format!("{}", reduced), "2*x*y");
    }

    #[test]
    fn test_like_terms_and_trailing_constant() {
        // x^2 + 3*x + 3*x - 5 -> ( x^2 + 6*x - 5 )
        let sum = Factor::Sum(vec![
            Factor::power_of("x", 2),
            product(vec![Factor::constant(3.0), Factor::variable("x")]),
            product(vec![Factor::constant(3.0), Factor::variable("x")]),
            Factor::constant(-5.0),
        ]);
        let organized = organize_terms(&reduce(&sum));
        assert_eq!(format!("{}", organized), "( x^2 + 6*x - 5 )");
    }

    #[test]
    fn test_cancellation_drops_bucket() {
        let sum = Factor::Sum(vec![
            product(vec![Factor::constant(3.0), Factor::variable("x")]),
            product(vec![Factor::constant(-3.0), Factor::variable("x")]),
            Factor::variable("y"),
        ]);
        let reduced = reduce(&sum);
        assert_eq!(reduced, Factor::variable("y"));

        let all_cancel = Factor::Sum(vec![
            Factor::variable("x"),
            product(vec![Factor::constant(-1.0), Factor::variable("x")]),
        ]);
        assert_eq!(reduce(&all_cancel), Factor::constant(0.0));
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let tree = Factor::Sum(vec![
            product(vec![
                Factor::variable("x"),
                Factor::variable("x"),
                Factor::constant(2.0),
            ]),
            product(vec![Factor::constant(3.0), Factor::variable("x")]),
            Factor::Sum(vec![Factor::variable("x"), Factor::constant(4.0)]),
            Factor::constant(-1.0),
        ]);
        let once = reduce(&tree);
        let twice = reduce(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reduced_sum_of_folds_constants() {
        let folded = reduced_sum_of(&[
            Factor::variable("x"),
            Factor::constant(2.0),
            Factor::constant(3.0),
        ]);
        assert_eq!(format!("{}", folded), "( x + 5 )");

        let zero_folded = reduced_sum_of(&[
            Factor::variable("x"),
            Factor::constant(2.0),
            Factor::constant(-2.0),
        ]);
        assert_eq!(zero_folded, Factor::variable("x"));

        let only_constants = reduced_sum_of(&[Factor::constant(2.0), Factor::constant(-2.0)]);
        assert_eq!(only_constants, Factor::constant(0.0));
    }

    #[test]
    fn test_organize_renders_subtraction() {
        // a - b arrives from conversion as a + (-1)*b
        let difference = Factor::Difference(vec![
            Factor::variable("a"),
            product(vec![Factor::constant(-1.0), Factor::variable("b")]),
        ]);
        let organized = organize_terms(&reduce(&difference));
        assert_eq!(format!("{}", organized), "( a - b )");
        // organizing again changes nothing
        assert_eq!(organize_terms(&organized), organized);
    }

    #[test]
    fn test_sum_inside_product_stays_opaque() {
        let tree = product(vec![
            Factor::constant(2.0),
            Factor::Sum(vec![Factor::variable("x"), Factor::constant(1.0)]),
        ]);
        let reduced = reduce(&tree);
        assert_eq!(format!("{}", reduced), "2*( x + 1 )");
    }

    #[test]
    fn test_power_folding() {
        assert_eq!(
            reduce(&Factor::Power(
                Factor::constant(2.0).boxed(),
                Factor::constant(3.0).boxed()
            )),
            Factor::constant(8.0)
        );
        assert_eq!(
            reduce(&Factor::Power(
                Factor::variable("x").boxed(),
                Factor::constant(1.0).boxed()
            )),
            Factor::variable("x")
        );
        assert_eq!(
            reduce(&Factor::Power(
                Factor::variable("x").boxed(),
                Factor::constant(0.0).boxed()
            )),
            Factor::constant(1.0)
        );
    }
}
