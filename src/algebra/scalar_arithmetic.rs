//! # Scalar Arithmetic Module
//!
//! Opaque numeric value used by the symbolic core. Every constant in a
//! factor tree is a `Scalar`; the rest of the engine only ever talks to the
//! methods below, so the concrete storage (`f64` today) stays a private
//! detail of this file.
//!
//! ## Purpose
//!
//! - keep the engine numeric-type-agnostic: reduction, substitution and the
//!   solver never touch `f64` directly, they call `plus`/`times`/`pow_int`
//!   and the predicates
//! - route all construction through `ScalarConverter`, which turns host
//!   input (integers, doubles, textual sub-expressions) into `Scalar`s
//! - render integral values without a trailing `.0` so `6.0` prints as `6`
//!
//! There is deliberately no in-place `set` mutation: folding code threads an
//! accumulator through a loop and rebuilds, which keeps reduction pure.

use crate::global::{MAX_INTEGRAL_RENDER, THRESHOLD};
use num_traits::{One, Zero};
use std::fmt;

/// Numeric constant of the symbolic engine. Construct via [`ScalarConverter`]
/// or the associated `zero`/`one`/`neg_one` helpers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Scalar(f64);

impl Scalar {
    pub fn zero() -> Scalar {
        Scalar(f64::zero())
    }
    pub fn one() -> Scalar {
        Scalar(f64::one())
    }
    pub fn neg_one() -> Scalar {
        Scalar(-f64::one())
    }

    pub fn plus(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 + other.0)
    }

    pub fn times(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 * other.0)
    }

    /// Integer power, the only exponentiation the polynomial core needs.
    pub fn pow_int(&self, exponent: i64) -> Scalar {
        Scalar(self.0.powi(exponent as i32))
    }

    pub fn negate(&self) -> Scalar {
        Scalar(-self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == f64::zero()
    }

    pub fn is_one(&self) -> bool {
        self.0 == f64::one()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < f64::zero()
    }

    pub fn to_double(&self) -> f64 {
        self.0
    }

    /// True when the value is (numerically) an integer, i.e. safe to render
    /// without a decimal part.
    pub fn is_integral(&self) -> bool {
        (self.0 - self.0.round()).abs() < THRESHOLD && self.0.abs() < MAX_INTEGRAL_RENDER
    }

    /// Exponent seen as a machine integer; used by power folding.
    pub fn as_exponent(&self) -> Option<i64> {
        if self.is_integral() {
            Some(self.0.round() as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_integral() {
            write!(f, "{}", self.0.round() as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar(value as f64)
    }
}

/// Host evaluator for textual constants: given the text of a numeric
/// sub-expression, the host calculator returns its value.
pub type HostEval = Box<dyn Fn(&str) -> Result<f64, String>>;

/// Converts host input into [`Scalar`]s.
///
/// Plain numeric literals are handled here; anything else is delegated to an
/// optional host evaluator installed by the embedding calculator. Without a
/// host evaluator, non-literal text is a fatal error.
pub struct ScalarConverter {
    pub host_eval: Option<HostEval>,
}

impl ScalarConverter {
    pub fn new() -> Self {
        ScalarConverter { host_eval: None }
    }

    pub fn with_host_eval(host_eval: HostEval) -> Self {
        ScalarConverter {
            host_eval: Some(host_eval),
        }
    }

    pub fn from_int(&self, value: i64) -> Scalar {
        Scalar(value as f64)
    }

    pub fn from_double(&self, value: f64) -> Scalar {
        Scalar(value)
    }

    /// Parse a textual constant, falling back to the host evaluator for
    /// anything that is not a plain literal.
    pub fn from_text(&self, text: &str) -> Result<Scalar, String> {
        if let Ok(value) = text.trim().parse::<f64>() {
            return Ok(Scalar(value));
        }
        match &self.host_eval {
            Some(eval) => eval(text).map(Scalar),
            None => Err(format!("cannot interpret '{}' as a number", text)),
        }
    }

    pub fn zero(&self) -> Scalar {
        Scalar::zero()
    }
    pub fn one(&self) -> Scalar {
        Scalar::one()
    }
    pub fn neg_one(&self) -> Scalar {
        Scalar::neg_one()
    }
}

impl Default for ScalarConverter {
    fn default() -> Self {
        ScalarConverter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_arithmetic() {
        let converter = ScalarConverter::new();
        let a = converter.from_int(3);
        let b = converter.from_double(0.5);
        assert_relative_eq!(a.plus(&b).to_double(), 3.5);
        assert_relative_eq!(a.times(&b).to_double(), 1.5);
        assert_relative_eq!(a.pow_int(3).to_double(), 27.0);
        assert!(a.negate().is_negative());
        assert!(converter.zero().is_zero());
        assert!(converter.one().is_one());
        assert!(converter.neg_one().is_negative());
    }

    #[test]
    fn test_integral_rendering() {
        assert_eq!(format!("{}", Scalar::from(6.0)), "6");
        assert_eq!(format!("{}", Scalar::from(-5.0)), "-5");
        assert_eq!(format!("{}", Scalar::from(2.5)), "2.5");
    }

    #[test]
    fn test_from_text_literal_and_host() {
        let converter = ScalarConverter::new();
        assert_relative_eq!(converter.from_text("42").unwrap().to_double(), 42.0);
        assert_relative_eq!(converter.from_text(" -1.5 ").unwrap().to_double(), -1.5);
        assert!(converter.from_text("2+2").is_err());

        let with_host =
            ScalarConverter::with_host_eval(Box::new(|text| match text {
                "2+2" => Ok(4.0),
                other => Err(format!("host cannot evaluate '{}'", other)),
            }));
        assert_relative_eq!(with_host.from_text("2+2").unwrap().to_double(), 4.0);
        let err = with_host.from_text("nope").unwrap_err();
        assert!(err.contains("nope"));
    }

    #[test]
    fn test_exponent_extraction() {
        assert_eq!(Scalar::from(3.0).as_exponent(), Some(3));
        assert_eq!(Scalar::from(-2.0).as_exponent(), Some(-2));
        assert_eq!(Scalar::from(2.5).as_exponent(), None);
    }
}
