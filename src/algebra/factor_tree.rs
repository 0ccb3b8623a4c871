//! # Factor Tree Module
//!
//! This module provides the core expression representation for the polynomial
//! algebra engine: a closed sum type of factors with owned children, the
//! construction helpers that keep sums and products flat, and the rendering
//! grammar used everywhere a tree is shown to the user.
//!
//! ## Purpose
//!
//! The factor tree allows the engine to:
//! - Represent constants, variables, sums, products and integer powers as a
//!   recursive owned tree (no arena, no parent pointers)
//! - Build trees incrementally with associativity flattening, so `(a+b)+c`
//!   and `a+(b+c)` become the same flat `Sum`
//! - Collect the distinct symbol names a tree references, the basis of the
//!   "reduced" check used by the linear solver
//! - Render with the calculator's display grammar: sub-sums in parentheses,
//!   subtraction via `-` instead of `+ -1*..`, `*`/`^` without spaces
//!
//! ## Main Structures and Methods
//!
//! ### `Factor` Enum
//! - **Constant**: `Constant(Scalar)` - numeric leaf
//! - **Variable**: `Variable(String)` - symbolic leaf like "x" or "a"
//! - **Sum / Difference**: flat term lists; a `Difference` is a `Sum` whose
//!   display favors `-` between terms
//! - **Negated**: one-child display wrapper produced by term organization
//! - **Product**: flat factor list
//! - **Power**: base and integer exponent, always exactly two children
//!
//! ### Key Methods
//! - `add(child)` - push a child with associativity flattening
//! - `reduce_single()` - unwrap one-child sums/products
//! - `negate()` - sign-flip plus `Negated` wrapper for display
//! - `collect_symbols()` / `symbolic_references()` / `is_reduced()`
//! - `substitute_symbol()` - replace a variable by a subtree (used for
//!   formal-parameter substitution when expanding function calls)

use crate::algebra::scalar_arithmetic::Scalar;
use std::collections::BTreeSet;
use std::fmt;
use strum_macros::Display as StrumDisplay;

/// Variant tag of a [`Factor`]; list-like kinds share a tag so flattening
/// can splice same-kind children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum FactorKind {
    Summation,
    Negation,
    Multiplication,
    Operand,
}

/// Core symbolic expression type of the engine.
///
/// Children are owned (`Vec`/`Box`), so a tree is cloned and dropped like any
/// other value. Sums and products are kept flat by construction; `Power` is
/// the only fixed-arity composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Constant(Scalar),
    Variable(String),
    Sum(Vec<Factor>),
    Difference(Vec<Factor>),
    Negated(Box<Factor>),
    Product(Vec<Factor>),
    Power(Box<Factor>, Box<Factor>),
}

impl Factor {
    pub fn constant(value: f64) -> Factor {
        Factor::Constant(Scalar::from(value))
    }

    pub fn variable(name: &str) -> Factor {
        Factor::Variable(name.to_string())
    }

    /// Integer power of a named variable, the canonical product building block.
    pub fn power_of(name: &str, exponent: i64) -> Factor {
        Factor::Power(
            Factor::variable(name).boxed(),
            Factor::Constant(Scalar::from(exponent)).boxed(),
        )
    }

    pub fn boxed(&self) -> Box<Factor> {
        Box::new(self.clone())
    }

    pub fn kind(&self) -> FactorKind {
        match self {
            Factor::Sum(_) | Factor::Difference(_) => FactorKind::Summation,
            Factor::Negated(_) => FactorKind::Negation,
            Factor::Product(_) => FactorKind::Multiplication,
            Factor::Constant(_) | Factor::Variable(_) | Factor::Power(_, _) => FactorKind::Operand,
        }
    }

    /// Push `child` into a list-like parent. When the child's kind matches the
    /// parent's and the child is itself list-like, its children are spliced in
    /// directly, so sums and products stay flat no matter how the host tree
    /// was associated. Powers take base and exponent positionally and are
    /// never a target of `add`.
    pub fn add(&mut self, child: Factor) {
        match self {
            Factor::Sum(children) | Factor::Difference(children) => match child {
                Factor::Sum(inner) | Factor::Difference(inner) => children.extend(inner),
                other => children.push(other),
            },
            Factor::Product(children) => match child {
                Factor::Product(inner) => children.extend(inner),
                other => children.push(other),
            },
            parent => panic!(
                "add: parent must be list-like (Summation or Multiplication), got {}",
                parent.kind()
            ),
        }
    }

    /// Unwrap sums/products that ended up with a single child.
    pub fn reduce_single(self) -> Factor {
        match self {
            Factor::Sum(mut children)
            | Factor::Difference(mut children)
            | Factor::Product(mut children)
                if children.len() == 1 =>
            {
                children.remove(0).reduce_single()
            }
            other => other,
        }
    }

    /// Sign-flip a copy of `self` and mark it with a `Negated` wrapper, so a
    /// negative term renders as `- term` inside a sum. The wrapper means
    /// "minus the wrapped value": flipping inside keeps the overall value.
    pub fn negate(&self) -> Factor {
        let flipped = match self {
            Factor::Constant(value) => Factor::Constant(value.negate()),
            Factor::Product(children) => match children.first() {
                Some(Factor::Constant(lead)) => {
                    let lead = lead.negate();
                    let mut flipped = children.clone();
                    if lead.is_one() && flipped.len() > 1 {
                        flipped.remove(0);
                    } else {
                        flipped[0] = Factor::Constant(lead);
                    }
                    Factor::Product(flipped).reduce_single()
                }
                _ => {
                    let mut flipped = vec![Factor::Constant(Scalar::neg_one())];
                    flipped.extend(children.clone());
                    Factor::Product(flipped)
                }
            },
            Factor::Negated(inner) => return (**inner).clone(),
            other => Factor::Product(vec![Factor::Constant(Scalar::neg_one()), other.clone()]),
        };
        Factor::Negated(flipped.boxed())
    }

    /// Add every referenced symbol name into the caller-supplied set.
    pub fn collect_symbols(&self, symbols: &mut BTreeSet<String>) {
        match self {
            Factor::Constant(_) => {}
            Factor::Variable(name) => {
                symbols.insert(name.clone());
            }
            Factor::Sum(children) | Factor::Difference(children) | Factor::Product(children) => {
                for child in children {
                    child.collect_symbols(symbols);
                }
            }
            Factor::Negated(inner) => inner.collect_symbols(symbols),
            Factor::Power(base, exponent) => {
                base.collect_symbols(symbols);
                exponent.collect_symbols(symbols);
            }
        }
    }

    pub fn symbolic_references(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    /// A factor is reduced when it references at most one distinct symbol;
    /// only reduced terms can enter the linear system.
    pub fn is_reduced(&self) -> bool {
        self.symbolic_references().len() <= 1
    }

    /// Replace every occurrence of the variable `name` by `replacement`.
    /// Used for formal-parameter substitution when a function body is
    /// expanded at a call site.
    pub fn substitute_symbol(&self, name: &str, replacement: &Factor) -> Factor {
        match self {
            Factor::Variable(var) if var == name => replacement.clone(),
            Factor::Constant(_) | Factor::Variable(_) => self.clone(),
            Factor::Sum(children) => Factor::Sum(
                children
                    .iter()
                    .map(|child| child.substitute_symbol(name, replacement))
                    .collect(),
            ),
            Factor::Difference(children) => Factor::Difference(
                children
                    .iter()
                    .map(|child| child.substitute_symbol(name, replacement))
                    .collect(),
            ),
            Factor::Product(children) => Factor::Product(
                children
                    .iter()
                    .map(|child| child.substitute_symbol(name, replacement))
                    .collect(),
            ),
            Factor::Negated(inner) => {
                Factor::Negated(inner.substitute_symbol(name, replacement).boxed())
            }
            Factor::Power(base, exponent) => Factor::Power(
                base.substitute_symbol(name, replacement).boxed(),
                exponent.substitute_symbol(name, replacement).boxed(),
            ),
        }
    }

    /// Terms of a sum, or the factor itself as a one-term slice.
    pub fn terms(&self) -> &[Factor] {
        match self {
            Factor::Sum(children) | Factor::Difference(children) => children,
            other => std::slice::from_ref(other),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Factor::Constant(value) => write!(f, "{}", value),
            Factor::Variable(name) => write!(f, "{}", name),
            Factor::Sum(children) | Factor::Difference(children) => {
                write!(f, "( ")?;
                for (i, term) in children.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{}", term)?;
                    } else if let Factor::Negated(inner) = term {
                        write!(f, " - {}", inner)?;
                    } else {
                        write!(f, " + {}", term)?;
                    }
                }
                write!(f, " )")
            }
            Factor::Negated(inner) => write!(f, "-{}", inner),
            Factor::Product(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
            Factor::Power(base, exponent) => write!(f, "{}^{}", base, exponent),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////
