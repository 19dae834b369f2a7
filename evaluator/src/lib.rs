//! Evaluator: the three-valued-logic expression engine.
//!
//! Depends on `rules-reservoir`. Does not import from `rules-dispatch`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod evaluator;
pub mod expression;
pub mod key;

pub use error::EvaluatorError;
pub use evaluator::Evaluator;
pub use expression::{Expression, Logic};
pub use key::ExpressionKey;
