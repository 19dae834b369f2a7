//! Typed, local error taxonomy for the evaluator crate.

use crate::key::ExpressionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorError {
    /// Registering an expression key that already exists.
    DuplicateExpression(ExpressionKey),
    /// Registration with an empty element list.
    EmptyElements,
    /// A `SubExpression` element references an expression that is not
    /// yet registered.
    UnregisteredSubExpression(ExpressionKey),
    /// An element's variant does not match the declared expression kind.
    ElementKindMismatch,
}

impl std::fmt::Display for EvaluatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatorError::DuplicateExpression(key) => {
                write!(f, "expression {key} is already registered")
            }
            EvaluatorError::EmptyElements => write!(f, "expression has no elements"),
            EvaluatorError::UnregisteredSubExpression(key) => {
                write!(f, "sub-expression {key} is not yet registered")
            }
            EvaluatorError::ElementKindMismatch => {
                write!(f, "element variant does not match the declared expression kind")
            }
        }
    }
}

impl std::error::Error for EvaluatorError {}
