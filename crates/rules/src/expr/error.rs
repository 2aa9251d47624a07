//! Errors raised while parsing or evaluating condition expressions.

/// Condition text could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unterminated quoted signal name starting at offset {offset}")]
    UnterminatedName { offset: usize },

    #[error("invalid signal name {name:?} at offset {offset}")]
    InvalidName { name: String, offset: usize },

    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("expected {expected} at offset {offset}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}

/// Evaluation fault for a single rule. Recovered per event by the dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {0}")]
    Overflow(&'static str),
}
