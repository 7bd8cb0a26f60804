use thiserror::Error;

/// Why an expression was refused before any arithmetic happened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("empty expression")]
    Empty,

    #[error("expression longer than {0} bytes")]
    TooLong(usize),

    #[error("expression nested deeper than {0} levels")]
    TooDeeplyNested(usize),

    #[error("malformed number: {0}")]
    MalformedNumber(String),

    #[error("function calls are not allowed: {0}(...)")]
    CallNotAllowed(String),

    #[error("names are not allowed: {0}")]
    NameNotAllowed(String),

    #[error("operator '{0}' is not allowed")]
    OperatorNotAllowed(String),

    #[error("{0} are not allowed")]
    ConstructNotAllowed(&'static str),

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

/// Failure of [`evaluate`](super::services::evaluate).
///
/// The keypad shows the same `Error` marker for every variant; the variants
/// exist so callers and logs can tell rejection apart from arithmetic failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] Rejection),

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow: {0}")]
    Overflow(&'static str),

    #[error("result is not a real number")]
    NotReal,
}

pub type EvalResult<T> = Result<T, EvalError>;
