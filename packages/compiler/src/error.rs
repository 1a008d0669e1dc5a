//! Compiler errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilerError {
    /// Lexer or parser failure inside a template expression.
    #[error("Parser Error: {message} at column {index} in [{input}] in {location}")]
    ExpressionParse {
        message: String,
        input: String,
        location: String,
        index: usize,
    },

    /// A CSS selector that cannot be matched against elements.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// A deferred block state change that the lifecycle does not allow.
    #[error("Illegal defer block transition from {from} to {to}")]
    IllegalDeferTransition { from: String, to: String },

    /// An IR phase found the operation lists in a shape it cannot handle.
    #[error("IR invariant violated: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, CompilerError>;
