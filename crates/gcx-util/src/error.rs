//! Engine error type.
//!
//! Every failure the engine can surface carries a human-readable
//! message; lex errors always know where they happened, parse errors
//! usually do, and evaluation errors never do (the source text is gone
//! by the time a statement executes).

use thiserror::Error;

use crate::span::Span;

/// An error raised while lexing, parsing or evaluating G-code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GCodeError {
    /// Lexical error: bad escape, unterminated string or expression,
    /// illegal digit, literal overflow, illegal operator.
    #[error("{message} at {span}")]
    Lex { message: String, span: Span },

    /// Syntax error: unexpected token, unbalanced parentheses, missing
    /// `ELSE`. When a span is known, [`parse_at`](GCodeError::parse_at)
    /// folds it into the message.
    #[error("{message}")]
    Parse { message: String, span: Option<Span> },

    /// Evaluation error: type mismatch, bad lookup, wrong arity,
    /// division by zero.
    #[error("{message}")]
    Eval { message: String },
}

impl GCodeError {
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        GCodeError::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        GCodeError::Parse {
            message: message.into(),
            span: None,
        }
    }

    pub fn parse_at(message: impl Into<String>, span: Span) -> Self {
        GCodeError::Parse {
            message: format!("{} at {span}", message.into()),
            span: Some(span),
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        GCodeError::Eval {
            message: message.into(),
        }
    }

    /// The stored message text. Lex errors append their span in
    /// `Display` instead of carrying it here.
    pub fn message(&self) -> &str {
        match self {
            GCodeError::Lex { message, .. }
            | GCodeError::Parse { message, .. }
            | GCodeError::Eval { message } => message,
        }
    }

    /// The source span, when one was recorded.
    pub fn span(&self) -> Option<Span> {
        match self {
            GCodeError::Lex { span, .. } => Some(*span),
            GCodeError::Parse { span, .. } => *span,
            GCodeError::Eval { .. } => None,
        }
    }
}

/// Result type alias used throughout the engine crates.
pub type Result<T> = std::result::Result<T, GCodeError>;
