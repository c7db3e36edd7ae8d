//! Token output interface.

use gcx_util::{GCodeError, Span};

use crate::token::Token;

/// Receiver for the lexer's output.
///
/// The lexer calls `token` for every token it recognizes and `error`
/// when it hits a lexical problem. Sinks are infallible: after an
/// error the lexer enters its own recovery state and discards input
/// through the next newline, so there is nothing for the sink to abort.
pub trait TokenSink {
    /// A token was recognized at `span`.
    fn token(&mut self, token: Token, span: Span);

    /// A lexical error was raised. Tokens already delivered for the
    /// failed line belong to no statement and should be discarded.
    fn error(&mut self, error: GCodeError);
}

/// Collects output into vectors. Handy for tests and tools.
#[derive(Debug, Default)]
pub struct TokenBuffer {
    pub tokens: Vec<(Token, Span)>,
    pub errors: Vec<GCodeError>,
}

impl TokenSink for TokenBuffer {
    fn token(&mut self, token: Token, span: Span) {
        self.tokens.push((token, span));
    }

    fn error(&mut self, error: GCodeError) {
        self.errors.push(error);
    }
}
