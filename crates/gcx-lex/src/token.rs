//! Token definitions.

use crate::keywords::Keyword;

/// A lexical unit of the G-code stream.
///
/// Tokens are ephemeral: the lexer hands each one to its sink together
/// with a source span and keeps nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// An operator or reserved word from the keyword table.
    Keyword(Keyword),

    /// An upper-cased identifier from the expression sublanguage.
    Identifier(String),

    /// A string literal: either a word in statement position
    /// (upper-cased) or a `"…"` literal inside an expression (escapes
    /// decoded).
    Str(String),

    /// An integer literal in any of the four bases.
    Int(i64),

    /// A floating point literal (decimal or hex form), including
    /// decimal integers promoted on overflow.
    Float(f64),

    /// The seam between a word and an adjacent expression within the
    /// same field, as in `X{POS}` or `{POS}A`.
    Bridge,

    /// `{` - entry into the expression sublanguage.
    ExprStart,

    /// `}` - return to statement text.
    ExprEnd,

    /// End of a logical line that carried at least one token.
    EndOfStatement,
}
