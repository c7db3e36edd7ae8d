//! Core lexer state machine.
//!
//! This module holds the `Lexer` struct, the byte dispatch loop and the
//! statement-position states (fresh line, line number, words, comments,
//! the bridge seams around `{…}` expressions). Number and string
//! lexing live in sibling modules.

mod number;
mod string;

use gcx_util::{GCodeError, Span};

use crate::keywords::Keyword;
use crate::sink::TokenSink;
use crate::token::Token;

/// State of the machine. One variant per position in the grammar where
/// a chunk boundary may fall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    /// Start of a logical line; a line number may follow.
    FreshLine,
    /// Consuming an `N<digits>` line number (which may still turn out
    /// to be an ordinary word).
    LineNumber,
    /// Statement position between fields.
    Whitespace,
    /// Inside a free-text word.
    Word,
    /// Inside a `;` comment.
    Comment,
    /// Expression position between tokens.
    Expression,
    /// Accumulating a symbol (operator) run.
    Symbol,
    /// Accumulating an identifier run.
    Identifier,
    /// Just left `}`; decides whether the field continues.
    PostExpression,
    /// Inside a `"…"` literal.
    Str,
    /// After a backslash inside a string.
    StrEscape,
    /// Inside a `\ooo` escape.
    StrOctal,
    /// Inside a `\xH…` escape.
    StrHex,
    /// Inside a `\uXXXX` escape.
    StrLowUnicode,
    /// Inside a `\UXXXXXXXX` escape.
    StrHighUnicode,
    /// After a leading `0`; selects the numeric base.
    NumberBase,
    /// Decimal integer digits.
    Decimal,
    /// Hex integer digits.
    Hex,
    /// Binary integer digits.
    Binary,
    /// Octal integer digits.
    Octal,
    /// Decimal digits too large for `i64`, continued as a float.
    DecimalFloat,
    /// Digits after the decimal point.
    DecimalFraction,
    /// Just after `e`/`E`; an optional `-` may follow.
    DecimalExponentSign,
    /// Decimal exponent digits.
    DecimalExponent,
    /// Hex digits too large for `i64`, continued as a float.
    HexFloat,
    /// Hex digits after the point.
    HexFraction,
    /// Just after `p`/`P`; an optional `-` may follow.
    HexExponentSign,
    /// Hex exponent digits.
    HexExponent,
    /// Discarding input through the next newline after an error.
    ScanError,
}

/// What to do with the current byte after a state handler ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// The byte was consumed; advance to the next one.
    Consume,
    /// The byte terminated a token; feed it to the new state.
    Retain,
}

/// Incremental G-code lexer.
///
/// Feed bytes with [`scan`](Lexer::scan) in chunks of any size, flush a
/// trailing unterminated line with [`finish`](Lexer::finish), and reuse
/// the instance after [`reset`](Lexer::reset). All state lives in the
/// struct, so the token stream is independent of how the input is
/// chunked.
#[derive(Debug)]
pub struct Lexer {
    state: State,
    /// Text accumulator for words, identifiers, symbols and strings.
    /// Raw bytes so multi-byte characters may split across chunks.
    buf: Vec<u8>,

    // Numeric accumulators, shared by the number and escape states.
    int_value: i64,
    float_value: f64,
    exponent_sign: i32,
    digit_count: u32,

    // Location tracking. `line`/`column` address the next byte;
    // `last_*` address the byte consumed most recently.
    line: u32,
    column: u32,
    last_line: u32,
    last_column: u32,
    token_line: u32,
    token_column: u32,

    /// Whether the current logical line has emitted any token yet.
    /// Blank and comment-only lines produce no end-of-statement.
    line_has_tokens: bool,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    /// Creates a lexer in its initial state, positioned at line 1,
    /// column 1.
    pub fn new() -> Self {
        Self {
            state: State::FreshLine,
            buf: Vec::new(),
            int_value: 0,
            float_value: 0.0,
            exponent_sign: 1,
            digit_count: 0,
            line: 1,
            column: 1,
            last_line: 1,
            last_column: 1,
            token_line: 1,
            token_column: 1,
            line_has_tokens: false,
        }
    }

    /// Returns the lexer to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Scans a chunk of input, delivering tokens and errors to `sink`.
    ///
    /// Chunks may split anywhere, including mid-token, mid-escape or
    /// mid-UTF-8-sequence; the output is the same as for a single call
    /// with the concatenated input.
    pub fn scan<S: TokenSink>(&mut self, buf: &[u8], sink: &mut S) {
        for &ch in buf {
            loop {
                let action = self.step(ch, sink);
                if action == Action::Consume {
                    self.advance(ch);
                    break;
                }
            }
        }
    }

    /// Flushes a pending statement by running a synthetic newline
    /// through the machine.
    ///
    /// A line cut off inside a string or expression surfaces the same
    /// "unterminated" error a real newline would produce.
    pub fn finish<S: TokenSink>(&mut self, sink: &mut S) {
        self.scan(b"\n", sink);
    }

    /// Current line of the next byte to be scanned (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column of the next byte to be scanned (1-based).
    pub fn column(&self) -> u32 {
        self.column
    }

    fn advance(&mut self, ch: u8) {
        self.last_line = self.line;
        self.last_column = self.column;
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Dispatches one byte to the handler for the current state.
    fn step<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match self.state {
            State::FreshLine => self.lex_fresh_line(ch),
            State::LineNumber => self.lex_line_number(ch),
            State::Whitespace => self.lex_whitespace(ch, sink),
            State::Word => self.lex_word(ch, sink),
            State::Comment => self.lex_comment(ch),
            State::Expression => self.lex_expression(ch, sink),
            State::Symbol => self.lex_symbol(ch, sink),
            State::Identifier => self.lex_identifier(ch, sink),
            State::PostExpression => self.lex_post_expression(ch, sink),
            State::Str => self.lex_string(ch, sink),
            State::StrEscape => self.lex_string_escape(ch, sink),
            State::StrOctal => self.lex_string_octal(ch, sink),
            State::StrHex => self.lex_string_hex(ch, sink),
            State::StrLowUnicode => self.lex_string_low_unicode(ch, sink),
            State::StrHighUnicode => self.lex_string_high_unicode(ch, sink),
            State::NumberBase => self.lex_number_base(ch, sink),
            State::Decimal => self.lex_decimal(ch, sink),
            State::Hex => self.lex_hex(ch, sink),
            State::Binary => self.lex_binary(ch, sink),
            State::Octal => self.lex_octal(ch, sink),
            State::DecimalFloat => self.lex_decimal_float(ch, sink),
            State::DecimalFraction => self.lex_decimal_fraction(ch, sink),
            State::DecimalExponentSign => self.lex_decimal_exponent_sign(ch),
            State::DecimalExponent => self.lex_decimal_exponent(ch, sink),
            State::HexFloat => self.lex_hex_float(ch, sink),
            State::HexFraction => self.lex_hex_fraction(ch, sink),
            State::HexExponentSign => self.lex_hex_exponent_sign(ch),
            State::HexExponent => self.lex_hex_exponent(ch, sink),
            State::ScanError => self.lex_scan_error(ch),
        }
    }

    // -------------------------------------------------------------------------
    // Statement-position states
    // -------------------------------------------------------------------------

    fn lex_fresh_line(&mut self, ch: u8) -> Action {
        match ch {
            b'N' | b'n' => {
                self.start_token();
                self.buf.clear();
                self.buf.push(ch.to_ascii_uppercase());
                self.state = State::LineNumber;
                Action::Consume
            }
            b' ' | b'\t' | b'\x0b' | b'\r' => Action::Consume,
            b'\n' => Action::Consume,
            _ => {
                self.state = State::Whitespace;
                Action::Retain
            }
        }
    }

    fn lex_line_number(&mut self, ch: u8) -> Action {
        if ch.is_ascii_digit() {
            self.buf.push(ch);
            return Action::Consume;
        }
        if self.buf.len() > 1 && is_field_separator(ch) {
            // A complete line number; it carries no meaning downstream.
            self.buf.clear();
            self.state = State::Whitespace;
        } else {
            // `N` with no digits, or `N10X…`: an ordinary word after all.
            self.state = State::Word;
        }
        Action::Retain
    }

    fn lex_whitespace<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b' ' | b'\t' | b'\x0b' | b'\r' => Action::Consume,
            b'\n' => {
                if self.line_has_tokens {
                    self.emit_here(sink, Token::EndOfStatement);
                    self.line_has_tokens = false;
                }
                self.state = State::FreshLine;
                Action::Consume
            }
            b';' => {
                self.state = State::Comment;
                Action::Consume
            }
            b'{' => {
                self.emit_here(sink, Token::ExprStart);
                self.state = State::Expression;
                Action::Consume
            }
            _ => {
                self.start_token();
                self.buf.clear();
                self.state = State::Word;
                Action::Retain
            }
        }
    }

    fn lex_word<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b' ' | b'\t' | b'\x0b' | b'\r' | b'\n' | b';' => {
                self.emit_buf_str(sink);
                self.state = State::Whitespace;
                Action::Retain
            }
            b'{' => {
                // The word and the expression share one field.
                self.emit_buf_str(sink);
                self.emit_here(sink, Token::Bridge);
                self.emit_here(sink, Token::ExprStart);
                self.state = State::Expression;
                Action::Consume
            }
            _ => {
                self.buf.push(ch.to_ascii_uppercase());
                Action::Consume
            }
        }
    }

    fn lex_comment(&mut self, ch: u8) -> Action {
        if ch == b'\n' {
            self.state = State::Whitespace;
            Action::Retain
        } else {
            Action::Consume
        }
    }

    fn lex_post_expression<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b' ' | b'\t' | b'\x0b' | b'\r' | b'\n' | b';' => {
                self.state = State::Whitespace;
                Action::Retain
            }
            b'{' => {
                self.emit_here(sink, Token::Bridge);
                self.emit_here(sink, Token::ExprStart);
                self.state = State::Expression;
                Action::Consume
            }
            _ => {
                // `{expr}more`: the field continues as a word.
                self.emit_here(sink, Token::Bridge);
                self.start_token();
                self.buf.clear();
                self.state = State::Word;
                Action::Retain
            }
        }
    }

    fn lex_scan_error(&mut self, ch: u8) -> Action {
        if ch == b'\n' {
            self.line_has_tokens = false;
            self.state = State::FreshLine;
        }
        Action::Consume
    }

    // -------------------------------------------------------------------------
    // Expression-position states
    // -------------------------------------------------------------------------

    fn lex_expression<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b' ' | b'\t' | b'\x0b' | b'\r' => Action::Consume,
            b'\n' => self.fail_here(sink, "Unterminated expression"),
            b'(' => {
                self.emit_here(sink, Token::Keyword(Keyword::LeftParen));
                Action::Consume
            }
            b')' => {
                // Emitted even when unbalanced; the parser enforces
                // paren balance.
                self.emit_here(sink, Token::Keyword(Keyword::RightParen));
                Action::Consume
            }
            b'}' => {
                self.emit_here(sink, Token::ExprEnd);
                self.state = State::PostExpression;
                Action::Consume
            }
            b'{' => self.fail_here(sink, "Unexpected '{' inside expression"),
            b'"' => {
                self.start_token();
                self.buf.clear();
                self.state = State::Str;
                Action::Consume
            }
            b'0' => {
                self.start_token();
                self.int_value = 0;
                self.state = State::NumberBase;
                Action::Consume
            }
            b'1'..=b'9' => {
                self.start_token();
                self.int_value = 0;
                self.state = State::Decimal;
                Action::Retain
            }
            _ if is_ident_start(ch) => {
                self.start_token();
                self.buf.clear();
                self.state = State::Identifier;
                Action::Retain
            }
            _ => {
                self.start_token();
                self.buf.clear();
                self.state = State::Symbol;
                Action::Retain
            }
        }
    }

    fn lex_identifier<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        if is_ident_continue(ch) {
            self.buf.push(ch.to_ascii_uppercase());
            return Action::Consume;
        }
        let text = self.take_buf();
        match Keyword::lookup(&text) {
            Some(keyword) => self.emit(sink, Token::Keyword(keyword)),
            None => self.emit(sink, Token::Identifier(text)),
        }
        self.state = State::Expression;
        Action::Retain
    }

    fn lex_symbol<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        if is_symbol_terminator(ch) {
            let text = self.take_buf();
            return match Keyword::lookup(&text) {
                Some(keyword) => {
                    self.emit(sink, Token::Keyword(keyword));
                    self.state = State::Expression;
                    Action::Retain
                }
                None => self.fail_token(sink, format!("Illegal operator '{text}'")),
            };
        }
        self.buf.push(ch);
        Action::Consume
    }

    // -------------------------------------------------------------------------
    // Emission helpers
    // -------------------------------------------------------------------------

    /// Marks the current byte as the first character of a token.
    fn start_token(&mut self) {
        self.token_line = self.line;
        self.token_column = self.column;
    }

    /// Emits a token spanning from the marked start through the last
    /// consumed byte.
    fn emit<S: TokenSink>(&mut self, sink: &mut S, token: Token) {
        let span = Span::new(
            self.token_line,
            self.token_column,
            self.last_line,
            self.last_column,
        );
        self.line_has_tokens = true;
        sink.token(token, span);
    }

    /// Emits a token whose span is exactly the current byte.
    fn emit_here<S: TokenSink>(&mut self, sink: &mut S, token: Token) {
        self.line_has_tokens = true;
        sink.token(token, Span::point(self.line, self.column));
    }

    /// Emits the buffered word as an (upper-cased) string literal.
    fn emit_buf_str<S: TokenSink>(&mut self, sink: &mut S) {
        let text = self.take_buf();
        self.emit(sink, Token::Str(text));
    }

    fn take_buf(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        text
    }

    /// Raises a lexical error located at the current byte and enters
    /// recovery. The offending byte is retained so a newline still
    /// terminates the line.
    fn fail_here<S: TokenSink>(&mut self, sink: &mut S, message: impl Into<String>) -> Action {
        sink.error(GCodeError::lex(
            message,
            Span::point(self.line, self.column),
        ));
        self.state = State::ScanError;
        Action::Retain
    }

    /// Raises a lexical error spanning the token built so far.
    fn fail_token<S: TokenSink>(&mut self, sink: &mut S, message: impl Into<String>) -> Action {
        sink.error(GCodeError::lex(
            message,
            Span::new(
                self.token_line,
                self.token_column,
                self.last_line,
                self.last_column,
            ),
        ));
        self.state = State::ScanError;
        Action::Retain
    }
}

// -----------------------------------------------------------------------------
// Character classification
// -----------------------------------------------------------------------------

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$'
}

/// Bytes that end an `N<digits>` line number.
fn is_field_separator(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\x0b' | b'\r' | b'\n' | b';' | b'{')
}

/// Bytes that end a symbol run. Everything else accumulates, so junk
/// like `+#` surfaces as one "Illegal operator" instead of several.
fn is_symbol_terminator(ch: u8) -> bool {
    matches!(
        ch,
        b' ' | b'\t' | b'\x0b' | b'\r' | b'\n' | b'(' | b')' | b'{' | b'}' | b'"'
    ) || ch.is_ascii_digit()
        || is_ident_start(ch)
}
