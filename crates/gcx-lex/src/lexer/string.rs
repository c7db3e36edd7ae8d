//! String literal states.
//!
//! Strings are byte-oriented: escape sequences produce raw bytes
//! (octal and hex escapes) or UTF-8 sequences (unicode escapes), and
//! ordinary body bytes pass through untouched. A raw newline inside a
//! string is an unterminated-string error.

use crate::lexer::{Action, Lexer, State};
use crate::sink::TokenSink;

const UNICODE_MAX: i64 = 0x10FFFF;

impl Lexer {
    pub(crate) fn lex_string<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'\\' => {
                self.state = State::StrEscape;
                Action::Consume
            }
            b'"' => {
                self.emit_buf_str(sink);
                self.state = State::Expression;
                Action::Consume
            }
            b'\n' => self.fail_token(sink, "Unterminated string literal"),
            _ => {
                self.buf.push(ch);
                Action::Consume
            }
        }
    }

    pub(crate) fn lex_string_escape<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        let simple = match ch {
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'e' => Some(0x1b),
            b'f' => Some(0x0c),
            b'n' => Some(0x0a),
            b'r' => Some(0x0d),
            b't' => Some(0x09),
            b'v' => Some(0x0b),
            b'\\' => Some(0x5c),
            b'\'' => Some(0x27),
            b'"' => Some(0x22),
            b'?' => Some(0x3f),
            _ => None,
        };
        if let Some(byte) = simple {
            self.buf.push(byte);
            self.state = State::Str;
            return Action::Consume;
        }
        match ch {
            b'x' => {
                self.int_value = 0;
                self.digit_count = 0;
                self.state = State::StrHex;
                Action::Consume
            }
            b'u' => {
                self.int_value = 0;
                self.digit_count = 0;
                self.state = State::StrLowUnicode;
                Action::Consume
            }
            b'U' => {
                self.int_value = 0;
                self.digit_count = 0;
                self.state = State::StrHighUnicode;
                Action::Consume
            }
            b'0'..=b'7' => {
                self.int_value = 0;
                self.digit_count = 0;
                self.state = State::StrOctal;
                Action::Retain
            }
            _ => self.fail_here(sink, format!("Illegal string escape \\{}", ch as char)),
        }
    }

    pub(crate) fn lex_string_octal<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'0'..=b'7' => {
                let value = self.int_value * 8 + (ch - b'0') as i64;
                if value > 0xFF {
                    return self.fail_here(sink, "Octal escape (\\nnn) exceeds byte value");
                }
                self.int_value = value;
                self.digit_count += 1;
                if self.digit_count == 3 {
                    self.buf.push(self.int_value as u8);
                    self.state = State::Str;
                }
                Action::Consume
            }
            b'8' | b'9' => self.fail_here(sink, "Illegal digit in octal escape (\\nnn)"),
            _ => {
                self.buf.push(self.int_value as u8);
                self.state = State::Str;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_string_hex<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match hex_value(ch) {
            Some(digit) => {
                let value = self.int_value * 16 + digit;
                if value > 0xFF {
                    return self.fail_here(sink, "Hex escape exceeds byte value");
                }
                self.int_value = value;
                self.digit_count += 1;
                Action::Consume
            }
            None if self.digit_count == 0 => {
                self.fail_here(sink, "Hex string escape (\\x) requires at least one digit")
            }
            None => {
                self.buf.push(self.int_value as u8);
                self.state = State::Str;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_string_low_unicode<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match hex_value(ch) {
            Some(digit) => {
                self.int_value = self.int_value * 16 + digit;
                self.digit_count += 1;
                if self.digit_count == 4 {
                    self.push_code_point(self.int_value);
                    self.state = State::Str;
                }
                Action::Consume
            }
            None => self.fail_here(
                sink,
                "Low unicode escape (\\u) requires exactly four digits",
            ),
        }
    }

    pub(crate) fn lex_string_high_unicode<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match hex_value(ch) {
            Some(digit) => {
                let value = self.int_value * 16 + digit;
                if value > UNICODE_MAX {
                    return self.fail_here(sink, "High unicode escape (\\U) exceeds unicode value");
                }
                self.int_value = value;
                self.digit_count += 1;
                if self.digit_count == 8 {
                    self.push_code_point(self.int_value);
                    self.state = State::Str;
                }
                Action::Consume
            }
            None => self.fail_here(
                sink,
                "High unicode escape (\\U) requires exactly eight digits",
            ),
        }
    }

    /// Appends the UTF-8 encoding of a code point, or `?` when the
    /// value is not a valid scalar (surrogates).
    fn push_code_point(&mut self, value: i64) {
        match char::from_u32(value as u32) {
            Some(c) => {
                let mut utf8 = [0u8; 4];
                self.buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }
}

fn hex_value(ch: u8) -> Option<i64> {
    match ch {
        b'0'..=b'9' => Some((ch - b'0') as i64),
        b'a'..=b'f' => Some((ch - b'a' + 10) as i64),
        b'A'..=b'F' => Some((ch - b'A' + 10) as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::sink::TokenBuffer;
    use crate::token::Token;
    use crate::Lexer;

    fn lex_str(literal: &str) -> Token {
        let mut lexer = Lexer::new();
        let mut out = TokenBuffer::default();
        lexer.scan(format!("{{{literal}}}\n").as_bytes(), &mut out);
        assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);
        out.tokens[1].0.clone()
    }

    fn lex_str_error(literal: &str) -> String {
        let mut lexer = Lexer::new();
        let mut out = TokenBuffer::default();
        lexer.scan(format!("{{{literal}}}\n").as_bytes(), &mut out);
        assert_eq!(out.errors.len(), 1, "expected one error: {:?}", out.errors);
        out.errors[0].message().to_string()
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(lex_str("\"hello\""), Token::Str("hello".into()));
        assert_eq!(lex_str("\"\""), Token::Str("".into()));
    }

    #[test]
    fn test_case_preserved_in_strings() {
        // Words upper-case; quoted strings do not.
        assert_eq!(lex_str("\"MixedCase\""), Token::Str("MixedCase".into()));
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(
            lex_str(r#""\a\b\e\f\n\r\t\v""#),
            Token::Str("\x07\x08\x1b\x0c\n\r\t\x0b".into())
        );
        assert_eq!(lex_str(r#""\\\'\"\?""#), Token::Str("\\'\"?".into()));
    }

    #[test]
    fn test_octal_escapes() {
        assert_eq!(lex_str(r#""\101""#), Token::Str("A".into()));
        assert_eq!(lex_str(r#""\7x""#), Token::Str("\x07x".into()));
        assert_eq!(lex_str(r#""\0""#), Token::Str("\0".into()));
    }

    #[test]
    fn test_hex_escapes() {
        assert_eq!(lex_str(r#""\x41""#), Token::Str("A".into()));
        assert_eq!(lex_str(r#""\x4a!""#), Token::Str("J!".into()));
        assert_eq!(lex_str(r#""\x0a""#), Token::Str("\n".into()));
    }

    #[test]
    fn test_low_unicode_escape() {
        // é is the two-byte sequence 0xC3 0xA9.
        let token = lex_str(r#""\u00e9""#);
        assert_eq!(token, Token::Str("é".into()));
        if let Token::Str(s) = token {
            assert_eq!(s.as_bytes(), &[0xC3, 0xA9]);
        }
    }

    #[test]
    fn test_high_unicode_escape() {
        assert_eq!(lex_str(r#""\U0001F600""#), Token::Str("😀".into()));
    }

    #[test]
    fn test_surrogate_becomes_question_mark() {
        assert_eq!(lex_str(r#""\ud800""#), Token::Str("?".into()));
    }

    #[test]
    fn test_escape_errors() {
        assert_eq!(lex_str_error(r#""\q""#), "Illegal string escape \\q");
        assert_eq!(
            lex_str_error(r#""\777""#),
            "Octal escape (\\nnn) exceeds byte value"
        );
        assert_eq!(
            lex_str_error(r#""\08""#),
            "Illegal digit in octal escape (\\nnn)"
        );
        assert_eq!(
            lex_str_error(r#""\xgg""#),
            "Hex string escape (\\x) requires at least one digit"
        );
        assert_eq!(
            lex_str_error(r#""\x1ff""#),
            "Hex escape exceeds byte value"
        );
        assert_eq!(
            lex_str_error(r#""\u12""#),
            "Low unicode escape (\\u) requires exactly four digits"
        );
        assert_eq!(
            lex_str_error(r#""\U00110000""#),
            "High unicode escape (\\U) exceeds unicode value"
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new();
        let mut out = TokenBuffer::default();
        lexer.scan(b"{\"abc\n", &mut out);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message(), "Unterminated string literal");
    }
}
