//! Numeric literal states.
//!
//! Numbers come in four integer bases plus decimal and hex float
//! forms. Integer accumulation is checked against `i64::MAX`: the
//! first digit that would overflow a decimal or hex integer promotes
//! the running value to `f64` and lexing continues as a float. Binary
//! and octal literals have no float form, so overflow there is an
//! error, as are fractional parts.

use crate::lexer::{Action, Lexer, State};
use crate::sink::TokenSink;
use crate::token::Token;

fn hex_digit_value(ch: u8) -> Option<i64> {
    match ch {
        b'0'..=b'9' => Some((ch - b'0') as i64),
        b'a'..=b'f' => Some((ch - b'a' + 10) as i64),
        b'A'..=b'F' => Some((ch - b'A' + 10) as i64),
        _ => None,
    }
}

impl Lexer {
    /// Base selection after a leading `0`.
    pub(crate) fn lex_number_base<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'b' | b'B' => {
                self.int_value = 0;
                self.state = State::Binary;
                Action::Consume
            }
            b'x' | b'X' => {
                self.int_value = 0;
                self.state = State::Hex;
                Action::Consume
            }
            b'.' => {
                self.float_value = 0.0;
                self.digit_count = 0;
                self.state = State::DecimalFraction;
                Action::Consume
            }
            b'e' | b'E' => {
                self.float_value = 0.0;
                self.state = State::DecimalExponentSign;
                Action::Consume
            }
            b'0'..=b'9' => {
                self.int_value = 0;
                self.state = State::Octal;
                Action::Retain
            }
            _ => {
                self.emit(sink, Token::Int(0));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_decimal<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'.' => {
                self.float_value = self.int_value as f64;
                self.digit_count = 0;
                self.state = State::DecimalFraction;
                Action::Consume
            }
            b'e' | b'E' => {
                self.float_value = self.int_value as f64;
                self.state = State::DecimalExponentSign;
                Action::Consume
            }
            b'0'..=b'9' => {
                let digit = (ch - b'0') as i64;
                match self
                    .int_value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                {
                    Some(value) => {
                        self.int_value = value;
                        Action::Consume
                    }
                    None => {
                        // Too large for i64: keep going as a float.
                        self.float_value = self.int_value as f64;
                        self.state = State::DecimalFloat;
                        Action::Retain
                    }
                }
            }
            _ => {
                self.emit(sink, Token::Int(self.int_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_hex<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'.' => {
                self.float_value = self.int_value as f64;
                self.digit_count = 0;
                self.state = State::HexFraction;
                Action::Consume
            }
            b'p' | b'P' => {
                self.float_value = self.int_value as f64;
                self.state = State::HexExponentSign;
                Action::Consume
            }
            _ => match hex_digit_value(ch) {
                Some(digit) => match self
                    .int_value
                    .checked_mul(16)
                    .and_then(|v| v.checked_add(digit))
                {
                    Some(value) => {
                        self.int_value = value;
                        Action::Consume
                    }
                    None => {
                        self.float_value = self.int_value as f64;
                        self.state = State::HexFloat;
                        Action::Retain
                    }
                },
                None => {
                    self.emit(sink, Token::Int(self.int_value));
                    self.state = State::Expression;
                    Action::Retain
                }
            },
        }
    }

    pub(crate) fn lex_binary<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'0' | b'1' => {
                let digit = (ch - b'0') as i64;
                match self
                    .int_value
                    .checked_mul(2)
                    .and_then(|v| v.checked_add(digit))
                {
                    Some(value) => {
                        self.int_value = value;
                        Action::Consume
                    }
                    None => self.fail_here(sink, "Binary literal exceeds maximum value"),
                }
            }
            b'.' => self.fail_here(sink, "Fractional binary literals not allowed"),
            b'2'..=b'9' => self.fail_here(sink, format!("Illegal binary digit {}", ch as char)),
            _ => {
                self.emit(sink, Token::Int(self.int_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_octal<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'0'..=b'7' => {
                let digit = (ch - b'0') as i64;
                match self
                    .int_value
                    .checked_mul(8)
                    .and_then(|v| v.checked_add(digit))
                {
                    Some(value) => {
                        self.int_value = value;
                        Action::Consume
                    }
                    None => self.fail_here(sink, "Octal literal exceeds maximum value"),
                }
            }
            b'.' => self.fail_here(sink, "Fractional octal literals not allowed"),
            b'8' | b'9' => self.fail_here(sink, format!("Illegal octal digit {}", ch as char)),
            _ => {
                self.emit(sink, Token::Int(self.int_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_decimal_float<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'.' => {
                self.digit_count = 0;
                self.state = State::DecimalFraction;
                Action::Consume
            }
            b'e' | b'E' => {
                self.state = State::DecimalExponentSign;
                Action::Consume
            }
            b'0'..=b'9' => {
                self.float_value = self.float_value * 10.0 + (ch - b'0') as f64;
                Action::Consume
            }
            _ => {
                self.emit(sink, Token::Float(self.float_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_decimal_fraction<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'e' | b'E' => {
                self.state = State::DecimalExponentSign;
                Action::Consume
            }
            b'0'..=b'9' => {
                self.digit_count += 1;
                self.float_value += (ch - b'0') as f64 / 10f64.powi(self.digit_count as i32);
                Action::Consume
            }
            _ => {
                self.emit(sink, Token::Float(self.float_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_decimal_exponent_sign(&mut self, ch: u8) -> Action {
        self.int_value = 0;
        self.digit_count = 0;
        self.state = State::DecimalExponent;
        if ch == b'-' {
            self.exponent_sign = -1;
            Action::Consume
        } else {
            self.exponent_sign = 1;
            Action::Retain
        }
    }

    pub(crate) fn lex_decimal_exponent<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'0'..=b'9' => {
                if self.digit_count == 3 {
                    return self.fail_here(sink, "Decimal exponent must be 3 digits or less");
                }
                self.int_value = self.int_value * 10 + (ch - b'0') as i64;
                self.digit_count += 1;
                Action::Consume
            }
            _ if self.digit_count == 0 => {
                self.fail_here(sink, "No digits after decimal exponent delimiter")
            }
            _ => {
                self.float_value *= 10f64.powi(self.exponent_sign * self.int_value as i32);
                self.emit(sink, Token::Float(self.float_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }

    pub(crate) fn lex_hex_float<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'.' => {
                self.digit_count = 0;
                self.state = State::HexFraction;
                Action::Consume
            }
            b'p' | b'P' => {
                self.state = State::HexExponentSign;
                Action::Consume
            }
            _ => match hex_digit_value(ch) {
                Some(digit) => {
                    self.float_value = self.float_value * 16.0 + digit as f64;
                    Action::Consume
                }
                None => {
                    self.emit(sink, Token::Float(self.float_value));
                    self.state = State::Expression;
                    Action::Retain
                }
            },
        }
    }

    pub(crate) fn lex_hex_fraction<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match ch {
            b'p' | b'P' => {
                self.state = State::HexExponentSign;
                Action::Consume
            }
            _ => match hex_digit_value(ch) {
                Some(digit) => {
                    self.digit_count += 1;
                    self.float_value += digit as f64 / 16f64.powi(self.digit_count as i32);
                    Action::Consume
                }
                None => {
                    self.emit(sink, Token::Float(self.float_value));
                    self.state = State::Expression;
                    Action::Retain
                }
            },
        }
    }

    pub(crate) fn lex_hex_exponent_sign(&mut self, ch: u8) -> Action {
        self.int_value = 0;
        self.digit_count = 0;
        self.state = State::HexExponent;
        if ch == b'-' {
            self.exponent_sign = -1;
            Action::Consume
        } else {
            self.exponent_sign = 1;
            Action::Retain
        }
    }

    pub(crate) fn lex_hex_exponent<S: TokenSink>(&mut self, ch: u8, sink: &mut S) -> Action {
        match hex_digit_value(ch) {
            Some(digit) => {
                if self.digit_count == 2 {
                    return self.fail_here(sink, "Hex exponent must be 2 digits or less");
                }
                self.int_value = self.int_value * 16 + digit;
                self.digit_count += 1;
                Action::Consume
            }
            None if self.digit_count == 0 => {
                self.fail_here(sink, "No digits after hex exponent delimiter")
            }
            None => {
                // `p` scales by powers of two.
                self.float_value *= 2f64.powi(self.exponent_sign * self.int_value as i32);
                self.emit(sink, Token::Float(self.float_value));
                self.state = State::Expression;
                Action::Retain
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sink::TokenBuffer;
    use crate::token::Token;
    use crate::Lexer;

    /// Lexes a full expression and returns the tokens between the
    /// brace markers.
    fn lex_expr(expr: &str) -> Vec<Token> {
        let mut lexer = Lexer::new();
        let mut out = TokenBuffer::default();
        lexer.scan(format!("{{{expr}}}\n").as_bytes(), &mut out);
        assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);
        let tokens: Vec<Token> = out.tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens.first(), Some(&Token::ExprStart));
        tokens[1..tokens.len() - 2].to_vec()
    }

    fn lex_errors(expr: &str) -> Vec<String> {
        let mut lexer = Lexer::new();
        let mut out = TokenBuffer::default();
        lexer.scan(format!("{{{expr}}}\n").as_bytes(), &mut out);
        out.errors.iter().map(|e| e.message().to_string()).collect()
    }

    #[test]
    fn test_decimal_integer() {
        assert_eq!(lex_expr("42"), vec![Token::Int(42)]);
        assert_eq!(lex_expr("0"), vec![Token::Int(0)]);
        assert_eq!(lex_expr("9223372036854775807"), vec![Token::Int(i64::MAX)]);
    }

    #[test]
    fn test_hex_integer() {
        assert_eq!(lex_expr("0xff"), vec![Token::Int(255)]);
        assert_eq!(lex_expr("0XDEAD"), vec![Token::Int(0xDEAD)]);
        assert_eq!(lex_expr("0x0"), vec![Token::Int(0)]);
    }

    #[test]
    fn test_binary_integer() {
        assert_eq!(lex_expr("0b1010"), vec![Token::Int(10)]);
        assert_eq!(lex_expr("0B1"), vec![Token::Int(1)]);
    }

    #[test]
    fn test_octal_integer() {
        assert_eq!(lex_expr("0777"), vec![Token::Int(0o777)]);
        assert_eq!(lex_expr("00"), vec![Token::Int(0)]);
    }

    #[test]
    fn test_decimal_float() {
        assert_eq!(lex_expr("1.5"), vec![Token::Float(1.5)]);
        assert_eq!(lex_expr("0.25"), vec![Token::Float(0.25)]);
        assert_eq!(lex_expr("2.5e2"), vec![Token::Float(250.0)]);
        assert_eq!(lex_expr("1e-3"), vec![Token::Float(0.001)]);
        assert_eq!(lex_expr("0e5"), vec![Token::Float(0.0)]);
    }

    #[test]
    fn test_hex_float() {
        // 0x1.8 = 1.5, p2 scales by 4.
        assert_eq!(lex_expr("0x1.8"), vec![Token::Float(1.5)]);
        assert_eq!(lex_expr("0x1.8p2"), vec![Token::Float(6.0)]);
        assert_eq!(lex_expr("0x10p-1"), vec![Token::Float(8.0)]);
    }

    #[test]
    fn test_integer_overflow_promotes_to_float() {
        // One past i64::MAX.
        assert_eq!(
            lex_expr("9223372036854775808"),
            vec![Token::Float(9223372036854775808.0)]
        );
        assert_eq!(
            lex_expr("0xffffffffffffffff"),
            vec![Token::Float(18446744073709551615.0)]
        );
    }

    #[test]
    fn test_illegal_digits() {
        assert_eq!(lex_errors("0b12"), vec!["Illegal binary digit 2"]);
        assert_eq!(lex_errors("078"), vec!["Illegal octal digit 8"]);
        assert_eq!(
            lex_errors("0b1.0"),
            vec!["Fractional binary literals not allowed"]
        );
        assert_eq!(
            lex_errors("01.0"),
            vec!["Fractional octal literals not allowed"]
        );
    }

    #[test]
    fn test_exponent_errors() {
        assert_eq!(
            lex_errors("1e"),
            vec!["No digits after decimal exponent delimiter"]
        );
        assert_eq!(
            lex_errors("1e1234"),
            vec!["Decimal exponent must be 3 digits or less"]
        );
        assert_eq!(
            lex_errors("0x1p123"),
            vec!["Hex exponent must be 2 digits or less"]
        );
    }

    #[test]
    fn test_number_terminates_at_operator() {
        assert_eq!(
            lex_expr("2+3"),
            vec![
                Token::Int(2),
                Token::Keyword(crate::Keyword::Add),
                Token::Int(3)
            ]
        );
    }

    #[test]
    fn test_bare_zero_before_operator() {
        assert_eq!(
            lex_expr("0*1"),
            vec![
                Token::Int(0),
                Token::Keyword(crate::Keyword::Multiply),
                Token::Int(1)
            ]
        );
    }
}
