//! Statement parser.
//!
//! The parser owns the lexer, buffers the token stream of the current
//! logical line, and runs recursive descent over the buffer once the
//! end of the line arrives. One statement per line; a syntax error
//! anywhere in a line discards that line and the next one starts
//! fresh.

use gcx_lex::{Keyword, Lexer, Token, TokenSink};
use gcx_util::{GCodeError, Span};

use crate::ast::{Node, Operator, Statement};

/// Receiver for the parser's output.
///
/// Ownership of each completed statement transfers to the sink.
pub trait ParseSink {
    fn statement(&mut self, statement: Statement);
    fn error(&mut self, error: GCodeError);
}

/// Raw lexer output, preserved in order so errors interleave with
/// statements the way they appeared in the input.
enum RawEvent {
    Token(Token, Span),
    Error(GCodeError),
}

#[derive(Default)]
struct Collector {
    events: Vec<RawEvent>,
}

impl TokenSink for Collector {
    fn token(&mut self, token: Token, span: Span) {
        self.events.push(RawEvent::Token(token, span));
    }

    fn error(&mut self, error: GCodeError) {
        self.events.push(RawEvent::Error(error));
    }
}

/// Incremental G-code parser.
///
/// Feed bytes with [`parse`](Parser::parse) in chunks of any size and
/// flush a trailing unterminated line with [`finish`](Parser::finish).
pub struct Parser {
    lexer: Lexer,
    collector: Collector,
    /// Tokens of the logical line currently being collected.
    pending: Vec<(Token, Span)>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            lexer: Lexer::new(),
            collector: Collector::default(),
            pending: Vec::new(),
        }
    }

    /// Feeds a chunk of input; completed statements and errors are
    /// delivered to `sink` in input order.
    pub fn parse<S: ParseSink>(&mut self, buf: &[u8], sink: &mut S) {
        self.lexer.scan(buf, &mut self.collector);
        self.dispatch(sink);
    }

    /// Flushes a pending unterminated line.
    pub fn finish<S: ParseSink>(&mut self, sink: &mut S) {
        self.lexer.finish(&mut self.collector);
        self.dispatch(sink);
    }

    /// Returns the parser (and its lexer) to the initial state.
    pub fn reset(&mut self) {
        self.lexer.reset();
        self.collector.events.clear();
        self.pending.clear();
    }

    fn dispatch<S: ParseSink>(&mut self, sink: &mut S) {
        let events = std::mem::take(&mut self.collector.events);
        for event in events {
            match event {
                RawEvent::Error(error) => {
                    // The failed line's tokens belong to no statement.
                    self.pending.clear();
                    sink.error(error);
                }
                RawEvent::Token(Token::EndOfStatement, _) => {
                    let tokens = std::mem::take(&mut self.pending);
                    match parse_statement(&tokens) {
                        Ok(statement) => sink.statement(statement),
                        Err(error) => sink.error(error),
                    }
                }
                RawEvent::Token(token, span) => self.pending.push((token, span)),
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Recursive descent over one line of tokens
// -----------------------------------------------------------------------------

fn parse_statement(tokens: &[(Token, Span)]) -> Result<Statement, GCodeError> {
    let mut line = LineParser { tokens, pos: 0 };
    let mut fields = Vec::new();
    while !line.at_end() {
        fields.push(line.parse_field()?);
    }
    Ok(Statement::new(fields))
}

struct LineParser<'a> {
    tokens: &'a [(Token, Span)],
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    /// Consumes the given keyword if it is next.
    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek() == Some(&Token::Keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, context: &str) -> GCodeError {
        match self.tokens.get(self.pos) {
            Some((token, span)) => GCodeError::parse_at(
                format!("Unexpected {} {}", describe(token), context),
                *span,
            ),
            None => GCodeError::parse(format!("Unexpected end of statement {context}")),
        }
    }

    /// One field: word and expression parts joined by bridges.
    fn parse_field(&mut self) -> Result<Node, GCodeError> {
        let first = self.parse_field_part()?;
        if self.peek() != Some(&Token::Bridge) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.peek() == Some(&Token::Bridge) {
            self.pos += 1;
            parts.push(self.parse_field_part()?);
        }
        Ok(Node::Operator(Operator::Concat, parts))
    }

    fn parse_field_part(&mut self) -> Result<Node, GCodeError> {
        match self.peek() {
            Some(Token::Str(text)) => {
                let node = Node::Str(text.clone());
                self.pos += 1;
                Ok(node)
            }
            Some(Token::ExprStart) => {
                self.pos += 1;
                let expr = self.parse_expr()?;
                if self.peek() == Some(&Token::ExprEnd) {
                    self.pos += 1;
                    Ok(expr)
                } else {
                    Err(self.unexpected("in expression"))
                }
            }
            _ => Err(self.unexpected("at start of field")),
        }
    }

    /// Expression entry point: the conditional has the loosest
    /// binding.
    ///
    /// `IF cond then-expr ELSE else-expr` evaluates `then-expr` when
    /// the condition holds, `else-expr` otherwise.
    fn parse_expr(&mut self) -> Result<Node, GCodeError> {
        if self.eat_keyword(Keyword::If) {
            let cond = self.parse_or()?;
            let then_arm = self.parse_expr()?;
            if !self.eat_keyword(Keyword::Else) {
                return Err(match self.tokens.get(self.pos) {
                    Some((_, span)) => {
                        GCodeError::parse_at("Missing ELSE in conditional", *span)
                    }
                    None => GCodeError::parse("Missing ELSE in conditional"),
                });
            }
            let else_arm = self.parse_expr()?;
            return Ok(Node::Operator(
                Operator::IfElse,
                vec![cond, then_arm, else_arm],
            ));
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Node, GCodeError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            left = Node::binary(Operator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, GCodeError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword(Keyword::And) {
            let right = self.parse_not()?;
            left = Node::binary(Operator::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Node, GCodeError> {
        if self.eat_keyword(Keyword::Not) {
            let operand = self.parse_not()?;
            return Ok(Node::unary(Operator::Not, operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node, GCodeError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Keyword(Keyword::Equals)) => Operator::Equals,
                Some(Token::Keyword(Keyword::Lt)) => Operator::Lt,
                Some(Token::Keyword(Keyword::Gt)) => Operator::Gt,
                Some(Token::Keyword(Keyword::Le)) => Operator::Le,
                Some(Token::Keyword(Keyword::Ge)) => Operator::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = Node::binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Node, GCodeError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Keyword(Keyword::Add)) => Operator::Add,
                Some(Token::Keyword(Keyword::Subtract)) => Operator::Subtract,
                Some(Token::Keyword(Keyword::Concat)) => Operator::Concat,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = Node::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Node, GCodeError> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek() {
                Some(Token::Keyword(Keyword::Multiply)) => Operator::Multiply,
                Some(Token::Keyword(Keyword::Divide)) => Operator::Divide,
                Some(Token::Keyword(Keyword::Modulus)) => Operator::Modulus,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_power()?;
            left = Node::binary(op, left, right);
        }
    }

    fn parse_power(&mut self) -> Result<Node, GCodeError> {
        let left = self.parse_unary()?;
        if self.eat_keyword(Keyword::Power) {
            // Right-associative: 2**3**2 is 2**(3**2).
            let right = self.parse_power()?;
            return Ok(Node::binary(Operator::Power, left, right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, GCodeError> {
        if self.eat_keyword(Keyword::Subtract) {
            let operand = self.parse_unary()?;
            return Ok(Node::unary(Operator::Negate, operand));
        }
        self.parse_postfix()
    }

    /// Primary expression plus any trailing `.key` lookup chain.
    fn parse_postfix(&mut self) -> Result<Node, GCodeError> {
        let mut node = self.parse_primary()?;
        while self.eat_keyword(Keyword::Dot) {
            match self.tokens.get(self.pos) {
                Some((Token::Identifier(key), _)) => {
                    node = Node::Operator(Operator::Lookup, vec![node, Node::Str(key.clone())]);
                    self.pos += 1;
                }
                Some((token, span)) => {
                    return Err(GCodeError::parse_at(
                        format!("Expected identifier after '.', found {}", describe(token)),
                        *span,
                    ));
                }
                None => {
                    return Err(GCodeError::parse("Expected identifier after '.'"));
                }
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Node, GCodeError> {
        let node = match self.peek() {
            Some(Token::Int(value)) => Node::Int(*value),
            Some(Token::Float(value)) => Node::Float(*value),
            Some(Token::Str(text)) => Node::Str(text.clone()),
            Some(Token::Keyword(Keyword::True)) => Node::Bool(true),
            Some(Token::Keyword(Keyword::False)) => Node::Bool(false),
            Some(Token::Keyword(Keyword::Nan)) => Node::Float(f64::NAN),
            Some(Token::Keyword(Keyword::Infinity)) => Node::Float(f64::INFINITY),
            Some(Token::Keyword(Keyword::LeftParen)) => {
                self.pos += 1;
                let expr = self.parse_expr()?;
                if !self.eat_keyword(Keyword::RightParen) {
                    return Err(self.unexpected("in parenthesized expression"));
                }
                return Ok(expr);
            }
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.pos += 1;
                if self.eat_keyword(Keyword::LeftParen) {
                    return self.parse_call(name);
                }
                return Ok(Node::Parameter(name));
            }
            _ => return Err(self.unexpected("in expression")),
        };
        self.pos += 1;
        Ok(node)
    }

    /// Comma-separated argument list; the opening paren is consumed.
    fn parse_call(&mut self, name: String) -> Result<Node, GCodeError> {
        let mut args = Vec::new();
        if !self.eat_keyword(Keyword::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat_keyword(Keyword::Comma) {
                    continue;
                }
                if self.eat_keyword(Keyword::RightParen) {
                    break;
                }
                return Err(self.unexpected("in argument list"));
            }
        }
        Ok(Node::Function(name, args))
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Keyword(keyword) => format!("'{}'", keyword.text()),
        Token::Identifier(name) => format!("identifier '{name}'"),
        Token::Str(text) => format!("string '{text}'"),
        Token::Int(value) => format!("integer {value}"),
        Token::Float(value) => format!("float {value}"),
        Token::Bridge => "bridge".to_string(),
        Token::ExprStart => "'{'".to_string(),
        Token::ExprEnd => "'}'".to_string(),
        Token::EndOfStatement => "end of statement".to_string(),
    }
}
