//! gcx-par - G-code statement parser.
//!
//! Turns the lexer's token stream into one [`Statement`] tree per
//! logical line. Fields are words, `{…}` expressions, or
//! concatenations of both; expressions follow a conventional
//! precedence ladder with functions, parameter references and `.`
//! lookup chains.

pub mod ast;
mod parser;

pub use ast::{Node, Operator, Statement};
pub use parser::{ParseSink, Parser};
