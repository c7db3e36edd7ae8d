//! Keyword table.
//!
//! A pure lookup from token text to keyword id. The original engine
//! generated a perfect hash for this table; a lazily built FxHashMap
//! over the same closed set serves the same contract.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// An operator or reserved word of the expression sublanguage.
///
/// The set is closed: the lexer matches identifier and symbol runs
/// against this table and everything that misses is an identifier (for
/// word-shaped runs) or an "Illegal operator" error (for symbol runs).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `OR`
    Or,
    /// `AND`
    And,
    /// `=`
    Equals,
    /// `~` - string concatenation
    Concat,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `%`
    Modulus,
    /// `**`
    Power,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `!`
    Not,
    /// `IF`
    If,
    /// `ELSE`
    Else,
    /// `.` - dictionary lookup
    Dot,
    /// `,`
    Comma,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `NAN`
    Nan,
    /// `INFINITY`
    Infinity,
    /// `TRUE`
    True,
    /// `FALSE`
    False,
}

static KEYWORDS: Lazy<FxHashMap<&'static str, Keyword>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    map.insert("OR", Keyword::Or);
    map.insert("AND", Keyword::And);
    map.insert("=", Keyword::Equals);
    map.insert("~", Keyword::Concat);
    map.insert("+", Keyword::Add);
    map.insert("-", Keyword::Subtract);
    map.insert("%", Keyword::Modulus);
    map.insert("**", Keyword::Power);
    map.insert("*", Keyword::Multiply);
    map.insert("/", Keyword::Divide);
    map.insert("<", Keyword::Lt);
    map.insert(">", Keyword::Gt);
    map.insert("<=", Keyword::Le);
    map.insert(">=", Keyword::Ge);
    map.insert("!", Keyword::Not);
    map.insert("IF", Keyword::If);
    map.insert("ELSE", Keyword::Else);
    map.insert(".", Keyword::Dot);
    map.insert(",", Keyword::Comma);
    map.insert("(", Keyword::LeftParen);
    map.insert(")", Keyword::RightParen);
    map.insert("NAN", Keyword::Nan);
    map.insert("INFINITY", Keyword::Infinity);
    map.insert("TRUE", Keyword::True);
    map.insert("FALSE", Keyword::False);
    map
});

impl Keyword {
    /// Looks up token text in the keyword table.
    ///
    /// The lexer upper-cases identifier runs before calling this, so
    /// the table only holds the canonical spellings.
    pub fn lookup(text: &str) -> Option<Keyword> {
        KEYWORDS.get(text).copied()
    }

    /// The canonical spelling, for diagnostics.
    pub fn text(&self) -> &'static str {
        match self {
            Keyword::Or => "OR",
            Keyword::And => "AND",
            Keyword::Equals => "=",
            Keyword::Concat => "~",
            Keyword::Add => "+",
            Keyword::Subtract => "-",
            Keyword::Modulus => "%",
            Keyword::Power => "**",
            Keyword::Multiply => "*",
            Keyword::Divide => "/",
            Keyword::Lt => "<",
            Keyword::Gt => ">",
            Keyword::Le => "<=",
            Keyword::Ge => ">=",
            Keyword::Not => "!",
            Keyword::If => "IF",
            Keyword::Else => "ELSE",
            Keyword::Dot => ".",
            Keyword::Comma => ",",
            Keyword::LeftParen => "(",
            Keyword::RightParen => ")",
            Keyword::Nan => "NAN",
            Keyword::Infinity => "INFINITY",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_keywords() {
        assert_eq!(Keyword::lookup("AND"), Some(Keyword::And));
        assert_eq!(Keyword::lookup("OR"), Some(Keyword::Or));
        assert_eq!(Keyword::lookup("IF"), Some(Keyword::If));
        assert_eq!(Keyword::lookup("ELSE"), Some(Keyword::Else));
        assert_eq!(Keyword::lookup("TRUE"), Some(Keyword::True));
        assert_eq!(Keyword::lookup("FALSE"), Some(Keyword::False));
        assert_eq!(Keyword::lookup("NAN"), Some(Keyword::Nan));
        assert_eq!(Keyword::lookup("INFINITY"), Some(Keyword::Infinity));
    }

    #[test]
    fn test_symbol_keywords() {
        assert_eq!(Keyword::lookup("**"), Some(Keyword::Power));
        assert_eq!(Keyword::lookup("*"), Some(Keyword::Multiply));
        assert_eq!(Keyword::lookup("<="), Some(Keyword::Le));
        assert_eq!(Keyword::lookup(">="), Some(Keyword::Ge));
        assert_eq!(Keyword::lookup("~"), Some(Keyword::Concat));
        assert_eq!(Keyword::lookup("."), Some(Keyword::Dot));
    }

    #[test]
    fn test_misses() {
        assert_eq!(Keyword::lookup("G1"), None);
        assert_eq!(Keyword::lookup("and"), None);
        assert_eq!(Keyword::lookup("=="), None);
        assert_eq!(Keyword::lookup(""), None);
    }
}
