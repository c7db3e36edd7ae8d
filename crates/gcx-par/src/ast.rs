//! AST node definitions.
//!
//! One `Statement` per logical input line; its children are the fields
//! of a single command invocation. Expression subtrees hang off
//! operator and function nodes. Child order is argument order, every
//! node has exactly one owner, and dropping a node drops its subtree.

/// An n-ary operator of the expression sublanguage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// `AND` - logical conjunction (both sides always evaluate).
    And,
    /// `OR` - logical disjunction (both sides always evaluate).
    Or,
    /// `=` - equality comparison.
    Equals,
    /// `~` - string concatenation; also joins the word and expression
    /// parts of a single field.
    Concat,
    /// `+`
    Add,
    /// `-` (binary)
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
    /// `!` - logical negation.
    Not,
    /// `-` (unary)
    Negate,
    /// `IF cond then ELSE else` - children are `[cond, then, else]`;
    /// only the taken arm evaluates.
    IfElse,
    /// `.` - dictionary lookup; children are `[parent, key]`.
    Lookup,
}

impl Operator {
    /// Surface spelling, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Equals => "=",
            Operator::Concat => "~",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Modulus => "%",
            Operator::Power => "**",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Not => "!",
            Operator::Negate => "-",
            Operator::IfElse => "IF",
            Operator::Lookup => ".",
        }
    }
}

/// A node of a statement tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A bare identifier in expression context; resolved against the
    /// root environment at evaluation time.
    Parameter(String),
    /// String literal: a statement word or a quoted expression string.
    Str(String),
    /// Boolean literal (`TRUE` / `FALSE`).
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal (also `NAN` and `INFINITY`).
    Float(f64),
    /// Operator application; arity depends on the operator.
    Operator(Operator, Vec<Node>),
    /// Call to a named function; children are the arguments.
    Function(String, Vec<Node>),
}

impl Node {
    /// Builds a binary operator application.
    pub fn binary(op: Operator, left: Node, right: Node) -> Node {
        Node::Operator(op, vec![left, right])
    }

    /// Builds a unary operator application.
    pub fn unary(op: Operator, operand: Node) -> Node {
        Node::Operator(op, vec![operand])
    }
}

/// One logical input line: an ordered sequence of field expressions
/// making up a single command invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub fields: Vec<Node>,
}

impl Statement {
    pub fn new(fields: Vec<Node>) -> Self {
        Self { fields }
    }

    /// The command name, when the first field is plain text.
    ///
    /// Fields built from expressions have no name until evaluation, so
    /// they return `None` here.
    pub fn command_name(&self) -> Option<&str> {
        match self.fields.first() {
            Some(Node::Str(name)) => Some(name),
            _ => None,
        }
    }
}
