//! Statement evaluation.
//!
//! The interpreter walks a statement tree, evaluates each field
//! left-to-right against the host environment, and flattens the
//! results into a command name plus expanded argument strings.

use gcx_par::{Node, Operator, Statement};
use gcx_util::GCodeError;

use crate::arena::{ScratchArena, StrRef};
use crate::value::{DictHandle, Env, Value};

/// A fully expanded command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

/// Result of executing one queue entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Nothing to do (empty queue or empty statement).
    Empty,
    /// A parse or evaluation error.
    Error(GCodeError),
    /// A command ready for the host to act on.
    Command(Command),
}

/// Evaluation-time value. Strings live in the scratch arena and stay
/// valid for the duration of one `exec`.
#[derive(Clone, Copy, Debug)]
enum Operand {
    /// A missing environment lookup; coerces like ""/0/0.0/false.
    Unknown,
    Str(StrRef),
    Bool(bool),
    Int(i64),
    Float(f64),
    Dict(DictHandle),
}

impl Operand {
    fn type_name(&self) -> &'static str {
        match self {
            Operand::Unknown => "unknown",
            Operand::Str(_) => "string",
            Operand::Bool(_) => "boolean",
            Operand::Int(_) => "integer",
            Operand::Float(_) => "float",
            Operand::Dict(_) => "dictionary",
        }
    }
}

/// Statement interpreter.
///
/// Holds the scratch arena and the field buffer; both reset at the
/// start of every [`exec`](Interpreter::exec).
#[derive(Debug, Default)]
pub struct Interpreter {
    arena: ScratchArena,
    fields: Vec<StrRef>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates a statement into a flat command.
    ///
    /// Fields evaluate left-to-right; the first evaluation error
    /// aborts the statement and discards any fields accumulated so
    /// far.
    pub fn exec<E: Env>(&mut self, statement: &Statement, env: &mut E) -> Outcome {
        self.arena.reset();
        self.fields.clear();

        if statement.fields.is_empty() {
            return Outcome::Empty;
        }

        for field in &statement.fields {
            match self.eval(field, env) {
                Ok(value) => {
                    let text = self.str_cast(&value, env);
                    self.fields.push(text);
                }
                Err(error) => return Outcome::Error(error),
            }
        }

        let name = self.arena.get(self.fields[0]).to_string();
        let args = self.fields[1..]
            .iter()
            .map(|r| self.arena.get(*r).to_string())
            .collect();
        Outcome::Command(Command { name, args })
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    fn eval<E: Env>(&mut self, node: &Node, env: &mut E) -> Result<Operand, GCodeError> {
        match node {
            Node::Str(text) => Ok(Operand::Str(self.arena.push_str(text))),
            Node::Bool(value) => Ok(Operand::Bool(*value)),
            Node::Int(value) => Ok(Operand::Int(*value)),
            Node::Float(value) => Ok(Operand::Float(*value)),
            Node::Parameter(name) => Ok(self.import(env.lookup(None, name))),
            Node::Function(name, args) => self.eval_call(name, args, env),
            Node::Operator(op, children) => self.eval_operator(*op, children, env),
        }
    }

    fn eval_call<E: Env>(
        &mut self,
        name: &str,
        args: &[Node],
        env: &mut E,
    ) -> Result<Operand, GCodeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let operand = self.eval(arg, env)?;
            values.push(self.export(&operand));
        }
        match env.call(name, &values) {
            Some(value) => Ok(self.import(Some(value))),
            None => Err(GCodeError::eval(format!("Unknown function '{name}'"))),
        }
    }

    fn eval_operator<E: Env>(
        &mut self,
        op: Operator,
        children: &[Node],
        env: &mut E,
    ) -> Result<Operand, GCodeError> {
        self.check_arity(op, children)?;
        match op {
            Operator::IfElse => {
                // The only short-circuiting form: one arm never runs.
                let cond = self.eval(&children[0], env)?;
                if self.bool_cast(&cond) {
                    self.eval(&children[1], env)
                } else {
                    self.eval(&children[2], env)
                }
            }
            Operator::And => {
                let left = self.eval(&children[0], env)?;
                let right = self.eval(&children[1], env)?;
                Ok(Operand::Bool(
                    self.bool_cast(&left) && self.bool_cast(&right),
                ))
            }
            Operator::Or => {
                let left = self.eval(&children[0], env)?;
                let right = self.eval(&children[1], env)?;
                Ok(Operand::Bool(
                    self.bool_cast(&left) || self.bool_cast(&right),
                ))
            }
            Operator::Not => {
                let operand = self.eval(&children[0], env)?;
                Ok(Operand::Bool(!self.bool_cast(&operand)))
            }
            Operator::Negate => {
                let operand = self.eval(&children[0], env)?;
                Ok(match operand {
                    Operand::Float(f) => Operand::Float(-f),
                    other => {
                        let i = self.int_cast(&other);
                        match i.checked_neg() {
                            Some(value) => Operand::Int(value),
                            None => Operand::Float(-(i as f64)),
                        }
                    }
                })
            }
            Operator::Concat => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    let value = self.eval(child, env)?;
                    parts.push(self.str_cast(&value, env));
                }
                Ok(Operand::Str(self.arena.concat(&parts)))
            }
            Operator::Lookup => self.eval_lookup(children, env),
            Operator::Equals | Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge => {
                self.eval_comparison(op, children, env)
            }
            Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Divide
            | Operator::Modulus
            | Operator::Power => self.eval_arithmetic(op, children, env),
        }
    }

    fn eval_lookup<E: Env>(
        &mut self,
        children: &[Node],
        env: &mut E,
    ) -> Result<Operand, GCodeError> {
        let parent = self.eval(&children[0], env)?;
        let key_value = self.eval(&children[1], env)?;
        let key_ref = self.str_cast(&key_value, env);
        match parent {
            Operand::Dict(handle) => {
                let key = self.arena.get(key_ref).to_string();
                Ok(self.import(env.lookup(Some(handle), &key)))
            }
            // A missing parent swallows the whole chain quietly.
            Operand::Unknown => Ok(Operand::Unknown),
            other => Err(GCodeError::eval(format!(
                "Cannot look up '{}' in {} value",
                self.arena.get(key_ref),
                other.type_name()
            ))),
        }
    }

    fn eval_comparison<E: Env>(
        &mut self,
        op: Operator,
        children: &[Node],
        env: &mut E,
    ) -> Result<Operand, GCodeError> {
        let left = self.eval(&children[0], env)?;
        let right = self.eval(&children[1], env)?;

        // Strings order lexicographically; anything else numerically.
        if matches!(left, Operand::Str(_)) || matches!(right, Operand::Str(_)) {
            let lr = self.str_cast(&left, env);
            let rr = self.str_cast(&right, env);
            let a = self.arena.get(lr);
            let b = self.arena.get(rr);
            return Ok(Operand::Bool(match op {
                Operator::Equals => a == b,
                Operator::Lt => a < b,
                Operator::Gt => a > b,
                Operator::Le => a <= b,
                Operator::Ge => a >= b,
                _ => unreachable!("comparison operator"),
            }));
        }

        if matches!(left, Operand::Float(_)) || matches!(right, Operand::Float(_)) {
            let a = self.float_cast(&left);
            let b = self.float_cast(&right);
            return Ok(Operand::Bool(match op {
                Operator::Equals => a == b,
                Operator::Lt => a < b,
                Operator::Gt => a > b,
                Operator::Le => a <= b,
                Operator::Ge => a >= b,
                _ => unreachable!("comparison operator"),
            }));
        }

        let a = self.int_cast(&left);
        let b = self.int_cast(&right);
        Ok(Operand::Bool(match op {
            Operator::Equals => a == b,
            Operator::Lt => a < b,
            Operator::Gt => a > b,
            Operator::Le => a <= b,
            Operator::Ge => a >= b,
            _ => unreachable!("comparison operator"),
        }))
    }

    fn eval_arithmetic<E: Env>(
        &mut self,
        op: Operator,
        children: &[Node],
        env: &mut E,
    ) -> Result<Operand, GCodeError> {
        let left = self.eval(&children[0], env)?;
        let right = self.eval(&children[1], env)?;

        if matches!(left, Operand::Float(_)) || matches!(right, Operand::Float(_)) {
            let a = self.float_cast(&left);
            let b = self.float_cast(&right);
            return Ok(Operand::Float(match op {
                Operator::Add => a + b,
                Operator::Subtract => a - b,
                Operator::Multiply => a * b,
                Operator::Divide => a / b,
                Operator::Modulus => a % b,
                Operator::Power => a.powf(b),
                _ => unreachable!("arithmetic operator"),
            }));
        }

        let a = self.int_cast(&left);
        let b = self.int_cast(&right);
        let result = match op {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => {
                if b == 0 {
                    return Err(GCodeError::eval("Division by zero"));
                }
                a.checked_div(b)
            }
            Operator::Modulus => {
                if b == 0 {
                    return Err(GCodeError::eval("Modulo by zero"));
                }
                a.checked_rem(b)
            }
            Operator::Power => {
                if b < 0 {
                    None
                } else {
                    u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
                }
            }
            _ => unreachable!("arithmetic operator"),
        };
        // Integer overflow promotes to float, like oversized literals.
        Ok(match result {
            Some(value) => Operand::Int(value),
            None => Operand::Float(match op {
                Operator::Add => a as f64 + b as f64,
                Operator::Subtract => a as f64 - b as f64,
                Operator::Multiply => a as f64 * b as f64,
                Operator::Divide => a as f64 / b as f64,
                Operator::Modulus => (a as f64) % (b as f64),
                Operator::Power => (a as f64).powf(b as f64),
                _ => unreachable!("arithmetic operator"),
            }),
        })
    }

    fn check_arity(&self, op: Operator, children: &[Node]) -> Result<(), GCodeError> {
        let expected = match op {
            Operator::Not | Operator::Negate => 1,
            Operator::IfElse => 3,
            Operator::Concat => {
                if children.is_empty() {
                    return Err(GCodeError::eval("Operator '~' expects at least 1 argument"));
                }
                return Ok(());
            }
            _ => 2,
        };
        if children.len() != expected {
            return Err(GCodeError::eval(format!(
                "Operator '{}' expects {} argument{}",
                op.name(),
                expected,
                if expected == 1 { "" } else { "s" }
            )));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Host boundary conversions
    // -------------------------------------------------------------------------

    /// Interns a host value; `None` is the unknown value.
    fn import(&mut self, value: Option<Value>) -> Operand {
        match value {
            None => Operand::Unknown,
            Some(Value::Str(text)) => Operand::Str(self.arena.push_str(&text)),
            Some(Value::Bool(b)) => Operand::Bool(b),
            Some(Value::Int(i)) => Operand::Int(i),
            Some(Value::Float(f)) => Operand::Float(f),
            Some(Value::Dict(handle)) => Operand::Dict(handle),
        }
    }

    /// Materializes an operand for a host call.
    fn export(&self, operand: &Operand) -> Value {
        match operand {
            Operand::Unknown => Value::Str(String::new()),
            Operand::Str(r) => Value::Str(self.arena.get(*r).to_string()),
            Operand::Bool(b) => Value::Bool(*b),
            Operand::Int(i) => Value::Int(*i),
            Operand::Float(f) => Value::Float(*f),
            Operand::Dict(handle) => Value::Dict(*handle),
        }
    }

    // -------------------------------------------------------------------------
    // Coercions (total; never fail)
    // -------------------------------------------------------------------------

    fn str_cast<E: Env>(&mut self, operand: &Operand, env: &mut E) -> StrRef {
        match operand {
            Operand::Unknown => StrRef::EMPTY,
            Operand::Str(r) => *r,
            Operand::Bool(true) => self.arena.push_str("true"),
            Operand::Bool(false) => self.arena.push_str("false"),
            Operand::Int(i) => self.arena.push_fmt(format_args!("{i}")),
            // Fixed six decimal places, printf %f style.
            Operand::Float(f) => self.arena.push_fmt(format_args!("{f:.6}")),
            Operand::Dict(handle) => match env.serialize(*handle) {
                Some(text) => self.arena.push_str(&text),
                None => self.arena.push_str("<obj>"),
            },
        }
    }

    fn int_cast(&self, operand: &Operand) -> i64 {
        match operand {
            Operand::Unknown => 0,
            Operand::Str(r) => self.arena.get(*r).parse().unwrap_or(0),
            Operand::Bool(b) => *b as i64,
            Operand::Int(i) => *i,
            // Saturating truncation; NaN goes to zero.
            Operand::Float(f) => *f as i64,
            Operand::Dict(_) => 0,
        }
    }

    fn float_cast(&self, operand: &Operand) -> f64 {
        match operand {
            Operand::Unknown => 0.0,
            Operand::Str(r) => self.arena.get(*r).parse().unwrap_or(0.0),
            Operand::Bool(true) => 1.0,
            Operand::Bool(false) => 0.0,
            Operand::Int(i) => *i as f64,
            Operand::Float(f) => *f,
            Operand::Dict(_) => 0.0,
        }
    }

    fn bool_cast(&self, operand: &Operand) -> bool {
        match operand {
            Operand::Unknown => false,
            Operand::Str(r) => !self.arena.get(*r).is_empty(),
            Operand::Bool(b) => *b,
            Operand::Int(i) => *i != 0,
            Operand::Float(f) => *f != 0.0 && !f.is_nan(),
            Operand::Dict(_) => true,
        }
    }
}
