//! gcx-interp - Statement evaluation for the gcx G-code engine.
//!
//! Takes the parser's statement trees, evaluates embedded expressions
//! against a host-supplied [`Env`], and flattens each statement into a
//! [`Command`] whose arguments are fully expanded strings.

mod arena;
mod interp;
mod value;

pub use interp::{Command, Interpreter, Outcome};
pub use value::{DictHandle, Env, Value};

#[cfg(test)]
mod tests {
    use gcx_par::{Node, Operator, Statement};

    use crate::{Command, DictHandle, Env, Interpreter, Outcome, Value};

    /// Test environment: `POS = 7`, `NAME = "abc"`, `HOT = true`,
    /// `TEMP.BED = 60`, plus a `DOUBLE(x)` function.
    struct TestEnv {
        lookups: usize,
    }

    impl TestEnv {
        fn new() -> Self {
            Self { lookups: 0 }
        }
    }

    const TEMP_DICT: DictHandle = DictHandle(1);

    impl Env for TestEnv {
        fn lookup(&mut self, parent: Option<DictHandle>, key: &str) -> Option<Value> {
            self.lookups += 1;
            match (parent, key) {
                (None, "POS") => Some(Value::Int(7)),
                (None, "NAME") => Some(Value::Str("abc".into())),
                (None, "HOT") => Some(Value::Bool(true)),
                (None, "HALF") => Some(Value::Float(0.5)),
                (None, "TEMP") => Some(Value::Dict(TEMP_DICT)),
                (Some(TEMP_DICT), "BED") => Some(Value::Int(60)),
                _ => None,
            }
        }

        fn serialize(&mut self, dict: DictHandle) -> Option<String> {
            if dict == TEMP_DICT {
                Some("#<dict:temp>".into())
            } else {
                None
            }
        }

        fn call(&mut self, name: &str, args: &[Value]) -> Option<Value> {
            if name == "DOUBLE" && args.len() == 1 {
                if let Value::Int(i) = args[0] {
                    return Some(Value::Int(i * 2));
                }
            }
            None
        }
    }

    fn exec(statement: Statement) -> Outcome {
        let mut interp = Interpreter::new();
        let mut env = TestEnv::new();
        interp.exec(&statement, &mut env)
    }

    /// Evaluates one expression node as a single-field statement and
    /// returns the expanded text.
    fn eval_str(node: Node) -> String {
        match exec(Statement::new(vec![node])) {
            Outcome::Command(Command { name, .. }) => name,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    fn eval_err(node: Node) -> String {
        match exec(Statement::new(vec![node])) {
            Outcome::Error(error) => error.message().to_string(),
            other => panic!("expected an error, got {other:?}"),
        }
    }

    fn param(name: &str) -> Node {
        Node::Parameter(name.into())
    }

    #[test]
    fn test_simple_command() {
        let outcome = exec(Statement::new(vec![
            Node::Str("G1".into()),
            Node::Str("X10".into()),
            Node::Str("Y20".into()),
        ]));
        assert_eq!(
            outcome,
            Outcome::Command(Command {
                name: "G1".into(),
                args: vec!["X10".into(), "Y20".into()],
            })
        );
    }

    #[test]
    fn test_empty_statement_is_empty() {
        assert_eq!(exec(Statement::new(vec![])), Outcome::Empty);
    }

    #[test]
    fn test_literal_serialization() {
        assert_eq!(eval_str(Node::Int(14)), "14");
        assert_eq!(eval_str(Node::Float(-150.0)), "-150.000000");
        assert_eq!(eval_str(Node::Bool(true)), "true");
        assert_eq!(eval_str(Node::Bool(false)), "false");
        assert_eq!(eval_str(Node::Str("plain".into())), "plain");
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(
            eval_str(Node::binary(Operator::Add, Node::Int(2), Node::Int(3))),
            "5"
        );
        assert_eq!(
            eval_str(Node::binary(Operator::Divide, Node::Int(7), Node::Int(2))),
            "3"
        );
        assert_eq!(
            eval_str(Node::binary(Operator::Modulus, Node::Int(7), Node::Int(4))),
            "3"
        );
        assert_eq!(
            eval_str(Node::binary(Operator::Power, Node::Int(2), Node::Int(10))),
            "1024"
        );
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(
            eval_str(Node::binary(Operator::Add, Node::Int(1), Node::Float(0.5))),
            "1.500000"
        );
        assert_eq!(
            eval_str(Node::binary(
                Operator::Divide,
                Node::Float(7.0),
                Node::Int(2)
            )),
            "3.500000"
        );
    }

    #[test]
    fn test_integer_overflow_promotes_to_float() {
        let result = eval_str(Node::binary(
            Operator::Multiply,
            Node::Int(i64::MAX),
            Node::Int(2),
        ));
        assert!(result.contains('.'), "expected a float string: {result}");
    }

    #[test]
    fn test_negate() {
        assert_eq!(
            eval_str(Node::unary(Operator::Negate, Node::Int(5))),
            "-5"
        );
        assert_eq!(
            eval_str(Node::unary(Operator::Negate, Node::Float(1.5))),
            "-1.500000"
        );
        assert_eq!(
            eval_str(Node::unary(Operator::Negate, Node::Int(i64::MIN))),
            format!("{:.6}", -(i64::MIN as f64))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval_err(Node::binary(Operator::Divide, Node::Int(1), Node::Int(0))),
            "Division by zero"
        );
        assert_eq!(
            eval_err(Node::binary(Operator::Modulus, Node::Int(1), Node::Int(0))),
            "Modulo by zero"
        );
        // Float division follows IEEE instead.
        assert_eq!(
            eval_str(Node::binary(
                Operator::Divide,
                Node::Float(1.0),
                Node::Int(0)
            )),
            "inf"
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            eval_str(Node::binary(Operator::Lt, Node::Int(1), Node::Int(2))),
            "true"
        );
        assert_eq!(
            eval_str(Node::binary(Operator::Ge, Node::Int(1), Node::Int(2))),
            "false"
        );
        assert_eq!(
            eval_str(Node::binary(
                Operator::Equals,
                Node::Float(1.0),
                Node::Int(1)
            )),
            "true"
        );
        // Either side being a string makes it a string comparison.
        assert_eq!(
            eval_str(Node::binary(
                Operator::Lt,
                Node::Str("abc".into()),
                Node::Str("abd".into())
            )),
            "true"
        );
        assert_eq!(
            eval_str(Node::binary(
                Operator::Equals,
                Node::Str("1".into()),
                Node::Int(1)
            )),
            "true"
        );
    }

    #[test]
    fn test_logic_operators() {
        assert_eq!(
            eval_str(Node::binary(Operator::And, Node::Bool(true), Node::Int(0))),
            "false"
        );
        assert_eq!(
            eval_str(Node::binary(Operator::Or, Node::Bool(false), Node::Int(3))),
            "true"
        );
        assert_eq!(
            eval_str(Node::unary(Operator::Not, Node::Str("".into()))),
            "true"
        );
    }

    #[test]
    fn test_conditional_short_circuits() {
        // The untaken arm would error; it must never evaluate.
        let node = Node::Operator(
            Operator::IfElse,
            vec![
                Node::Bool(true),
                Node::Int(1),
                Node::binary(Operator::Divide, Node::Int(1), Node::Int(0)),
            ],
        );
        assert_eq!(eval_str(node), "1");
    }

    #[test]
    fn test_nan_condition_takes_else() {
        let node = Node::Operator(
            Operator::IfElse,
            vec![Node::Float(f64::NAN), Node::Int(1), Node::Int(2)],
        );
        assert_eq!(eval_str(node), "2");
    }

    #[test]
    fn test_concat() {
        let node = Node::Operator(
            Operator::Concat,
            vec![Node::Str("S".into()), Node::Int(20), Node::Bool(true)],
        );
        assert_eq!(eval_str(node), "S20true");
    }

    #[test]
    fn test_parameter_lookup() {
        assert_eq!(eval_str(param("POS")), "7");
        assert_eq!(eval_str(param("NAME")), "abc");
        // Unknown parameters coerce to the empty string.
        assert_eq!(eval_str(param("MISSING")), "");
    }

    #[test]
    fn test_unknown_coercions() {
        assert_eq!(
            eval_str(Node::binary(Operator::Add, param("MISSING"), Node::Int(3))),
            "3"
        );
        assert_eq!(
            eval_str(Node::unary(Operator::Not, param("MISSING"))),
            "true"
        );
    }

    #[test]
    fn test_lookup_chain() {
        let node = Node::Operator(
            Operator::Lookup,
            vec![param("TEMP"), Node::Str("BED".into())],
        );
        assert_eq!(eval_str(node), "60");
    }

    #[test]
    fn test_lookup_on_unknown_parent_is_unknown() {
        let node = Node::Operator(
            Operator::Lookup,
            vec![
                Node::Operator(
                    Operator::Lookup,
                    vec![param("MISSING"), Node::Str("B".into())],
                ),
                Node::Str("C".into()),
            ],
        );
        assert_eq!(eval_str(node), "");
    }

    #[test]
    fn test_lookup_on_scalar_is_an_error() {
        let node = Node::Operator(
            Operator::Lookup,
            vec![Node::Int(5), Node::Str("KEY".into())],
        );
        assert_eq!(eval_err(node), "Cannot look up 'KEY' in integer value");
    }

    #[test]
    fn test_dict_serializes_through_host() {
        assert_eq!(eval_str(param("TEMP")), "#<dict:temp>");
    }

    #[test]
    fn test_host_function() {
        let node = Node::Function("DOUBLE".into(), vec![Node::Int(21)]);
        assert_eq!(eval_str(node), "42");
    }

    #[test]
    fn test_unknown_function_is_an_error() {
        let node = Node::Function("NOPE".into(), vec![]);
        assert_eq!(eval_err(node), "Unknown function 'NOPE'");
    }

    #[test]
    fn test_error_aborts_statement() {
        let outcome = exec(Statement::new(vec![
            Node::Str("G1".into()),
            Node::binary(Operator::Divide, Node::Int(1), Node::Int(0)),
            Node::Str("NEVER".into()),
        ]));
        assert!(matches!(outcome, Outcome::Error(_)));
    }

    #[test]
    fn test_fields_evaluate_left_to_right() {
        let mut interp = Interpreter::new();
        let mut env = TestEnv::new();
        let statement = Statement::new(vec![
            Node::Str("M117".into()),
            param("POS"),
            param("NAME"),
        ]);
        let outcome = interp.exec(&statement, &mut env);
        assert_eq!(
            outcome,
            Outcome::Command(Command {
                name: "M117".into(),
                args: vec!["7".into(), "abc".into()],
            })
        );
        assert_eq!(env.lookups, 2);
    }

    #[test]
    fn test_interpreter_reuse_resets_scratch() {
        let mut interp = Interpreter::new();
        let mut env = TestEnv::new();
        for _ in 0..3 {
            let statement = Statement::new(vec![
                Node::Str("M117".into()),
                Node::Operator(
                    Operator::Concat,
                    vec![Node::Str("S".into()), param("POS")],
                ),
            ]);
            let outcome = interp.exec(&statement, &mut env);
            assert_eq!(
                outcome,
                Outcome::Command(Command {
                    name: "M117".into(),
                    args: vec!["S7".into()],
                })
            );
        }
    }

    #[test]
    fn test_string_to_number_casts() {
        assert_eq!(
            eval_str(Node::binary(
                Operator::Add,
                Node::Str("12".into()),
                Node::Int(1)
            )),
            "13"
        );
        // Unparsable strings coerce to zero.
        assert_eq!(
            eval_str(Node::binary(
                Operator::Add,
                Node::Str("abc".into()),
                Node::Int(1)
            )),
            "1"
        );
    }
}
