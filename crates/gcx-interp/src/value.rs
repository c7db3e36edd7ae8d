//! Host-facing value model.

/// Opaque cookie identifying an object in the host's environment tree.
///
/// The engine never interprets a handle; it only passes handles back
/// to the host's [`Env::lookup`] and [`Env::serialize`] calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DictHandle(pub u64);

/// A typed runtime value crossing the host boundary.
///
/// Environment lookups and function calls return these; a `None`
/// where a `Value` was expected means "unknown", which coerces like an
/// empty string / 0 / false.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Dict(DictHandle),
}

/// The evaluation environment supplied by the host.
///
/// `parent` is `None` for the root environment, or a handle the host
/// previously returned inside [`Value::Dict`].
pub trait Env {
    /// Resolves `parent.key`. `None` means the key is unknown.
    fn lookup(&mut self, parent: Option<DictHandle>, key: &str) -> Option<Value>;

    /// Stringifies a dictionary handle. `None` falls back to `<obj>`.
    fn serialize(&mut self, dict: DictHandle) -> Option<String>;

    /// Applies a named function. The built-in set is empty; hosts may
    /// extend it. `None` makes the call an evaluation error.
    fn call(&mut self, name: &str, args: &[Value]) -> Option<Value> {
        let _ = (name, args);
        None
    }
}
