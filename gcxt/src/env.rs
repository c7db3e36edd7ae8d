//! Demonstration environment.
//!
//! A fixed three-level dictionary, `FOO.BAR.BIZ = "baz"`, showing how
//! a host hands opaque handles back to the engine.

use gcx_queue::{DictHandle, Env, Host, Value};

const FOO: DictHandle = DictHandle(1);
const BAR: DictHandle = DictHandle(2);

/// Host for the reference harness.
#[derive(Debug, Default)]
pub struct TrivialDict;

impl Env for TrivialDict {
    fn lookup(&mut self, parent: Option<DictHandle>, key: &str) -> Option<Value> {
        match (parent, key) {
            (None, "FOO") => Some(Value::Dict(FOO)),
            (Some(FOO), "BAR") => Some(Value::Dict(BAR)),
            (Some(BAR), "BIZ") => Some(Value::Str("baz".into())),
            _ => None,
        }
    }

    fn serialize(&mut self, dict: DictHandle) -> Option<String> {
        match dict {
            FOO => Some("#<dict:foo>".into()),
            BAR => Some("#<dict:bar>".into()),
            _ => None,
        }
    }
}

impl Host for TrivialDict {
    fn fatal(&mut self, message: &str) {
        tracing::error!("fatal engine error: {message}");
    }

    fn m112(&mut self) {
        tracing::warn!("M112 emergency stop requested");
    }
}
