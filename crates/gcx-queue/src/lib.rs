//! gcx-queue - Queue-driven execution for the gcx G-code engine.
//!
//! This crate is the engine's front door. The host constructs an
//! [`Executor`] around its [`Host`] implementation, wraps it in a
//! [`GCodeQueue`], feeds raw bytes through [`GCodeQueue::parse`], and
//! drains results with [`GCodeQueue::exec_next`]:
//!
//! ```
//! use gcx_queue::{DictHandle, Env, Executor, GCodeQueue, Host, Outcome, Value};
//!
//! struct NullHost;
//!
//! impl Env for NullHost {
//!     fn lookup(&mut self, _parent: Option<DictHandle>, _key: &str) -> Option<Value> {
//!         None
//!     }
//!     fn serialize(&mut self, _dict: DictHandle) -> Option<String> {
//!         None
//!     }
//! }
//!
//! impl Host for NullHost {
//!     fn fatal(&mut self, _message: &str) {}
//!     fn m112(&mut self) {}
//! }
//!
//! let mut queue = GCodeQueue::new(Executor::new(NullHost));
//! queue.parse(b"G1 X{2+3}\n");
//! match queue.exec_next() {
//!     Outcome::Command(command) => {
//!         assert_eq!(command.name, "G1");
//!         assert_eq!(command.args, vec!["X5".to_string()]);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

mod host;
mod queue;

pub use gcx_interp::{Command, DictHandle, Env, Outcome, Value};
pub use gcx_util::{GCodeError, Span};
pub use host::Host;
pub use queue::{Executor, GCodeQueue};
