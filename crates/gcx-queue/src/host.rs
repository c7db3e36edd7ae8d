//! Host interface.

use gcx_interp::Env;

/// Everything the engine asks of its embedding program.
///
/// The environment half ([`Env`]) drives expression evaluation; the
/// methods here cover the queue's own obligations: the emergency-stop
/// hook and the out-of-memory report.
pub trait Host: Env {
    /// Unrecoverable allocation failure or invariant violation. The
    /// engine drops the offending entry and continues accepting
    /// input, but the host should treat the stream as compromised.
    fn fatal(&mut self, message: &str);

    /// Emergency stop: fires at parse time when an `M112` statement
    /// is queued, before any pending entries execute.
    fn m112(&mut self);
}
