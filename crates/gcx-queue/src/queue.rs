//! Statement queue and executor.
//!
//! Parsing runs ahead of execution: completed statements and parse
//! errors land in a FIFO ring, and the host drains them one at a time
//! with [`GCodeQueue::exec_next`] on its own schedule. The ring grows
//! as needed and absorbs any parser-ahead-of-executor skew.

use std::collections::VecDeque;

use gcx_interp::{Interpreter, Outcome};
use gcx_par::{ParseSink, Parser, Statement};
use gcx_util::GCodeError;

use crate::host::Host;

/// Command name that triggers the emergency-stop hook at parse time.
const EMERGENCY_STOP: &str = "M112";

/// One queued unit of work.
#[derive(Debug)]
enum RingEntry {
    Statement(Statement),
    Error(GCodeError),
}

/// Owns the host and the interpreter; executes statements the queue
/// hands over.
pub struct Executor<H: Host> {
    host: H,
    interp: Interpreter,
}

impl<H: Host> Executor<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            interp: Interpreter::new(),
        }
    }

    /// Evaluates one statement against the host environment.
    pub fn exec(&mut self, statement: &Statement) -> Outcome {
        self.interp.exec(statement, &mut self.host)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the executor, returning the host.
    pub fn into_host(self) -> H {
        self.host
    }
}

/// A parsing context feeding an injected [`Executor`].
///
/// Entries pop in strict FIFO order; dropping the queue frees all
/// pending entries.
pub struct GCodeQueue<H: Host> {
    executor: Executor<H>,
    parser: Parser,
    ring: VecDeque<RingEntry>,
}

/// Initial ring capacity; doubles on overflow.
const INITIAL_RING_CAPACITY: usize = 32;

impl<H: Host> GCodeQueue<H> {
    pub fn new(executor: Executor<H>) -> Self {
        Self {
            executor,
            parser: Parser::new(),
            ring: VecDeque::with_capacity(INITIAL_RING_CAPACITY),
        }
    }

    /// Feeds a chunk of input bytes, in any chunking the host finds
    /// convenient. Returns the number of pending entries.
    pub fn parse(&mut self, buf: &[u8]) -> usize {
        let mut sink = RingSink {
            ring: &mut self.ring,
            host: self.executor.host_mut(),
        };
        self.parser.parse(buf, &mut sink);
        self.ring.len()
    }

    /// Flushes a trailing line that arrived without a newline.
    /// Returns the number of pending entries.
    pub fn parse_finish(&mut self) -> usize {
        let mut sink = RingSink {
            ring: &mut self.ring,
            host: self.executor.host_mut(),
        };
        self.parser.finish(&mut sink);
        self.ring.len()
    }

    /// Number of entries waiting to execute.
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    /// Pops and executes the next entry.
    ///
    /// An empty ring yields [`Outcome::Empty`]; a queued parse error
    /// comes back as [`Outcome::Error`]; a statement executes and
    /// yields whatever the interpreter produced. The entry and its
    /// resources are released either way.
    pub fn exec_next(&mut self) -> Outcome {
        match self.ring.pop_front() {
            None => Outcome::Empty,
            Some(RingEntry::Error(error)) => Outcome::Error(error),
            Some(RingEntry::Statement(statement)) => {
                log::trace!(
                    "executing {} ({} pending)",
                    statement.command_name().unwrap_or("<expr>"),
                    self.ring.len()
                );
                self.executor.exec(&statement)
            }
        }
    }

    /// Drops all pending entries and restarts the parser at a fresh
    /// line.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.parser.reset();
    }

    pub fn executor(&self) -> &Executor<H> {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut Executor<H> {
        &mut self.executor
    }

    /// Consumes the queue, returning its executor. Pending entries
    /// are dropped.
    pub fn into_executor(self) -> Executor<H> {
        self.executor
    }
}

/// Parse sink that queues output and fires the emergency-stop hook.
struct RingSink<'a, H: Host> {
    ring: &'a mut VecDeque<RingEntry>,
    host: &'a mut H,
}

impl<H: Host> RingSink<'_, H> {
    fn push(&mut self, entry: RingEntry) {
        if self.ring.len() == self.ring.capacity() {
            log::debug!("statement ring full at {}, growing", self.ring.len());
            if self.ring.try_reserve(self.ring.capacity().max(1)).is_err() {
                self.host.fatal("Out of memory growing statement ring");
                return;
            }
        }
        self.ring.push_back(entry);
    }
}

impl<H: Host> ParseSink for RingSink<'_, H> {
    fn statement(&mut self, statement: Statement) {
        let emergency = statement.command_name() == Some(EMERGENCY_STOP);
        self.push(RingEntry::Statement(statement));
        if emergency {
            self.host.m112();
        }
    }

    fn error(&mut self, error: GCodeError) {
        self.push(RingEntry::Error(error));
    }
}
