//! Producer and consumer worker threads.
//!
//! Each worker owns one OS thread, its own statistics, and a clone of the
//! shared [`WorkerContext`]. Workers observe the shutdown signal at the top
//! of their loop and through the buffer's interruptible operations, so they
//! exit within one poll interval of the coordinator requesting shutdown.

mod consumer;
mod producer;
mod stats;

pub use consumer::Consumer;
pub use producer::Producer;
pub use stats::{StatsSnapshot, WorkerStats};

use crate::buffer::BoundedBuffer;
use crate::core::ShutdownSignal;
use crate::report::EventLog;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared state handed to every worker at spawn time.
#[derive(Clone)]
pub struct WorkerContext {
    /// The one buffer all workers exchange messages through
    pub buffer: Arc<BoundedBuffer>,
    /// The run-wide shutdown signal (workers only read it)
    pub shutdown: ShutdownSignal,
    /// Shared CSV event log
    pub log: Arc<EventLog>,
    /// Run start, for relative event timestamps
    pub started: Instant,
    /// Poll interval for interruptible waits
    pub poll: Duration,
}

impl WorkerContext {
    /// Milliseconds elapsed since the run started
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}
