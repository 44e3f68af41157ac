//! Convenient re-exports for common types and traits

pub use crate::buffer::{BoundedBuffer, GetStatus, PriorityStore, PutStatus, Semaphore};
pub use crate::config::RunConfig;
pub use crate::core::{ExchangeError, Message, Result, ShutdownSignal};
pub use crate::report::{Actor, EventKind, EventLog, RunReport};
pub use crate::worker::{Consumer, Producer, WorkerContext, WorkerStats};
