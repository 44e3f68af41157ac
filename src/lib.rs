//! # Priority Exchange
//!
//! A bounded, priority-aware message exchange between producer and consumer
//! threads, with a timeout-driven shutdown protocol that terminates all
//! threads promptly without breaking synchronization invariants.
//!
//! ## Features
//!
//! - **Priority Store**: Fixed-capacity container with FIFO insertion and
//!   stable highest-priority-first removal
//! - **Counting Semaphores**: Blocking and timed waits built on parking_lot,
//!   with scoped tokens that release themselves on every exit path
//! - **Bounded Buffer**: Safe concurrent put/get, plus interruptible
//!   variants that observe a shutdown signal within one poll interval
//! - **Workers**: Producer/consumer threads with per-thread statistics
//! - **Observability**: Thread-safe CSV event log and end-of-run reporting
//!
//! ## Quick Start
//!
//! ```rust
//! use priority_exchange::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let buffer = BoundedBuffer::new(5)?;
//!
//! buffer.put(Message::new(3, 1, 0))?;
//! buffer.put(Message::new(8, 7, 0))?;
//!
//! // Highest priority first; ties go to the earliest insert.
//! let best = buffer.get()?;
//! assert_eq!(best.value(), 8);
//! # Ok(())
//! # }
//! ```
//!
//! ## Cooperative Shutdown
//!
//! ```rust
//! use priority_exchange::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let buffer = BoundedBuffer::new(1)?;
//! let shutdown = ShutdownSignal::new();
//!
//! shutdown.request();
//!
//! // Once the signal is set, interruptible operations return the
//! // non-error "stopped" outcome without touching the buffer.
//! let status = buffer.put_interruptible(
//!     Message::new(1, 1, 0),
//!     &shutdown,
//!     Duration::from_millis(200),
//! )?;
//! assert!(status.is_stopped());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod config;
pub mod core;
pub mod prelude;
pub mod report;
pub mod worker;

pub use crate::core::{ExchangeError, Message, Result, ShutdownSignal};
pub use buffer::{BoundedBuffer, GetStatus, PutStatus};
pub use config::RunConfig;
