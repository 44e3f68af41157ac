//! Bounded buffer and its building blocks.
//!
//! This module is the concurrency core of the exchange:
//!
//! - [`PriorityStore`]: the fixed-capacity container (no locking of its own)
//! - [`Semaphore`] / [`SemaphoreToken`]: counting semaphores with timed
//!   waits and scoped token release
//! - [`BoundedBuffer`]: the composed thread-safe put/get API, including the
//!   interruptible variants that cooperate with a
//!   [`ShutdownSignal`](crate::core::ShutdownSignal)
//!
//! The buffer emits no events and carries no logging dependency; callers
//! query [`BoundedBuffer::len`] after successful operations when they want
//! to record occupancy.

mod bounded;
mod semaphore;
mod store;

pub use bounded::{BoundedBuffer, GetStatus, PutStatus};
pub use semaphore::{Semaphore, SemaphoreToken};
pub use store::PriorityStore;
