//! Shared shutdown signal
//!
//! One [`ShutdownSignal`] is created per run and a clone handed to every
//! worker thread and to the interruptible buffer operations. The contract
//! is single-writer / multiple-reader: exactly one coordinating thread calls
//! [`request()`](ShutdownSignal::request) (on timeout, or on a fatal startup
//! error), everyone else only reads. The signal transitions once and is
//! never cleared, which is why a plain atomic boolean is sufficient and no
//! lock is needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cloneable handle to the run-wide shutdown flag.
///
/// # Example
///
/// ```rust
/// use priority_exchange::core::ShutdownSignal;
/// use std::thread;
/// use std::time::Duration;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
///
/// let handle = thread::spawn(move || {
///     while !observer.is_requested() {
///         thread::sleep(Duration::from_millis(10));
///     }
///     "stopped"
/// });
///
/// shutdown.request();
/// assert_eq!(handle.join().unwrap(), "stopped");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a signal in the "not requested" state
    pub fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request shutdown.
    ///
    /// Idempotent; only the coordinating thread should call this. Once set
    /// the signal stays set for the rest of the run.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Check whether shutdown has been requested.
    ///
    /// Lock-free, suitable for frequent checking in hot loops.
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Sleep for up to `total`, waking early if shutdown is requested.
    ///
    /// The sleep is chunked into `poll`-sized slices so the flag is observed
    /// with bounded latency. Used by workers for their pacing waits between
    /// buffer operations.
    pub fn interruptible_sleep(&self, total: Duration, poll: Duration) {
        if total.is_zero() {
            return;
        }
        if poll.is_zero() {
            std::thread::sleep(total);
            return;
        }

        let mut remaining = total;
        while !remaining.is_zero() && !self.is_requested() {
            let chunk = remaining.min(poll);
            std::thread::sleep(chunk);
            remaining = remaining.saturating_sub(chunk);
        }
    }
}
