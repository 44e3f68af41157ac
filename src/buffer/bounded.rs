//! Thread-safe bounded buffer
//!
//! Composes the [`PriorityStore`] with one mutex and two counting
//! semaphores into the safe put/get API shared by all producer and
//! consumer threads. The semaphore meaning is fixed:
//!
//! - `slots` counts free space remaining (starts at capacity)
//! - `items` counts queued messages available (starts at 0)
//!
//! Every successful operation acquires a token from one semaphore, mutates
//! the store under the mutex, then posts the paired semaphore, so
//! `slots + items == capacity` holds at every observable boundary and the
//! item count doubles as the store's occupancy. Token acquisition and
//! release happen outside the lock; only the store mutation runs under it.

use super::semaphore::Semaphore;
use super::store::PriorityStore;
use crate::core::{ExchangeError, Message, Result, ShutdownSignal};
use parking_lot::Mutex;
use std::time::Duration;

/// Outcome of an interruptible insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutStatus {
    /// The message was inserted into the store
    Stored,
    /// The shutdown signal was observed; nothing was inserted
    Stopped,
}

/// Outcome of an interruptible removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetStatus {
    /// The best message was removed from the store
    Received(Message),
    /// The shutdown signal was observed; nothing was removed
    Stopped,
}

impl PutStatus {
    /// Whether this outcome is the shutdown result
    pub fn is_stopped(&self) -> bool {
        matches!(self, PutStatus::Stopped)
    }
}

impl GetStatus {
    /// Whether this outcome is the shutdown result
    pub fn is_stopped(&self) -> bool {
        matches!(self, GetStatus::Stopped)
    }
}

/// A fixed-capacity, priority-aware buffer safe for concurrent use.
///
/// # Example
///
/// ```rust
/// use priority_exchange::buffer::BoundedBuffer;
/// use priority_exchange::core::Message;
///
/// let buffer = BoundedBuffer::new(4)?;
/// buffer.put(Message::new(1, 2, 0))?;
/// buffer.put(Message::new(2, 8, 0))?;
///
/// // Highest priority leaves first.
/// assert_eq!(buffer.get()?.value(), 2);
/// assert_eq!(buffer.len(), 1);
/// # Ok::<(), priority_exchange::core::ExchangeError>(())
/// ```
#[derive(Debug)]
pub struct BoundedBuffer {
    store: Mutex<PriorityStore>,
    items: Semaphore,
    slots: Semaphore,
    capacity: usize,
}

impl BoundedBuffer {
    /// Create a buffer with the given fixed capacity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCapacity` or `AllocationFailure` from the underlying
    /// store construction.
    pub fn new(capacity: usize) -> Result<Self> {
        let store = PriorityStore::new(capacity)?;
        Ok(Self {
            store: Mutex::new(store),
            items: Semaphore::new(0),
            slots: Semaphore::new(capacity),
            capacity,
        })
    }

    /// Fixed capacity set at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently held, under lock. Instrumentation only.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Whether the buffer currently holds no messages
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current free-slot count, for instrumentation and tests
    pub fn available_slots(&self) -> usize {
        self.slots.available()
    }

    /// Current queued-item count, for instrumentation and tests
    pub fn available_items(&self) -> usize {
        self.items.available()
    }

    /// Insert a message, blocking while the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns `InternalInconsistency` if the store rejects the insert
    /// despite an acquired slot token; the token is released back and the
    /// buffer accounting stays balanced, but the condition indicates a
    /// logic defect and should be treated as fatal.
    pub fn put(&self, message: Message) -> Result<()> {
        let token = self.slots.acquire_token();

        let inserted = {
            let mut store = self.store.lock();
            store.insert(message)
        };

        match inserted {
            Ok(_) => {
                token.commit();
                self.items.release();
                Ok(())
            }
            // Token drops here, returning the slot.
            Err(err) => Err(ExchangeError::inconsistency(
                "put",
                format!("store rejected insert with a slot token held: {}", err),
            )),
        }
    }

    /// Remove the best message, blocking while the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns `InternalInconsistency` if the store has nothing to remove
    /// despite an acquired item token (see [`put`](Self::put)).
    pub fn get(&self) -> Result<Message> {
        let token = self.items.acquire_token();

        let removed = {
            let mut store = self.store.lock();
            store.remove_best()
        };

        match removed {
            Ok(message) => {
                token.commit();
                self.slots.release();
                Ok(message)
            }
            Err(err) => Err(ExchangeError::inconsistency(
                "get",
                format!("store had no message with an item token held: {}", err),
            )),
        }
    }

    /// Insert a message, observing the shutdown signal with bounded latency.
    ///
    /// Each wait for a free slot is bounded by `poll`; on timeout the signal
    /// is re-checked and the wait retried. The signal is also re-checked
    /// immediately after a slot token is acquired and again after the lock
    /// is taken, so a shutdown request is observed within one poll interval
    /// plus one lock acquisition, and no message is ever inserted after the
    /// signal is seen set. A token acquired on a path that then observes
    /// shutdown is released back, leaving the slot/item counts exactly as
    /// before the call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero poll interval, or
    /// `InternalInconsistency` as for [`put`](Self::put).
    pub fn put_interruptible(
        &self,
        message: Message,
        shutdown: &ShutdownSignal,
        poll: Duration,
    ) -> Result<PutStatus> {
        if poll.is_zero() {
            return Err(ExchangeError::invalid_argument(
                "poll interval must be non-zero",
            ));
        }

        while !shutdown.is_requested() {
            let token = match self.slots.acquire_token_timeout(poll) {
                Some(token) => token,
                // Timed out: no token held, re-check the signal and retry.
                None => continue,
            };

            // Shutdown may have been requested after the slot was acquired.
            if shutdown.is_requested() {
                return Ok(PutStatus::Stopped);
            }

            let mut store = self.store.lock();
            // Or while waiting for the lock.
            if shutdown.is_requested() {
                drop(store);
                return Ok(PutStatus::Stopped);
            }

            let inserted = store.insert(message);
            drop(store);

            return match inserted {
                Ok(_) => {
                    token.commit();
                    self.items.release();
                    Ok(PutStatus::Stored)
                }
                Err(err) => Err(ExchangeError::inconsistency(
                    "put_interruptible",
                    format!("store rejected insert with a slot token held: {}", err),
                )),
            };
        }

        Ok(PutStatus::Stopped)
    }

    /// Remove the best message, observing the shutdown signal with bounded
    /// latency. Structural mirror of
    /// [`put_interruptible`](Self::put_interruptible).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero poll interval, or
    /// `InternalInconsistency` as for [`get`](Self::get).
    pub fn get_interruptible(
        &self,
        shutdown: &ShutdownSignal,
        poll: Duration,
    ) -> Result<GetStatus> {
        if poll.is_zero() {
            return Err(ExchangeError::invalid_argument(
                "poll interval must be non-zero",
            ));
        }

        while !shutdown.is_requested() {
            let token = match self.items.acquire_token_timeout(poll) {
                Some(token) => token,
                None => continue,
            };

            if shutdown.is_requested() {
                return Ok(GetStatus::Stopped);
            }

            let mut store = self.store.lock();
            if shutdown.is_requested() {
                drop(store);
                return Ok(GetStatus::Stopped);
            }

            let removed = store.remove_best();
            drop(store);

            return match removed {
                Ok(message) => {
                    token.commit();
                    self.slots.release();
                    Ok(GetStatus::Received(message))
                }
                Err(err) => Err(ExchangeError::inconsistency(
                    "get_interruptible",
                    format!("store had no message with an item token held: {}", err),
                )),
            };
        }

        Ok(GetStatus::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    const POLL: Duration = Duration::from_millis(20);

    fn msg(value: i32, priority: u8) -> Message {
        Message::new(value, priority, 0)
    }

    #[test]
    fn test_put_get_priority_order() {
        let buffer = BoundedBuffer::new(3).unwrap();
        buffer.put(msg(1, 1)).unwrap();
        buffer.put(msg(2, 9)).unwrap();
        buffer.put(msg(3, 5)).unwrap();

        assert_eq!(buffer.get().unwrap().value(), 2);
        assert_eq!(buffer.get().unwrap().value(), 3);
        assert_eq!(buffer.get().unwrap().value(), 1);
    }

    #[test]
    fn test_count_tracks_puts_minus_gets() {
        let buffer = BoundedBuffer::new(5).unwrap();
        assert_eq!(buffer.len(), 0);

        buffer.put(msg(1, 1)).unwrap();
        buffer.put(msg(2, 2)).unwrap();
        assert_eq!(buffer.len(), 2);

        buffer.get().unwrap();
        assert_eq!(buffer.len(), 1);

        buffer.get().unwrap();
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_semaphore_counts_mirror_occupancy() {
        let buffer = BoundedBuffer::new(4).unwrap();
        assert_eq!(buffer.available_slots(), 4);
        assert_eq!(buffer.available_items(), 0);

        buffer.put(msg(1, 1)).unwrap();
        assert_eq!(buffer.available_slots(), 3);
        assert_eq!(buffer.available_items(), 1);
        assert_eq!(
            buffer.available_slots() + buffer.available_items(),
            buffer.capacity()
        );

        buffer.get().unwrap();
        assert_eq!(buffer.available_slots(), 4);
        assert_eq!(buffer.available_items(), 0);
    }

    #[test]
    fn test_put_blocks_when_full() {
        let buffer = Arc::new(BoundedBuffer::new(1).unwrap());
        buffer.put(msg(1, 1)).unwrap();

        let writer = Arc::clone(&buffer);
        let handle = thread::spawn(move || {
            // Blocks until the main thread makes room.
            writer.put(msg(2, 2)).unwrap();
        });

        // Give the writer a chance to block.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(buffer.len(), 1);

        buffer.get().unwrap();
        handle.join().unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_get_blocks_until_put() {
        let buffer = Arc::new(BoundedBuffer::new(2).unwrap());

        let reader = Arc::clone(&buffer);
        let handle = thread::spawn(move || reader.get().unwrap());

        thread::sleep(Duration::from_millis(50));
        buffer.put(msg(42, 5)).unwrap();

        assert_eq!(handle.join().unwrap().value(), 42);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let buffer = BoundedBuffer::new(1).unwrap();
        let shutdown = ShutdownSignal::new();

        let err = buffer
            .put_interruptible(msg(1, 1), &shutdown, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidArgument { .. }));

        let err = buffer
            .get_interruptible(&shutdown, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidArgument { .. }));
    }

    #[test]
    fn test_interruptible_put_get_roundtrip() {
        let buffer = BoundedBuffer::new(2).unwrap();
        let shutdown = ShutdownSignal::new();

        let status = buffer
            .put_interruptible(msg(7, 3), &shutdown, POLL)
            .unwrap();
        assert_eq!(status, PutStatus::Stored);

        match buffer.get_interruptible(&shutdown, POLL).unwrap() {
            GetStatus::Received(m) => assert_eq!(m.value(), 7),
            GetStatus::Stopped => panic!("unexpected stop"),
        }
    }

    #[test]
    fn test_stopped_before_any_acquire() {
        let buffer = BoundedBuffer::new(2).unwrap();
        let shutdown = ShutdownSignal::new();
        shutdown.request();

        let status = buffer
            .put_interruptible(msg(1, 1), &shutdown, POLL)
            .unwrap();
        assert!(status.is_stopped());

        let status = buffer.get_interruptible(&shutdown, POLL).unwrap();
        assert!(status.is_stopped());

        // Nothing was touched.
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.available_slots(), 2);
        assert_eq!(buffer.available_items(), 0);
    }

    #[test]
    fn test_put_on_full_buffer_stops_within_poll_interval() {
        let buffer = Arc::new(BoundedBuffer::new(1).unwrap());
        buffer.put(msg(1, 1)).unwrap();

        let shutdown = ShutdownSignal::new();
        let writer_shutdown = shutdown.clone();
        let writer = Arc::clone(&buffer);

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let status = writer
                .put_interruptible(msg(2, 2), &writer_shutdown, POLL)
                .unwrap();
            (status, start.elapsed())
        });

        // Let the writer settle into its timed-wait loop, then stop it.
        thread::sleep(Duration::from_millis(60));
        shutdown.request();

        let (status, waited) = handle.join().unwrap();
        assert!(status.is_stopped());
        // Convergence is bounded by one poll interval plus scheduling slack.
        assert!(waited < Duration::from_millis(500), "took {:?}", waited);

        // A stopped call leaves the token counts untouched.
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.available_slots(), 0);
        assert_eq!(buffer.available_items(), 1);
    }

    #[test]
    fn test_get_on_empty_buffer_stops_within_poll_interval() {
        let buffer = Arc::new(BoundedBuffer::new(1).unwrap());

        let shutdown = ShutdownSignal::new();
        let reader_shutdown = shutdown.clone();
        let reader = Arc::clone(&buffer);

        let handle = thread::spawn(move || {
            reader.get_interruptible(&reader_shutdown, POLL).unwrap()
        });

        thread::sleep(Duration::from_millis(60));
        shutdown.request();

        assert!(handle.join().unwrap().is_stopped());
        assert_eq!(buffer.available_slots(), 1);
        assert_eq!(buffer.available_items(), 0);
    }

    #[test]
    fn test_stop_racing_with_operation_never_leaks_tokens() {
        // The signal may be observed before, during, or after the token
        // acquire; whichever path is taken, a stopped call must leave the
        // counts as they were and a stored call must move exactly one unit.
        for _ in 0..50 {
            let buffer = Arc::new(BoundedBuffer::new(1).unwrap());
            let shutdown = ShutdownSignal::new();

            let writer = Arc::clone(&buffer);
            let writer_shutdown = shutdown.clone();
            let handle = thread::spawn(move || {
                writer
                    .put_interruptible(msg(1, 1), &writer_shutdown, Duration::from_millis(1))
                    .unwrap()
            });

            shutdown.request();
            let status = handle.join().unwrap();

            match status {
                PutStatus::Stored => {
                    assert_eq!(buffer.available_slots(), 0);
                    assert_eq!(buffer.available_items(), 1);
                    assert_eq!(buffer.len(), 1);
                }
                PutStatus::Stopped => {
                    assert_eq!(buffer.available_slots(), 1);
                    assert_eq!(buffer.available_items(), 0);
                    assert_eq!(buffer.len(), 0);
                }
            }
        }
    }

    #[test]
    fn test_no_mutation_after_stop() {
        let buffer = BoundedBuffer::new(3).unwrap();
        buffer.put(msg(1, 1)).unwrap();

        let shutdown = ShutdownSignal::new();
        shutdown.request();

        // Both directions refuse to touch the store once stopped.
        assert!(buffer
            .put_interruptible(msg(2, 2), &shutdown, POLL)
            .unwrap()
            .is_stopped());
        assert!(buffer
            .get_interruptible(&shutdown, POLL)
            .unwrap()
            .is_stopped());
        assert_eq!(buffer.len(), 1);
    }
}
