//! Counting semaphore with timed waits
//!
//! The exchange coordinates capacity with two of these: a `slots` semaphore
//! counting free space and an `items` semaphore counting queued messages.
//! Built on `parking_lot`'s mutex and condvar; waits re-check the count in a
//! loop, so spurious wakeups never surface to callers and there is no
//! OS-signal failure mode to retry around.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A counting semaphore supporting blocking, non-blocking, and timed acquire.
///
/// The timed acquire exists so that callers can bound each wait and
/// periodically re-check an external shutdown flag instead of blocking
/// indefinitely.
///
/// # Example
///
/// ```rust
/// use priority_exchange::buffer::Semaphore;
/// use std::time::Duration;
///
/// let sem = Semaphore::new(1);
/// assert!(sem.acquire_timeout(Duration::from_millis(10)));
/// // Count is now zero; the next timed acquire times out.
/// assert!(!sem.acquire_timeout(Duration::from_millis(10)));
/// sem.release();
/// assert_eq!(sem.available(), 1);
/// ```
#[derive(Debug)]
pub struct Semaphore {
    count: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Create a semaphore with the given initial count
    pub fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    /// Block until the count is positive, then decrement it
    pub fn acquire(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.available.wait(&mut count);
        }
        *count -= 1;
    }

    /// Decrement the count if it is positive, without blocking
    pub fn try_acquire(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Like [`acquire`](Self::acquire), but give up after `timeout`.
    ///
    /// Returns `true` if a unit was acquired, `false` on timeout. The
    /// relative timeout is converted to an absolute deadline so that
    /// spurious wakeups do not extend the wait.
    pub fn acquire_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count == 0 {
            if self.available.wait_until(&mut count, deadline).timed_out() {
                // A release may have slipped in between the timeout and
                // reacquiring the lock; honour it if so.
                if *count == 0 {
                    return false;
                }
                break;
            }
        }
        *count -= 1;
        true
    }

    /// Increment the count and wake one waiter if any are blocked
    pub fn release(&self) {
        {
            let mut count = self.count.lock();
            *count += 1;
        }
        self.available.notify_one();
    }

    /// Blocking acquire returning a unit as a [`SemaphoreToken`] guard
    pub fn acquire_token(&self) -> SemaphoreToken<'_> {
        self.acquire();
        SemaphoreToken {
            semaphore: self,
            armed: true,
        }
    }

    /// Timed acquire returning a [`SemaphoreToken`] guard, `None` on timeout
    pub fn acquire_token_timeout(&self, timeout: Duration) -> Option<SemaphoreToken<'_>> {
        if !self.acquire_timeout(timeout) {
            return None;
        }
        Some(SemaphoreToken {
            semaphore: self,
            armed: true,
        })
    }

    /// Current count, for instrumentation and tests
    pub fn available(&self) -> usize {
        *self.count.lock()
    }
}

/// One acquired semaphore unit, released back on drop unless committed.
///
/// Dropping an uncommitted token returns the unit to the semaphore it came
/// from, which guarantees the acquire is undone on every early-return and
/// error path. Calling [`commit`](Self::commit) consumes the token without a
/// release; the caller then posts the *paired* semaphore to transfer the
/// unit (a free slot becomes a queued item, or vice versa).
#[derive(Debug)]
#[must_use = "dropping the token immediately releases the acquired unit"]
pub struct SemaphoreToken<'a> {
    semaphore: &'a Semaphore,
    armed: bool,
}

impl SemaphoreToken<'_> {
    /// Consume the token without releasing the unit back
    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for SemaphoreToken<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.semaphore.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_count() {
        let sem = Semaphore::new(3);
        assert_eq!(sem.available(), 3);
    }

    #[test]
    fn test_acquire_decrements() {
        let sem = Semaphore::new(2);
        sem.acquire();
        assert_eq!(sem.available(), 1);
        sem.acquire();
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_try_acquire_at_zero() {
        let sem = Semaphore::new(1);
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_acquire_timeout_expires() {
        let sem = Semaphore::new(0);
        let start = Instant::now();
        assert!(!sem.acquire_timeout(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_release_wakes_blocked_acquire() {
        let sem = Arc::new(Semaphore::new(0));

        let waiter = Arc::clone(&sem);
        let handle = thread::spawn(move || {
            waiter.acquire();
        });

        // Give the waiter time to block
        thread::sleep(Duration::from_millis(50));
        sem.release();

        handle.join().unwrap();
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_release_during_timed_wait() {
        let sem = Arc::new(Semaphore::new(0));

        let waiter = Arc::clone(&sem);
        let handle = thread::spawn(move || waiter.acquire_timeout(Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(50));
        sem.release();

        assert!(handle.join().unwrap());
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_token_drop_releases() {
        let sem = Semaphore::new(1);
        {
            let _token = sem.acquire_token();
            assert_eq!(sem.available(), 0);
        }
        assert_eq!(sem.available(), 1);
    }

    #[test]
    fn test_token_commit_keeps_unit() {
        let sem = Semaphore::new(1);
        let token = sem.acquire_token();
        token.commit();
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_token_timeout_none_on_empty() {
        let sem = Semaphore::new(0);
        assert!(sem.acquire_token_timeout(Duration::from_millis(10)).is_none());
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let sem = Arc::new(Semaphore::new(0));
        let rounds = 1000;

        let poster = Arc::clone(&sem);
        let producer = thread::spawn(move || {
            for _ in 0..rounds {
                poster.release();
            }
        });

        let taker = Arc::clone(&sem);
        let consumer = thread::spawn(move || {
            for _ in 0..rounds {
                taker.acquire();
            }
        });

        producer.join().unwrap();
        consumer.join().unwrap();
        assert_eq!(sem.available(), 0);
    }
}
