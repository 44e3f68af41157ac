//! Producer thread

use super::stats::{StatsSnapshot, WorkerStats};
use super::WorkerContext;
use crate::buffer::PutStatus;
use crate::config::{PRODUCER_WAIT_MAX, VALUE_MAX, VALUE_MIN};
use crate::core::{ExchangeError, Message, Result};
use crate::report::{Actor, EventKind};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Handle to a running producer thread.
///
/// Each producer generates messages with a random payload value and its own
/// fixed priority, inserts them through the buffer's interruptible put, and
/// pauses a random interval between writes. The loop exits on the shutdown
/// signal or on the first fatal buffer error.
pub struct Producer {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Producer {
    /// Spawn a producer with the given identity and fixed priority.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the OS thread cannot be created.
    pub fn spawn(id: usize, priority: u8, ctx: WorkerContext) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);
        let name = format!("producer-{}", id);

        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::run(id, priority, ctx, stats_clone))
            .map_err(|e| ExchangeError::spawn(name, e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Producer identity
    pub fn id(&self) -> usize {
        self.id
    }

    /// Live view of this producer's statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the thread to exit and return its final statistics.
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the thread panicked.
    pub fn join(mut self) -> Result<StatsSnapshot> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| ExchangeError::join(format!("producer-{}", self.id)))?;
        }
        Ok(self.stats.snapshot())
    }

    fn run(id: usize, priority: u8, ctx: WorkerContext, stats: Arc<WorkerStats>) {
        let actor = Actor::Producer(id);
        ctx.log
            .record(ctx.elapsed_ms(), EventKind::ProducerStart, actor, None, ctx.buffer.len(), 0);
        log::debug!("producer {} started (priority {})", id, priority);

        while !ctx.shutdown.is_requested() {
            let message = Message::new(fastrand::i32(VALUE_MIN..=VALUE_MAX), priority, id);

            // Blocked time approximates the semaphore wait plus the brief
            // critical section.
            let wait_started = Instant::now();
            let outcome = ctx.buffer.put_interruptible(message, &ctx.shutdown, ctx.poll);
            let blocked_ms = wait_started.elapsed().as_millis() as u64;

            match outcome {
                Ok(PutStatus::Stored) => {
                    let depth = ctx.buffer.len();
                    ctx.log.record(
                        ctx.elapsed_ms(),
                        EventKind::ProducerWrite,
                        actor,
                        Some(&message),
                        depth,
                        blocked_ms,
                    );
                    stats.record_op(blocked_ms, depth);
                    log::debug!(
                        "producer {} wrote value {} (priority {}, depth {})",
                        id,
                        message.value(),
                        priority,
                        depth
                    );
                }
                Ok(PutStatus::Stopped) => break,
                Err(err) => {
                    ctx.log.record(
                        ctx.elapsed_ms(),
                        EventKind::ProducerError,
                        actor,
                        Some(&message),
                        ctx.buffer.len(),
                        blocked_ms,
                    );
                    log::error!("producer {}: put failed, exiting: {}", id, err);
                    break;
                }
            }

            let pause =
                Duration::from_millis(fastrand::u64(0..=PRODUCER_WAIT_MAX.as_millis() as u64));
            ctx.shutdown.interruptible_sleep(pause, ctx.poll);
        }

        ctx.log
            .record(ctx.elapsed_ms(), EventKind::ProducerExit, actor, None, ctx.buffer.len(), 0);
        log::debug!("producer {} exited", id);
    }
}
