//! Consumer thread

use super::stats::{StatsSnapshot, WorkerStats};
use super::WorkerContext;
use crate::buffer::GetStatus;
use crate::config::CONSUMER_WAIT_MAX;
use crate::core::{ExchangeError, Result};
use crate::report::{Actor, EventKind};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Handle to a running consumer thread.
///
/// Structural mirror of [`Producer`](super::Producer): removes the best
/// message through the buffer's interruptible get, records the event, and
/// pauses a random interval between reads.
pub struct Consumer {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Consumer {
    /// Spawn a consumer with the given identity.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the OS thread cannot be created.
    pub fn spawn(id: usize, ctx: WorkerContext) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);
        let name = format!("consumer-{}", id);

        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::run(id, ctx, stats_clone))
            .map_err(|e| ExchangeError::spawn(name, e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Consumer identity
    pub fn id(&self) -> usize {
        self.id
    }

    /// Live view of this consumer's statistics
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
                .map_err(|_| ExchangeError::join(format!("consumer-{}", self.id)))?;
        }
        Ok(self.stats.snapshot())
    }

    fn run(id: usize, ctx: WorkerContext, stats: Arc<WorkerStats>) {
        let actor = Actor::Consumer(id);
        ctx.log
            .record(ctx.elapsed_ms(), EventKind::ConsumerStart, actor, None, ctx.buffer.len(), 0);
        log::debug!("consumer {} started", id);

        while !ctx.shutdown.is_requested() {
            let wait_started = Instant::now();
            let outcome = ctx.buffer.get_interruptible(&ctx.shutdown, ctx.poll);
            let blocked_ms = wait_started.elapsed().as_millis() as u64;

            match outcome {
                Ok(GetStatus::Received(message)) => {
                    let depth = ctx.buffer.len();
                    ctx.log.record(
                        ctx.elapsed_ms(),
                        EventKind::ConsumerRead,
                        actor,
                        Some(&message),
                        depth,
                        blocked_ms,
                    );
                    stats.record_op(blocked_ms, depth);
                    log::debug!(
                        "consumer {} read value {} (priority {}, from producer {})",
                        id,
                        message.value(),
                        message.priority(),
                        message.producer_id()
                    );
                }
                Ok(GetStatus::Stopped) => break,
                Err(err) => {
                    ctx.log.record(
                        ctx.elapsed_ms(),
                        EventKind::ConsumerError,
                        actor,
                        None,
                        ctx.buffer.len(),
                        blocked_ms,
                    );
                    log::error!("consumer {}: get failed, exiting: {}", id, err);
                    break;
                }
            }

            let pause =
                Duration::from_millis(fastrand::u64(0..=CONSUMER_WAIT_MAX.as_millis() as u64));
            ctx.shutdown.interruptible_sleep(pause, ctx.poll);
        }

        ctx.log
            .record(ctx.elapsed_ms(), EventKind::ConsumerExit, actor, None, ctx.buffer.len(), 0);
        log::debug!("consumer {} exited", id);
    }
}
