//! Thread-safe CSV event log
//!
//! One row per event, written under an internal mutex so rows from
//! concurrent threads never interleave, and flushed immediately so the log
//! stays usable if the process terminates early. The log records event
//! strings verbatim; it does not interpret them.

use crate::config::RunConfig;
use crate::core::{ExchangeError, Message, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Stable CSV column header
const CSV_HEADER: &str =
    "time_ms,event,actor_type,actor_id,value,priority,producer_id,q_count,blocked_ms";

/// Kinds of events recorded over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Run started
    RunStart,
    /// Run finished
    RunEnd,
    /// Coordinator set the shutdown signal on timeout
    StopTimeout,
    /// Coordinator set the shutdown signal after a startup failure
    StopInitFail,
    /// Producer thread entered its loop
    ProducerStart,
    /// Producer inserted a message
    ProducerWrite,
    /// Producer hit a fatal buffer error
    ProducerError,
    /// Producer thread exited
    ProducerExit,
    /// Consumer thread entered its loop
    ConsumerStart,
    /// Consumer removed a message
    ConsumerRead,
    /// Consumer hit a fatal buffer error
    ConsumerError,
    /// Consumer thread exited
    ConsumerExit,
}

impl EventKind {
    /// The string recorded in the CSV `event` column
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::RunStart => "RUN_START",
            EventKind::RunEnd => "RUN_END",
            EventKind::StopTimeout => "STOP_SET_TIMEOUT",
            EventKind::StopInitFail => "STOP_SET_INIT_FAIL",
            EventKind::ProducerStart => "P_START",
            EventKind::ProducerWrite => "P_WRITE",
            EventKind::ProducerError => "P_ERROR",
            EventKind::ProducerExit => "P_EXIT",
            EventKind::ConsumerStart => "C_START",
            EventKind::ConsumerRead => "C_READ",
            EventKind::ConsumerError => "C_ERROR",
            EventKind::ConsumerExit => "C_EXIT",
        }
    }
}

/// Who recorded an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The coordinating (main) thread
    Main,
    /// A producer thread, by id
    Producer(usize),
    /// A consumer thread, by id
    Consumer(usize),
}

impl Actor {
    fn type_char(&self) -> char {
        match self {
            Actor::Main => 'M',
            Actor::Producer(_) => 'P',
            Actor::Consumer(_) => 'C',
        }
    }

    fn id(&self) -> usize {
        match self {
            Actor::Main => 0,
            Actor::Producer(id) | Actor::Consumer(id) => *id,
        }
    }
}

/// CSV event logger shared by all threads of a run.
///
/// # Example
///
/// ```rust,no_run
/// use priority_exchange::config::RunConfig;
/// use priority_exchange::report::{Actor, EventKind, EventLog};
///
/// let config = RunConfig {
///     producers: 2, consumers: 1, capacity: 5, timeout_secs: 10, verbose: false,
/// };
/// let log = EventLog::create("run_log.csv", &config)?;
/// log.record(0, EventKind::RunStart, Actor::Main, None, 0, 0);
/// # Ok::<(), priority_exchange::core::ExchangeError>(())
/// ```
#[derive(Debug)]
pub struct EventLog {
    file: Mutex<File>,
}

impl EventLog {
    /// Create the log file, writing the metadata header and CSV header row.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be created or the header written.
    pub fn create(path: impl AsRef<Path>, config: &RunConfig) -> Result<Self> {
        let path = path.as_ref();
        let to_io_err = |e| ExchangeError::io(path.display().to_string(), e);

        let mut file = File::create(path).map_err(to_io_err)?;

        writeln!(
            file,
            "# producers={} consumers={} q={} timeout={} verbose={}",
            config.producers,
            config.consumers,
            config.capacity,
            config.timeout_secs,
            config.verbose as u8,
        )
        .map_err(to_io_err)?;
        writeln!(file, "# crate={} version={}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            .map_err(to_io_err)?;
        writeln!(
            file,
            "# started={}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )
        .map_err(to_io_err)?;
        writeln!(file, "{}", CSV_HEADER).map_err(to_io_err)?;
        file.flush().map_err(to_io_err)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append one event row.
    ///
    /// Message fields are recorded as -1 when no message is involved. Write
    /// failures are reported through the `log` facade rather than returned;
    /// a torn log must not take the run down.
    pub fn record(
        &self,
        time_ms: u64,
        event: EventKind,
        actor: Actor,
        message: Option<&Message>,
        queue_depth: usize,
        blocked_ms: u64,
    ) {
        let (value, priority, producer_id) = match message {
            Some(m) => (m.value() as i64, m.priority() as i64, m.producer_id() as i64),
            None => (-1, -1, -1),
        };

        let mut file = self.file.lock();
        let written = writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            time_ms,
            event.as_str(),
            actor.type_char(),
            actor.id(),
            value,
            priority,
            producer_id,
            queue_depth,
            blocked_ms,
        )
        .and_then(|_| file.flush());

        if let Err(e) = written {
            log::warn!("event log write failed: {}", e);
        }
    }

    /// Append a `#`-prefixed comment line
    pub fn comment(&self, text: &str) {
        let mut file = self.file.lock();
        let written = writeln!(file, "# {}", text).and_then(|_| file.flush());
        if let Err(e) = written {
            log::warn!("event log comment failed: {}", e);
        }
    }
}
