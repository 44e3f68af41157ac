//! Run configuration and command-line parsing
//!
//! Bounds and timing defaults are compile-time constants; the command line
//! only selects values inside those bounds so runs stay reproducible.

use crate::core::{ExchangeError, Result};
use std::time::Duration;

/// Maximum number of producer threads
pub const MAX_PRODUCERS: usize = 10;
/// Maximum number of consumer threads
pub const MAX_CONSUMERS: usize = 3;
/// Maximum buffer capacity
pub const MAX_CAPACITY: usize = 20;

/// Inclusive range of produced payload values
pub const VALUE_MIN: i32 = 0;
/// Inclusive range of produced payload values
pub const VALUE_MAX: i32 = 9;

/// Upper bound of the random pause between producer writes
pub const PRODUCER_WAIT_MAX: Duration = Duration::from_secs(2);
/// Upper bound of the random pause between consumer reads
pub const CONSUMER_WAIT_MAX: Duration = Duration::from_secs(4);

/// Poll interval used by interruptible waits so threads observe shutdown
/// within bounded latency
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Validated run parameters.
///
/// # Example
///
/// ```rust
/// use priority_exchange::config::RunConfig;
///
/// let args = ["-p", "5", "-c", "3", "-q", "10", "-t", "20", "-v"];
/// let config = RunConfig::parse_args(args.iter().map(|s| s.to_string()))?;
/// assert_eq!(config.producers, 5);
/// assert_eq!(config.capacity, 10);
/// assert!(config.verbose);
/// # Ok::<(), priority_exchange::core::ExchangeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of producer threads (1..=[`MAX_PRODUCERS`])
    pub producers: usize,
    /// Number of consumer threads (1..=[`MAX_CONSUMERS`])
    pub consumers: usize,
    /// Buffer capacity (1..=[`MAX_CAPACITY`])
    pub capacity: usize,
    /// Run duration before the coordinator requests shutdown
    pub timeout_secs: u64,
    /// Echo per-event diagnostics (default off)
    pub verbose: bool,
}

impl RunConfig {
    /// Parse `-p N -c N -q N -t N [-v]` style arguments.
    ///
    /// All four numeric options are required. Integer values are parsed
    /// strictly; partial parses and out-of-range values are rejected with
    /// the offending parameter named in the error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first rejected parameter.
    pub fn parse_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut producers: Option<usize> = None;
        let mut consumers: Option<usize> = None;
        let mut capacity: Option<usize> = None;
        let mut timeout_secs: Option<u64> = None;
        let mut verbose = false;

        let mut iter = args.into_iter();
        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "-p" => producers = Some(parse_int(&mut iter, "producers")?),
                "-c" => consumers = Some(parse_int(&mut iter, "consumers")?),
                "-q" => capacity = Some(parse_int(&mut iter, "capacity")?),
                "-t" => timeout_secs = Some(parse_int(&mut iter, "timeout")?),
                "-v" => verbose = true,
                other => {
                    return Err(ExchangeError::invalid_config(
                        other,
                        "unrecognized option",
                    ))
                }
            }
        }

        let config = Self {
            producers: required(producers, "producers")?,
            consumers: required(consumers, "consumers")?,
            capacity: required(capacity, "capacity")?,
            timeout_secs: required(timeout_secs, "timeout")?,
            verbose,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check all parameters against the compile-time bounds
    pub fn validate(&self) -> Result<()> {
        check_range(self.producers, 1, MAX_PRODUCERS, "producers")?;
        check_range(self.consumers, 1, MAX_CONSUMERS, "consumers")?;
        check_range(self.capacity, 1, MAX_CAPACITY, "capacity")?;
        if self.timeout_secs < 1 {
            return Err(ExchangeError::invalid_config(
                "timeout",
                "must be at least 1 second",
            ));
        }
        Ok(())
    }

    /// The run duration as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Usage string for the given program name
    pub fn usage(prog: &str) -> String {
        format!(
            "Usage:\n  {prog} -p <producers 1..{MAX_PRODUCERS}> -c <consumers 1..{MAX_CONSUMERS}> \
             -q <capacity 1..{MAX_CAPACITY}> -t <timeout_sec> [-v]\n\n\
             Example:\n  {prog} -p 5 -c 3 -q 10 -t 20 -v"
        )
    }
}

fn required<T>(value: Option<T>, parameter: &str) -> Result<T> {
    value.ok_or_else(|| ExchangeError::invalid_config(parameter, "required option is missing"))
}

fn check_range(value: usize, min: usize, max: usize, parameter: &str) -> Result<()> {
    if value < min || value > max {
        return Err(ExchangeError::invalid_config(
            parameter,
            format!("must be in {min}..={max} (got {value})"),
        ));
    }
    Ok(())
}

fn parse_int<T, I>(iter: &mut I, parameter: &str) -> Result<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = String>,
{
    let raw = iter
        .next()
        .ok_or_else(|| ExchangeError::invalid_config(parameter, "missing value"))?;
    // str::parse rejects empty strings, signs without digits, and trailing
    // junk; no partial parses get through.
    raw.parse()
        .map_err(|_| ExchangeError::invalid_config(parameter, format!("not a valid integer: '{raw}'")))
}
