//! Binary driver: wires configuration, buffer, event log, workers, and the
//! timeout-driven shutdown together for one run.

use priority_exchange::config::{POLL_INTERVAL, PRODUCER_WAIT_MAX, CONSUMER_WAIT_MAX, VALUE_MAX, VALUE_MIN};
use priority_exchange::core::MAX_PRIORITY;
use priority_exchange::prelude::*;
use priority_exchange::report::print_run_summary;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

const LOG_PATH: &str = "run_log.csv";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match RunConfig::parse_args(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}\n", RunConfig::usage("priority-exchange"));
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.verbose);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("run failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .init();
}

fn run(config: RunConfig) -> Result<()> {
    print_run_summary(&config);

    let buffer = Arc::new(BoundedBuffer::new(config.capacity)?);
    let event_log = Arc::new(EventLog::create(LOG_PATH, &config)?);
    let shutdown = ShutdownSignal::new();
    let started = Instant::now();

    let ctx = WorkerContext {
        buffer: Arc::clone(&buffer),
        shutdown: shutdown.clone(),
        log: Arc::clone(&event_log),
        started,
        poll: POLL_INTERVAL,
    };

    event_log.record(0, EventKind::RunStart, Actor::Main, None, 0, 0);
    event_log.comment(&format!(
        "defaults producer_wait_max_s={} consumer_wait_max_s={} value_range={}..={}",
        PRODUCER_WAIT_MAX.as_secs(),
        CONSUMER_WAIT_MAX.as_secs(),
        VALUE_MIN,
        VALUE_MAX,
    ));

    let mut producers = Vec::with_capacity(config.producers);
    let mut consumers = Vec::with_capacity(config.consumers);
    let mut startup_error: Option<ExchangeError> = None;

    for id in 0..config.producers {
        // Deterministic priority assignment, one rank per producer.
        let priority = (id % (MAX_PRIORITY as usize + 1)) as u8;
        match Producer::spawn(id, priority, ctx.clone()) {
            Ok(producer) => producers.push(producer),
            Err(err) => {
                log::error!("failed to start producer {}: {}", id, err);
                startup_error = Some(err);
                break;
            }
        }
    }

    if startup_error.is_none() {
        for id in 0..config.consumers {
            match Consumer::spawn(id, ctx.clone()) {
                Ok(consumer) => consumers.push(consumer),
                Err(err) => {
                    log::error!("failed to start consumer {}: {}", id, err);
                    startup_error = Some(err);
                    break;
                }
            }
        }
    }

    // The coordinator is the only writer of the shutdown signal: it sets it
    // once, either after the configured run time or right away when startup
    // failed partway.
    if startup_error.is_none() {
        log::info!(
            "running {} producers / {} consumers for {} s",
            producers.len(),
            consumers.len(),
            config.timeout_secs
        );
        std::thread::sleep(config.timeout());
        shutdown.request();
        event_log.record(
            ctx.elapsed_ms(),
            EventKind::StopTimeout,
            Actor::Main,
            None,
            buffer.len(),
            0,
        );
    } else {
        shutdown.request();
        event_log.record(
            ctx.elapsed_ms(),
            EventKind::StopInitFail,
            Actor::Main,
            None,
            buffer.len(),
            0,
        );
    }

    let mut producer_stats = Vec::with_capacity(producers.len());
    for producer in producers {
        match producer.join() {
            Ok(snapshot) => producer_stats.push(snapshot),
            Err(err) => log::error!("{}", err),
        }
    }

    let mut consumer_stats = Vec::with_capacity(consumers.len());
    for consumer in consumers {
        match consumer.join() {
            Ok(snapshot) => consumer_stats.push(snapshot),
            Err(err) => log::error!("{}", err),
        }
    }

    let runtime = started.elapsed();
    let report = RunReport::aggregate(producer_stats, consumer_stats, runtime);
    report.print();

    event_log.comment(&report.summary_line());
    event_log.record(
        runtime.as_millis() as u64,
        EventKind::RunEnd,
        Actor::Main,
        None,
        buffer.len(),
        0,
    );
    log::info!("event log written to {}", LOG_PATH);

    match startup_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
