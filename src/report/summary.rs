//! Run summary banner and end-of-run report

use crate::config::{
    RunConfig, CONSUMER_WAIT_MAX, MAX_CAPACITY, MAX_CONSUMERS, MAX_PRODUCERS, PRODUCER_WAIT_MAX,
    VALUE_MAX, VALUE_MIN,
};
use crate::worker::StatsSnapshot;
use std::time::Duration;

/// Print the start-of-run banner to stdout.
///
/// Environment details are best-effort; a missing variable never fails the
/// run.
pub fn print_run_summary(config: &RunConfig) {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());

    println!("=== RUN SUMMARY ===");
    println!("Started      : {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("User@host    : {}@{}", user, host);
    println!(
        "Producers    : {} (max {})",
        config.producers, MAX_PRODUCERS
    );
    println!(
        "Consumers    : {} (max {})",
        config.consumers, MAX_CONSUMERS
    );
    println!(
        "Capacity     : {} (max {})",
        config.capacity, MAX_CAPACITY
    );
    println!("Timeout      : {} s", config.timeout_secs);
    println!("Verbose      : {}", if config.verbose { "on" } else { "off" });
    println!(
        "Defaults     : producer_wait<={}s consumer_wait<={}s values={}..={}",
        PRODUCER_WAIT_MAX.as_secs(),
        CONSUMER_WAIT_MAX.as_secs(),
        VALUE_MIN,
        VALUE_MAX,
    );
    println!("===================\n");
}

/// Aggregated end-of-run statistics.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Total successful producer operations
    pub produced_ops: u64,
    /// Total successful consumer operations
    pub consumed_ops: u64,
    /// Producer-side blocking, total milliseconds
    pub producer_blocked_ms: u64,
    /// Producer operations that observed blocking
    pub producer_blocked_events: u64,
    /// Consumer-side blocking, total milliseconds
    pub consumer_blocked_ms: u64,
    /// Consumer operations that observed blocking
    pub consumer_blocked_events: u64,
    /// Maximum queue depth any worker observed
    pub max_depth: usize,
    /// Wall-clock duration of the run
    pub runtime: Duration,
}

impl RunReport {
    /// Aggregate per-worker snapshots into run totals
    pub fn aggregate(
        producers: impl IntoIterator<Item = StatsSnapshot>,
        consumers: impl IntoIterator<Item = StatsSnapshot>,
        runtime: Duration,
    ) -> Self {
        let mut report = Self {
            runtime,
            ..Self::default()
        };

        for snap in producers {
            report.produced_ops += snap.ops;
            report.producer_blocked_ms += snap.blocked_ms;
            report.producer_blocked_events += snap.blocked_events;
            report.max_depth = report.max_depth.max(snap.max_depth);
        }
        for snap in consumers {
            report.consumed_ops += snap.ops;
            report.consumer_blocked_ms += snap.blocked_ms;
            report.consumer_blocked_events += snap.blocked_events;
            report.max_depth = report.max_depth.max(snap.max_depth);
        }

        report
    }

    /// Consumed operations per second over the run
    pub fn throughput(&self) -> f64 {
        let secs = self.runtime.as_secs_f64();
        if secs > 0.0 {
            self.consumed_ops as f64 / secs
        } else {
            0.0
        }
    }

    /// Print the report to stdout
    pub fn print(&self) {
        println!("\n=== RUN STATS ===");
        println!("Produced ops : {}", self.produced_ops);
        println!("Consumed ops : {}", self.consumed_ops);
        println!("Runtime      : {:.3} s", self.runtime.as_secs_f64());
        println!("Throughput   : {:.3} items/sec", self.throughput());
        println!(
            "Prod blocked : {} ms across {} events",
            self.producer_blocked_ms, self.producer_blocked_events
        );
        println!(
            "Cons blocked : {} ms across {} events",
            self.consumer_blocked_ms, self.consumer_blocked_events
        );
        println!("Max queue q  : {}", self.max_depth);
        println!("=============\n");
    }

    /// Single-line rendering for the event log's summary comment
    pub fn summary_line(&self) -> String {
        format!(
            "summary prod_ops={} cons_ops={} runtime_s={:.3} throughput={:.3} \
             prod_block_ms={} prod_block_ev={} cons_block_ms={} cons_block_ev={} max_q={}",
            self.produced_ops,
            self.consumed_ops,
            self.runtime.as_secs_f64(),
            self.throughput(),
            self.producer_blocked_ms,
            self.producer_blocked_events,
            self.consumer_blocked_ms,
            self.consumer_blocked_events,
            self.max_depth,
        )
    }
}
