//! Observability collaborators: CSV event logging and run reporting.
//!
//! Nothing in here touches the buffer's synchronization; these modules only
//! consume counts, timings, and outcomes that workers and the coordinator
//! hand them.

mod csv;
mod summary;

pub use csv::{Actor, EventKind, EventLog};
pub use summary::{print_run_summary, RunReport};
