//! Core types shared across the exchange

pub mod error;
pub mod message;
pub mod shutdown;

pub use error::{ExchangeError, Result};
pub use message::{Message, MAX_PRIORITY};
pub use shutdown::ShutdownSignal;
