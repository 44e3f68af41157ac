//! Error types for the message exchange

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Errors that can occur in the message exchange
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExchangeError {
    /// Requested buffer capacity is not usable
    #[error("buffer capacity must be positive (got {requested})")]
    InvalidCapacity {
        /// The capacity that was requested
        requested: usize,
    },

    /// Backing storage for the store could not be reserved
    #[error("failed to reserve storage for {capacity} messages")]
    AllocationFailure {
        /// Capacity the allocation was attempted for
        capacity: usize,
    },

    /// Store is at capacity
    #[error("store is full ({capacity}/{capacity} messages held)")]
    Full {
        /// Fixed capacity of the store
        capacity: usize,
    },

    /// Store holds no messages
    #[error("store is empty")]
    Empty,

    /// Caller passed an unusable argument
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// Semaphore accounting and store state disagree
    ///
    /// This indicates a logic defect, not a recoverable condition. Callers
    /// should treat it as fatal and terminate their loop.
    #[error("internal inconsistency during {operation}: {message}")]
    InternalInconsistency {
        /// Operation that detected the divergence
        operation: &'static str,
        /// Description of the divergence
        message: String,
    },

    /// Invalid run configuration with parameter
    #[error("invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker thread
    #[error("failed to spawn thread '{thread_name}': {message}")]
    SpawnError {
        /// Name of the thread that failed to spawn
        thread_name: String,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("failed to join thread '{thread_name}': the thread panicked")]
    JoinError {
        /// Name of the thread that failed to join
        thread_name: String,
    },

    /// I/O failure in the event log
    #[error("event log I/O failed for '{path}'")]
    Io {
        /// Path the operation was performed on
        path: String,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },
}

impl ExchangeError {
    /// Create an invalid capacity error
    pub fn invalid_capacity(requested: usize) -> Self {
        ExchangeError::InvalidCapacity { requested }
    }

    /// Create an allocation failure error
    pub fn allocation_failure(capacity: usize) -> Self {
        ExchangeError::AllocationFailure { capacity }
    }

    /// Create a full error
    pub fn full(capacity: usize) -> Self {
        ExchangeError::Full { capacity }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ExchangeError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal inconsistency error
    pub fn inconsistency(operation: &'static str, message: impl Into<String>) -> Self {
        ExchangeError::InternalInconsistency {
            operation,
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ExchangeError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn(thread_name: impl Into<String>, source: std::io::Error) -> Self {
        let message = source.to_string();
        ExchangeError::SpawnError {
            thread_name: thread_name.into(),
            message,
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(thread_name: impl Into<String>) -> Self {
        ExchangeError::JoinError {
            thread_name: thread_name.into(),
        }
    }

    /// Create an event log I/O error
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ExchangeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is fatal to the whole run rather than to one call
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExchangeError::InternalInconsistency { .. }
                | ExchangeError::SpawnError { .. }
                | ExchangeError::AllocationFailure { .. }
        )
    }
}
