use thiserror::Error;

/// Errors returned by the clustering engine and the instance loader.
#[derive(Debug, Error)]
pub enum Error {
    /// An instance line could not be parsed (distance or coordinates).
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number in the instance text.
        line: usize,
        /// Human-readable explanation.
        message: String,
    },

    /// Reading an instance failed.
    #[error("reading instance: {0}")]
    Io(#[from] std::io::Error),

    /// A point handed to the engine has a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the point in the caller's input.
        index: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// An explicit partition plan does not satisfy the width/order rules.
    #[error("invalid partition plan: {0}")]
    InvalidPartition(String),

    /// A partition worker panicked; no partial result is produced.
    #[error("partition worker {partition} panicked")]
    WorkerPanicked {
        /// Index of the failed partition (bottom-up).
        partition: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
