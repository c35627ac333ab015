use std::time::Duration;
use thiserror::Error;


/// A specialized result type for eye-tracking operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error associated with eye-tracking operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no connection to the eye tracker is open")]
    NotConnected,
    #[error("eye tracking has already been started")]
    AlreadyStarted,
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("could not resolve any address for {0}")]
    Unresolved(String),
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("record of {length} bytes exceeds the maximum of {max} bytes")]
    RecordTooLong { length: usize, max: usize },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
