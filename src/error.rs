//! Error types for yap
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad id, bad argument, unknown task)
//! - 3: Blocked (another instance holds the lock, link slot taken)
//! - 4: Operation failed (filesystem error, corrupt task file)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the yap CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for yap operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid task id: {0}")]
    InvalidId(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Blocked (exit code 3)
    #[error("Another yap instance is already running (lock held on {0})")]
    LockHeld(PathBuf),

    #[error("Link already exists: {0}")]
    AlreadyLinked(PathBuf),

    // Operation failures (exit code 4)
    #[error("Invalid record format: {0}")]
    InvalidRecordFormat(String),

    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidId(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDate(_)
            | Error::InvalidConfig(_)
            | Error::NotFound(_) => exit_codes::USER_ERROR,

            Error::LockHeld(_) | Error::AlreadyLinked(_) => exit_codes::BLOCKED,

            Error::InvalidRecordFormat(_)
            | Error::Io { .. }
            | Error::Json(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Wrap an IO error with a description of what was being done
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach context to raw IO results
pub trait IoContext<T> {
    fn with_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::io(context(), source))
    }
}

/// Result type alias for yap operations
pub type Result<T> = std::result::Result<T, Error>;
