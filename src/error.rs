//! Error types for the discovery library.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller asked about a port outside 0-65535.
    #[error("invalid port {0}: must be between 0 and 65535")]
    InvalidPort(i64),

    /// The external tool is not installed or not on PATH.
    #[error("{program} is not installed")]
    ToolMissing { program: String },

    /// The external tool ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
