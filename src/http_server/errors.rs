//! Startup errors
//!
//! All of these are fatal: the process exits with a non-zero status.

use std::io;

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while bringing the service up
#[derive(Debug, Error)]
pub enum BootError {
    /// Socket address could not be parsed
    #[error("invalid socket address {0}")]
    InvalidAddress(String),

    /// Gear database unreachable at startup
    #[error("could not connect to gear database: {0}")]
    Store(#[from] StoreError),

    /// Listener could not bind or serve
    #[error("server I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Boot result type
pub type BootResult<T> = Result<T, BootError>;
