//! Shared error type
//!
//! `NotFound` and `InvalidInput` become 4xx responses; every other variant
//! is a server fault.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad or missing bootstrap configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected upload, query parameter or state change
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
