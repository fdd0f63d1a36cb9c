//! Error types for the order analytics runner.
//!
//! Defines the main error enum used throughout the application. Every variant
//! propagates out of the run immediately; retries are the scheduler's job.

use thiserror::Error;

/// Main error type for ETL operations.
#[derive(Error, Debug)]
pub enum EtlError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// DDL errors while ensuring the destination schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Query errors during the aggregation reads.
    #[error("Query error: {0}")]
    Query(String),

    /// Write or constraint errors during an upsert.
    #[error("Write error: {0}")]
    Write(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a schema error with the given message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a write error with the given message.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Schema(_) => "Schema Error",
            Self::Query(_) => "Query Error",
            Self::Write(_) => "Write Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using EtlError.
pub type Result<T> = std::result::Result<T, EtlError>;
