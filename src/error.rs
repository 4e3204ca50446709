//! Error types for tablesort
//!
//! Every error is fatal: the caller reports it and exits. Nothing here is
//! retried, and no SQL is written once one of these has been produced.

use thiserror::Error;

/// A required parameter was not supplied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `--db` was missing or empty
    #[error("missing required parameter --db=<database>")]
    MissingDatabase,
}

/// The database connection could not be established
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The host setting could not be turned into host and port
    #[error("Invalid host '{0}': expected <host> or <host>:<port>")]
    InvalidHost(String),
    /// The runtime driving the connection could not be started
    #[error("Failed to start database runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// Network/authentication error reported by the driver
    #[error("Connection failed: {0}")]
    Driver(#[source] sqlx::Error),
}

/// The catalog query could not be executed or its rows could not be read
#[derive(Debug, Error)]
pub enum FetchError {
    /// The driver rejected or failed the query
    #[error("Error retrieving columns: {0}")]
    Query(#[source] sqlx::Error),
    /// A row came back without a value the descriptor needs
    #[error("Error retrieving columns: column {column} of catalog row {row} is {problem}")]
    Row {
        row: usize,
        column: &'static str,
        problem: &'static str,
    },
    /// The connection was already closed when the query was issued
    #[error("Error retrieving columns: connection is closed")]
    Closed,
}

/// Any error that ends a run
#[derive(Debug, Error)]
pub enum ReorderError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, ReorderError>;
