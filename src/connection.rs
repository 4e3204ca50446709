//! MySQL connection
//!
//! Wraps a single `sqlx::MySqlConnection` and the current-thread runtime that
//! drives it, so callers see a plain blocking API:
//! - host/port parsing and validation
//! - connection establishment
//! - the catalog query ([`CatalogSource`] implementation)
//! - release on `close()` or drop, whichever comes first

use crate::catalog::{CatalogSource, COLUMNS_QUERY};
use crate::descriptor::CatalogRow;
use crate::error::{ConnectionError, FetchError};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};
use std::fmt;
use std::time::Instant;
use tokio::runtime::{Builder, Runtime};

pub const DEFAULT_PORT: u16 = 3306;

/// Everything needed to open a connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Split a host setting into host and port
///
/// Accepts `host`, `host:port`, `[v6addr]` and `[v6addr]:port`. A bare IPv6
/// address (more than one `:`) is taken as a host without a port.
///
/// # Errors
///
/// Returns `ConnectionError::InvalidHost` for an empty host or a port that is
/// not a number in `1..=65535`.
pub fn parse_host(value: &str) -> Result<(String, u16), ConnectionError> {
    let invalid = || ConnectionError::InvalidHost(value.to_string());
    let value_trimmed = value.trim();

    let (host, port) = if let Some(rest) = value_trimmed.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        match tail {
            "" => (host, None),
            _ => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
        }
    } else if value_trimmed.matches(':').count() == 1 {
        let (host, port) = value_trimmed.split_once(':').ok_or_else(invalid)?;
        (host, Some(port))
    } else {
        (value_trimmed, None)
    };

    if host.is_empty() {
        return Err(invalid());
    }

    let port = match port {
        Some(port) => port.parse::<u16>().ok().filter(|p| *p != 0).ok_or_else(invalid)?,
        None => DEFAULT_PORT,
    };

    Ok((host.to_string(), port))
}

/// Open a connection to the server described by `options`
///
/// This blocks until the server has accepted or rejected the handshake.
///
/// # Errors
///
/// Returns `ConnectionError` if the runtime cannot start or the driver fails
/// to connect (unreachable host, bad credentials, unknown database).
pub fn connect(options: &ConnectionOptions) -> Result<MySqlCatalog, ConnectionError> {
    let start = Instant::now();

    let runtime = Builder::new_current_thread().enable_all().build()?;

    let connect_options = MySqlConnectOptions::new()
        .host(&options.host)
        .port(options.port)
        .username(&options.user)
        .password(&options.password)
        .database(&options.database);

    let connection = runtime
        .block_on(MySqlConnection::connect_with(&connect_options))
        .map_err(ConnectionError::Driver)?;

    log::debug!(
        "Connected to {}:{} as {} in {:?}",
        options.host,
        options.port,
        options.user,
        start.elapsed()
    );

    Ok(MySqlCatalog {
        runtime,
        connection: Some(connection),
    })
}

/// Catalog reader backed by a live MySQL connection
pub struct MySqlCatalog {
    runtime: Runtime,
    connection: Option<MySqlConnection>,
}

impl MySqlCatalog {
    /// Close the connection
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` if the server did not acknowledge the close.
    /// The socket is released either way.
    pub fn close(mut self) -> Result<(), ConnectionError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), ConnectionError> {
        if let Some(connection) = self.connection.take() {
            self.runtime
                .block_on(connection.close())
                .map_err(ConnectionError::Driver)?;
            log::debug!("Connection closed");
        }
        Ok(())
    }
}

impl Drop for MySqlCatalog {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Failed to close connection cleanly: {}", e);
        }
    }
}

impl CatalogSource for MySqlCatalog {
    fn fetch_columns(&mut self, schema: &str) -> Result<Vec<CatalogRow>, FetchError> {
        let connection = self.connection.as_mut().ok_or(FetchError::Closed)?;
        let start = Instant::now();

        let rows = self
            .runtime
            .block_on(sqlx::query(COLUMNS_QUERY).bind(schema).fetch_all(connection))
            .map_err(FetchError::Query)?;

        log::debug!("Catalog query returned {} row(s) in {:?}", rows.len(), start.elapsed());

        rows.iter()
            .enumerate()
            .map(|(index, row)| catalog_row(index, row))
            .collect()
    }
}

/// Read a text column
///
/// `information_schema` columns can be reported with a binary collation,
/// in which case the driver refuses to decode them as `String`; those bytes
/// are decoded as UTF-8 instead.
fn text(row: &MySqlRow, index: usize) -> Result<Option<String>, sqlx::Error> {
    match row.try_get::<Option<String>, _>(index) {
        Ok(value) => Ok(value),
        Err(_) => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|bytes| bytes.map(|b| String::from_utf8_lossy(&b).into_owned())),
    }
}

fn required(
    row: &MySqlRow,
    row_index: usize,
    index: usize,
    column: &'static str,
) -> Result<String, FetchError> {
    text(row, index)
        .map_err(FetchError::Query)?
        .ok_or(FetchError::Row {
            row: row_index,
            column,
            problem: "NULL",
        })
}

fn optional(row: &MySqlRow, index: usize) -> Result<Option<String>, FetchError> {
    text(row, index).map_err(FetchError::Query)
}

fn catalog_row(row_index: usize, row: &MySqlRow) -> Result<CatalogRow, FetchError> {
    Ok(CatalogRow {
        table_name: required(row, row_index, 0, "TABLE_NAME")?,
        column_name: required(row, row_index, 1, "COLUMN_NAME")?,
        column_type: required(row, row_index, 2, "COLUMN_TYPE")?,
        is_nullable: required(row, row_index, 3, "IS_NULLABLE")?,
        column_default: optional(row, 4)?,
        column_comment: optional(row, 5)?,
        extra: optional(row, 6)?,
        check_clause: optional(row, 7)?,
    })
}
