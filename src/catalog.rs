//! Catalog access
//!
//! Reads every column of every table in a schema from `information_schema`
//! and groups the rows by table.
//!
//! Check constraints are joined to columns by name: MySQL names a column-level
//! `CHECK` after its column only by convention, so a constraint that happens to
//! share a column's name will be attached to that column.

use crate::descriptor::{group_by_table, CatalogRow, ColumnDescriptor, TableColumnSet};
use crate::error::FetchError;
use std::collections::BTreeMap;

/// Columns of every table in one schema, in table then physical order
///
/// The only parameter is the schema name.
pub const COLUMNS_QUERY: &str = "
SELECT
    c.TABLE_NAME,
    c.COLUMN_NAME,
    c.COLUMN_TYPE,
    c.IS_NULLABLE,
    c.COLUMN_DEFAULT,
    c.COLUMN_COMMENT,
    c.EXTRA,
    cc.CHECK_CLAUSE
FROM
    information_schema.COLUMNS c
LEFT JOIN
    information_schema.CHECK_CONSTRAINTS cc
    ON c.TABLE_SCHEMA = cc.CONSTRAINT_SCHEMA
    AND cc.CONSTRAINT_NAME = c.COLUMN_NAME
WHERE
    c.TABLE_SCHEMA = ?
ORDER BY
    c.TABLE_NAME, c.ORDINAL_POSITION";

/// Source of raw catalog rows
///
/// Implemented by [`crate::MySqlCatalog`] for a live server and by
/// [`MemoryCatalog`] for fixed data.
pub trait CatalogSource {
    /// Fetch the rows of [`COLUMNS_QUERY`] for `schema`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the query cannot be executed or a row cannot
    /// be read. No rows are returned in that case.
    fn fetch_columns(&mut self, schema: &str) -> Result<Vec<CatalogRow>, FetchError>;
}

/// In-memory catalog keyed by schema name
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    schemas: BTreeMap<String, Vec<CatalogRow>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to `schema`; rows are returned in insertion order
    pub fn push(&mut self, schema: impl Into<String>, row: CatalogRow) {
        self.schemas.entry(schema.into()).or_default().push(row);
    }

    #[must_use]
    pub fn with_row(mut self, schema: impl Into<String>, row: CatalogRow) -> Self {
        self.push(schema, row);
        self
    }
}

impl CatalogSource for MemoryCatalog {
    fn fetch_columns(&mut self, schema: &str) -> Result<Vec<CatalogRow>, FetchError> {
        Ok(self.schemas.get(schema).cloned().unwrap_or_default())
    }
}

/// Read and group the columns of every table in `schema`
///
/// # Errors
///
/// Returns `FetchError` from the source; nothing is produced for any table.
pub fn fetch_schema(
    source: &mut dyn CatalogSource,
    schema: &str,
) -> Result<Vec<TableColumnSet>, FetchError> {
    let rows = source.fetch_columns(schema)?;
    log::debug!("Fetched {} column row(s) from schema `{}`", rows.len(), schema);

    let tables = group_by_table(rows.into_iter().map(ColumnDescriptor::from_catalog_row));
    log::info!("Found {} table(s) in schema `{}`", tables.len(), schema);

    Ok(tables)
}
