//! # tablesort
//!
//! Generates `ALTER TABLE ... MODIFY COLUMN` statements that put every table
//! of a MySQL schema into alphabetical column order, with `id` pinned first.
//! Nothing is executed: the statements are returned as text.
//!
//! ```no_run
//! use tablesort::{connect, reorder_schema, ConfigOverrides, ReorderConfig};
//!
//! # fn main() -> tablesort::Result<()> {
//! let config = ReorderConfig::load(ConfigOverrides {
//!     db: Some("shop".to_string()),
//!     ..ConfigOverrides::default()
//! })?;
//! let mut catalog = connect(&config.connection_options()?)?;
//! let sql = reorder_schema(&mut catalog, &config.db, config.custom)?;
//! catalog.close()?;
//! print!("{}", sql);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod ordering;

pub use catalog::{fetch_schema, CatalogSource, MemoryCatalog};
pub use crate::config::{ConfigOverrides, ReorderConfig};
pub use connection::{connect, ConnectionOptions, MySqlCatalog};
pub use descriptor::{CatalogRow, ColumnDescriptor, TableColumnSet};
pub use error::{ConnectionError, FetchError, ReorderError, Result, UsageError};
pub use generator::AlterTableWriter;
pub use ordering::{compare_column_names, target_order};

/// Fetch `schema` from `source` and render the reorder statements for it
///
/// Nothing is rendered unless the whole fetch succeeds.
///
/// # Errors
///
/// Returns `FetchError` if the catalog cannot be read.
pub fn reorder_schema(
    source: &mut dyn CatalogSource,
    schema: &str,
    house_style: bool,
) -> std::result::Result<String, FetchError> {
    let tables = fetch_schema(source, schema)?;
    Ok(AlterTableWriter::new(house_style).render_schema(&tables))
}
