//! Column metadata as read from `information_schema`
//!
//! [`CatalogRow`] is one row of the catalog query, text exactly as the server
//! returned it. [`ColumnDescriptor`] is the normalised form the generator
//! works with: nullability is a bool and empty strings become `None`.

use std::collections::HashMap;

/// One raw row of the catalog query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    pub table_name: String,
    pub column_name: String,
    pub column_type: String,
    /// `YES` or `NO`
    pub is_nullable: String,
    pub column_default: Option<String>,
    pub column_comment: Option<String>,
    pub extra: Option<String>,
    pub check_clause: Option<String>,
}

/// Metadata for a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub table_name: String,
    pub column_name: String,
    /// Full type expression, e.g. `varchar(255)`, passed through verbatim
    pub column_type: String,
    pub is_nullable: bool,
    /// Stored default expression, never quoted or escaped on output
    pub default_value: Option<String>,
    /// Trimmed comment
    pub comment: Option<String>,
    /// e.g. `auto_increment`, `on update current_timestamp()`
    pub extra: Option<String>,
    pub check_clause: Option<String>,
}

/// Marker MySQL 8 puts in `EXTRA` for expression defaults; not valid DDL
const DEFAULT_GENERATED: &str = "DEFAULT_GENERATED";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn strip_default_generated(extra: Option<String>) -> Option<String> {
    let extra = extra?;
    if !extra.contains(DEFAULT_GENERATED) {
        return Some(extra);
    }
    let kept: Vec<&str> = extra
        .split_whitespace()
        .filter(|word| *word != DEFAULT_GENERATED)
        .collect();
    non_empty(Some(kept.join(" ")))
}

impl ColumnDescriptor {
    /// Create a descriptor with only the required parts set
    #[must_use]
    pub fn new(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        column_type: impl Into<String>,
        is_nullable: bool,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            column_type: column_type.into(),
            is_nullable,
            default_value: None,
            comment: None,
            extra: None,
            check_clause: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = Some(comment.trim().to_string()).filter(|c| !c.is_empty());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = non_empty(Some(extra.into()));
        self
    }

    #[must_use]
    pub fn with_check(mut self, check_clause: impl Into<String>) -> Self {
        self.check_clause = non_empty(Some(check_clause.into()));
        self
    }

    /// Normalise a raw catalog row
    ///
    /// Anything other than `YES` in `IS_NULLABLE` counts as `NOT NULL`.
    /// `COLUMN_DEFAULT` is kept as-is, even when empty; only SQL `NULL`
    /// means "no default". `DEFAULT_GENERATED` is removed from `EXTRA`.
    #[must_use]
    pub fn from_catalog_row(row: CatalogRow) -> Self {
        let comment = row
            .column_comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Self {
            table_name: row.table_name,
            column_name: row.column_name,
            column_type: row.column_type,
            is_nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            default_value: row.column_default,
            comment,
            extra: strip_default_generated(non_empty(row.extra)),
            check_clause: non_empty(row.check_clause),
        }
    }
}

/// A table and its columns in physical order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumnSet {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableColumnSet {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Group descriptors by table
///
/// Tables come out in the order they first appear and columns keep their
/// delivery order. The check-constraint join matches on name only, so a
/// column can be delivered twice; the first copy wins.
pub fn group_by_table(
    descriptors: impl IntoIterator<Item = ColumnDescriptor>,
) -> Vec<TableColumnSet> {
    let mut tables: Vec<TableColumnSet> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for descriptor in descriptors {
        let slot = match index.get(&descriptor.table_name) {
            Some(&slot) => slot,
            None => {
                tables.push(TableColumnSet::new(descriptor.table_name.clone(), Vec::new()));
                index.insert(descriptor.table_name.clone(), tables.len() - 1);
                tables.len() - 1
            }
        };

        let table = &mut tables[slot];
        if table
            .columns
            .iter()
            .any(|c| c.column_name == descriptor.column_name)
        {
            log::warn!(
                "Column `{}`.`{}` delivered more than once \
                 (check constraints sharing its name?), keeping the first",
                descriptor.table_name,
                descriptor.column_name
            );
            continue;
        }
        table.columns.push(descriptor);
    }

    tables
}
