//! `ALTER TABLE ... MODIFY COLUMN` statement generation
//!
//! One statement per table. Each column is redefined with its current type,
//! nullability, default, comment, extra attributes and check clause, then
//! positioned `FIRST` or `AFTER` the column that precedes it in target order.
//!
//! House style (`--custom`) replaces the definition of three conventional
//! columns and drops check clauses:
//!
//! - `created`: `timestamp NOT NULL DEFAULT current_timestamp()`
//! - `updated`: the same plus `on update current_timestamp()`
//! - any name starting with `json`: `JSON NULL`

use crate::descriptor::{ColumnDescriptor, TableColumnSet};
use crate::ordering::target_order;

const CREATED_DEFINITION: &str = "timestamp NOT NULL DEFAULT current_timestamp()";
const UPDATED_DEFINITION: &str =
    "timestamp NOT NULL DEFAULT current_timestamp() on update current_timestamp()";
const JSON_DEFINITION: &str = "JSON NULL";
const JSON_PREFIX: &str = "json";

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal with single quotes
///
/// `'` is doubled and `\` is escaped so the literal survives the default
/// MySQL `sql_mode`. Text without either character is emitted unchanged.
pub fn quote_literal(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        match ch {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

/// Renders reorder statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlterTableWriter {
    house_style: bool,
}

impl AlterTableWriter {
    pub fn new(house_style: bool) -> Self {
        Self { house_style }
    }

    /// Definition of one column, without name or position
    pub fn column_definition(&self, column: &ColumnDescriptor) -> String {
        if let Some(fixed) = self.house_style_definition(&column.column_name) {
            return fixed.to_string();
        }

        let mut definition = column.column_type.clone();

        definition.push_str(if column.is_nullable { " NULL" } else { " NOT NULL" });

        match &column.default_value {
            Some(default) => {
                definition.push_str(" DEFAULT ");
                definition.push_str(default);
            }
            None if column.is_nullable => definition.push_str(" DEFAULT NULL"),
            None => {}
        }

        if let Some(comment) = &column.comment {
            definition.push_str(" COMMENT ");
            definition.push_str(&quote_literal(comment));
        }

        if let Some(extra) = &column.extra {
            definition.push(' ');
            definition.push_str(extra);
        }

        if let Some(check) = &column.check_clause {
            if !self.house_style {
                definition.push_str(" CHECK (");
                definition.push_str(check);
                definition.push(')');
            }
        }

        definition
    }

    fn house_style_definition(&self, column_name: &str) -> Option<&'static str> {
        if !self.house_style {
            return None;
        }
        match column_name {
            "created" => Some(CREATED_DEFINITION),
            "updated" => Some(UPDATED_DEFINITION),
            name if name.starts_with(JSON_PREFIX) => Some(JSON_DEFINITION),
            _ => None,
        }
    }

    /// Statement for columns that are already in target order
    ///
    /// Returns `None` when there are no columns.
    pub fn alter_table_ordered(
        &self,
        table_name: &str,
        ordered: &[&ColumnDescriptor],
    ) -> Option<String> {
        if ordered.is_empty() {
            return None;
        }

        let clauses: Vec<String> = ordered
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let position = match index {
                    0 => " FIRST".to_string(),
                    _ => format!(" AFTER {}", quote_identifier(&ordered[index - 1].column_name)),
                };
                format!(
                    "MODIFY COLUMN {} {}{}",
                    quote_identifier(&column.column_name),
                    self.column_definition(column),
                    position
                )
            })
            .collect();

        Some(format!(
            "ALTER TABLE {} \n{};\n",
            quote_identifier(table_name),
            clauses.join(",\n")
        ))
    }

    /// Statement reordering one table, `None` for a table without columns
    pub fn alter_table(&self, table: &TableColumnSet) -> Option<String> {
        let ordered = target_order(&table.columns);
        self.alter_table_ordered(&table.name, &ordered)
    }

    /// All statements for a schema, each followed by a blank line
    pub fn render_schema(&self, tables: &[TableColumnSet]) -> String {
        let statements: Vec<String> = tables
            .iter()
            .filter_map(|table| {
                if table.is_empty() {
                    log::debug!("Skipping `{}`: no columns", table.name);
                    return None;
                }
                log::debug!(
                    "Rendering reorder of `{}` ({} columns)",
                    table.name,
                    table.columns.len()
                );
                self.alter_table(table)
            })
            .map(|statement| statement + "\n")
            .collect();
        statements.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_not_null_without_default() {
        let writer = AlterTableWriter::new(false);
        let column =
            ColumnDescriptor::new("t", "id", "int(11)", false).with_extra("auto_increment");
        assert_eq!(writer.column_definition(&column), "int(11) NOT NULL auto_increment");
    }

    #[test]
    fn test_definition_nullable_without_default() {
        let writer = AlterTableWriter::new(false);
        let column = ColumnDescriptor::new("t", "name", "varchar(255)", true);
        assert_eq!(writer.column_definition(&column), "varchar(255) NULL DEFAULT NULL");
    }

    #[test]
    fn test_definition_default_is_verbatim() {
        let writer = AlterTableWriter::new(false);
        let column = ColumnDescriptor::new("t", "stamp", "timestamp", false)
            .with_default("current_timestamp()");
        assert_eq!(
            writer.column_definition(&column),
            "timestamp NOT NULL DEFAULT current_timestamp()"
        );

        let quoted =
            ColumnDescriptor::new("t", "status", "varchar(10)", true).with_default("'new'");
        assert_eq!(
            writer.column_definition(&quoted),
            "varchar(10) NULL DEFAULT 'new'"
        );
    }

    #[test]
    fn test_definition_clause_order() {
        let writer = AlterTableWriter::new(false);
        let column = ColumnDescriptor::new("t", "age", "int(11)", false)
            .with_default("0")
            .with_comment("Age in years")
            .with_extra("INVISIBLE")
            .with_check("`age` >= 0");
        assert_eq!(
            writer.column_definition(&column),
            "int(11) NOT NULL DEFAULT 0 COMMENT 'Age in years' INVISIBLE CHECK (`age` >= 0)"
        );
    }

    #[test]
    fn test_comment_is_escaped() {
        let writer = AlterTableWriter::new(false);
        let column =
            ColumnDescriptor::new("t", "name", "text", false).with_comment("user's \\ name");
        assert_eq!(
            writer.column_definition(&column),
            "text NOT NULL COMMENT 'user''s \\\\ name'"
        );
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_house_style_overrides() {
        let writer = AlterTableWriter::new(true);
        let created = ColumnDescriptor::new("t", "created", "datetime", true);
        let updated = ColumnDescriptor::new("t", "updated", "datetime", true);
        let json = ColumnDescriptor::new("t", "json_payload", "longtext", false)
            .with_check("json_valid(`json_payload`)");
        let data_json = ColumnDescriptor::new("t", "data_json", "longtext", true);

        assert_eq!(writer.column_definition(&created), CREATED_DEFINITION);
        assert_eq!(writer.column_definition(&updated), UPDATED_DEFINITION);
        assert_eq!(writer.column_definition(&json), "JSON NULL");
        assert_eq!(writer.column_definition(&data_json), "longtext NULL DEFAULT NULL");
    }

    #[test]
    fn test_house_style_drops_check() {
        let column = ColumnDescriptor::new("t", "age", "int", false).with_check("`age` > 0");
        assert_eq!(
            AlterTableWriter::new(false).column_definition(&column),
            "int NOT NULL CHECK (`age` > 0)"
        );
        assert_eq!(AlterTableWriter::new(true).column_definition(&column), "int NOT NULL");
    }

    #[test]
    fn test_overrides_ignored_without_house_style() {
        let writer = AlterTableWriter::new(false);
        let created = ColumnDescriptor::new("t", "created", "datetime", true);
        assert_eq!(writer.column_definition(&created), "datetime NULL DEFAULT NULL");
    }

    #[test]
    fn test_alter_table_layout() {
        let writer = AlterTableWriter::new(false);
        let table = TableColumnSet::new(
            "users",
            vec![
                ColumnDescriptor::new("users", "name", "varchar(50)", false),
                ColumnDescriptor::new("users", "id", "int(11)", false).with_extra("auto_increment"),
                ColumnDescriptor::new("users", "email", "varchar(100)", false),
            ],
        );

        assert_eq!(
            writer.alter_table(&table).unwrap(),
            "ALTER TABLE `users` \n\
             MODIFY COLUMN `id` int(11) NOT NULL auto_increment FIRST,\n\
             MODIFY COLUMN `email` varchar(100) NOT NULL AFTER `id`,\n\
             MODIFY COLUMN `name` varchar(50) NOT NULL AFTER `email`;\n"
        );
    }

    #[test]
    fn test_alter_table_empty_is_none() {
        let writer = AlterTableWriter::new(false);
        assert_eq!(writer.alter_table(&TableColumnSet::new("ghost", Vec::new())), None);
    }

    #[test]
    fn test_render_schema_separates_tables() {
        let writer = AlterTableWriter::new(false);
        let tables = vec![
            TableColumnSet::new("a", vec![ColumnDescriptor::new("a", "id", "int", false)]),
            TableColumnSet::new("empty", Vec::new()),
            TableColumnSet::new("b", vec![ColumnDescriptor::new("b", "x", "int", false)]),
        ];

        assert_eq!(
            writer.render_schema(&tables),
            "ALTER TABLE `a` \nMODIFY COLUMN `id` int NOT NULL FIRST;\n\n\
             ALTER TABLE `b` \nMODIFY COLUMN `x` int NOT NULL FIRST;\n\n"
        );
    }

    #[test]
    fn test_render_schema_empty() {
        assert_eq!(AlterTableWriter::new(true).render_schema(&[]), "");
    }
}
