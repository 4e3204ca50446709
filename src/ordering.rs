//! Target column order: `id` first, everything else by name

use crate::descriptor::ColumnDescriptor;
use std::cmp::Ordering;

/// Column that is always moved to the first position
pub const PINNED_COLUMN: &str = "id";

/// Compare two column names for target order
///
/// The pinned column sorts before everything else (exact, case-sensitive
/// match). All other names compare byte-wise.
pub fn compare_column_names(a: &str, b: &str) -> Ordering {
    match (a == PINNED_COLUMN, b == PINNED_COLUMN) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.as_bytes().cmp(b.as_bytes()),
    }
}

/// Columns of one table in target order
pub fn target_order(columns: &[ColumnDescriptor]) -> Vec<&ColumnDescriptor> {
    let mut ordered: Vec<&ColumnDescriptor> = columns.iter().collect();
    ordered.sort_by(|a, b| compare_column_names(&a.column_name, &b.column_name));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        let descriptors: Vec<ColumnDescriptor> = columns
            .iter()
            .map(|c| ColumnDescriptor::new("t", *c, "int", false))
            .collect();
        target_order(&descriptors)
            .into_iter()
            .map(|d| d.column_name.clone())
            .collect()
    }

    #[test]
    fn test_id_is_pinned_first() {
        assert_eq!(
            names(&["name", "created", "id", "amount"]),
            vec!["id", "amount", "created", "name"]
        );
    }

    #[test]
    fn test_without_id_is_plain_sort() {
        assert_eq!(names(&["b", "a", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ordinal_comparison_puts_uppercase_first() {
        // Byte order, not collation: 'Z' (0x5a) < '_' (0x5f) < 'a' (0x61)
        assert_eq!(
            names(&["alpha", "_hidden", "Zeta", "ID"]),
            vec!["ID", "Zeta", "_hidden", "alpha"]
        );
    }

    #[test]
    fn test_pin_is_case_sensitive() {
        assert_eq!(names(&["Id", "a"]), vec!["Id", "a"]);
        assert_eq!(names(&["a", "Id", "id"]), vec!["id", "Id", "a"]);
    }

    #[test]
    fn test_id_prefix_is_not_pinned() {
        assert_eq!(names(&["id_user", "age", "id"]), vec!["id", "age", "id_user"]);
    }

    #[test]
    fn test_compare_column_names() {
        assert_eq!(compare_column_names("id", "a"), Ordering::Less);
        assert_eq!(compare_column_names("a", "id"), Ordering::Greater);
        assert_eq!(compare_column_names("id", "id"), Ordering::Equal);
        assert_eq!(compare_column_names("a", "b"), Ordering::Less);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(names(&["only"]), vec!["only"]);
        assert!(names(&[]).is_empty());
    }
}
