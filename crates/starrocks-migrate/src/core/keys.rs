//! Key classification and column reordering.
//!
//! Selects the effective key column set for a bundle (primary preferred,
//! unique as a substitute) and moves the key columns to the front of the
//! column list.

use crate::core::schema::{ColumnMeta, KeyColumnUsage, TableBundle};

/// The key entries to consider for a bundle: the primary group when
/// present, otherwise the unique group.
pub fn effective_keys(bundle: &TableBundle) -> &[KeyColumnUsage] {
    if !bundle.primary_keys.is_empty() {
        &bundle.primary_keys
    } else {
        &bundle.unique_keys
    }
}

/// Select the effective key column list.
///
/// Entries are grouped by constraint name in first-encountered order; the
/// first group whose member columns are all non-nullable wins. An empty
/// result ("no keys") is a normal outcome, not an error.
pub fn select_key_columns(keys: &[KeyColumnUsage], columns: &[ColumnMeta]) -> Vec<String> {
    let mut constraint_order: Vec<&str> = Vec::new();
    for key in keys {
        if !constraint_order.contains(&key.constraint_name.as_str()) {
            constraint_order.push(&key.constraint_name);
        }
    }

    for constraint in constraint_order {
        let group: Vec<&str> = keys
            .iter()
            .filter(|k| k.constraint_name == constraint)
            .map(|k| k.column_name.as_str())
            .collect();
        let has_nullable = columns
            .iter()
            .any(|col| col.is_nullable && group.contains(&col.name.as_str()));
        if !has_nullable {
            return group.into_iter().map(String::from).collect();
        }
    }

    Vec::new()
}

/// Reorder columns so the key columns come first, in the key's declared
/// order, followed by the remaining columns in their original order.
/// With an empty key list the order is unchanged.
pub fn reorder_columns(key_columns: &[String], columns: Vec<ColumnMeta>) -> Vec<ColumnMeta> {
    if key_columns.is_empty() {
        return columns;
    }
    let mut reordered: Vec<ColumnMeta> = key_columns
        .iter()
        .filter_map(|key| columns.iter().find(|col| &col.name == key).cloned())
        .collect();
    reordered.extend(
        columns
            .into_iter()
            .filter(|col| !key_columns.contains(&col.name)),
    );
    reordered
}

/// Classify a bundle's keys and reorder its columns in place.
/// Returns the selected key column list (empty when no group qualifies).
pub fn classify_and_reorder(bundle: &mut TableBundle) -> Vec<String> {
    let key_columns = select_key_columns(effective_keys(bundle), &bundle.columns);
    if !key_columns.is_empty() {
        let columns = std::mem::take(&mut bundle.columns);
        bundle.columns = reorder_columns(&key_columns, columns);
    }
    key_columns
}
