//! Schema metadata types for source tables, columns and key constraints.
//!
//! These mirror the information_schema rows the introspector reads and are
//! the database-agnostic representation the planning engine works on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Table metadata (information_schema.tables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMeta {
    /// Catalog (database) name. Rewritten when a shard family is merged.
    pub catalog: String,

    /// Schema name. For MySQL-family sources this equals the catalog.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Storage engine (e.g. "InnoDB").
    pub engine: String,

    /// Data size in bytes.
    pub data_length: u64,

    /// Creation timestamp.
    pub create_time: DateTime<Utc>,

    /// Free-text table comment.
    pub comment: String,
}

impl TableMeta {
    /// Table name prefixed with its schema, used when several source
    /// schemas land in one target database.
    pub fn schema_prefixed_name(&self) -> String {
        format!("{}__{}", self.schema, self.name)
    }

    /// Whether a column row belongs to this table.
    pub fn owns(&self, catalog: &str, schema: &str, name: &str) -> bool {
        self.catalog == catalog && self.schema == schema && self.name == name
    }
}

/// Column metadata (information_schema.columns).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Owning table catalog.
    pub catalog: String,

    /// Owning table schema.
    pub schema: String,

    /// Owning table name.
    pub table: String,

    /// Column name.
    pub name: String,

    /// 1-based ordinal position.
    pub ordinal_position: u64,

    /// Base data type (e.g. "int", "varchar").
    pub data_type: String,

    /// Full declared type (e.g. "int(11) unsigned").
    pub column_type: String,

    /// Numeric precision (0 when not numeric).
    pub numeric_precision: u64,

    /// Numeric scale (0 when not numeric).
    pub numeric_scale: u64,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Declared default value.
    pub default: Option<String>,

    /// Free-text column comment.
    pub comment: String,

    /// Dialect-specific key-role flags (ClickHouse/Hive style sources).
    #[serde(default)]
    pub key_roles: KeyRoles,
}

/// Dialect-specific key membership flags carried on a column.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KeyRoles {
    /// Member of the source partition key.
    pub partition: bool,
    /// Member of the source sorting key.
    pub sorting: bool,
    /// Member of the source sampling key.
    pub sampling: bool,
}

/// Key column usage metadata (information_schema.key_column_usage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyColumnUsage {
    /// Owning table catalog.
    pub catalog: String,

    /// Owning table schema.
    pub schema: String,

    /// Owning table name.
    pub table: String,

    /// Column name.
    pub column_name: String,

    /// Constraint name. Distinguishes primary from unique groups.
    pub constraint_name: String,

    /// 1-based position within the constraint.
    pub ordinal_position: u64,
}

/// One source table plus its columns and key entries, classified into
/// primary and unique constraint groups.
#[derive(Debug, Clone)]
pub struct TableBundle {
    /// Table metadata.
    pub table: TableMeta,

    /// Columns in ordinal order (reordered by the key classifier).
    pub columns: Vec<ColumnMeta>,

    /// Key entries belonging to the primary key constraint.
    pub primary_keys: Vec<KeyColumnUsage>,

    /// Key entries belonging to unique constraints.
    pub unique_keys: Vec<KeyColumnUsage>,
}

impl TableBundle {
    /// Rewrite the identifier triple on the table, every column and every
    /// key entry. Used when a shard family is merged under a unified name.
    pub fn rewrite_identifier(&mut self, catalog: &str, schema: &str, name: &str) {
        self.table.catalog = catalog.to_string();
        self.table.schema = schema.to_string();
        self.table.name = name.to_string();
        for col in &mut self.columns {
            col.catalog = catalog.to_string();
            col.schema = schema.to_string();
            col.table = name.to_string();
        }
        for kcu in self.primary_keys.iter_mut().chain(self.unique_keys.iter_mut()) {
            kcu.catalog = catalog.to_string();
            kcu.schema = schema.to_string();
            kcu.table = name.to_string();
        }
    }
}

/// Bundles grouped by the index of the rule that matched them.
///
/// Every rule index is present, possibly with an empty list, so emitter
/// output stays deterministic.
pub type RuleBundleMap = BTreeMap<usize, Vec<TableBundle>>;
