//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database connection settings.
    pub source: SourceConfig,

    /// Capacity planning settings for the target cluster.
    #[serde(default)]
    pub planning: PlanningConfig,

    /// Result file output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Ordered table matching rules. Later rules win over earlier ones.
    pub rules: Vec<TableRule>,
}

/// Supported source database kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// MySQL (catalog == schema, no separate schema level).
    Mysql,
    /// TiDB (MySQL-compatible, uses the tidb-cdc pipeline connector).
    Tidb,
}

impl SourceKind {
    /// Kind identifier as it appears in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Mysql => "mysql",
            SourceKind::Tidb => "tidb",
        }
    }
}

/// Source database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database kind.
    pub r#type: SourceKind,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,
}

impl SourceConfig {
    /// Build a mysql_async connection URL against information_schema.
    pub fn connection_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/information_schema",
            self.user, self.password, self.host, self.port
        )
    }
}

/// Capacity planning configuration for the target cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Number of backend (BE) nodes in the target cluster.
    #[serde(default = "default_be_num")]
    pub be_num: u64,

    /// Emit DECIMAL V3 types (precision up to 38) instead of falling back
    /// to STRING above precision 27.
    #[serde(default)]
    pub use_decimal_v3: bool,
}

impl PlanningConfig {
    /// Replica count for generated tables: 3, capped by the BE count.
    pub fn replication_num(&self) -> u64 {
        self.be_num.min(3)
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            be_num: default_be_num(),
            use_decimal_v3: false,
        }
    }
}

/// Result file output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the result files are written to. Recreated on every run.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// A user-declared table matching rule plus target-schema directives.
///
/// The three patterns use unanchored substring matching unless anchored
/// with `^`/`$`. Among all rules whose patterns match a table, the last
/// one in declaration order wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRule {
    /// Rule identifier, used as the per-rule result file suffix.
    pub seq: String,

    /// Pattern matched against the table catalog (database).
    pub database: String,

    /// Pattern matched against the table schema (default: match all).
    #[serde(default = "default_match_all")]
    pub schema: String,

    /// Pattern matched against the table name.
    pub table: String,

    /// Explicit partition key column. Falls back to the first
    /// date/datetime/timestamp column when empty.
    #[serde(default)]
    pub partition_key: String,

    /// Explicit partition clause body, replacing the computed range.
    #[serde(default)]
    pub partitions: String,

    /// Explicit DUPLICATE KEY column list for keyless tables.
    #[serde(default)]
    pub duplicate_keys: String,

    /// Explicit DISTRIBUTED BY column list.
    #[serde(default)]
    pub distributed_by: String,

    /// Explicit bucket count, replacing the computed value.
    #[serde(default)]
    pub bucket_num: Option<u64>,

    /// Native table PROPERTIES. Extended monotonically by emitters.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// External table PROPERTIES. Extended monotonically by emitters.
    #[serde(default)]
    pub external_properties: BTreeMap<String, String>,

    /// Flink CDC source connector properties.
    #[serde(default)]
    pub flink_source_properties: BTreeMap<String, String>,

    /// Flink StarRocks sink connector properties.
    #[serde(default)]
    pub flink_sink_properties: BTreeMap<String, String>,

    /// Whether the tables matched by this rule form a shard family.
    /// Assumed true after load; cleared by the planner when the matched
    /// tables are not structurally identical.
    #[serde(skip)]
    pub from_shard_family: bool,
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_be_num() -> u64 {
    3
}

fn default_output_dir() -> String {
    "./result".to_string()
}

fn default_match_all() -> String {
    ".*".to_string()
}
