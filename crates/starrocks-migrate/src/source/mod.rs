//! Source database dialects and schema introspection.
//!
//! Each dialect supplies two capabilities: live introspection of
//! information_schema metadata ([`SchemaSource`]) and pure column
//! formatting for the target DDL families ([`Dialect`]). The planning
//! engine depends only on the abstractions, never a concrete dialect.

pub mod mysql;
pub mod tidb;

pub use mysql::{MySqlDialect, MySqlSource};
pub use tidb::{TiDbDialect, TiDbSource};

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::config::{Config, SourceKind, TableRule};
use crate::core::schema::{ColumnMeta, KeyColumnUsage, TableMeta};
use crate::error::Result;

/// The DDL families a dialect can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterKind {
    /// Native OLAP tables.
    StarRocks,
    /// External tables querying the source in place.
    StarRocksExternal,
    /// Flink CDC source/sink pipeline.
    Flink,
}

/// Column formatting and naming conventions for one source dialect.
pub trait Dialect: Send + Sync {
    /// Dialect identifier (e.g. "mysql").
    fn name(&self) -> &'static str;

    /// Whether table names must be prefixed with their schema because the
    /// source has a schema level between database and table.
    fn combine_schema_name(&self) -> bool;

    /// Engine name used in external table DDL.
    fn external_engine(&self) -> &'static str;

    /// Flink CDC connector identifier.
    fn pipeline_connector(&self) -> &'static str;

    /// Whether the pipeline connector is configured with host/port/user
    /// credentials (TiDB uses PD endpoints instead).
    fn pipeline_needs_endpoint(&self) -> bool;

    /// Dialect-specific pipeline connector properties. Keys the user set
    /// on the rule are never overwritten by these.
    fn pipeline_special_props(&self, rule: &TableRule) -> BTreeMap<String, String>;

    /// Format a column definition for native warehouse DDL.
    fn format_warehouse_column(&self, table: &TableMeta, col: &ColumnMeta) -> Result<String>;

    /// Format a column definition for pipeline DDL.
    fn format_pipeline_column(&self, table: &TableMeta, col: &ColumnMeta) -> Result<String>;

    /// The DDL families generated for this dialect, in emit order.
    fn emitters(&self) -> &'static [EmitterKind];
}

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Mysql(MySqlDialect),
    Tidb(TiDbDialect),
}

impl Dialect for DialectImpl {
    fn name(&self) -> &'static str {
        match self {
            DialectImpl::Mysql(d) => d.name(),
            DialectImpl::Tidb(d) => d.name(),
        }
    }

    fn combine_schema_name(&self) -> bool {
        match self {
            DialectImpl::Mysql(d) => d.combine_schema_name(),
            DialectImpl::Tidb(d) => d.combine_schema_name(),
        }
    }

    fn external_engine(&self) -> &'static str {
        match self {
            DialectImpl::Mysql(d) => d.external_engine(),
            DialectImpl::Tidb(d) => d.external_engine(),
        }
    }

    fn pipeline_connector(&self) -> &'static str {
        match self {
            DialectImpl::Mysql(d) => d.pipeline_connector(),
            DialectImpl::Tidb(d) => d.pipeline_connector(),
        }
    }

    fn pipeline_needs_endpoint(&self) -> bool {
        match self {
            DialectImpl::Mysql(d) => d.pipeline_needs_endpoint(),
            DialectImpl::Tidb(d) => d.pipeline_needs_endpoint(),
        }
    }

    fn pipeline_special_props(&self, rule: &TableRule) -> BTreeMap<String, String> {
        match self {
            DialectImpl::Mysql(d) => d.pipeline_special_props(rule),
            DialectImpl::Tidb(d) => d.pipeline_special_props(rule),
        }
    }

    fn format_warehouse_column(&self, table: &TableMeta, col: &ColumnMeta) -> Result<String> {
        match self {
            DialectImpl::Mysql(d) => d.format_warehouse_column(table, col),
            DialectImpl::Tidb(d) => d.format_warehouse_column(table, col),
        }
    }

    fn format_pipeline_column(&self, table: &TableMeta, col: &ColumnMeta) -> Result<String> {
        match self {
            DialectImpl::Mysql(d) => d.format_pipeline_column(table, col),
            DialectImpl::Tidb(d) => d.format_pipeline_column(table, col),
        }
    }

    fn emitters(&self) -> &'static [EmitterKind] {
        match self {
            DialectImpl::Mysql(d) => d.emitters(),
            DialectImpl::Tidb(d) => d.emitters(),
        }
    }
}

/// Introspected schema metadata, ready for the planning pass.
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    /// Base tables in (schema, name) order.
    pub tables: Vec<TableMeta>,

    /// All columns in ordinal order.
    pub columns: Vec<ColumnMeta>,

    /// All key column usage rows, ordered by constraint and position.
    pub key_usage: Vec<KeyColumnUsage>,
}

/// Live schema introspection for one source database.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Read tables, columns and key usage from the source.
    ///
    /// Zero tables or zero columns is fatal; downstream planning with
    /// empty metadata would silently produce nothing.
    async fn snapshot(&self) -> Result<SourceSnapshot>;

    /// Build the dialect for this source. May query the source for
    /// connector endpoints (TiDB PD instances).
    async fn dialect(&self) -> Result<DialectImpl>;

    /// Close the connection pool.
    async fn close(&self);
}

/// Connect to the configured source database.
pub async fn connect(config: &Config) -> Result<Box<dyn SchemaSource>> {
    match config.source.r#type {
        SourceKind::Mysql => Ok(Box::new(MySqlSource::connect(config).await?)),
        SourceKind::Tidb => Ok(Box::new(TiDbSource::connect(config).await?)),
    }
}
