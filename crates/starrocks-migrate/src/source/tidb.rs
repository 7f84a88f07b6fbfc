//! TiDB source. Schema metadata comes through the same information_schema
//! surface as MySQL; the pipeline connector differs and needs the placement
//! driver address instead of a host/port endpoint.

use async_trait::async_trait;
use mysql_async::prelude::*;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::{Config, TableRule};
use crate::core::schema::{ColumnMeta, TableMeta};
use crate::error::Result;
use crate::source::mysql::{MySqlDialect, MySqlSource};
use crate::source::{Dialect, DialectImpl, EmitterKind, SchemaSource, SourceSnapshot};

const PD_ADDRESSES_KEY: &str = "pd-addresses";

/// Column formatting for TiDB sources. Type mapping is shared with MySQL.
#[derive(Debug, Clone)]
pub struct TiDbDialect {
    inner: MySqlDialect,
    pd_addresses: Option<String>,
}

impl TiDbDialect {
    pub fn new(use_decimal_v3: bool, pd_addresses: Option<String>) -> Self {
        Self {
            inner: MySqlDialect::new(use_decimal_v3),
            pd_addresses,
        }
    }
}

impl Dialect for TiDbDialect {
    fn name(&self) -> &'static str {
        "tidb"
    }

    fn combine_schema_name(&self) -> bool {
        false
    }

    fn external_engine(&self) -> &'static str {
        "mysql"
    }

    fn pipeline_connector(&self) -> &'static str {
        "tidb-cdc"
    }

    fn pipeline_needs_endpoint(&self) -> bool {
        false
    }

    fn pipeline_special_props(&self, rule: &TableRule) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        if let Some(pd) = &self.pd_addresses {
            if !rule.flink_source_properties.contains_key(PD_ADDRESSES_KEY) {
                props.insert(PD_ADDRESSES_KEY.to_string(), pd.clone());
            }
        }
        props
    }

    fn format_warehouse_column(&self, table: &TableMeta, col: &ColumnMeta) -> Result<String> {
        self.inner.format_warehouse_column(table, col)
    }

    fn format_pipeline_column(&self, table: &TableMeta, col: &ColumnMeta) -> Result<String> {
        self.inner.format_pipeline_column(table, col)
    }

    fn emitters(&self) -> &'static [EmitterKind] {
        &[
            EmitterKind::StarRocks,
            EmitterKind::StarRocksExternal,
            EmitterKind::Flink,
        ]
    }
}

/// TiDB introspection. Delegates the snapshot to the MySQL path and adds a
/// cluster_info lookup for the newest placement driver instance.
pub struct TiDbSource {
    inner: MySqlSource,
}

impl TiDbSource {
    pub async fn connect(config: &Config) -> Result<Self> {
        Ok(Self {
            inner: MySqlSource::connect(config).await?,
        })
    }

    async fn pd_addresses(&self) -> Result<Option<String>> {
        let mut conn = self.inner.pool().get_conn().await?;
        let instance: Option<String> = conn
            .query_first(
                "SELECT INSTANCE FROM information_schema.cluster_info
                 WHERE TYPE = 'pd' ORDER BY START_TIME DESC LIMIT 1",
            )
            .await?;
        if instance.is_none() {
            warn!("no placement driver instance found in cluster_info");
        }
        Ok(instance)
    }
}

#[async_trait]
impl SchemaSource for TiDbSource {
    async fn snapshot(&self) -> Result<SourceSnapshot> {
        self.inner.snapshot_inner().await
    }

    async fn dialect(&self) -> Result<DialectImpl> {
        let pd = self.pd_addresses().await?;
        Ok(DialectImpl::Tidb(TiDbDialect::new(
            self.inner.use_decimal_v3(),
            pd,
        )))
    }

    async fn close(&self) {
        self.inner.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableRule;

    fn rule() -> TableRule {
        TableRule {
            seq: "01".to_string(),
            database: ".*".to_string(),
            schema: ".*".to_string(),
            table: ".*".to_string(),
            partition_key: String::new(),
            partitions: String::new(),
            duplicate_keys: String::new(),
            distributed_by: String::new(),
            bucket_num: None,
            properties: Default::default(),
            external_properties: Default::default(),
            flink_source_properties: Default::default(),
            flink_sink_properties: Default::default(),
            from_shard_family: true,
        }
    }

    #[test]
    fn test_special_props_inject_pd_addresses() {
        let dialect = TiDbDialect::new(false, Some("pd0:2379".to_string()));
        let props = dialect.pipeline_special_props(&rule());
        assert_eq!(props.get("pd-addresses").map(String::as_str), Some("pd0:2379"));
    }

    #[test]
    fn test_special_props_respect_user_override() {
        let dialect = TiDbDialect::new(false, Some("pd0:2379".to_string()));
        let mut rule = rule();
        rule.flink_source_properties
            .insert("pd-addresses".to_string(), "custom:2379".to_string());
        assert!(dialect.pipeline_special_props(&rule).is_empty());
    }

    #[test]
    fn test_special_props_empty_without_discovery() {
        let dialect = TiDbDialect::new(false, None);
        assert!(dialect.pipeline_special_props(&rule()).is_empty());
    }
}
