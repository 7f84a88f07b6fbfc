//! Native StarRocks table DDL.

use crate::config::Config;
use crate::core::planner::PlanSet;
use crate::emit::{emitted_table_name, quote_join, render_properties, DdlEmitter, DdlSet};
use crate::error::Result;
use crate::source::{Dialect, DialectImpl};

const TEMPORAL_TYPES: [&str; 3] = ["date", "datetime", "timestamp"];

/// Emits `CREATE DATABASE` / `CREATE TABLE ... ENGINE=olap` statements with
/// key, partition, distribution and property clauses.
pub struct StarRocksEmitter;

impl DdlEmitter for StarRocksEmitter {
    fn file_prefix(&self) -> &'static str {
        "starrocks-create"
    }

    fn emit(&self, _config: &Config, dialect: &DialectImpl, plan: &mut PlanSet) -> Result<DdlSet> {
        let PlanSet { rules, planned } = plan;
        let mut out = DdlSet::for_rules(rules);

        for rule_plan in planned.iter() {
            let rule = &mut rules[rule_plan.rule_index];
            for pb in &rule_plan.bundles {
                let database = &pb.bundle.table.catalog;
                out.push_dedup(
                    &rule.seq,
                    format!("CREATE DATABASE IF NOT EXISTS `{}`", database),
                );

                let table_name = emitted_table_name(
                    rule.from_shard_family,
                    dialect.combine_schema_name(),
                    &pb.bundle.table,
                );
                let mut ddl = format!(
                    "CREATE TABLE IF NOT EXISTS `{}`.`{}` (\n",
                    database, table_name
                );

                // Columns, tracking the first temporal column as partition
                // key fallback.
                let mut partition_key = rule.partition_key.clone();
                let mut column_defs = Vec::with_capacity(pb.bundle.columns.len());
                for col in &pb.bundle.columns {
                    column_defs.push(dialect.format_warehouse_column(&pb.bundle.table, col)?);
                    if partition_key.is_empty()
                        && TEMPORAL_TYPES.contains(&col.data_type.as_str())
                    {
                        partition_key = col.name.clone();
                    }
                }
                ddl.push_str(&column_defs.join(",\n"));
                ddl.push_str("\n) ENGINE=olap\n");

                // Key clause. Tables without a usable key fall back to a
                // duplicate key over the first three columns.
                let keys_list = if pb.key_columns.is_empty() {
                    let dup: Vec<String> = pb
                        .bundle
                        .columns
                        .iter()
                        .take(3)
                        .map(|c| c.name.clone())
                        .collect();
                    let keys_list = quote_join(&dup);
                    if rule.duplicate_keys.is_empty() {
                        ddl.push_str(&format!("DUPLICATE KEY({})\n", keys_list));
                    } else {
                        ddl.push_str(&format!("DUPLICATE KEY({})\n", rule.duplicate_keys));
                    }
                    keys_list
                } else {
                    let keys_list = quote_join(&pb.key_columns);
                    ddl.push_str(&format!("PRIMARY KEY({})\n", keys_list));
                    keys_list
                };

                ddl.push_str(&format!("COMMENT \"{}\"\n", pb.bundle.table.comment));

                // Partition clause, duplicate-key tables only. A PRIMARY KEY
                // table cannot use a non-key partition column.
                if pb.key_columns.is_empty() && !partition_key.is_empty() {
                    if let Some(range) = &pb.partition.range {
                        let body = if rule.partitions.is_empty() {
                            range.render()
                        } else {
                            rule.partitions.clone()
                        };
                        ddl.push_str(&format!(
                            "PARTITION BY RANGE ({}) (\n{}\n)\n",
                            partition_key, body
                        ));
                    }
                }

                let dis_keys = if rule.distributed_by.is_empty() {
                    keys_list
                } else {
                    rule.distributed_by.clone()
                };
                let buckets = rule.bucket_num.unwrap_or(pb.buckets);
                ddl.push_str(&format!(
                    "DISTRIBUTED BY HASH({}) BUCKETS {}\n",
                    dis_keys, buckets
                ));

                // Dynamic-partition properties fill in around what the user
                // declared; a user-set key always wins.
                if pb.key_columns.is_empty() && !pb.partition.dynamic_properties.is_empty() {
                    for (k, v) in &pb.partition.dynamic_properties {
                        rule.properties.entry(k.clone()).or_insert_with(|| v.clone());
                    }
                    rule.properties
                        .entry("dynamic_partition.buckets".to_string())
                        .or_insert_with(|| buckets.to_string());
                }
                ddl.push_str(&format!(
                    "PROPERTIES (\n{}\n)",
                    render_properties(&rule.properties)
                ));

                out.push(&rule.seq, ddl);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::planner::plan;
    use crate::core::schema::{ColumnMeta, KeyColumnUsage, KeyRoles, TableMeta};
    use crate::source::{DialectImpl, MySqlDialect};
    use chrono::{TimeZone, Utc};

    const YAML: &str = r#"
source:
  type: mysql
  host: localhost
  user: root
  password: secret
planning:
  be_num: 3
rules:
  - seq: "01"
    database: app
    table: ".*"
"#;

    fn table(name: &str, data_length: u64) -> TableMeta {
        TableMeta {
            catalog: "app".to_string(),
            schema: "app".to_string(),
            name: name.to_string(),
            engine: "InnoDB".to_string(),
            data_length,
            create_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            comment: "orders fact".to_string(),
        }
    }

    fn column(table: &str, name: &str, pos: u64, data_type: &str, nullable: bool) -> ColumnMeta {
        ColumnMeta {
            catalog: "app".to_string(),
            schema: "app".to_string(),
            table: table.to_string(),
            name: name.to_string(),
            ordinal_position: pos,
            data_type: data_type.to_string(),
            column_type: data_type.to_string(),
            numeric_precision: 0,
            numeric_scale: 0,
            is_nullable: nullable,
            default: None,
            comment: String::new(),
            key_roles: KeyRoles::default(),
        }
    }

    fn key(table: &str, col: &str, constraint: &str, pos: u64) -> KeyColumnUsage {
        KeyColumnUsage {
            catalog: "app".to_string(),
            schema: "app".to_string(),
            table: table.to_string(),
            column_name: col.to_string(),
            constraint_name: constraint.to_string(),
            ordinal_position: pos,
        }
    }

    fn emit_with(
        tables: Vec<TableMeta>,
        columns: Vec<ColumnMeta>,
        keys: Vec<KeyColumnUsage>,
    ) -> (Config, DdlSet) {
        let config = Config::from_yaml(YAML).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap();
        let mut plan_set = plan(
            config.rules.clone(),
            config.planning.be_num,
            tables,
            &columns,
            &keys,
            now,
        );
        let dialect = DialectImpl::Mysql(MySqlDialect::new(false));
        let out = StarRocksEmitter
            .emit(&config, &dialect, &mut plan_set)
            .unwrap();
        (config, out)
    }

    #[test]
    fn test_primary_key_table() {
        let (_, out) = emit_with(
            vec![table("orders", 1 << 20)],
            vec![
                column("orders", "note", 1, "varchar", true),
                column("orders", "id", 2, "bigint", false),
            ],
            vec![key("orders", "id", "PRIMARY", 1)],
        );
        // db statement first, then the table
        assert_eq!(out.all[0], "CREATE DATABASE IF NOT EXISTS `app`");
        let ddl = &out.all[1];
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS `app`.`orders` (\n"));
        assert!(ddl.contains("PRIMARY KEY(`id`)"));
        // key column reordered to the front
        let id_pos = ddl.find("`id` BIGINT").unwrap();
        let note_pos = ddl.find("`note` STRING").unwrap();
        assert!(id_pos < note_pos);
        assert!(ddl.contains("COMMENT \"orders fact\""));
        assert!(ddl.contains("DISTRIBUTED BY HASH(`id`) BUCKETS 1\n"));
        assert!(ddl.contains("\"replication_num\" = \"3\""));
        // small primary-key table gets no partition clause
        assert!(!ddl.contains("PARTITION BY RANGE"));
        assert_eq!(out.per_rule["01"].len(), 2);
    }

    #[test]
    fn test_keyless_table_gets_duplicate_key_and_partitions() {
        // 200 GiB over 10 days: 20 GiB/day, DAY granularity, dynamic props
        let (_, out) = emit_with(
            vec![table("events", 200 << 30)],
            vec![
                column("events", "a", 1, "int", true),
                column("events", "b", 2, "int", true),
                column("events", "c", 3, "int", true),
                column("events", "d", 4, "int", true),
                column("events", "ts", 5, "datetime", true),
            ],
            vec![],
        );
        let ddl = &out.all[1];
        assert!(ddl.contains("DUPLICATE KEY(`a`, `b`, `c`)"));
        assert!(ddl.contains("PARTITION BY RANGE (ts) (\n"));
        assert!(ddl.contains("EVERY (INTERVAL 1 day)"));
        assert!(ddl.contains("\"dynamic_partition.enable\" = \"true\""));
        assert!(ddl.contains("\"dynamic_partition.time_unit\" = \"DAY\""));
        assert!(ddl.contains("\"dynamic_partition.end\" = \"3\""));
        assert!(ddl.contains("\"dynamic_partition.buckets\""));
        assert!(ddl.contains("DISTRIBUTED BY HASH(`a`, `b`, `c`) BUCKETS"));
    }

    #[test]
    fn test_rule_overrides_replace_computed_values() {
        let config = Config::from_yaml(YAML).unwrap();
        let mut rules = config.rules.clone();
        rules[0].bucket_num = Some(7);
        rules[0].distributed_by = "`x`".to_string();
        rules[0].duplicate_keys = "`x`, `y`".to_string();
        let now = Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap();
        let mut plan_set = plan(
            rules,
            3,
            vec![table("orders", 1 << 20)],
            &[
                column("orders", "x", 1, "int", true),
                column("orders", "y", 2, "int", true),
            ],
            &[],
            now,
        );
        let dialect = DialectImpl::Mysql(MySqlDialect::new(false));
        let out = StarRocksEmitter
            .emit(&config, &dialect, &mut plan_set)
            .unwrap();
        let ddl = &out.all[1];
        assert!(ddl.contains("DUPLICATE KEY(`x`, `y`)"));
        assert!(ddl.contains("DISTRIBUTED BY HASH(`x`) BUCKETS 7\n"));
    }

    #[test]
    fn test_explicit_partition_clause_replaces_computed_range() {
        let config = Config::from_yaml(YAML).unwrap();
        let mut rules = config.rules.clone();
        rules[0].partition_key = "event_day".to_string();
        rules[0].partitions =
            "  PARTITION p2025 VALUES LESS THAN (\"2026-01-01\")".to_string();
        let now = Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap();
        // keyless, 200 GiB over 10 days: crosses the dynamic threshold,
        // so a computed range exists to be replaced
        let mut plan_set = plan(
            rules,
            3,
            vec![table("events", 200 << 30)],
            &[
                column("events", "ts", 1, "datetime", true),
                column("events", "event_day", 2, "date", true),
            ],
            &[],
            now,
        );
        let dialect = DialectImpl::Mysql(MySqlDialect::new(false));
        let out = StarRocksEmitter
            .emit(&config, &dialect, &mut plan_set)
            .unwrap();
        let ddl = &out.all[1];
        // the configured key wins over the first temporal column fallback
        assert!(ddl.contains(
            "PARTITION BY RANGE (event_day) (\n  PARTITION p2025 VALUES LESS THAN (\"2026-01-01\")\n)\n"
        ));
        // the computed range body is fully replaced
        assert!(!ddl.contains("START ("));
        assert!(!ddl.contains("EVERY (INTERVAL"));
    }

    #[test]
    fn test_user_property_not_overwritten_by_dynamic_merge() {
        let config = Config::from_yaml(YAML).unwrap();
        let mut rules = config.rules.clone();
        rules[0]
            .properties
            .insert("dynamic_partition.end".to_string(), "7".to_string());
        let now = Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap();
        let mut plan_set = plan(
            rules,
            3,
            vec![table("events", 200 << 30)],
            &[column("events", "ts", 1, "datetime", true)],
            &[],
            now,
        );
        let dialect = DialectImpl::Mysql(MySqlDialect::new(false));
        let out = StarRocksEmitter
            .emit(&config, &dialect, &mut plan_set)
            .unwrap();
        assert!(out.all[1].contains("\"dynamic_partition.end\" = \"7\""));
        assert!(out.all[1].contains("\"dynamic_partition.enable\" = \"true\""));
    }
}
