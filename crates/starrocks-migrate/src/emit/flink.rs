//! Flink CDC pipeline DDL: a source/sink table pair per planned bundle
//! plus the INSERT statement wiring them together.

use crate::config::Config;
use crate::core::planner::PlanSet;
use crate::emit::{emitted_table_name, quote_join, render_with_props, DdlEmitter, DdlSet};
use crate::error::Result;
use crate::source::{Dialect, DialectImpl};

const FLINK_CATALOG: &str = "default_catalog";

/// Emits paired `_src` (CDC connector) and `_sink` (starrocks connector)
/// tables and the `INSERT INTO ... SELECT *` job statement.
pub struct FlinkEmitter;

impl DdlEmitter for FlinkEmitter {
    fn file_prefix(&self) -> &'static str {
        "flink-create"
    }

    fn emit(&self, config: &Config, dialect: &DialectImpl, plan: &mut PlanSet) -> Result<DdlSet> {
        let PlanSet { rules, planned } = plan;
        let mut out = DdlSet::for_rules(rules);

        for rule_plan in planned.iter() {
            let rule = &mut rules[rule_plan.rule_index];

            // Each bundle claims the next server id so parallel CDC readers
            // never collide. Only endpoint-based connectors use one.
            let mut server_id: Option<u64> = if dialect.pipeline_needs_endpoint() {
                rule.flink_source_properties
                    .get("server-id")
                    .and_then(|v| v.parse().ok())
            } else {
                None
            };

            for pb in &rule_plan.bundles {
                let database = &pb.bundle.table.catalog;
                out.push_dedup(
                    &rule.seq,
                    format!(
                        "CREATE DATABASE IF NOT EXISTS `{}`.`{}`",
                        FLINK_CATALOG, database
                    ),
                );

                let table_name = emitted_table_name(
                    rule.from_shard_family,
                    dialect.combine_schema_name(),
                    &pb.bundle.table,
                );

                let mut column_defs = Vec::with_capacity(pb.bundle.columns.len());
                for col in &pb.bundle.columns {
                    column_defs.push(dialect.format_pipeline_column(&pb.bundle.table, col)?);
                }
                let mut body = column_defs.join(",\n");
                if !pb.key_columns.is_empty() {
                    body.push_str(&format!(
                        ",\n  PRIMARY KEY({}) NOT ENFORCED",
                        quote_join(&pb.key_columns)
                    ));
                }

                // Source table.
                let user_set: Vec<String> =
                    rule.flink_source_properties.keys().cloned().collect();
                let source_props = &mut rule.flink_source_properties;
                source_props.insert(
                    "connector".to_string(),
                    dialect.pipeline_connector().to_string(),
                );
                if dialect.pipeline_needs_endpoint() {
                    source_props.insert("hostname".to_string(), config.source.host.clone());
                    source_props.insert("port".to_string(), config.source.port.to_string());
                    source_props.insert("username".to_string(), config.source.user.clone());
                    source_props.insert("password".to_string(), config.source.password.clone());
                }
                if let Some(id) = server_id {
                    source_props.insert("server-id".to_string(), id.to_string());
                    server_id = Some(id + 1);
                }
                if rule.from_shard_family {
                    source_props.insert("database-name".to_string(), trim_regex(&rule.database));
                    source_props.insert("table-name".to_string(), trim_regex(&rule.table));
                    if dialect.combine_schema_name() {
                        source_props.insert("schema-name".to_string(), trim_regex(&rule.schema));
                    }
                } else {
                    source_props.insert("database-name".to_string(), database.clone());
                    source_props.insert("table-name".to_string(), pb.bundle.table.name.clone());
                    if dialect.combine_schema_name() {
                        source_props
                            .insert("schema-name".to_string(), pb.bundle.table.schema.clone());
                    }
                }
                for (k, v) in dialect.pipeline_special_props(rule) {
                    if user_set.contains(&k) {
                        continue;
                    }
                    rule.flink_source_properties.insert(k, v);
                }
                let src_ddl = format!(
                    "CREATE TABLE IF NOT EXISTS `{}`.`{}`.`{}_src` (\n{}\n) with (\n{}\n)",
                    FLINK_CATALOG,
                    database,
                    table_name,
                    body,
                    render_with_props(&rule.flink_source_properties)
                );
                out.push(&rule.seq, src_ddl);

                // Sink table.
                let sink_props = &mut rule.flink_sink_properties;
                sink_props.insert("connector".to_string(), "starrocks".to_string());
                sink_props.insert("database-name".to_string(), database.clone());
                sink_props.insert("table-name".to_string(), table_name.clone());
                let sink_ddl = format!(
                    "CREATE TABLE IF NOT EXISTS `{}`.`{}`.`{}_sink` (\n{}\n) with (\n{}\n)",
                    FLINK_CATALOG,
                    database,
                    table_name,
                    body,
                    render_with_props(&rule.flink_sink_properties)
                );
                out.push(&rule.seq, sink_ddl);

                out.push(
                    &rule.seq,
                    format!(
                        "INSERT INTO `{c}`.`{db}`.`{t}_sink` SELECT * FROM `{c}`.`{db}`.`{t}_src`",
                        c = FLINK_CATALOG,
                        db = database,
                        t = table_name
                    ),
                );
            }
        }
        Ok(out)
    }
}

/// Strip one leading `^` and one trailing `$` so an anchored matching
/// pattern can be reused as a Flink CDC table-name pattern.
fn trim_regex(pattern: &str) -> String {
    let pattern = pattern.strip_suffix('$').unwrap_or(pattern);
    pattern.strip_prefix('^').unwrap_or(pattern).to_string()
}
