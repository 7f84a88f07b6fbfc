//! StarRocks external table DDL, querying the source database in place.

use crate::config::Config;
use crate::core::planner::PlanSet;
use crate::emit::{emitted_table_name, render_properties, DdlEmitter, DdlSet};
use crate::error::Result;
use crate::source::{Dialect, DialectImpl};

/// Emits `CREATE EXTERNAL TABLE ... ENGINE=mysql` statements with the
/// source connection injected into each rule's external property map.
pub struct StarRocksExternalEmitter;

impl DdlEmitter for StarRocksExternalEmitter {
    fn file_prefix(&self) -> &'static str {
        "starrocks-external-create"
    }

    fn emit(&self, config: &Config, dialect: &DialectImpl, plan: &mut PlanSet) -> Result<DdlSet> {
        let PlanSet { rules, planned } = plan;
        let mut out = DdlSet::for_rules(rules);
        let engine = dialect.external_engine();

        for rule_plan in planned.iter() {
            let rule = &mut rules[rule_plan.rule_index];
            for pb in &rule_plan.bundles {
                let props = &mut rule.external_properties;
                props.insert("host".to_string(), config.source.host.clone());
                props.insert("port".to_string(), config.source.port.to_string());
                props.insert("user".to_string(), config.source.user.clone());
                props.insert("password".to_string(), config.source.password.clone());
                props.insert("database".to_string(), pb.bundle.table.catalog.clone());
                props.insert("table".to_string(), pb.bundle.table.name.clone());

                let database = format!("{}_external_{}", engine, pb.bundle.table.catalog);
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
                    "CREATE EXTERNAL TABLE `{}`.`{}` (\n",
                    database, table_name
                );
                let mut column_defs = Vec::with_capacity(pb.bundle.columns.len());
                for col in &pb.bundle.columns {
                    column_defs.push(dialect.format_warehouse_column(&pb.bundle.table, col)?);
                }
                ddl.push_str(&column_defs.join(",\n"));
                ddl.push_str(&format!("\n) ENGINE={}\n", engine));
                ddl.push_str(&format!("COMMENT \"{}\"\n", pb.bundle.table.comment));
                ddl.push_str(&format!(
                    "PROPERTIES (\n{}\n)",
                    render_properties(&rule.external_properties)
                ));

                out.push(&rule.seq, ddl);
            }
        }
        Ok(out)
    }
}
