//! DDL emitters: render a plan into target-system statement lists.
//!
//! Emitters run in a fixed order and may extend a rule's property maps;
//! keys are only ever added, never removed, so later emitters observe the
//! earlier ones' additions.

pub mod external;
pub mod flink;
pub mod starrocks;

pub use external::StarRocksExternalEmitter;
pub use flink::FlinkEmitter;
pub use starrocks::StarRocksEmitter;

use std::collections::BTreeMap;

use crate::config::Config;
use crate::core::planner::PlanSet;
use crate::error::Result;
use crate::source::DialectImpl;

/// Rendered statements for one emitter: everything in emission order plus
/// the per-rule slices keyed by rule seq.
#[derive(Debug, Clone, Default)]
pub struct DdlSet {
    /// All statements in emission order, database statements deduplicated.
    pub all: Vec<String>,

    /// Statements per rule seq. Every rule gets an entry, matched or not.
    pub per_rule: BTreeMap<String, Vec<String>>,
}

impl DdlSet {
    /// Initialise with one empty slot per rule seq.
    fn for_rules(rules: &[crate::config::TableRule]) -> Self {
        let per_rule = rules
            .iter()
            .map(|r| (r.seq.clone(), Vec::new()))
            .collect();
        Self {
            all: Vec::new(),
            per_rule,
        }
    }

    /// Push a statement into the global list and the rule's slice, skipping
    /// duplicates in either scope. Used for CREATE DATABASE statements.
    fn push_dedup(&mut self, seq: &str, stmt: String) {
        if !self.all.contains(&stmt) {
            self.all.push(stmt.clone());
        }
        let ruled = self.per_rule.entry(seq.to_string()).or_default();
        if !ruled.contains(&stmt) {
            ruled.push(stmt);
        }
    }

    fn push(&mut self, seq: &str, stmt: String) {
        self.all.push(stmt.clone());
        self.per_rule.entry(seq.to_string()).or_default().push(stmt);
    }
}

/// One DDL family renderer.
pub trait DdlEmitter {
    /// Result file name prefix (e.g. "starrocks-create").
    fn file_prefix(&self) -> &'static str;

    /// Render every planned bundle. Receives the plan mutably because
    /// emitters record computed properties back onto the rules.
    fn emit(&self, config: &Config, dialect: &DialectImpl, plan: &mut PlanSet) -> Result<DdlSet>;
}

/// Quote and comma-join identifier names: `` `a`, `b` ``.
fn quote_join(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a PROPERTIES block body with double-quoted pairs.
fn render_properties(props: &BTreeMap<String, String>) -> String {
    props
        .iter()
        .map(|(k, v)| format!("  \"{}\" = \"{}\"", k, v))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Render a Flink `with (...)` body with single-quoted pairs.
fn render_with_props(props: &BTreeMap<String, String>) -> String {
    props
        .iter()
        .map(|(k, v)| format!("  '{}' = '{}'", k, v))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// The table name as emitted: schema-prefixed for merged shard families and
/// for dialects with a real schema level, bare otherwise.
fn emitted_table_name(
    from_shard_family: bool,
    combine_schema_name: bool,
    table: &crate::core::schema::TableMeta,
) -> String {
    if from_shard_family || combine_schema_name {
        table.schema_prefixed_name()
    } else {
        table.name.clone()
    }
}
