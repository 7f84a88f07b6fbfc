//! Planning pass: rule matching, shard unification and per-bundle
//! key/partition/bucket planning, producing the structure the DDL
//! emitters render.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::TableRule;
use crate::core::bucket::plan_buckets;
use crate::core::keys::classify_and_reorder;
use crate::core::matcher::group_by_rule;
use crate::core::partition::{plan_partitions, PartitionPlan};
use crate::core::schema::{ColumnMeta, KeyColumnUsage, TableBundle, TableMeta};
use crate::core::unify::unify_shards;

/// A bundle plus everything the emitters need: the selected key columns
/// (bundle columns already reordered accordingly) and the capacity plan.
#[derive(Debug, Clone)]
pub struct PlannedBundle {
    /// The (possibly merged) table bundle with reordered columns.
    pub bundle: TableBundle,

    /// Selected effective key columns, in key order. Empty when no
    /// candidate group is fully non-nullable.
    pub key_columns: Vec<String>,

    /// Partition plan for this bundle.
    pub partition: PartitionPlan,

    /// Computed default bucket count. A rule-level override replaces it
    /// at emit time.
    pub buckets: u64,
}

/// Plans for one rule. The bundle list is empty when the rule matched no
/// tables; it has exactly one entry when the rule's tables were merged as
/// a shard family.
#[derive(Debug, Clone)]
pub struct RulePlan {
    /// Index into [`PlanSet::rules`].
    pub rule_index: usize,

    /// Planned bundles in source order.
    pub bundles: Vec<PlannedBundle>,
}

/// Output of the planning pass, consumed (and property-wise extended) by
/// the DDL emitters.
#[derive(Debug, Clone)]
pub struct PlanSet {
    /// Rules in declaration order. Emitters extend their property maps
    /// monotonically; keys are never removed between emitters.
    pub rules: Vec<TableRule>,

    /// One plan per rule, ordered by rule index.
    pub planned: Vec<RulePlan>,
}

impl PlanSet {
    /// Total number of planned bundles across all rules.
    pub fn bundle_count(&self) -> usize {
        self.planned.iter().map(|p| p.bundles.len()).sum()
    }
}

/// Run the full planning pass.
///
/// Single-threaded and synchronous: one matching pass, one unification
/// pass, one planning pass per bundle.
pub fn plan(
    mut rules: Vec<TableRule>,
    be_num: u64,
    tables: Vec<TableMeta>,
    columns: &[ColumnMeta],
    key_usage: &[KeyColumnUsage],
    now: DateTime<Utc>,
) -> PlanSet {
    let mut map = group_by_rule(&rules, tables, columns, key_usage);
    unify_shards(&mut rules, &mut map);

    let mut planned = Vec::with_capacity(rules.len());
    for (rule_index, bundles) in map {
        let mut planned_bundles = Vec::with_capacity(bundles.len());
        for mut bundle in bundles {
            let key_columns = classify_and_reorder(&mut bundle);
            let partition =
                plan_partitions(bundle.table.data_length, bundle.table.create_time, now);
            let buckets = plan_buckets(partition.basis_bytes, be_num);
            planned_bundles.push(PlannedBundle {
                bundle,
                key_columns,
                partition,
                buckets,
            });
        }
        planned.push(RulePlan {
            rule_index,
            bundles: planned_bundles,
        });
    }

    let set = PlanSet { rules, planned };
    info!(
        rules = set.rules.len(),
        bundles = set.bundle_count(),
        "planning pass complete"
    );
    set
}
