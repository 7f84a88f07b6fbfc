//! Shard-family detection and merging.
//!
//! Physically split tables (e.g. `orders_00` .. `orders_31`) that match one
//! rule and share an identical column layout are merged into a single
//! logical bundle under a unified identifier derived from the longest
//! common prefix of the member names.

use tracing::debug;

use crate::config::TableRule;
use crate::core::schema::{RuleBundleMap, TableBundle};

/// Suffix appended to a unified identifier derived from a shard family.
pub const SHARD_SUFFIX: &str = "_auto_shard";

/// Longest common prefix (`prefix == true`) or suffix of a set of strings.
///
/// Seeded with the first string; each subsequent string shrinks the working
/// boundary at the first differing character. Returns the empty string when
/// the list or any member is empty.
pub fn longest_common_xfix(strs: &[&str], prefix: bool) -> String {
    let Some(first) = strs.first() else {
        return String::new();
    };
    let mut xfix: Vec<char> = first.chars().collect();
    for s in &strs[1..] {
        if xfix.is_empty() || s.is_empty() {
            return String::new();
        }
        let chars: Vec<char> = s.chars().collect();
        let max_len = xfix.len().min(chars.len());
        if prefix {
            let mut end = max_len;
            for i in 0..max_len {
                if xfix[i] != chars[i] {
                    end = i;
                    break;
                }
            }
            xfix.truncate(end);
        } else {
            let mut keep = max_len;
            for i in 0..max_len {
                if xfix[xfix.len() - 1 - i] != chars[chars.len() - 1 - i] {
                    keep = i;
                    break;
                }
            }
            xfix.drain(..xfix.len() - keep);
        }
    }
    xfix.into_iter().collect()
}

/// Derive the unified identifier component for a shard family.
///
/// Empty prefix: placeholder plus the shard suffix. Prefix equal to the
/// first member's full string: reused unchanged. Otherwise: prefix plus
/// the shard suffix.
fn unified_component(parts: &[&str], placeholder: &str) -> String {
    let prefix = longest_common_xfix(parts, true);
    if prefix.is_empty() {
        format!("{}{}", placeholder, SHARD_SUFFIX)
    } else if prefix == parts[0] {
        prefix
    } else {
        format!("{}{}", prefix, SHARD_SUFFIX)
    }
}

/// Whether all bundles share the same column count and identical
/// positional (name, type) pairs.
fn structurally_identical(bundles: &[TableBundle]) -> bool {
    let first = &bundles[0];
    bundles[1..].iter().all(|b| {
        b.columns.len() == first.columns.len()
            && b.columns.iter().zip(first.columns.iter()).all(|(a, b)| {
                a.name == b.name && a.column_type == b.column_type
            })
    })
}

/// Detect and merge shard families in place.
///
/// Rules with a single bundle are not families. Rules whose bundles fail
/// the structural-equivalence check revert silently to unmerged per-table
/// bundles. Equivalent families collapse to one bundle carrying the summed
/// size, the earliest creation time and the unified identifier.
pub fn unify_shards(rules: &mut [TableRule], map: &mut RuleBundleMap) {
    for (&rule_idx, bundles) in map.iter_mut() {
        let rule = &mut rules[rule_idx];
        if bundles.len() <= 1 {
            rule.from_shard_family = false;
            continue;
        }
        if !rule.from_shard_family {
            continue;
        }
        if !structurally_identical(bundles) {
            debug!(
                rule = %rule.seq,
                tables = bundles.len(),
                "tables under rule are not structurally identical, keeping them separate"
            );
            rule.from_shard_family = false;
            continue;
        }

        let total_size: u64 = bundles.iter().map(|b| b.table.data_length).sum();
        let first_created = bundles
            .iter()
            .map(|b| b.table.create_time)
            .min()
            .expect("non-empty bundle list");

        let catalogs: Vec<&str> = bundles.iter().map(|b| b.table.catalog.as_str()).collect();
        let schemas: Vec<&str> = bundles.iter().map(|b| b.table.schema.as_str()).collect();
        let names: Vec<&str> = bundles.iter().map(|b| b.table.name.as_str()).collect();
        let catalog = unified_component(&catalogs, "db");
        let schema = unified_component(&schemas, "schema");
        let name = unified_component(&names, "table");

        let mut merged = bundles.swap_remove(0);
        merged.table.data_length = total_size;
        merged.table.create_time = first_created;
        merged.rewrite_identifier(&catalog, &schema, &name);

        debug!(
            rule = %rule.seq,
            table = %name,
            size = total_size,
            "merged shard family"
        );
        *bundles = vec![merged];
    }
}
