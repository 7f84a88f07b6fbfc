//! Rule matching: assigns each source table to at most one migration rule.

use crate::config::TableRule;
use crate::core::schema::{ColumnMeta, KeyColumnUsage, RuleBundleMap, TableBundle, TableMeta};

/// Test a rule pattern against an identifier component.
///
/// Patterns are unanchored substring matches unless they carry `^`/`$`
/// anchors. The `regex` engine is tried first; patterns it cannot compile
/// (backreferences, lookarounds) fall back to `fancy-regex`. A pattern
/// neither engine accepts matches nothing.
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(value),
        Err(_) => fancy_regex::Regex::new(pattern)
            .ok()
            .and_then(|re| re.is_match(value).ok())
            .unwrap_or(false),
    }
}

/// Select the rule for a table: the *last* rule in declaration order whose
/// database, schema and table patterns all match. Returns `None` when no
/// rule matches; such tables are dropped silently.
pub fn match_rule(rules: &[TableRule], table: &TableMeta) -> Option<usize> {
    let mut matched = None;
    for (idx, rule) in rules.iter().enumerate() {
        if pattern_matches(&rule.database, &table.catalog)
            && pattern_matches(&rule.schema, &table.schema)
            && pattern_matches(&rule.table, &table.name)
        {
            matched = Some(idx);
        }
    }
    matched
}

/// Whether a constraint name denotes the primary key.
///
/// MySQL-family sources name the primary constraint `PRIMARY`; SQL Server
/// style sources generate `PK__`-prefixed names.
pub fn is_primary_constraint(name: &str) -> bool {
    name == "PRIMARY" || name.starts_with("PK__")
}

/// Group introspected tables into per-rule bundles.
///
/// Each bundle carries the table's columns (ordinal order) and its key
/// entries split into primary and unique groups. Every rule index appears
/// in the result, possibly with an empty bundle list.
pub fn group_by_rule(
    rules: &[TableRule],
    tables: Vec<TableMeta>,
    columns: &[ColumnMeta],
    key_usage: &[KeyColumnUsage],
) -> RuleBundleMap {
    let mut map: RuleBundleMap = (0..rules.len()).map(|idx| (idx, Vec::new())).collect();

    for table in tables {
        let Some(rule_idx) = match_rule(rules, &table) else {
            continue;
        };

        let table_columns: Vec<ColumnMeta> = columns
            .iter()
            .filter(|col| table.owns(&col.catalog, &col.schema, &col.table))
            .cloned()
            .collect();

        let mut primary_keys = Vec::new();
        let mut unique_keys = Vec::new();
        for kcu in key_usage {
            if !table.owns(&kcu.catalog, &kcu.schema, &kcu.table) {
                continue;
            }
            if is_primary_constraint(&kcu.constraint_name) {
                primary_keys.push(kcu.clone());
            } else {
                unique_keys.push(kcu.clone());
            }
        }

        map.entry(rule_idx).or_default().push(TableBundle {
            table,
            columns: table_columns,
            primary_keys,
            unique_keys,
        });
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::TableMeta;
    use chrono::{TimeZone, Utc};

    fn table(catalog: &str, schema: &str, name: &str) -> TableMeta {
        TableMeta {
            catalog: catalog.to_string(),
            schema: schema.to_string(),
            name: name.to_string(),
            engine: "InnoDB".to_string(),
            data_length: 0,
            create_time: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            comment: String::new(),
        }
    }

    fn rule(seq: &str, database: &str, table: &str) -> TableRule {
        TableRule {
            seq: seq.to_string(),
            database: database.to_string(),
            schema: ".*".to_string(),
            table: table.to_string(),
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
    fn test_substring_match_unanchored() {
        assert!(pattern_matches("orders", "app_orders_00"));
        assert!(pattern_matches("^app", "app_orders"));
        assert!(!pattern_matches("^orders", "app_orders"));
        assert!(pattern_matches("00$", "orders_00"));
    }

    #[test]
    fn test_fallback_engine_handles_lookahead() {
        // regex cannot compile lookarounds; fancy-regex can.
        assert!(pattern_matches("orders_(?!archive)", "orders_00"));
        assert!(!pattern_matches("orders_(?!archive)", "orders_archive"));
    }

    #[test]
    fn test_invalid_in_both_engines_matches_nothing() {
        assert!(!pattern_matches("(", "anything"));
    }

    #[test]
    fn test_last_matching_rule_wins() {
        let rules = vec![
            rule("01", "app", ".*"),
            rule("02", "app", "orders"),
            rule("03", "other", ".*"),
        ];
        let t = table("app", "app", "orders_00");
        assert_eq!(match_rule(&rules, &t), Some(1));
    }

    #[test]
    fn test_unmatched_table_is_none() {
        let rules = vec![rule("01", "^crm$", ".*")];
        let t = table("app", "app", "orders");
        assert_eq!(match_rule(&rules, &t), None);
    }

    #[test]
    fn test_primary_constraint_convention() {
        assert!(is_primary_constraint("PRIMARY"));
        assert!(is_primary_constraint("PK__orders__1234"));
        assert!(!is_primary_constraint("uk_orders_code"));
    }

    #[test]
    fn test_group_by_rule_keeps_empty_rules() {
        let rules = vec![rule("01", "app", "orders"), rule("02", "crm", ".*")];
        let tables = vec![table("app", "app", "orders_00")];
        let map = group_by_rule(&rules, tables, &[], &[]);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&0].len(), 1);
        assert!(map[&1].is_empty());
    }

    #[test]
    fn test_unmatched_table_dropped_silently() {
        let rules = vec![rule("01", "^crm$", ".*")];
        let tables = vec![table("app", "app", "orders")];
        let map = group_by_rule(&rules, tables, &[], &[]);
        assert!(map[&0].is_empty());
    }
}
