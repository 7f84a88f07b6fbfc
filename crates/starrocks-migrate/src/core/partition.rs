//! Partition planning: derives a time granularity and an optional
//! dynamic-partition window from a table's size and age.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use std::collections::BTreeMap;

/// One gibibyte.
pub const GIB: u64 = 1 << 30;

const DAY_SECONDS: i64 = 24 * 3600;

/// Tables below this size stay a single static partition.
const DYNAMIC_PARTITION_THRESHOLD: u64 = 100 * GIB;

/// Prefix for automatically created partitions.
const DYNAMIC_PARTITION_PREFIX: &str = "auto_gen_p_";

/// Trailing partitions kept ahead of the current one.
const DYNAMIC_PARTITION_END: &str = "3";

/// Partition time granularity, selected from the table's daily growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// The `dynamic_partition.time_unit` property value.
    pub fn time_unit(&self) -> &'static str {
        match self {
            Granularity::Day => "DAY",
            Granularity::Month => "MONTH",
            Granularity::Year => "YEAR",
        }
    }

    /// The interval keyword used in a partition range clause.
    pub fn interval_unit(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

/// A bounded partition range: start at the creation date (truncated to the
/// unit boundary), end one unit past now, stepping one unit at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

impl PartitionRange {
    /// Render the range clause body.
    pub fn render(&self) -> String {
        format!(
            "  START (\"{}\") END (\"{}\") EVERY (INTERVAL 1 {})",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            self.granularity.interval_unit()
        )
    }
}

/// The computed partition plan for one table.
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    /// Estimated bytes per partition, consumed by the bucket planner.
    pub basis_bytes: u64,

    /// Selected granularity.
    pub granularity: Granularity,

    /// Dynamic-partition properties. Empty below the size threshold.
    pub dynamic_properties: BTreeMap<String, String>,

    /// Bounded partition range. None below the size threshold.
    pub range: Option<PartitionRange>,
}

/// Compute the partition plan for a table of `data_length` bytes created at
/// `created`, as of `now`.
///
/// Granularity thresholds are strict: a growth rate of exactly 10 GiB/day
/// falls through to MONTH, exactly 1 GiB/day falls through to YEAR.
pub fn plan_partitions(
    data_length: u64,
    created: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PartitionPlan {
    let elapsed = (now.timestamp() - created.timestamp()).max(0);
    let age_days = (elapsed as u64).div_ceil(DAY_SECONDS as u64).max(1);
    let rate = data_length / age_days;

    let granularity = if rate > 10 * GIB {
        Granularity::Day
    } else if rate > GIB {
        Granularity::Month
    } else {
        Granularity::Year
    };

    let basis_bytes = match granularity {
        Granularity::Day => rate,
        Granularity::Month => rate * 30,
        Granularity::Year => rate * 365,
    };

    if data_length < DYNAMIC_PARTITION_THRESHOLD {
        return PartitionPlan {
            basis_bytes,
            granularity,
            dynamic_properties: BTreeMap::new(),
            range: None,
        };
    }

    let mut dynamic_properties = BTreeMap::new();
    dynamic_properties.insert("dynamic_partition.enable".to_string(), "true".to_string());
    dynamic_properties.insert(
        "dynamic_partition.time_unit".to_string(),
        granularity.time_unit().to_string(),
    );
    dynamic_properties.insert(
        "dynamic_partition.end".to_string(),
        DYNAMIC_PARTITION_END.to_string(),
    );
    dynamic_properties.insert(
        "dynamic_partition.prefix".to_string(),
        DYNAMIC_PARTITION_PREFIX.to_string(),
    );

    let created_date = created.date_naive();
    let now_date = now.date_naive();
    let (start, end) = match granularity {
        Granularity::Day => (
            created_date,
            now_date.checked_add_days(Days::new(1)).unwrap_or(now_date),
        ),
        Granularity::Month => (
            created_date.with_day(1).unwrap_or(created_date),
            next_month_start(now_date),
        ),
        Granularity::Year => (
            NaiveDate::from_ymd_opt(created_date.year(), 1, 1).unwrap_or(created_date),
            NaiveDate::from_ymd_opt(now_date.year() + 1, 1, 1).unwrap_or(now_date),
        ),
    };

    PartitionPlan {
        basis_bytes,
        granularity,
        dynamic_properties,
        range: Some(PartitionRange {
            start,
            end,
            granularity,
        }),
    }
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1))
        .and_then(|d| d.with_day(1))
        .unwrap_or(date)
}
