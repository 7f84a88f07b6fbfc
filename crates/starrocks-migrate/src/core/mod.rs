//! Core planning engine: rule matching, shard unification, key
//! classification and partition/bucket capacity planning.
//!
//! Everything in here is synchronous and works on already-materialized
//! metadata from the introspector; the DB access lives in [`crate::source`]
//! and the DDL rendering in [`crate::emit`].

pub mod bucket;
pub mod keys;
pub mod matcher;
pub mod partition;
pub mod planner;
pub mod schema;
pub mod unify;

pub use partition::{Granularity, PartitionPlan, PartitionRange, GIB};
pub use planner::{plan, PlanSet, PlannedBundle, RulePlan};
pub use schema::{ColumnMeta, KeyColumnUsage, KeyRoles, RuleBundleMap, TableBundle, TableMeta};
pub use unify::{longest_common_xfix, SHARD_SUFFIX};
