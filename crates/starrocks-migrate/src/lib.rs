//! # starrocks-migrate
//!
//! Schema migration planning library for StarRocks.
//!
//! Introspects a source database (MySQL or TiDB), matches tables against
//! user-declared rules and generates the DDL needed to move them into a
//! StarRocks warehouse:
//!
//! - **Native table DDL** with computed partition and bucket plans
//! - **External table DDL** querying the source in place
//! - **Flink CDC pipeline DDL** (source/sink pairs plus INSERT jobs)
//! - **Shard unification** merging structurally identical sharded tables
//!   into a single target table
//!
//! ## Example
//!
//! ```rust,no_run
//! use starrocks_migrate::{Config, Orchestrator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let summary = Orchestrator::new(config).run().await?;
//!     println!("Wrote {} result files", summary.files_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod emit;
pub mod error;
pub mod orchestrator;
pub mod source;

// Re-exports for convenient access
pub use config::{Config, PlanningConfig, SourceConfig, SourceKind, TableRule};
pub use error::{MigrateError, Result};
pub use orchestrator::{Orchestrator, RunSummary};
pub use source::{Dialect, DialectImpl, SchemaSource, SourceSnapshot};
