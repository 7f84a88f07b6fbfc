//! Generation orchestrator - main workflow coordinator.
//!
//! Connects to the source, introspects, runs the planning pass, renders
//! every DDL family the dialect supports and writes the result files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::planner::plan;
use crate::emit::{DdlEmitter, DdlSet, FlinkEmitter, StarRocksEmitter, StarRocksExternalEmitter};
use crate::error::{MigrateError, Result};
use crate::source::{connect, Dialect, EmitterKind};

/// Result of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Tables introspected from the source.
    pub tables_introspected: usize,

    /// Planned bundles after shard unification.
    pub bundles_planned: usize,

    /// Configured rules.
    pub rules: usize,

    /// Statements rendered across all emitters.
    pub statements: usize,

    /// Result files written.
    pub files_written: usize,

    /// Output directory.
    pub output_dir: PathBuf,
}

/// DDL generation orchestrator.
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full generation workflow.
    pub async fn run(self) -> Result<RunSummary> {
        let started_at = Utc::now();

        let source = connect(&self.config).await?;
        let snapshot = source.snapshot().await?;
        let dialect = source.dialect().await?;
        source.close().await;
        info!(dialect = dialect.name(), "source introspection complete");

        let tables_introspected = snapshot.tables.len();
        let mut plan_set = plan(
            self.config.rules.clone(),
            self.config.planning.be_num,
            snapshot.tables,
            &snapshot.columns,
            &snapshot.key_usage,
            started_at,
        );
        if plan_set.bundle_count() == 0 {
            return Err(MigrateError::Introspection(
                "no tables matched any rule; check the rule patterns".to_string(),
            ));
        }

        let output_dir = PathBuf::from(&self.config.output.dir);
        reset_output_dir(&output_dir)?;

        let mut statements = 0;
        let mut files_written = 0;
        for kind in dialect.emitters() {
            let emitter: Box<dyn DdlEmitter> = match kind {
                EmitterKind::StarRocks => Box::new(StarRocksEmitter),
                EmitterKind::StarRocksExternal => Box::new(StarRocksExternalEmitter),
                EmitterKind::Flink => Box::new(FlinkEmitter),
            };
            let ddl = emitter.emit(&self.config, &dialect, &mut plan_set)?;
            statements += ddl.all.len();
            files_written += write_result_files(&output_dir, emitter.file_prefix(), &ddl)?;
            info!(
                emitter = emitter.file_prefix(),
                statements = ddl.all.len(),
                "rendered DDL"
            );
        }

        let summary = RunSummary {
            started_at,
            duration_seconds: (Utc::now() - started_at).num_milliseconds() as f64 / 1000.0,
            tables_introspected,
            bundles_planned: plan_set.bundle_count(),
            rules: plan_set.rules.len(),
            statements,
            files_written,
            output_dir,
        };
        info!(
            tables = summary.tables_introspected,
            bundles = summary.bundles_planned,
            statements = summary.statements,
            files = summary.files_written,
            "generation complete"
        );
        Ok(summary)
    }

}

/// Recreate the output directory. Stale files from a previous run would
/// otherwise mix with the new result set.
fn reset_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!(?dir, "removing previous result directory");
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Write `<prefix>.all.sql` plus one `<prefix>.<seq>.sql` per rule that
/// produced statements. Returns the number of files written.
fn write_result_files(dir: &Path, prefix: &str, ddl: &DdlSet) -> Result<usize> {
    let mut written = 0;
    if !ddl.all.is_empty() {
        std::fs::write(dir.join(format!("{}.all.sql", prefix)), join_statements(&ddl.all))?;
        written += 1;
    }
    for (seq, statements) in &ddl.per_rule {
        if statements.is_empty() {
            continue;
        }
        std::fs::write(
            dir.join(format!("{}.{}.sql", prefix, seq)),
            join_statements(statements),
        )?;
        written += 1;
    }
    Ok(written)
}

fn join_statements(statements: &[String]) -> String {
    let mut out = statements.join(";\n\n");
    out.push_str(";\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_statements() {
        let stmts = vec!["CREATE DATABASE `a`".to_string(), "CREATE TABLE t".to_string()];
        assert_eq!(
            join_statements(&stmts),
            "CREATE DATABASE `a`;\n\nCREATE TABLE t;\n"
        );
    }

    #[test]
    fn test_write_result_files_skips_empty_rules() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        let mut ddl = DdlSet::default();
        ddl.all.push("CREATE DATABASE `a`".to_string());
        ddl.per_rule.insert("01".to_string(), vec!["CREATE DATABASE `a`".to_string()]);
        ddl.per_rule.insert("02".to_string(), Vec::new());

        let written = write_result_files(dir, "starrocks-create", &ddl).unwrap();
        assert_eq!(written, 2);
        assert!(dir.join("starrocks-create.all.sql").exists());
        assert!(dir.join("starrocks-create.01.sql").exists());
        assert!(!dir.join("starrocks-create.02.sql").exists());

        let content = std::fs::read_to_string(dir.join("starrocks-create.all.sql")).unwrap();
        assert_eq!(content, "CREATE DATABASE `a`;\n");
    }
}
