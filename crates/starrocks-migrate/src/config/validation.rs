//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.source.host.is_empty() {
        return Err(MigrateError::Config("source.host is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(MigrateError::Config("source.user is required".into()));
    }

    if config.planning.be_num == 0 {
        return Err(MigrateError::Config(
            "planning.be_num must be at least 1".into(),
        ));
    }

    if config.rules.is_empty() {
        return Err(MigrateError::Config(
            "at least one table rule is required".into(),
        ));
    }

    for rule in &config.rules {
        if rule.seq.is_empty() {
            return Err(MigrateError::Config("rules[].seq is required".into()));
        }
        if rule.database.is_empty() {
            return Err(MigrateError::Config(format!(
                "rule [{}]: database pattern is required",
                rule.seq
            )));
        }
        if rule.table.is_empty() {
            return Err(MigrateError::Config(format!(
                "rule [{}]: table pattern is required",
                rule.seq
            )));
        }
        if let Some(0) = rule.bucket_num {
            return Err(MigrateError::Config(format!(
                "rule [{}]: bucket_num must be at least 1",
                rule.seq
            )));
        }
    }

    Ok(())
}
