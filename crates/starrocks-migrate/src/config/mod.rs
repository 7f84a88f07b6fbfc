//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.finalize_rules();
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Apply post-load rule defaults.
    ///
    /// Every rule starts as a shard-family candidate (the planner clears
    /// the flag when the matched tables are not structurally identical),
    /// gets the derived `replication_num` property, and - for MySQL-family
    /// sources, which have no schema level - a match-all schema pattern.
    fn finalize_rules(&mut self) {
        let replication_num = self.planning.replication_num().to_string();
        let mysql_family = matches!(self.source.r#type, SourceKind::Mysql | SourceKind::Tidb);
        for rule in &mut self.rules {
            rule.from_shard_family = true;
            rule.properties
                .entry("replication_num".to_string())
                .or_insert_with(|| replication_num.clone());
            if mysql_family || rule.schema.is_empty() {
                rule.schema = ".*".to_string();
            }
        }
    }
}
