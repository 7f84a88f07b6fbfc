//! Error types for the schema migration library.

use thiserror::Error;

/// Main error type for schema migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] mysql_async::Error),

    /// Schema introspection returned unusable metadata
    #[error("Introspection failed: {0}")]
    Introspection(String),

    /// Column could not be formatted for the target dialect
    #[error("Cannot format column {column} of {table}: {message}")]
    Format {
        table: String,
        column: String,
        message: String,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MigrateError {
    /// Create a Format error for a specific table column.
    pub fn format(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        MigrateError::Format {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias for schema migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
