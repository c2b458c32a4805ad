//! Error types for the migration library.

use thiserror::Error;

/// Main error type for schema and migration operations.
#[derive(Error, Debug)]
pub enum WeaveError {
    /// Configuration error (missing file, missing profile, unknown engine, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A declared dependency does not exist in the current schema
    #[error("Unknown dependency {requirement} at {declared_by}")]
    UnknownDependency {
        requirement: String,
        declared_by: String,
    },

    /// The schema dependency relation contains a cycle
    #[error("Circular dependency:\n  {}", path.join(" >\n  "))]
    CircularDependency { path: Vec<String> },

    /// A statement batch failed during apply or revert; the transaction was rolled back
    #[error("Migration {migration} failed, rolled back: {message}")]
    Statement { migration: String, message: String },

    /// A revert was requested but cannot be performed
    #[error("{0}")]
    Irreversible(String),

    /// PostgreSQL driver error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// MySQL driver error
    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql_async::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (reading definition files, writing migration artifacts)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WeaveError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl Into<String>, context: impl Into<String>) -> Self {
        WeaveError::Pool {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a Statement error for a failed migration
    pub fn statement(migration: impl Into<String>, message: impl Into<String>) -> Self {
        WeaveError::Statement {
            migration: migration.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            WeaveError::Config(_) => 1,
            WeaveError::UnknownDependency { .. } | WeaveError::CircularDependency { .. } => 2,
            WeaveError::Statement { .. } => 3,
            WeaveError::Irreversible(_) => 4,
            WeaveError::Yaml(_) | WeaveError::Json(_) => 5,
            WeaveError::Postgres(_) | WeaveError::Mysql(_) | WeaveError::Pool { .. } => 6,
            WeaveError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
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
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, WeaveError>;
