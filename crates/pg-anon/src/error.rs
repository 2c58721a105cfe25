//! Error types for the anonymization library.

use thiserror::Error;

/// Main error type for anonymization operations.
#[derive(Error, Debug)]
pub enum AnonError {
    /// Policy or connection configuration error (invalid YAML, missing
    /// fields, malformed table name, unsupported version, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A mutating statement failed for a specific table
    #[error("Execution failed for table {table}: {message}")]
    Execution { table: String, message: String },

    /// Safeguard gate veto: estimated affected rows exceed the cap
    #[error("Safety cap exceeded: would affect {total} rows (cap={cap}). Re-run with --force if intended.")]
    CapExceeded { total: u64, cap: u64 },

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnonError {
    /// Create an Execution error with table context
    pub fn execution(table: impl Into<String>, message: impl Into<String>) -> Self {
        AnonError::Execution {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnonError::Config(_) => 2,
            AnonError::CapExceeded { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
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

/// Result type alias for anonymization operations.
pub type Result<T> = std::result::Result<T, AnonError>;
