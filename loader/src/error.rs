//! Error types for record loading and saving.
//!
//! - [`LoadError`] - I/O, parse and conversion failures while decoding or encoding records
//! - [`SchemaError`] - Invalid schema tables, tags and schema files
//! - [`CliError`] - Top-level errors of the `recordload` binary
//!
//! Every failure is fatal to the current call. Conversion is automatic via
//! `From` implementations, so `?` works across module boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors raised while decoding or encoding a batch of records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input stream could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record is syntactically malformed.
    #[error("Parse error at record {record}: {message}")]
    Parse { record: usize, message: String },

    /// A wire value cannot be coerced to the field's scalar kind.
    #[error("Conversion error at record {record}, field '{field}' (value {value}): {message}")]
    Conversion {
        record: usize,
        field: String,
        value: String,
        message: String,
    },

    /// The input bytes could not be decoded with the requested encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// JSON serialization failure while encoding.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    pub fn parse(record: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            record,
            message: message.into(),
        }
    }

    pub fn conversion(
        record: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            record,
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        let record = err
            .position()
            .map(|p| p.record() as usize + 1)
            .unwrap_or_default();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => LoadError::Io(io),
            csv::ErrorKind::Utf8 { pos, err } => LoadError::parse(
                pos.map(|p| p.record() as usize + 1).unwrap_or(record),
                format!("invalid UTF-8 in field {}", err.field()),
            ),
            other => LoadError::parse(record, format!("{:?}", other)),
        }
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors in a schema table or schema file.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema has no fields.
    #[error("Schema '{0}' declares no fields")]
    Empty(String),

    /// Field name is empty.
    #[error("Field #{0} has an empty name")]
    EmptyName(usize),

    /// Two fields share a name.
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// Two serialized fields share a wire name.
    #[error("Duplicate wire name '{wire}' (fields '{first}' and '{second}')")]
    DuplicateWireName {
        wire: String,
        first: String,
        second: String,
    },

    /// Tag string could not be parsed.
    #[error("Invalid tag '{tag}' on field '{field}': {message}")]
    InvalidTag {
        field: String,
        tag: String,
        message: String,
    },

    /// Schema file failed structural validation.
    #[error("Invalid schema file: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// IO error.
    #[error("Schema IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Schema JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// CLI Errors (top-level)
// =============================================================================

/// Errors surfaced by the `recordload` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or saving records failed.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Schema could not be used.
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// Writing output failed.
    #[error("Cannot write output: {0}")]
    Output(#[from] std::io::Error),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load and save operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
