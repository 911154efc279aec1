//! Error types for fieldlog.
//!
//! This module defines all error types used throughout the fieldlog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fieldlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Record Errors ===
    /// No record exists at the given index or with the given id.
    #[error("{kind} record not found: {locator}")]
    RecordNotFound {
        /// Kind of record that was looked up.
        kind: &'static str,
        /// The id or index that was requested.
        locator: String,
    },

    /// A fire incident already carries the maximum number of photos.
    #[error("maximum of {limit} photos allowed")]
    PhotoLimit {
        /// The configured photo limit.
        limit: usize,
    },

    /// A filter or sort value could not be parsed.
    #[error("invalid {field} value: '{value}'")]
    InvalidFilter {
        /// Which filter field was being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A form value is not one of the configured choices.
    #[error("unknown {field} '{value}' (choose from: {allowed})")]
    UnknownChoice {
        /// Which form field was being set.
        field: &'static str,
        /// The rejected input.
        value: String,
        /// The accepted values, comma separated.
        allowed: String,
    },

    // === Server Errors ===
    /// The health server failed to bind or serve.
    #[error("server error: {0}")]
    Server(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fieldlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a record-not-found error.
    #[must_use]
    pub fn record_not_found(kind: &'static str, locator: impl ToString) -> Self {
        Self::RecordNotFound {
            kind,
            locator: locator.to_string(),
        }
    }

    /// Create an invalid filter value error.
    #[must_use]
    pub fn invalid_filter(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFilter {
            field,
            value: value.into(),
        }
    }

    /// Create an unknown-choice error listing the accepted values.
    #[must_use]
    pub fn unknown_choice(
        field: &'static str,
        value: impl Into<String>,
        allowed: &[String],
    ) -> Self {
        Self::UnknownChoice {
            field,
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Create a new server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error indicates a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_display() {
        let err = Error::record_not_found("fire", 4);
        assert_eq!(err.to_string(), "fire record not found: 4");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_is_not_found_false_for_other_errors() {
        assert!(!Error::internal("boom").is_not_found());
        assert!(!Error::PhotoLimit { limit: 3 }.is_not_found());
    }

    #[test]
    fn test_photo_limit_display() {
        let err = Error::PhotoLimit { limit: 3 };
        assert_eq!(err.to_string(), "maximum of 3 photos allowed");
    }

    #[test]
    fn test_invalid_filter_display() {
        let err = Error::invalid_filter("date filter", "yesterday");
        let msg = err.to_string();
        assert!(msg.contains("date filter"));
        assert!(msg.contains("yesterday"));
    }

    #[test]
    fn test_unknown_choice_display() {
        let allowed = vec!["Arrival".to_string(), "Transport".to_string()];
        let err = Error::unknown_choice("EMT event", "Lunch", &allowed);
        assert_eq!(
            err.to_string(),
            "unknown EMT event 'Lunch' (choose from: Arrival, Transport)"
        );
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_server_error() {
        let err = Error::server("address in use");
        assert_eq!(err.to_string(), "server error: address in use");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "max_photos must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("max_photos"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
