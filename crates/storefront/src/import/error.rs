//! Import error types and database error classification.

use axum::http::StatusCode;
use thiserror::Error;

use atelier_core::HandleError;

/// Why a single record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("record must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    Missing(String),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}` must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("field `{field}` must contain at most {max} items")]
    TooManyItems { field: String, max: usize },

    #[error("field `{field}` is out of range")]
    OutOfRange { field: String },

    #[error("field `{field}` is not a valid handle: {source}")]
    InvalidHandle {
        field: String,
        #[source]
        source: HandleError,
    },

    #[error("field `{field}` is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

/// Errors raised while running a catalog import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid or missing type: expected one of brands, collections, products")]
    InvalidType,

    #[error("Field data must be an array")]
    DataNotArray,

    #[error("Too many records: {count} (maximum {max})")]
    TooManyRecords { count: usize, max: usize },

    #[error("Invalid record at index {index}: {error}")]
    InvalidRecord { index: usize, error: FieldError },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ImportError {
    /// Index of the offending record, for validation failures.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::InvalidRecord { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Generic category a database failure is reported as.
///
/// Database error text is never returned to the caller; only the
/// category message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCategory {
    Duplicate,
    MissingField,
    MissingReference,
    Validation,
    Other,
}

impl DbErrorCategory {
    /// Classify a sqlx error by its `SQLSTATE`.
    #[must_use]
    pub fn classify(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => Self::from_sqlstate(db_err.code().as_deref()),
            _ => Self::Other,
        }
    }

    /// Classify a raw `SQLSTATE` code.
    #[must_use]
    pub fn from_sqlstate(code: Option<&str>) -> Self {
        match code {
            Some("23505") => Self::Duplicate,
            Some("23502") => Self::MissingField,
            Some("23503") => Self::MissingReference,
            Some("23514") => Self::Validation,
            Some(code) if code.starts_with("22") => Self::Validation,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Duplicate => StatusCode::CONFLICT,
            Self::MissingField | Self::MissingReference | Self::Validation => {
                StatusCode::BAD_REQUEST
            }
            Self::Other => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Duplicate => "Duplicate record: a record with this handle already exists",
            Self::MissingField => "Missing required field",
            Self::MissingReference => "Referenced record does not exist",
            Self::Validation => "Data validation failed",
            Self::Other => "Import operation failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_categories() {
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("23505")),
            DbErrorCategory::Duplicate
        );
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("23502")),
            DbErrorCategory::MissingField
        );
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("23503")),
            DbErrorCategory::MissingReference
        );
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("23514")),
            DbErrorCategory::Validation
        );
        // numeric_value_out_of_range, string_data_right_truncation
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("22003")),
            DbErrorCategory::Validation
        );
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("22001")),
            DbErrorCategory::Validation
        );
        assert_eq!(
            DbErrorCategory::from_sqlstate(Some("40001")),
            DbErrorCategory::Other
        );
        assert_eq!(DbErrorCategory::from_sqlstate(None), DbErrorCategory::Other);
    }

    #[test]
    fn test_non_database_errors_are_generic() {
        let category = DbErrorCategory::classify(&sqlx::Error::PoolTimedOut);
        assert_eq!(category, DbErrorCategory::Other);
        assert_eq!(category.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(category.message(), "Import operation failed");
    }

    #[test]
    fn test_duplicate_is_conflict() {
        assert_eq!(DbErrorCategory::Duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(
            DbErrorCategory::MissingReference.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_record_message_names_index() {
        let err = ImportError::InvalidRecord {
            index: 3,
            error: FieldError::Missing("handle".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "Invalid record at index 3: missing required field `handle`"
        );
        assert_eq!(err.index(), Some(3));
        assert_eq!(ImportError::DataNotArray.index(), None);
    }
}
