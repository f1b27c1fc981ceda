//! File-based catalog import.
//!
//! # Usage
//!
//! ```bash
//! # A bare array needs the record type
//! atelier import --type collections --file collections.json
//!
//! # An envelope carries its own type
//! atelier import --file import.json
//! ```
//!
//! Records go through the same validation and single-transaction write as
//! `POST /api/catalog/import`. Running servers keep serving cached catalog
//! reads until their cache TTL expires.

use std::path::Path;

use atelier_storefront::db;
use atelier_storefront::import::{self, ImportError, ImportKind};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during a file import.
#[derive(Debug, Error)]
pub enum ImportCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: STOREFRONT_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// A bare array was given without `--type`.
    #[error("--type is required when the file holds a bare array")]
    MissingType,

    /// `--type` disagrees with the envelope.
    #[error("--type {flag} does not match the file's type {file}")]
    TypeMismatch { flag: ImportKind, file: ImportKind },

    /// Validation or database failure.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Import the records in `file`.
///
/// # Returns
///
/// The number of records written.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any record is
/// invalid, or the write fails. Nothing is written on error.
pub async fn run(kind: Option<&str>, file: &Path) -> Result<usize, ImportCommandError> {
    let kind = kind.map(str::parse::<ImportKind>).transpose()?;
    let path = file.display().to_string();

    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| ImportCommandError::Read {
            path: path.clone(),
            source,
        })?;
    let payload: Value =
        serde_json::from_slice(&bytes).map_err(|source| ImportCommandError::Json {
            path: path.clone(),
            source,
        })?;

    let (kind, data) = split_payload(kind, payload)?;
    let batch = import::prepare(kind, &data)?;
    tracing::info!(kind = %kind, count = batch.len(), file = %path, "Records validated");

    if batch.is_empty() {
        tracing::info!("Nothing to import");
        return Ok(0);
    }

    let database_url = super::database_url().ok_or(ImportCommandError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;
    let count = import::run(&pool, &batch).await?;

    tracing::info!(kind = %kind, count, "Catalog import complete");
    Ok(count)
}

/// Resolve the record type and records from a bare array or an envelope.
fn split_payload(
    flag: Option<ImportKind>,
    payload: Value,
) -> Result<(ImportKind, Vec<Value>), ImportCommandError> {
    match payload {
        Value::Array(data) => {
            let kind = flag.ok_or(ImportCommandError::MissingType)?;
            import::check_record_count(data.len())?;
            Ok((kind, data))
        }
        envelope => {
            let (file, data) = import::parse_envelope(envelope)?;
            match flag {
                Some(flag) if flag != file => Err(ImportCommandError::TypeMismatch { flag, file }),
                _ => Ok((file, data)),
            }
        }
    }
}
