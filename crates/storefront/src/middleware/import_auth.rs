//! API key extractor for the catalog import endpoint.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use super::request_id::RequestId;
use crate::config::api_key_matches;
use crate::routes::import::ImportResponseError;
use crate::state::AppState;

/// The HTTP header carrying the import API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor that admits only callers presenting the configured import key.
///
/// Rejects with 500 when no key is configured and 401 when the header is
/// missing or wrong. Runs before the body is read.
#[derive(Debug, Clone, Copy)]
pub struct ImportApiKey;

impl FromRequestParts<AppState> for ImportApiKey {
    type Rejection = ImportResponseError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate);

        let Some(expected) = state.config().import_api_key.as_ref() else {
            tracing::error!(request_id = %request_id, "Import API key is not configured");
            return Err(ImportResponseError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Import API key is not configured",
                request_id,
            ));
        };

        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match presented {
            Some(key) if api_key_matches(expected, key) => Ok(Self),
            _ => {
                tracing::warn!(
                    request_id = %request_id,
                    "Rejected import call with missing or invalid API key"
                );
                Err(ImportResponseError::new(
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized: invalid or missing API key",
                    request_id,
                ))
            }
        }
    }
}
