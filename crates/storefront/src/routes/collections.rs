//! Collection route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use atelier_core::Handle;

use super::parse_handle;
use crate::error::Result;
use crate::models::catalog::{Collection, CollectionDetail};
use crate::state::AppState;

/// Query parameters for the collection list.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionListQuery {
    pub brand: Option<Handle>,
}

/// `GET /api/collections` - collections, optionally of one brand.
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<CollectionListQuery>, QueryRejection>,
) -> Result<Json<Vec<Collection>>> {
    let Query(query) = query?;
    let collections = state.catalog().collections(query.brand.as_ref()).await?;
    Ok(Json(collections))
}

/// `GET /api/collections/{handle}` - collection with its brand and products.
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Arc<CollectionDetail>>> {
    let handle = parse_handle(&handle)?;
    let detail = state.catalog().collection_detail(&handle).await?;
    Ok(Json(detail))
}
