//! Brand route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use super::parse_handle;
use crate::error::Result;
use crate::models::catalog::{Brand, BrandStorefront};
use crate::state::AppState;

/// Query parameters for the brand list.
#[derive(Debug, Default, Deserialize)]
pub struct BrandListQuery {
    pub featured: Option<bool>,
}

/// `GET /api/brands` - all brands ordered by name.
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<BrandListQuery>, QueryRejection>,
) -> Result<Json<Arc<Vec<Brand>>>> {
    let Query(query) = query?;
    let brands = state.catalog().brands(query.featured).await?;
    Ok(Json(brands))
}

/// `GET /api/brands/{handle}` - brand storefront.
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Arc<BrandStorefront>>> {
    let handle = parse_handle(&handle)?;
    let storefront = state.catalog().brand_storefront(&handle).await?;
    Ok(Json(storefront))
}
