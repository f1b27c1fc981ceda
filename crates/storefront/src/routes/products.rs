//! Product route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use atelier_core::Handle;

use super::parse_handle;
use crate::error::Result;
use crate::models::catalog::{ProductDetail, ProductFilter, ProductPage};
use crate::services::catalog::DEFAULT_PER_PAGE;
use crate::state::AppState;

/// Query parameters for the catalog browser.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub brand: Option<Handle>,
    pub collection: Option<Handle>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductListQuery {
    fn filter(self) -> ProductFilter {
        ProductFilter {
            brand: self.brand,
            collection: self.collection,
            search: self.q.filter(|q| !q.trim().is_empty()),
        }
    }
}

/// `GET /api/products` - one page of published products.
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<ProductPage>> {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    let page = state
        .catalog()
        .products(&query.filter(), page, per_page)
        .await?;
    Ok(Json(page))
}

/// `GET /api/products/{handle}` - product with images and variants.
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Arc<ProductDetail>>> {
    let handle = parse_handle(&handle)?;
    let detail = state.catalog().product_detail(&handle).await?;
    Ok(Json(detail))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ProductListQuery {
            q: Some("   ".to_owned()),
            ..ProductListQuery::default()
        };
        assert_eq!(query.filter(), ProductFilter::default());

        let query = ProductListQuery {
            brand: Some(Handle::parse("maison-verre").unwrap()),
            q: Some("coat".to_owned()),
            ..ProductListQuery::default()
        };
        let filter = query.filter();
        assert_eq!(filter.brand.unwrap().as_str(), "maison-verre");
        assert_eq!(filter.search.as_deref(), Some("coat"));
    }
}
