//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database)
//!
//! # Catalog import (CORS, x-api-key)
//! OPTIONS /api/catalog/import       - Preflight
//! POST    /api/catalog/import       - Import brands, collections or products
//!
//! # Catalog
//! GET  /api/brands                  - Brand list (?featured=)
//! GET  /api/brands/{handle}         - Brand storefront
//! GET  /api/collections             - Collection list (?brand=)
//! GET  /api/collections/{handle}    - Collection detail
//! GET  /api/products                - Catalog browser (?brand=&collection=&q=&page=&per_page=)
//! GET  /api/products/{handle}       - Product detail
//!
//! # Experiences (rate limited)
//! POST /api/experiences/quote       - Price an assortment
//! POST /api/experiences/checkout    - Submit an experience order
//! ```

pub mod brands;
pub mod collections;
pub mod experiences;
pub mod health;
pub mod import;
pub mod products;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use atelier_core::Handle;

use crate::error::AppError;
use crate::middleware::{
    api_rate_limiter, checkout_rate_limiter, import_cors_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Parse a path handle; anything unparseable cannot exist.
fn parse_handle(raw: &str) -> Result<Handle, AppError> {
    Handle::parse(raw).map_err(|_| AppError::NotFound(raw.to_owned()))
}

/// Create the catalog import router.
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/catalog/import",
            post(import::import).options(import::preflight),
        )
        .layer(from_fn(import_cors_middleware))
}

/// Create the catalog read routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(brands::index))
        .route("/brands/{handle}", get(brands::show))
        .route("/collections", get(collections::index))
        .route("/collections/{handle}", get(collections::show))
        .route("/products", get(products::index))
        .route("/products/{handle}", get(products::show))
        .layer(api_rate_limiter())
}

/// Create the experience checkout routes router.
pub fn experience_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(experiences::quote))
        .route("/checkout", post(experiences::checkout))
        .layer(checkout_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .nest("/experiences", experience_routes())
        .layer(from_fn(security_headers_middleware));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(import_routes())
        .nest("/api", api)
}
