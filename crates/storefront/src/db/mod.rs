//! Database operations for the marketplace `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `brands`, `collections`, `products` - Catalog entities, unique by `handle`
//! - `product_images`, `product_variants` - Product child rows, ordered by `position`
//! - `product_collections` - Product/collection junction, ordered by `position`
//! - `experience_orders`, `experience_order_items` - Experience checkout submissions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded in
//! [`MIGRATOR`] and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod brands;
pub mod collections;
pub mod experiences;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use brands::BrandRepository;
pub use collections::CollectionRepository;
pub use experiences::ExperienceOrderRepository;
pub use products::ProductRepository;

/// Embedded storefront migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate order reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
