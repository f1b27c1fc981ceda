//! Brand repository.

use sqlx::PgPool;

use atelier_core::{BrandId, Handle};

use super::RepositoryError;
use crate::models::catalog::{Brand, BrandSummary};

const BRAND_COLUMNS: &str = "id, handle, name, description, logo_url, banner_url, website_url, \
     country, founded_year, is_featured, tags, created_at, updated_at";

/// Repository for brand reads.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List brands ordered by name, optionally only (non-)featured ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, featured: Option<bool>) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands \
             WHERE ($1::boolean IS NULL OR is_featured = $1) \
             ORDER BY name, id"
        ))
        .bind(featured)
        .fetch_all(self.pool)
        .await?;
        Ok(brands)
    }

    /// Get a brand by handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_handle(&self, handle: &Handle) -> Result<Option<Brand>, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE handle = $1"
        ))
        .bind(handle)
        .fetch_optional(self.pool)
        .await?;
        Ok(brand)
    }

    /// Get the summary of a brand by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, id: BrandId) -> Result<Option<BrandSummary>, RepositoryError> {
        let summary = sqlx::query_as::<_, BrandSummary>(
            "SELECT id, handle, name, logo_url FROM brands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(summary)
    }
}
