//! Collection repository.

use sqlx::PgPool;

use atelier_core::{BrandId, Handle};

use super::RepositoryError;
use crate::models::catalog::Collection;

const COLLECTION_COLUMNS: &str = "c.id, c.handle, c.name, c.brand_id, c.description, c.image_url, \
     c.season, c.year, c.is_featured, c.tags, c.created_at, c.updated_at";

/// Repository for collection reads.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new collection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List collections ordered by name, optionally limited to one brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, brand: Option<&Handle>) -> Result<Vec<Collection>, RepositoryError> {
        let collections = sqlx::query_as::<_, Collection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections c \
             LEFT JOIN brands b ON b.id = c.brand_id \
             WHERE ($1::text IS NULL OR b.handle = $1) \
             ORDER BY c.name, c.id"
        ))
        .bind(brand)
        .fetch_all(self.pool)
        .await?;
        Ok(collections)
    }

    /// List a brand's collections, newest season first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_brand(
        &self,
        brand_id: BrandId,
    ) -> Result<Vec<Collection>, RepositoryError> {
        let collections = sqlx::query_as::<_, Collection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections c \
             WHERE c.brand_id = $1 \
             ORDER BY c.year DESC NULLS LAST, c.name, c.id"
        ))
        .bind(brand_id)
        .fetch_all(self.pool)
        .await?;
        Ok(collections)
    }

    /// Get a collection by handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<Collection>, RepositoryError> {
        let collection = sqlx::query_as::<_, Collection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections c WHERE c.handle = $1"
        ))
        .bind(handle)
        .fetch_optional(self.pool)
        .await?;
        Ok(collection)
    }
}
