//! Catalog read service with an in-memory cache.
//!
//! Brand lists, brand storefronts, collection detail and product detail are
//! cached for the configured TTL. Listings with filters go straight to the
//! database. A successful catalog import empties the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use atelier_core::Handle;

use crate::db::{BrandRepository, CollectionRepository, ProductRepository, RepositoryError};
use crate::models::catalog::{
    Brand, BrandStorefront, Collection, CollectionDetail, ProductDetail, ProductFilter, ProductPage,
};

/// Published products shown on a brand storefront.
pub const STOREFRONT_PRODUCT_LIMIT: i64 = 48;

/// Default page size of the catalog browser.
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Largest page size of the catalog browser.
pub const MAX_PER_PAGE: u32 = 96;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Brands { featured: Option<bool> },
    Brand(Handle),
    Collection(Handle),
    Product(Handle),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Brands(Arc<Vec<Brand>>),
    Brand(Arc<BrandStorefront>),
    Collection(Arc<CollectionDetail>),
    Product(Arc<ProductDetail>),
}

/// Catalog reads shared by the JSON API handlers.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { pool, cache }
    }

    /// All brands, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn brands(&self, featured: Option<bool>) -> Result<Arc<Vec<Brand>>, RepositoryError> {
        let key = CacheKey::Brands { featured };
        if let Some(CacheValue::Brands(brands)) = self.cache.get(&key).await {
            debug!("Cache hit for brand list");
            return Ok(brands);
        }

        let brands = Arc::new(BrandRepository::new(&self.pool).list(featured).await?);
        self.cache
            .insert(key, CacheValue::Brands(Arc::clone(&brands)))
            .await;
        Ok(brands)
    }

    /// A brand with its collections and first published products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown handle.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn brand_storefront(
        &self,
        handle: &Handle,
    ) -> Result<Arc<BrandStorefront>, RepositoryError> {
        let key = CacheKey::Brand(handle.clone());
        if let Some(CacheValue::Brand(storefront)) = self.cache.get(&key).await {
            debug!("Cache hit for brand storefront");
            return Ok(storefront);
        }

        let brand = BrandRepository::new(&self.pool)
            .get_by_handle(handle)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let collections = CollectionRepository::new(&self.pool)
            .list_for_brand(brand.id)
            .await?;
        let products = ProductRepository::new(&self.pool)
            .list_for_brand(brand.id, STOREFRONT_PRODUCT_LIMIT)
            .await?;

        let storefront = Arc::new(BrandStorefront {
            brand,
            collections,
            products,
        });
        self.cache
            .insert(key, CacheValue::Brand(Arc::clone(&storefront)))
            .await;
        Ok(storefront)
    }

    /// Collections, optionally of one brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn collections(
        &self,
        brand: Option<&Handle>,
    ) -> Result<Vec<Collection>, RepositoryError> {
        CollectionRepository::new(&self.pool).list(brand).await
    }

    /// A collection with its brand and products in collection order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown handle.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn collection_detail(
        &self,
        handle: &Handle,
    ) -> Result<Arc<CollectionDetail>, RepositoryError> {
        let key = CacheKey::Collection(handle.clone());
        if let Some(CacheValue::Collection(detail)) = self.cache.get(&key).await {
            debug!("Cache hit for collection");
            return Ok(detail);
        }

        let collection = CollectionRepository::new(&self.pool)
            .get_by_handle(handle)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let brand = match collection.brand_id {
            Some(id) => BrandRepository::new(&self.pool).summary(id).await?,
            None => None,
        };
        let products = ProductRepository::new(&self.pool)
            .list_for_collection(collection.id)
            .await?;

        let detail = Arc::new(CollectionDetail {
            collection,
            brand,
            products,
        });
        self.cache
            .insert(key, CacheValue::Collection(Arc::clone(&detail)))
            .await;
        Ok(detail)
    }

    /// One page of the catalog browser. `page` is 1-based.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn products(
        &self,
        filter: &ProductFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepositoryError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let repo = ProductRepository::new(&self.pool);
        let total = repo.count(filter).await?;
        let products = repo.list(filter, i64::from(per_page), offset).await?;

        Ok(ProductPage {
            products,
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
        })
    }

    /// A published product with its brand, images and variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown or unpublished handle.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn product_detail(
        &self,
        handle: &Handle,
    ) -> Result<Arc<ProductDetail>, RepositoryError> {
        let key = CacheKey::Product(handle.clone());
        if let Some(CacheValue::Product(detail)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(detail);
        }

        let repo = ProductRepository::new(&self.pool);
        let product = repo
            .get_by_handle(handle)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let brand = match product.brand_id {
            Some(id) => BrandRepository::new(&self.pool).summary(id).await?,
            None => None,
        };
        let images = repo.images(product.id).await?;
        let variants = repo.variants(product.id).await?;

        let detail = Arc::new(ProductDetail {
            product,
            brand,
            images,
            variants,
        });
        self.cache
            .insert(key, CacheValue::Product(Arc::clone(&detail)))
            .await;
        Ok(detail)
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        debug!("Catalog cache invalidated");
    }
}

fn total_pages(total: i64, per_page: u32) -> i64 {
    if total <= 0 {
        return 0;
    }
    let per_page = i64::from(per_page.max(1));
    (total + per_page - 1) / per_page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 24), 0);
        assert_eq!(total_pages(1, 24), 1);
        assert_eq!(total_pages(24, 24), 1);
        assert_eq!(total_pages(25, 24), 2);
        assert_eq!(total_pages(96, 96), 1);
    }
}
