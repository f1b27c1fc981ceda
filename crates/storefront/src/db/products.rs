//! Product repository.
//!
//! Only published products are visible through this repository.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use atelier_core::{BrandId, CollectionId, Handle, ProductId};

use super::RepositoryError;
use crate::models::catalog::{Product, ProductCard, ProductFilter, ProductImage, ProductVariant};

const CARD_SELECT: &str = "SELECT p.id, p.handle, p.title, b.name AS brand_name, p.price, \
     p.compare_at_price, p.currency_code, \
     (SELECT i.url FROM product_images i WHERE i.product_id = p.id \
      ORDER BY i.position LIMIT 1) AS image_url \
     FROM products p LEFT JOIN brands b ON b.id = p.brand_id";

const FILTER_WHERE: &str = "WHERE p.is_published \
     AND ($1::text IS NULL OR b.handle = $1) \
     AND ($2::text IS NULL OR EXISTS ( \
         SELECT 1 FROM product_collections pc \
         JOIN collections c ON c.id = pc.collection_id \
         WHERE pc.product_id = p.id AND c.handle = $2)) \
     AND ($3::text IS NULL OR p.title ILIKE $3)";

/// Price data needed to quote an assortment line.
#[derive(Debug, Clone, FromRow)]
pub struct PricingProduct {
    pub id: ProductId,
    pub handle: Handle,
    pub title: String,
    pub price: Option<Decimal>,
    pub currency_code: String,
}

/// Variant price data needed to quote an assortment line.
#[derive(Debug, Clone, FromRow)]
pub struct PricingVariant {
    pub product_id: ProductId,
    pub sku: String,
    pub title: String,
    pub price: Option<Decimal>,
}

/// Repository for product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of published products matching `filter`, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let cards = sqlx::query_as::<_, ProductCard>(&format!(
            "{CARD_SELECT} {FILTER_WHERE} ORDER BY p.title, p.id LIMIT $4 OFFSET $5"
        ))
        .bind(filter.brand.as_ref())
        .bind(filter.collection.as_ref())
        .bind(filter.title_pattern())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        Ok(cards)
    }

    /// Number of published products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM products p LEFT JOIN brands b ON b.id = p.brand_id {FILTER_WHERE}"
        ))
        .bind(filter.brand.as_ref())
        .bind(filter.collection.as_ref())
        .bind(filter.title_pattern())
        .fetch_one(self.pool)
        .await?;
        Ok(total)
    }

    /// Published products of a brand, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_brand(
        &self,
        brand_id: BrandId,
        limit: i64,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let cards = sqlx::query_as::<_, ProductCard>(&format!(
            "{CARD_SELECT} WHERE p.is_published AND p.brand_id = $1 \
             ORDER BY p.title, p.id LIMIT $2"
        ))
        .bind(brand_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(cards)
    }

    /// Published products of a collection, in junction order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_collection(
        &self,
        collection_id: CollectionId,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let cards = sqlx::query_as::<_, ProductCard>(&format!(
            "{CARD_SELECT} JOIN product_collections pc ON pc.product_id = p.id \
             WHERE p.is_published AND pc.collection_id = $1 \
             ORDER BY pc.position, p.id"
        ))
        .bind(collection_id)
        .fetch_all(self.pool)
        .await?;
        Ok(cards)
    }

    /// Get a published product by handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_handle(&self, handle: &Handle) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, handle, title, brand_id, description, product_type, material,
                   price, compare_at_price, currency_code, is_published, tags,
                   created_at, updated_at
            FROM products
            WHERE handle = $1 AND is_published
            ",
        )
        .bind(handle)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Images of a product, by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT id, url, alt_text, position FROM product_images \
             WHERE product_id = $1 ORDER BY position",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(images)
    }

    /// Variants of a product, by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, title, sku, size, color, price, inventory_quantity, position \
             FROM product_variants WHERE product_id = $1 ORDER BY position",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(variants)
    }

    /// Price data of the published products among `handles`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pricing_products(
        &self,
        handles: &[Handle],
    ) -> Result<Vec<PricingProduct>, RepositoryError> {
        let handles: Vec<&str> = handles.iter().map(Handle::as_str).collect();
        let products = sqlx::query_as::<_, PricingProduct>(
            "SELECT id, handle, title, price, currency_code FROM products \
             WHERE is_published AND handle = ANY($1)",
        )
        .bind(&handles)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Variants with a SKU belonging to `product_ids`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pricing_variants(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<PricingVariant>, RepositoryError> {
        let ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
        let variants = sqlx::query_as::<_, PricingVariant>(
            "SELECT product_id, sku, title, price FROM product_variants \
             WHERE sku IS NOT NULL AND product_id = ANY($1) ORDER BY product_id, position",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        Ok(variants)
    }
}
