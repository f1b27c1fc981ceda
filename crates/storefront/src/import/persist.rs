//! Writes validated import batches to the catalog tables.
//!
//! Every function takes a `&mut PgConnection` so the caller decides the
//! transaction boundary. Records are written one after another in input
//! order.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::debug;

use atelier_core::{BrandId, CollectionId, ProductId};

use super::ImportBatch;
use super::records::{BrandRecord, CollectionRecord, ProductRecord};

/// Write every record of `batch`, returning the number written.
///
/// # Errors
///
/// Returns the first database error; the caller rolls back.
pub async fn write_batch(
    conn: &mut PgConnection,
    batch: &ImportBatch,
) -> Result<usize, sqlx::Error> {
    match batch {
        ImportBatch::Brands(records) => {
            for record in records {
                upsert_brand(conn, record).await?;
            }
        }
        ImportBatch::Collections(records) => {
            let mut brands = BrandResolver::default();
            for record in records {
                upsert_collection(conn, record, &mut brands).await?;
            }
        }
        ImportBatch::Products(records) => {
            let mut brands = BrandResolver::default();
            for record in records {
                upsert_product(conn, record, &mut brands).await?;
            }
        }
    }
    Ok(batch.len())
}

/// Insert or update a brand, keyed by handle.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn upsert_brand(
    conn: &mut PgConnection,
    record: &BrandRecord,
) -> Result<BrandId, sqlx::Error> {
    sqlx::query_scalar::<_, BrandId>(
        r"
        INSERT INTO brands (
            handle, name, description, logo_url, banner_url, website_url,
            country, founded_year, is_featured, tags
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (handle) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            logo_url = EXCLUDED.logo_url,
            banner_url = EXCLUDED.banner_url,
            website_url = EXCLUDED.website_url,
            country = EXCLUDED.country,
            founded_year = EXCLUDED.founded_year,
            is_featured = EXCLUDED.is_featured,
            tags = EXCLUDED.tags,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(record.handle.as_str())
    .bind(&record.name)
    .bind(&record.description)
    .bind(&record.logo_url)
    .bind(&record.banner_url)
    .bind(&record.website_url)
    .bind(&record.country)
    .bind(record.founded_year)
    .bind(record.is_featured)
    .bind(&record.tags)
    .fetch_one(&mut *conn)
    .await
}

/// Insert or update a collection, keyed by handle.
///
/// An unknown `brand_name` leaves the collection without a brand.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn upsert_collection(
    conn: &mut PgConnection,
    record: &CollectionRecord,
    brands: &mut BrandResolver,
) -> Result<CollectionId, sqlx::Error> {
    let brand_id = brands.resolve(conn, record.brand_name.as_deref()).await?;

    sqlx::query_scalar::<_, CollectionId>(
        r"
        INSERT INTO collections (
            handle, name, brand_id, description, image_url, season, year,
            is_featured, tags
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (handle) DO UPDATE SET
            name = EXCLUDED.name,
            brand_id = EXCLUDED.brand_id,
            description = EXCLUDED.description,
            image_url = EXCLUDED.image_url,
            season = EXCLUDED.season,
            year = EXCLUDED.year,
            is_featured = EXCLUDED.is_featured,
            tags = EXCLUDED.tags,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(record.handle.as_str())
    .bind(&record.name)
    .bind(brand_id)
    .bind(&record.description)
    .bind(&record.image_url)
    .bind(&record.season)
    .bind(record.year)
    .bind(record.is_featured)
    .bind(&record.tags)
    .fetch_one(&mut *conn)
    .await
}

/// Insert or update a product and replace its images, variants and
/// collection links.
///
/// Child rows are deleted and re-inserted, so their positions always match
/// the array order of this record.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn upsert_product(
    conn: &mut PgConnection,
    record: &ProductRecord,
    brands: &mut BrandResolver,
) -> Result<ProductId, sqlx::Error> {
    let brand_id = brands.resolve(conn, record.brand_name.as_deref()).await?;
    let currency_code = record.currency().code();

    let existing = sqlx::query_scalar::<_, ProductId>("SELECT id FROM products WHERE handle = $1")
        .bind(record.handle.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    let product_id = if let Some(id) = existing {
        sqlx::query(
            r"
            UPDATE products SET
                title = $2, brand_id = $3, description = $4, product_type = $5,
                material = $6, price = $7, compare_at_price = $8,
                currency_code = $9, is_published = $10, tags = $11,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&record.title)
        .bind(brand_id)
        .bind(&record.description)
        .bind(&record.product_type)
        .bind(&record.material)
        .bind(record.price)
        .bind(record.compare_at_price)
        .bind(currency_code)
        .bind(record.is_published)
        .bind(&record.tags)
        .execute(&mut *conn)
        .await?;
        id
    } else {
        sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO products (
                handle, title, brand_id, description, product_type, material,
                price, compare_at_price, currency_code, is_published, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(record.handle.as_str())
        .bind(&record.title)
        .bind(brand_id)
        .bind(&record.description)
        .bind(&record.product_type)
        .bind(&record.material)
        .bind(record.price)
        .bind(record.compare_at_price)
        .bind(currency_code)
        .bind(record.is_published)
        .bind(&record.tags)
        .fetch_one(&mut *conn)
        .await?
    };

    replace_images(conn, product_id, record).await?;
    replace_variants(conn, product_id, record).await?;
    replace_collection_links(conn, product_id, record).await?;

    debug!(
        handle = %record.handle,
        images = record.images.len(),
        variants = record.variants.len(),
        "Product written"
    );
    Ok(product_id)
}

async fn replace_images(
    conn: &mut PgConnection,
    product_id: ProductId,
    record: &ProductRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for (position, image) in (0_i32..).zip(&record.images) {
        sqlx::query(
            "INSERT INTO product_images (product_id, url, alt_text, position) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_variants(
    conn: &mut PgConnection,
    product_id: ProductId,
    record: &ProductRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for (position, variant) in (0_i32..).zip(&record.variants) {
        sqlx::query(
            r"
            INSERT INTO product_variants (
                product_id, title, sku, size, color, price, inventory_quantity, position
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(product_id)
        .bind(&variant.title)
        .bind(&variant.sku)
        .bind(&variant.size)
        .bind(&variant.color)
        .bind(variant.price)
        .bind(variant.inventory_quantity)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Link the product to the collections named in `collection_handles`.
/// Handles that match no stored collection are dropped.
async fn replace_collection_links(
    conn: &mut PgConnection,
    product_id: ProductId,
    record: &ProductRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_collections WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    let handles = record.distinct_collection_handles();
    if handles.is_empty() {
        return Ok(());
    }

    let rows = sqlx::query_as::<_, (CollectionId, String)>(
        "SELECT id, handle FROM collections WHERE handle = ANY($1)",
    )
    .bind(&handles)
    .fetch_all(&mut *conn)
    .await?;
    let ids: HashMap<String, CollectionId> = rows.into_iter().map(|(id, h)| (h, id)).collect();

    let resolved: Vec<CollectionId> = handles.iter().filter_map(|h| ids.get(h).copied()).collect();
    if resolved.len() < handles.len() {
        debug!(
            handle = %record.handle,
            dropped = handles.len() - resolved.len(),
            "Unknown collection handles ignored"
        );
    }

    for (position, collection_id) in (0_i32..).zip(resolved) {
        sqlx::query(
            "INSERT INTO product_collections (product_id, collection_id, position) \
             VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(collection_id)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Resolves brand names to IDs case-insensitively, remembering each answer
/// for the rest of the batch.
#[derive(Debug, Default)]
pub struct BrandResolver {
    known: HashMap<String, Option<BrandId>>,
}

impl BrandResolver {
    /// Look up a brand by name. Blank or unknown names resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup query fails.
    pub async fn resolve(
        &mut self,
        conn: &mut PgConnection,
        name: Option<&str>,
    ) -> Result<Option<BrandId>, sqlx::Error> {
        let Some(key) = brand_key(name) else {
            return Ok(None);
        };
        if let Some(known) = self.known.get(&key) {
            return Ok(*known);
        }

        let id = sqlx::query_scalar::<_, BrandId>(
            "SELECT id FROM brands WHERE lower(name) = lower($1) ORDER BY id LIMIT 1",
        )
        .bind(&key)
        .fetch_optional(&mut *conn)
        .await?;

        if id.is_none() {
            debug!(brand_name = %key, "No brand matches name; leaving brand unset");
        }
        self.known.insert(key, id);
        Ok(id)
    }
}

/// Normalized lookup key for a brand name.
fn brand_key(name: Option<&str>) -> Option<String> {
    let trimmed = name?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_key_normalizes() {
        assert_eq!(brand_key(Some("  Maison VERRE ")).as_deref(), Some("maison verre"));
        assert_eq!(brand_key(Some("   ")), None);
        assert_eq!(brand_key(None), None);
    }
}
