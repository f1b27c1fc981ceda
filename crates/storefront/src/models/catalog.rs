//! Catalog domain types returned by the read API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use atelier_core::{BrandId, CollectionId, Handle, ProductId, ProductImageId, VariantId};

/// A brand storefront row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Brand {
    pub id: BrandId,
    pub handle: Handle,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub website_url: Option<String>,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The few brand fields shown next to a collection or product.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BrandSummary {
    pub id: BrandId,
    pub handle: Handle,
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Collection {
    pub id: CollectionId,
    pub handle: Handle,
    pub name: String,
    pub brand_id: Option<BrandId>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product as shown in grids: enough to render a card.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductCard {
    pub id: ProductId,
    pub handle: Handle,
    pub title: String,
    pub brand_name: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub currency_code: String,
    /// First image by position.
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub handle: Handle,
    pub title: String,
    pub brand_id: Option<BrandId>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub material: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub currency_code: String,
    pub is_published: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub url: String,
    pub alt_text: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductVariant {
    pub id: VariantId,
    pub title: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Option<Decimal>,
    pub inventory_quantity: i32,
    pub position: i32,
}

/// `GET /api/brands/{handle}`
#[derive(Debug, Clone, Serialize)]
pub struct BrandStorefront {
    pub brand: Brand,
    pub collections: Vec<Collection>,
    pub products: Vec<ProductCard>,
}

/// `GET /api/collections/{handle}`
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetail {
    pub collection: Collection,
    pub brand: Option<BrandSummary>,
    /// Ordered by the product's position in the collection.
    pub products: Vec<ProductCard>,
}

/// `GET /api/products/{handle}`
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub brand: Option<BrandSummary>,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
}

/// One page of the catalog browser.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductCard>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// Filters for the catalog browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub brand: Option<Handle>,
    pub collection: Option<Handle>,
    pub search: Option<String>,
}

impl ProductFilter {
    /// `ILIKE` pattern for the title search, with wildcards in the input escaped.
    #[must_use]
    pub fn title_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let mut pattern = String::with_capacity(term.len() + 2);
        pattern.push('%');
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_pattern_escapes_wildcards() {
        let filter = ProductFilter {
            search: Some(" 100%_silk ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.title_pattern().as_deref(), Some("%100\\%\\_silk%"));
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        let filter = ProductFilter {
            search: Some("   ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.title_pattern(), None);
        assert_eq!(ProductFilter::default().title_pattern(), None);
    }
}
