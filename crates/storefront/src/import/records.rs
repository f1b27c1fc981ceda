//! Typed import records.
//!
//! Records are deserialized from the cleaned objects produced by
//! [`validate_record`](super::validate::validate_record), so serde only sees
//! known fields with the right JSON types.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use atelier_core::{CurrencyCode, Handle};

use super::error::FieldError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrandRecord {
    pub handle: Handle,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub website_url: Option<String>,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionRecord {
    pub handle: Handle,
    pub name: String,
    pub description: Option<String>,
    pub brand_name: Option<String>,
    pub image_url: Option<String>,
    pub season: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariantRecord {
    pub title: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de_price")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub inventory_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    pub handle: Handle,
    pub title: String,
    pub description: Option<String>,
    pub brand_name: Option<String>,
    pub product_type: Option<String>,
    pub material: Option<String>,
    #[serde(default, deserialize_with = "de_price")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_price")]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default = "published_by_default")]
    pub is_published: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collection_handles: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

const fn published_by_default() -> bool {
    true
}

impl ProductRecord {
    /// Currency the product is priced in, defaulting to EUR.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.currency_code
            .as_deref()
            .and_then(|code| code.parse().ok())
            .unwrap_or_default()
    }

    /// Distinct, trimmed collection handles in first-seen order.
    #[must_use]
    pub fn distinct_collection_handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = Vec::with_capacity(self.collection_handles.len());
        for handle in &self.collection_handles {
            let handle = handle.trim();
            if !handle.is_empty() && !handles.iter().any(|h| h == handle) {
                handles.push(handle.to_owned());
            }
        }
        handles
    }
}

/// Import prices arrive as JSON numbers; store them at two decimal places.
fn de_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    raw.map(|value| {
        Decimal::from_f64_retain(value)
            .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .ok_or_else(|| serde::de::Error::custom("price is not representable"))
    })
    .transpose()
}

/// Turn a cleaned record object into a typed record.
///
/// # Errors
///
/// Returns [`FieldError::Invalid`] if the object does not fit the record type.
pub fn from_cleaned<T: DeserializeOwned>(object: Map<String, Value>) -> Result<T, FieldError> {
    serde_json::from_value(Value::Object(object)).map_err(|e| FieldError::Invalid {
        field: "record".to_owned(),
        reason: e.to_string(),
    })
}

/// Reject product currency codes the marketplace does not sell in.
///
/// # Errors
///
/// Returns [`FieldError::Invalid`] for an unsupported code.
pub fn check_currency(record: &ProductRecord) -> Result<(), FieldError> {
    match record.currency_code.as_deref() {
        Some(code) => code
            .parse::<CurrencyCode>()
            .map(|_| ())
            .map_err(|e| FieldError::Invalid {
                field: "currency_code".to_owned(),
                reason: e.to_string(),
            }),
        None => Ok(()),
    }
}
