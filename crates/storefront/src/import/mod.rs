//! Catalog import: validation and persistence of CSV-derived records.
//!
//! An import call carries one record type:
//!
//! ```json
//! { "type": "products", "data": [ { "handle": "wool-coat", "title": "Wool Coat" } ] }
//! ```
//!
//! Every record is validated before anything is written. The whole call then
//! runs in a single transaction, so a failing record or database error
//! leaves the catalog untouched.

pub mod error;
pub mod persist;
pub mod records;
pub mod schema;
pub mod validate;

use std::fmt;

use serde_json::Value;
use sqlx::PgPool;
use tracing::instrument;

pub use error::{DbErrorCategory, FieldError, ImportError};
pub use records::{BrandRecord, CollectionRecord, ImageRecord, ProductRecord, VariantRecord};

use records::{check_currency, from_cleaned};
use schema::{BRAND_FIELDS, COLLECTION_FIELDS, PRODUCT_FIELDS};
use validate::validate_record;

/// Maximum records per call.
pub const MAX_RECORDS: usize = 1000;

/// Maximum request body size, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Record type carried by an import call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Brands,
    Collections,
    Products,
}

impl ImportKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Collections => "collections",
            Self::Products => "products",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brands" => Ok(Self::Brands),
            "collections" => Ok(Self::Collections),
            "products" => Ok(Self::Products),
            _ => Err(ImportError::InvalidType),
        }
    }
}

/// A fully validated set of records, ready to write.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportBatch {
    Brands(Vec<BrandRecord>),
    Collections(Vec<CollectionRecord>),
    Products(Vec<ProductRecord>),
}

impl ImportBatch {
    #[must_use]
    pub const fn kind(&self) -> ImportKind {
        match self {
            Self::Brands(_) => ImportKind::Brands,
            Self::Collections(_) => ImportKind::Collections,
            Self::Products(_) => ImportKind::Products,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Brands(r) => r.len(),
            Self::Collections(r) => r.len(),
            Self::Products(r) => r.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a request body into its record type and raw records.
///
/// # Errors
///
/// Returns an error if the body is not an object, `type` is not a known
/// record type, `data` is not an array, or `data` holds more than
/// [`MAX_RECORDS`] entries.
pub fn parse_envelope(body: Value) -> Result<(ImportKind, Vec<Value>), ImportError> {
    let Value::Object(mut envelope) = body else {
        return Err(ImportError::NotAnObject);
    };

    let kind = envelope
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ImportError::InvalidType)?
        .parse::<ImportKind>()?;

    let Some(Value::Array(data)) = envelope.remove("data") else {
        return Err(ImportError::DataNotArray);
    };

    check_record_count(data.len())?;
    Ok((kind, data))
}

/// Reject batches larger than [`MAX_RECORDS`].
///
/// # Errors
///
/// Returns [`ImportError::TooManyRecords`] when `count` is over the limit.
pub const fn check_record_count(count: usize) -> Result<(), ImportError> {
    if count > MAX_RECORDS {
        return Err(ImportError::TooManyRecords {
            count,
            max: MAX_RECORDS,
        });
    }
    Ok(())
}

/// Validate every record and convert them to typed records.
///
/// # Errors
///
/// Returns [`ImportError::InvalidRecord`] for the first invalid record.
pub fn prepare(kind: ImportKind, data: &[Value]) -> Result<ImportBatch, ImportError> {
    check_record_count(data.len())?;
    match kind {
        ImportKind::Brands => collect(data, |value| {
            from_cleaned::<BrandRecord>(validate_record(value, BRAND_FIELDS)?)
        })
        .map(ImportBatch::Brands),
        ImportKind::Collections => collect(data, |value| {
            from_cleaned::<CollectionRecord>(validate_record(value, COLLECTION_FIELDS)?)
        })
        .map(ImportBatch::Collections),
        ImportKind::Products => collect(data, |value| {
            let record = from_cleaned::<ProductRecord>(validate_record(value, PRODUCT_FIELDS)?)?;
            check_currency(&record)?;
            Ok(record)
        })
        .map(ImportBatch::Products),
    }
}

fn collect<T>(
    data: &[Value],
    convert: impl Fn(&Value) -> Result<T, FieldError>,
) -> Result<Vec<T>, ImportError> {
    data.iter()
        .enumerate()
        .map(|(index, value)| {
            convert(value).map_err(|error| ImportError::InvalidRecord { index, error })
        })
        .collect()
}

/// Write a validated batch in one transaction.
///
/// # Errors
///
/// Returns [`ImportError::Database`] if any write fails; nothing is
/// committed in that case.
#[instrument(skip(pool, batch), fields(kind = %batch.kind(), count = batch.len()))]
pub async fn run(pool: &PgPool, batch: &ImportBatch) -> Result<usize, ImportError> {
    let mut tx = pool.begin().await?;
    let count = persist::write_batch(&mut *tx, batch).await?;
    tx.commit().await?;
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_requires_known_type() {
        let err = parse_envelope(json!({"type": "lookbooks", "data": []})).unwrap_err();
        assert!(matches!(err, ImportError::InvalidType));

        let err = parse_envelope(json!({"data": []})).unwrap_err();
        assert!(matches!(err, ImportError::InvalidType));

        let err = parse_envelope(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ImportError::NotAnObject));
    }

    #[test]
    fn test_envelope_requires_data_array() {
        let err = parse_envelope(json!({"type": "brands", "data": {"handle": "x"}})).unwrap_err();
        assert!(matches!(err, ImportError::DataNotArray));

        let err = parse_envelope(json!({"type": "brands"})).unwrap_err();
        assert!(matches!(err, ImportError::DataNotArray));
    }

    #[test]
    fn test_record_limit() {
        let data: Vec<Value> = (0..=MAX_RECORDS)
            .map(|i| json!({"handle": format!("b-{i}"), "name": "B"}))
            .collect();
        let err = parse_envelope(json!({"type": "brands", "data": data})).unwrap_err();
        assert!(matches!(
            err,
            ImportError::TooManyRecords {
                count: 1001,
                max: 1000
            }
        ));

        let (kind, data) = parse_envelope(json!({"type": "brands", "data": []})).unwrap();
        assert_eq!(kind, ImportKind::Brands);
        assert!(data.is_empty());
    }

    #[test]
    fn test_prepare_reports_first_invalid_index() {
        let data = vec![
            json!({"handle": "a", "name": "A"}),
            json!({"handle": "b", "name": "B"}),
            json!({"handle": "c"}),
            json!({"handle": "d", "name": 4}),
        ];
        let err = prepare(ImportKind::Brands, &data).unwrap_err();
        assert_eq!(err.index(), Some(2));
        assert!(matches!(
            err,
            ImportError::InvalidRecord {
                error: FieldError::Missing(ref field),
                ..
            } if field == "name"
        ));
    }

    #[test]
    fn test_prepare_products() {
        let data = vec![json!({
            "handle": "wool-coat",
            "title": "Wool Coat",
            "brand_name": "Maison Verre",
            "price": 420,
            "images": [{"url": "https://cdn.atelier.market/coat.jpg", "alt_text": null}],
            "variants": [{"title": "M", "sku": "WC-M", "inventory_quantity": 3}],
        })];
        let batch = prepare(ImportKind::Products, &data).unwrap();
        assert_eq!(batch.kind(), ImportKind::Products);
        assert_eq!(batch.len(), 1);

        let ImportBatch::Products(records) = batch else {
            panic!("expected products");
        };
        let record = records.first().unwrap();
        assert_eq!(record.images.len(), 1);
        assert_eq!(record.images.first().unwrap().alt_text, None);
    }

    #[test]
    fn test_prepare_rejects_unknown_currency() {
        let data = vec![json!({"handle": "coat", "title": "Coat", "currency_code": "ZZZ"})];
        let err = prepare(ImportKind::Products, &data).unwrap_err();
        assert_eq!(err.index(), Some(0));
    }
}
