//! Experience checkout: per-kind validation, pricing and order submission.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use atelier_core::pricing::{self, BULK_MINIMUM_UNITS};
use atelier_core::{
    Assortment, CurrencyCode, ExperienceKind, Handle, PricedLine, PricingError, Price, ProductId,
    Quote,
};

use crate::db::products::{PricingProduct, PricingVariant};
use crate::db::{ExperienceOrderRepository, ProductRepository, RepositoryError};
use crate::models::experience::{
    CheckoutReceipt, CheckoutRequest, ContactDetails, ExperienceDetails,
};

/// Most products a sample crate can hold.
pub const MAX_SAMPLE_LINES: usize = 6;

/// Largest party for a private showcase.
pub const MAX_SHOWCASE_GUESTS: u32 = 20;

/// Largest party for a trade-show RSVP.
pub const MAX_RSVP_GUESTS: u32 = 10;

/// Errors raised during experience checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0} requires at least one product")]
    EmptyAssortment(ExperienceKind),

    #[error("a sample crate holds at most {max} products")]
    TooManySamples { max: usize },

    #[error("bulk orders need at least {min} units (got {units})")]
    BelowBulkMinimum { min: u64, units: u64 },

    #[error("{0} does not take products")]
    UnexpectedProducts(ExperienceKind),

    #[error("missing required field: {0}")]
    MissingDetail(&'static str),

    #[error("guest count must be between 1 and {max}")]
    GuestCount { max: u32 },

    #[error("preferred date must be in the future")]
    DateNotInFuture,

    #[error("unknown product: {0}")]
    UnknownProduct(Handle),

    #[error("unknown variant {sku} for product {handle}")]
    UnknownVariant { handle: Handle, sku: String },

    #[error("product {0} has no price")]
    Unpriced(Handle),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Check that the assortment fits the experience kind.
///
/// # Errors
///
/// Returns the first rule the assortment breaks.
pub fn validate_assortment(
    kind: ExperienceKind,
    assortment: &Assortment,
) -> Result<(), CheckoutError> {
    match kind {
        ExperienceKind::SampleCrate => {
            if assortment.is_empty() {
                return Err(CheckoutError::EmptyAssortment(kind));
            }
            if assortment.len() > MAX_SAMPLE_LINES {
                return Err(CheckoutError::TooManySamples {
                    max: MAX_SAMPLE_LINES,
                });
            }
        }
        ExperienceKind::BulkOrder => {
            if assortment.is_empty() {
                return Err(CheckoutError::EmptyAssortment(kind));
            }
            let units = assortment.total_units();
            if units < BULK_MINIMUM_UNITS {
                return Err(CheckoutError::BelowBulkMinimum {
                    min: BULK_MINIMUM_UNITS,
                    units,
                });
            }
        }
        ExperienceKind::PrivateShowcase | ExperienceKind::TradeShowRsvp => {
            if !assortment.is_empty() {
                return Err(CheckoutError::UnexpectedProducts(kind));
            }
        }
    }
    Ok(())
}

/// Check contact and kind-specific details. `today` is the current UTC date.
///
/// # Errors
///
/// Returns the first missing or invalid detail.
pub fn validate_details(
    kind: ExperienceKind,
    contact: &ContactDetails,
    details: &ExperienceDetails,
    today: NaiveDate,
) -> Result<(), CheckoutError> {
    if is_blank(Some(&contact.name)) {
        return Err(CheckoutError::MissingDetail("contact.name"));
    }

    match kind {
        ExperienceKind::SampleCrate => {}
        ExperienceKind::BulkOrder => {
            if is_blank(contact.company.as_ref()) {
                return Err(CheckoutError::MissingDetail("contact.company"));
            }
        }
        ExperienceKind::PrivateShowcase => {
            let date = details
                .preferred_date
                .ok_or(CheckoutError::MissingDetail("details.preferred_date"))?;
            if date <= today {
                return Err(CheckoutError::DateNotInFuture);
            }
            check_guests(details.guest_count, MAX_SHOWCASE_GUESTS)?;
        }
        ExperienceKind::TradeShowRsvp => {
            if is_blank(details.event_name.as_ref()) {
                return Err(CheckoutError::MissingDetail("details.event_name"));
            }
            check_guests(details.guest_count, MAX_RSVP_GUESTS)?;
        }
    }
    Ok(())
}

fn check_guests(guest_count: Option<u32>, max: u32) -> Result<(), CheckoutError> {
    match guest_count {
        None => Err(CheckoutError::MissingDetail("details.guest_count")),
        Some(n) if (1..=max).contains(&n) => Ok(()),
        Some(_) => Err(CheckoutError::GuestCount { max }),
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

/// Attach catalog prices to every assortment line.
///
/// A line with a variant SKU uses the variant's price when it has one, and
/// the product price otherwise.
///
/// # Errors
///
/// Returns an error naming the first handle or SKU that is unknown or
/// unpriced.
pub fn resolve_lines(
    assortment: &Assortment,
    products: &[PricingProduct],
    variants: &[PricingVariant],
) -> Result<Vec<PricedLine>, CheckoutError> {
    let by_handle: HashMap<&Handle, &PricingProduct> =
        products.iter().map(|p| (&p.handle, p)).collect();

    assortment
        .iter()
        .map(|line| {
            let product = by_handle
                .get(&line.product_handle)
                .ok_or_else(|| CheckoutError::UnknownProduct(line.product_handle.clone()))?;

            let (title, amount) = match line.variant_sku.as_deref() {
                Some(sku) => {
                    let variant = variants
                        .iter()
                        .find(|v| v.product_id == product.id && v.sku == sku)
                        .ok_or_else(|| CheckoutError::UnknownVariant {
                            handle: line.product_handle.clone(),
                            sku: sku.to_owned(),
                        })?;
                    (
                        format!("{} - {}", product.title, variant.title),
                        variant.price.or(product.price),
                    )
                }
                None => (product.title.clone(), product.price),
            };
            let amount: Decimal =
                amount.ok_or_else(|| CheckoutError::Unpriced(line.product_handle.clone()))?;
            let currency_code = product.currency_code.parse::<CurrencyCode>().map_err(|e| {
                RepositoryError::DataCorruption(format!("product {}: {e}", product.handle))
            })?;

            Ok(PricedLine {
                product_handle: line.product_handle.clone(),
                variant_sku: line.variant_sku.clone(),
                title,
                quantity: line.quantity,
                unit_price: Price::new(amount, currency_code),
            })
        })
        .collect()
}

/// Price an assortment for an experience kind without storing anything.
///
/// # Errors
///
/// Returns an error if the assortment does not fit the kind, references
/// unknown products, or cannot be priced.
pub async fn price(
    pool: &PgPool,
    kind: ExperienceKind,
    assortment: &Assortment,
) -> Result<Quote, CheckoutError> {
    validate_assortment(kind, assortment)?;
    let (quote, _) = price_lines(pool, kind, assortment).await?;
    Ok(quote)
}

async fn price_lines(
    pool: &PgPool,
    kind: ExperienceKind,
    assortment: &Assortment,
) -> Result<(Quote, HashMap<Handle, ProductId>), CheckoutError> {
    if assortment.is_empty() {
        return Ok((pricing::quote(kind, &[])?, HashMap::new()));
    }

    let repo = ProductRepository::new(pool);
    let products = repo.pricing_products(&assortment.product_handles()).await?;
    let product_ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    let variants = repo.pricing_variants(&product_ids).await?;

    let lines = resolve_lines(assortment, &products, &variants)?;
    let quote = pricing::quote(kind, &lines)?;
    let ids = products.into_iter().map(|p| (p.handle, p.id)).collect();
    Ok((quote, ids))
}

/// Validate, price and store an experience order.
///
/// # Errors
///
/// Returns an error if validation or pricing fails, or the order cannot be
/// stored.
#[instrument(skip(pool, request), fields(kind = %request.kind))]
pub async fn submit(
    pool: &PgPool,
    request: &CheckoutRequest,
) -> Result<CheckoutReceipt, CheckoutError> {
    validate_assortment(request.kind, &request.assortment)?;
    validate_details(
        request.kind,
        &request.contact,
        &request.details,
        Utc::now().date_naive(),
    )?;

    let (quote, product_ids) = price_lines(pool, request.kind, &request.assortment).await?;
    let order = ExperienceOrderRepository::new(pool)
        .create(request, &quote, &product_ids)
        .await?;

    info!(
        reference = %order.reference,
        order_id = %order.id,
        units = quote.units,
        total = %quote.total,
        "Experience order submitted"
    );

    Ok(CheckoutReceipt {
        reference: order.reference,
        status: order.status,
        quote,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::AssortmentLine;

    use super::*;

    fn handle(s: &str) -> Handle {
        Handle::parse(s).unwrap()
    }

    fn assortment(lines: &[(&str, u32)]) -> Assortment {
        Assortment::from_lines(
            lines
                .iter()
                .map(|(h, q)| AssortmentLine::new(handle(h), *q)),
        )
        .unwrap()
    }

    fn contact(company: Option<&str>) -> ContactDetails {
        ContactDetails {
            name: "Ines Duval".to_owned(),
            email: atelier_core::Email::parse("ines@maison-verre.fr").unwrap(),
            company: company.map(str::to_owned),
            phone: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_sample_crate_line_limits() {
        let kind = ExperienceKind::SampleCrate;
        assert!(matches!(
            validate_assortment(kind, &Assortment::default()),
            Err(CheckoutError::EmptyAssortment(_))
        ));

        let names = ["a", "b", "c", "d", "e", "f", "g"];
        let seven: Vec<(&str, u32)> = names.iter().map(|n| (*n, 1)).collect();
        assert!(matches!(
            validate_assortment(kind, &assortment(&seven)),
            Err(CheckoutError::TooManySamples { max: 6 })
        ));
        let six: Vec<(&str, u32)> = seven.iter().take(6).copied().collect();
        assert!(validate_assortment(kind, &assortment(&six)).is_ok());
    }

    #[test]
    fn test_bulk_order_minimum() {
        let kind = ExperienceKind::BulkOrder;
        assert!(matches!(
            validate_assortment(kind, &assortment(&[("coat", 6), ("scarf", 5)])),
            Err(CheckoutError::BelowBulkMinimum { min: 12, units: 11 })
        ));
        assert!(validate_assortment(kind, &assortment(&[("coat", 6), ("scarf", 6)])).is_ok());
    }

    #[test]
    fn test_events_take_no_products() {
        assert!(matches!(
            validate_assortment(ExperienceKind::TradeShowRsvp, &assortment(&[("coat", 1)])),
            Err(CheckoutError::UnexpectedProducts(_))
        ));
        assert!(
            validate_assortment(ExperienceKind::PrivateShowcase, &Assortment::default()).is_ok()
        );
    }

    #[test]
    fn test_bulk_order_requires_company() {
        let details = ExperienceDetails::default();
        assert!(matches!(
            validate_details(ExperienceKind::BulkOrder, &contact(Some("  ")), &details, today()),
            Err(CheckoutError::MissingDetail("contact.company"))
        ));
        assert!(
            validate_details(
                ExperienceKind::BulkOrder,
                &contact(Some("Verre SAS")),
                &details,
                today()
            )
            .is_ok()
        );
    }

    #[test]
    fn test_private_showcase_details() {
        let kind = ExperienceKind::PrivateShowcase;
        let mut details = ExperienceDetails {
            preferred_date: Some(today()),
            guest_count: Some(4),
            ..ExperienceDetails::default()
        };
        assert!(matches!(
            validate_details(kind, &contact(None), &details, today()),
            Err(CheckoutError::DateNotInFuture)
        ));

        details.preferred_date = today().succ_opt();
        assert!(validate_details(kind, &contact(None), &details, today()).is_ok());

        details.guest_count = Some(21);
        assert!(matches!(
            validate_details(kind, &contact(None), &details, today()),
            Err(CheckoutError::GuestCount { max: 20 })
        ));
    }

    #[test]
    fn test_trade_show_rsvp_details() {
        let kind = ExperienceKind::TradeShowRsvp;
        let mut details = ExperienceDetails {
            guest_count: Some(2),
            ..ExperienceDetails::default()
        };
        assert!(matches!(
            validate_details(kind, &contact(None), &details, today()),
            Err(CheckoutError::MissingDetail("details.event_name"))
        ));

        details.event_name = Some("Pitti Uomo 109".to_owned());
        assert!(validate_details(kind, &contact(None), &details, today()).is_ok());

        details.guest_count = Some(0);
        assert!(matches!(
            validate_details(kind, &contact(None), &details, today()),
            Err(CheckoutError::GuestCount { max: 10 })
        ));
    }

    fn pricing_product(id: i32, h: &str, cents: Option<i64>) -> PricingProduct {
        PricingProduct {
            id: ProductId::new(id),
            handle: handle(h),
            title: h.to_owned(),
            price: cents.map(|c| Decimal::new(c, 2)),
            currency_code: "EUR".to_owned(),
        }
    }

    #[test]
    fn test_resolve_lines_uses_variant_price() {
        let mut a = Assortment::default();
        a.add(AssortmentLine::new(handle("loafer"), 2).with_variant("LF-39"))
            .unwrap();
        a.add(AssortmentLine::new(handle("belt"), 1)).unwrap();

        let products = vec![
            pricing_product(1, "loafer", Some(65000)),
            pricing_product(2, "belt", Some(18000)),
        ];
        let variants = vec![PricingVariant {
            product_id: ProductId::new(1),
            sku: "LF-39".to_owned(),
            title: "EU 39".to_owned(),
            price: Some(Decimal::new(68000, 2)),
        }];

        let lines = resolve_lines(&a, &products, &variants).unwrap();
        assert_eq!(lines.len(), 2);
        let first = lines.first().unwrap();
        assert_eq!(first.title, "loafer - EU 39");
        assert_eq!(first.unit_price.amount, Decimal::new(68000, 2));
        assert_eq!(lines.last().unwrap().unit_price.amount, Decimal::new(18000, 2));
    }

    #[test]
    fn test_resolve_lines_errors_name_the_handle() {
        let a = assortment(&[("ghost", 1)]);
        let err = resolve_lines(&a, &[], &[]).unwrap_err();
        assert_eq!(err.to_string(), "unknown product: ghost");

        let a = assortment(&[("belt", 1)]);
        let err = resolve_lines(&a, &[pricing_product(2, "belt", None)], &[]).unwrap_err();
        assert!(matches!(err, CheckoutError::Unpriced(ref h) if h.as_str() == "belt"));

        let mut a = Assortment::default();
        a.add(AssortmentLine::new(handle("belt"), 1).with_variant("BT-XL"))
            .unwrap();
        let err = resolve_lines(&a, &[pricing_product(2, "belt", Some(100))], &[]).unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownVariant { ref sku, .. } if sku == "BT-XL"));
    }
}
