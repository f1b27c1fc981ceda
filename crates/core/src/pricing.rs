//! Experience pricing: sample-crate pricing and B2B bulk discount tiers.
//!
//! All arithmetic is done in [`Decimal`]; rounding happens once per line
//! and once on the discount, to the currency's minor unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, ExperienceKind, Handle, Price};

/// Volume discount applied to bulk orders once `min_units` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountTier {
    pub min_units: u64,
    /// Fraction of the subtotal taken off (0.10 = 10 %).
    pub rate: Decimal,
}

const NO_DISCOUNT: DiscountTier = DiscountTier {
    min_units: 0,
    rate: Decimal::ZERO,
};

/// Bulk order tiers, ascending by `min_units`.
pub const BULK_TIERS: [DiscountTier; 4] = [
    NO_DISCOUNT,
    DiscountTier {
        min_units: 12,
        rate: Decimal::from_parts(10, 0, 0, false, 2),
    },
    DiscountTier {
        min_units: 48,
        rate: Decimal::from_parts(15, 0, 0, false, 2),
    },
    DiscountTier {
        min_units: 144,
        rate: Decimal::from_parts(20, 0, 0, false, 2),
    },
];

/// Minimum total units for a bulk order.
pub const BULK_MINIMUM_UNITS: u64 = 12;

/// Sample crate price is this fraction of the retail unit price...
const SAMPLE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
/// ...but never below this amount.
const SAMPLE_FLOOR: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Errors raised while pricing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Lines are priced in more than one currency.
    #[error("lines are priced in more than one currency ({0} and {1})")]
    MixedCurrencies(CurrencyCode, CurrencyCode),
    /// An intermediate amount overflowed.
    #[error("amount overflow while pricing")]
    Overflow,
}

/// A product line with its catalog unit price resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_handle: Handle,
    pub variant_sku: Option<String>,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Price,
}

/// A priced line as returned to the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedLine {
    pub product_handle: Handle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_sku: Option<String>,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The priced outcome of an assortment for one experience kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub kind: ExperienceKind,
    pub currency_code: CurrencyCode,
    pub units: u64,
    pub subtotal: Decimal,
    pub discount_rate: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub lines: Vec<QuotedLine>,
}

/// The discount tier that applies to `units`.
#[must_use]
pub fn tier_for(units: u64) -> DiscountTier {
    BULK_TIERS
        .iter()
        .rev()
        .find(|tier| units >= tier.min_units)
        .copied()
        .unwrap_or(NO_DISCOUNT)
}

/// Price a set of lines for an experience.
///
/// - `sample_crate`: every line counts once, at the sample price.
/// - `bulk_order`: retail price with the tier discount on the subtotal.
/// - showcases and RSVPs carry no products and quote to zero.
///
/// # Errors
///
/// Returns [`PricingError`] if lines mix currencies or an amount overflows.
pub fn quote(kind: ExperienceKind, lines: &[PricedLine]) -> Result<Quote, PricingError> {
    let currency_code = match lines.first() {
        Some(first) => first.unit_price.currency_code,
        None => CurrencyCode::default(),
    };

    let mut quoted = Vec::with_capacity(lines.len());
    let mut subtotal = Decimal::ZERO;
    let mut units: u64 = 0;

    for line in lines {
        if line.unit_price.currency_code != currency_code {
            return Err(PricingError::MixedCurrencies(
                currency_code,
                line.unit_price.currency_code,
            ));
        }

        let (quantity, unit) = match kind {
            ExperienceKind::SampleCrate => (1, sample_price(line.unit_price)),
            _ => (line.quantity, line.unit_price.rounded()),
        };

        let line_total = unit
            .amount
            .checked_mul(Decimal::from(quantity))
            .ok_or(PricingError::Overflow)?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or(PricingError::Overflow)?;
        units += u64::from(quantity);

        quoted.push(QuotedLine {
            product_handle: line.product_handle.clone(),
            variant_sku: line.variant_sku.clone(),
            title: line.title.clone(),
            quantity,
            unit_price: unit.amount,
            line_total,
        });
    }

    let discount_rate = match kind {
        ExperienceKind::BulkOrder => tier_for(units).rate,
        _ => Decimal::ZERO,
    };
    let discount = Price::new(
        subtotal
            .checked_mul(discount_rate)
            .ok_or(PricingError::Overflow)?,
        currency_code,
    )
    .rounded()
    .amount;

    Ok(Quote {
        kind,
        currency_code,
        units,
        subtotal,
        discount_rate,
        discount,
        total: subtotal - discount,
        lines: quoted,
    })
}

fn sample_price(retail: Price) -> Price {
    let scaled = Price::new(retail.amount * SAMPLE_RATE, retail.currency_code).rounded();
    if scaled.amount < SAMPLE_FLOOR {
        Price::new(SAMPLE_FLOOR, retail.currency_code)
    } else {
        scaled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(handle: &str, quantity: u32, cents: i64) -> PricedLine {
        PricedLine {
            product_handle: Handle::parse(handle).unwrap(),
            variant_sku: None,
            title: handle.to_owned(),
            quantity,
            unit_price: Price::new(Decimal::new(cents, 2), CurrencyCode::EUR),
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for(0).rate, Decimal::ZERO);
        assert_eq!(tier_for(11).rate, Decimal::ZERO);
        assert_eq!(tier_for(12).rate, Decimal::new(10, 2));
        assert_eq!(tier_for(47).rate, Decimal::new(10, 2));
        assert_eq!(tier_for(48).rate, Decimal::new(15, 2));
        assert_eq!(tier_for(143).rate, Decimal::new(15, 2));
        assert_eq!(tier_for(144).rate, Decimal::new(20, 2));
        assert_eq!(tier_for(10_000).rate, Decimal::new(20, 2));
    }

    #[test]
    fn test_bulk_order_applies_tier_discount() {
        // 30 + 20 = 50 units -> 15 %
        let lines = vec![line("wool-coat", 30, 42000), line("silk-scarf", 20, 9550)];
        let q = quote(ExperienceKind::BulkOrder, &lines).unwrap();

        assert_eq!(q.units, 50);
        assert_eq!(q.subtotal, Decimal::new(1451000, 2));
        assert_eq!(q.discount_rate, Decimal::new(15, 2));
        assert_eq!(q.discount, Decimal::new(217650, 2));
        assert_eq!(q.total, Decimal::new(1233350, 2));
    }

    #[test]
    fn test_discount_rounds_half_away_from_zero() {
        // 13 x 0.05 = 0.65 subtotal; 10 % = 0.065 -> 0.07
        let q = quote(ExperienceKind::BulkOrder, &[line("pin", 13, 5)]).unwrap();
        assert_eq!(q.discount, Decimal::new(7, 2));
        assert_eq!(q.total, Decimal::new(58, 2));
    }

    #[test]
    fn test_sample_crate_prices_one_of_each_with_floor() {
        let lines = vec![line("wool-coat", 4, 42000), line("pocket-square", 2, 3000)];
        let q = quote(ExperienceKind::SampleCrate, &lines).unwrap();

        assert_eq!(q.units, 2);
        let unit_prices: Vec<_> = q.lines.iter().map(|l| l.unit_price).collect();
        assert_eq!(unit_prices, vec![Decimal::new(4200, 2), Decimal::new(500, 2)]);
        assert_eq!(q.total, Decimal::new(4700, 2));
        assert_eq!(q.discount, Decimal::ZERO);
    }

    #[test]
    fn test_non_product_experiences_quote_zero() {
        let q = quote(ExperienceKind::PrivateShowcase, &[]).unwrap();
        assert_eq!(q.total, Decimal::ZERO);
        assert_eq!(q.units, 0);
        assert!(q.lines.is_empty());
    }

    #[test]
    fn test_mixed_currencies_rejected() {
        let mut gbp = line("tie", 1, 8000);
        gbp.unit_price.currency_code = CurrencyCode::GBP;
        let err = quote(ExperienceKind::BulkOrder, &[line("belt", 1, 1), gbp]).unwrap_err();
        assert_eq!(
            err,
            PricingError::MixedCurrencies(CurrencyCode::EUR, CurrencyCode::GBP)
        );
    }
}
