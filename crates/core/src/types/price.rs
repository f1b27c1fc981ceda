//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices are stored as `NUMERIC(12, 2)` and carried as
//! [`rust_decimal::Decimal`] so bulk-discount arithmetic never touches
//! floating point.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply the unit price by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add two prices of the same currency.
    ///
    /// Returns `None` when the currencies differ or the sum overflows.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency_code != other.currency_code {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Round to the currency's minor unit, midpoints away from zero.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(
            self.amount.round_dp_with_strategy(
                self.currency_code.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            self.currency_code,
        )
    }

    /// Format for display (e.g., "€1250.00").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let dp = self.currency_code.minor_units() as usize;
        format!("{}{:.dp$}", self.currency_code.symbol(), rounded.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Error returned when a currency code is not supported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// ISO 4217 currency codes the marketplace sells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    USD,
    #[default]
    EUR,
    GBP,
    CAD,
    AUD,
    CHF,
    JPY,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::CHF => "CHF ",
            Self::JPY => "¥",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::CHF => "CHF",
            Self::JPY => "JPY",
        }
    }

    /// Number of decimal places in the minor unit.
    #[must_use]
    pub const fn minor_units(&self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "CHF" => Ok(Self::CHF),
            "JPY" => Ok(Self::JPY),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_add() {
        let unit = Price::new(Decimal::new(1250, 2), CurrencyCode::EUR);
        let line = unit.times(3);
        assert_eq!(line.amount, Decimal::new(3750, 2));

        let total = line.checked_add(&unit).unwrap();
        assert_eq!(total.amount, Decimal::new(5000, 2));
    }

    #[test]
    fn test_checked_add_rejects_mixed_currencies() {
        let eur = Price::new(Decimal::ONE, CurrencyCode::EUR);
        let gbp = Price::new(Decimal::ONE, CurrencyCode::GBP);
        assert!(eur.checked_add(&gbp).is_none());
    }

    #[test]
    fn test_display_rounds_to_minor_unit() {
        let price = Price::new(Decimal::new(19_995, 4), CurrencyCode::GBP);
        assert_eq!(price.display(), "£2.00");

        let yen = Price::new(Decimal::new(45_005, 1), CurrencyCode::JPY);
        assert_eq!(yen.display(), "¥4501");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!(" CHF ".parse::<CurrencyCode>().unwrap(), CurrencyCode::CHF);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
