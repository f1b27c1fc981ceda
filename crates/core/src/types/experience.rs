//! Experience checkout kinds and order status.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an experience kind string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid experience kind: {0}")]
pub struct ParseKindError(pub String);

/// The multi-step checkout flows a buyer can go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "experience_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceKind {
    /// A small crate of product samples shipped to a buyer.
    SampleCrate,
    /// B2B wholesale order with tiered volume discounts.
    BulkOrder,
    /// Appointment-only viewing of a brand's collection.
    PrivateShowcase,
    /// Reservation to meet a brand at a trade show.
    TradeShowRsvp,
}

impl ExperienceKind {
    /// All kinds, in the order the storefront presents them.
    pub const ALL: [Self; 4] = [
        Self::SampleCrate,
        Self::BulkOrder,
        Self::PrivateShowcase,
        Self::TradeShowRsvp,
    ];

    /// Whether this experience ships products (and therefore needs an assortment).
    #[must_use]
    pub const fn carries_products(&self) -> bool {
        matches!(self, Self::SampleCrate | Self::BulkOrder)
    }

    /// Snake-case identifier used on the wire and in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SampleCrate => "sample_crate",
            Self::BulkOrder => "bulk_order",
            Self::PrivateShowcase => "private_showcase",
            Self::TradeShowRsvp => "trade_show_rsvp",
        }
    }
}

impl fmt::Display for ExperienceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExperienceKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_owned()))
    }
}

/// Lifecycle of a submitted experience order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "experience_order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceOrderStatus {
    #[default]
    Submitted,
    Confirmed,
    Cancelled,
}

/// Customer-facing order reference, e.g. `ATL-3F9A0C1B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Prefix shared by every reference.
    pub const PREFIX: &'static str = "ATL-";

    /// Generate a fresh reference from a random UUID.
    #[must_use]
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        let suffix: String = simple.chars().take(8).collect();
        Self(format!("{}{suffix}", Self::PREFIX))
    }

    /// Wrap a reference loaded from storage.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ExperienceKind::ALL {
            assert_eq!(kind.as_str().parse::<ExperienceKind>().unwrap(), kind);
        }
        assert!("pop_up".parse::<ExperienceKind>().is_err());
    }

    #[test]
    fn test_kind_serde_matches_as_str() {
        let json = serde_json::to_string(&ExperienceKind::TradeShowRsvp).unwrap();
        assert_eq!(json, "\"trade_show_rsvp\"");
    }

    #[test]
    fn test_only_product_experiences_carry_products() {
        assert!(ExperienceKind::SampleCrate.carries_products());
        assert!(ExperienceKind::BulkOrder.carries_products());
        assert!(!ExperienceKind::PrivateShowcase.carries_products());
        assert!(!ExperienceKind::TradeShowRsvp.carries_products());
    }

    #[test]
    fn test_order_reference_shape() {
        let reference = OrderReference::generate();
        let s = reference.as_str();
        assert!(s.starts_with("ATL-"));
        assert_eq!(s.len(), 12);
        assert!(
            s.trim_start_matches("ATL-")
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase())
        );
    }
}
