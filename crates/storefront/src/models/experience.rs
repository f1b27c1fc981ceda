//! Experience checkout request and order types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{
    Assortment, Email, ExperienceKind, ExperienceOrderId, ExperienceOrderStatus, OrderReference,
    Quote,
};

/// Who to contact about an experience order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Kind-specific details collected by the later checkout steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExperienceDetails {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `POST /api/experiences/quote`
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub kind: ExperienceKind,
    #[serde(default)]
    pub assortment: Assortment,
}

/// `POST /api/experiences/checkout`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub kind: ExperienceKind,
    #[serde(default)]
    pub assortment: Assortment,
    pub contact: ContactDetails,
    #[serde(default)]
    pub details: ExperienceDetails,
}

/// Response to a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub reference: OrderReference,
    pub status: ExperienceOrderStatus,
    pub quote: Quote,
}

/// A stored experience order.
#[derive(Debug, Clone)]
pub struct ExperienceOrder {
    pub id: ExperienceOrderId,
    pub reference: OrderReference,
    pub kind: ExperienceKind,
    pub status: ExperienceOrderStatus,
    pub created_at: DateTime<Utc>,
}
