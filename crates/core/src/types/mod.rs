//! Core types for Atelier.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod experience;
pub mod handle;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use experience::{ExperienceKind, ExperienceOrderStatus, OrderReference, ParseKindError};
pub use handle::{Handle, HandleError};
pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency};
