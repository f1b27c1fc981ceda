//! Atelier Core - Shared domain types.
//!
//! This crate provides the types used across all Atelier components:
//! - `storefront` - Catalog API, catalog import endpoint and experience checkout
//! - `cli` - Command-line tools for migrations and file-based catalog imports
//!
//! # Architecture
//!
//! The core crate contains only types and pure business rules - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, handles, emails, prices and experience kinds
//! - [`assortment`] - The ordered selection of products a buyer is assembling
//! - [`pricing`] - Bulk-discount tiers and experience quotes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assortment;
pub mod pricing;
pub mod types;

pub use assortment::{Assortment, AssortmentError, AssortmentLine};
pub use pricing::{DiscountTier, PricedLine, PricingError, Quote, QuotedLine};
pub use types::*;
