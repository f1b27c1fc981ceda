//! Business logic services for the storefront.
//!
//! - `catalog` - Cached catalog reads for the JSON API
//! - `checkout` - Experience validation, pricing and order submission

pub mod catalog;
pub mod checkout;

pub use catalog::CatalogService;
pub use checkout::CheckoutError;
