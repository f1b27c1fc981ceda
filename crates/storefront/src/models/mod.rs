//! Domain models for the storefront API.

pub mod catalog;
pub mod experience;
