//! The buyer's assortment: an ordered selection of products.
//!
//! The storefront keeps the assortment in the browser's local storage and
//! posts it with every quote or checkout. It is a plain ordered list: adding
//! a product that is already present bumps its quantity in place, anything
//! new is appended. There is no merging across devices.

use serde::{Deserialize, Serialize};

use crate::types::Handle;

/// Errors raised when an assortment change would break its limits.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssortmentError {
    /// Adding the line would exceed [`Assortment::MAX_LINES`].
    #[error("assortment cannot hold more than {max} lines")]
    TooManyLines {
        /// Maximum number of lines.
        max: usize,
    },
    /// A line quantity is zero or above [`Assortment::MAX_LINE_QUANTITY`].
    #[error("quantity for {handle} must be between 1 and {max}")]
    QuantityOutOfRange {
        /// Product the quantity applies to.
        handle: Handle,
        /// Maximum quantity per line.
        max: u32,
    },
}

/// One product (optionally a specific variant) and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssortmentLine {
    pub product_handle: Handle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_sku: Option<String>,
    pub quantity: u32,
}

impl AssortmentLine {
    /// Create a line for a product without a specific variant.
    #[must_use]
    pub const fn new(product_handle: Handle, quantity: u32) -> Self {
        Self {
            product_handle,
            variant_sku: None,
            quantity,
        }
    }

    /// Select a specific variant.
    #[must_use]
    pub fn with_variant(mut self, sku: impl Into<String>) -> Self {
        self.variant_sku = Some(sku.into());
        self
    }

    fn same_item(&self, handle: &Handle, sku: Option<&str>) -> bool {
        &self.product_handle == handle && self.variant_sku.as_deref() == sku
    }
}

#[derive(Deserialize)]
struct RawAssortment {
    #[serde(default)]
    lines: Vec<AssortmentLine>,
}

/// Ordered list of assortment lines.
///
/// ```
/// use atelier_core::{Assortment, AssortmentLine, Handle};
///
/// let scarf = Handle::parse("silk-scarf").unwrap();
/// let mut assortment = Assortment::default();
/// assortment.add(AssortmentLine::new(scarf.clone(), 2)).unwrap();
/// assortment.add(AssortmentLine::new(scarf, 3)).unwrap();
///
/// assert_eq!(assortment.len(), 1);
/// assert_eq!(assortment.total_units(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssortment")]
pub struct Assortment {
    lines: Vec<AssortmentLine>,
}

impl Assortment {
    /// Maximum number of distinct lines.
    pub const MAX_LINES: usize = 200;
    /// Maximum quantity of a single line.
    pub const MAX_LINE_QUANTITY: u32 = 10_000;

    /// Build an assortment by adding each line in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssortmentError`] any line triggers.
    pub fn from_lines(
        lines: impl IntoIterator<Item = AssortmentLine>,
    ) -> Result<Self, AssortmentError> {
        let mut assortment = Self::default();
        for line in lines {
            assortment.add(line)?;
        }
        Ok(assortment)
    }

    /// Add a line, merging into an existing line for the same product/variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged quantity is out of range or a new
    /// line would exceed [`Self::MAX_LINES`].
    pub fn add(&mut self, line: AssortmentLine) -> Result<(), AssortmentError> {
        let sku = line.variant_sku.clone();
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.same_item(&line.product_handle, sku.as_deref()))
        {
            let merged = existing.quantity.saturating_add(line.quantity);
            check_quantity(&line.product_handle, merged)?;
            existing.quantity = merged;
            return Ok(());
        }

        check_quantity(&line.product_handle, line.quantity)?;
        if self.lines.len() >= Self::MAX_LINES {
            return Err(AssortmentError::TooManyLines {
                max: Self::MAX_LINES,
            });
        }
        self.lines.push(line);
        Ok(())
    }

    /// Set the quantity of a line; zero removes it.
    ///
    /// Returns `false` if the line does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is above [`Self::MAX_LINE_QUANTITY`].
    pub fn set_quantity(
        &mut self,
        handle: &Handle,
        sku: Option<&str>,
        quantity: u32,
    ) -> Result<bool, AssortmentError> {
        if quantity == 0 {
            return Ok(self.remove(handle, sku));
        }
        check_quantity(handle, quantity)?;
        match self.lines.iter_mut().find(|l| l.same_item(handle, sku)) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a line. Returns `true` if a line was removed.
    pub fn remove(&mut self, handle: &Handle, sku: Option<&str>) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| !l.same_item(handle, sku));
        self.lines.len() != before
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the assortment has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AssortmentLine> {
        self.lines.iter()
    }

    /// Distinct product handles, in first-seen order.
    #[must_use]
    pub fn product_handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = Vec::new();
        for line in &self.lines {
            if !handles.contains(&line.product_handle) {
                handles.push(line.product_handle.clone());
            }
        }
        handles
    }
}

impl TryFrom<RawAssortment> for Assortment {
    type Error = AssortmentError;

    fn try_from(raw: RawAssortment) -> Result<Self, Self::Error> {
        Self::from_lines(raw.lines)
    }
}

fn check_quantity(handle: &Handle, quantity: u32) -> Result<(), AssortmentError> {
    if quantity == 0 || quantity > Assortment::MAX_LINE_QUANTITY {
        return Err(AssortmentError::QuantityOutOfRange {
            handle: handle.clone(),
            max: Assortment::MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn handle(s: &str) -> Handle {
        Handle::parse(s).unwrap()
    }

    #[test]
    fn test_add_merges_same_item_in_place() {
        let mut a = Assortment::default();
        a.add(AssortmentLine::new(handle("wool-coat"), 1)).unwrap();
        a.add(AssortmentLine::new(handle("silk-scarf"), 2)).unwrap();
        a.add(AssortmentLine::new(handle("wool-coat"), 4)).unwrap();

        let lines: Vec<_> = a.iter().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.first().unwrap().product_handle.as_str(), "wool-coat");
        assert_eq!(lines.first().unwrap().quantity, 5);
        assert_eq!(a.total_units(), 7);
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let mut a = Assortment::default();
        a.add(AssortmentLine::new(handle("loafer"), 1).with_variant("LF-38"))
            .unwrap();
        a.add(AssortmentLine::new(handle("loafer"), 1).with_variant("LF-39"))
            .unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.product_handles(), vec![handle("loafer")]);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut a = Assortment::default();
        a.add(AssortmentLine::new(handle("tote"), 3)).unwrap();
        assert!(a.set_quantity(&handle("tote"), None, 0).unwrap());
        assert!(a.is_empty());
        assert!(!a.set_quantity(&handle("tote"), None, 2).unwrap());
    }

    #[test]
    fn test_quantity_limits() {
        let mut a = Assortment::default();
        assert!(matches!(
            a.add(AssortmentLine::new(handle("tote"), 0)),
            Err(AssortmentError::QuantityOutOfRange { .. })
        ));
        a.add(AssortmentLine::new(handle("tote"), Assortment::MAX_LINE_QUANTITY))
            .unwrap();
        assert!(a.add(AssortmentLine::new(handle("tote"), 1)).is_err());
        assert_eq!(a.total_units(), u64::from(Assortment::MAX_LINE_QUANTITY));
    }

    #[test]
    fn test_line_limit() {
        let mut a = Assortment::default();
        for i in 0..Assortment::MAX_LINES {
            a.add(AssortmentLine::new(handle(&format!("p-{i}")), 1))
                .unwrap();
        }
        assert_eq!(
            a.add(AssortmentLine::new(handle("one-more"), 1)),
            Err(AssortmentError::TooManyLines { max: 200 })
        );
    }

    #[test]
    fn test_deserialize_local_storage_shape() {
        let json = r#"{"lines":[
            {"product_handle":"belt","quantity":1},
            {"product_handle":"belt","quantity":2},
            {"product_handle":"glove","variant_sku":"GL-M","quantity":1}
        ]}"#;
        let a: Assortment = serde_json::from_str(json).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.total_units(), 4);

        let bad = r#"{"lines":[{"product_handle":"belt","quantity":0}]}"#;
        assert!(serde_json::from_str::<Assortment>(bad).is_err());
    }
}
