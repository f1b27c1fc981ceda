//! Field tables for catalog import records.
//!
//! Each import type is described by a static list of [`FieldSpec`]s. The
//! validator walks the list; fields not listed are ignored.

/// Largest amount a `NUMERIC(12, 2)` price column can hold.
pub const MAX_PRICE: f64 = 9_999_999_999.99;

/// Expected JSON shape of a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// String of at most `max` characters.
    Text { max: usize },
    /// String that must parse as a catalog handle.
    Handle,
    /// Whole number within `min..=max`.
    Integer { min: i64, max: i64 },
    /// Finite number within `0..=max`.
    Number { max: f64 },
    /// `true` or `false`.
    Boolean,
    /// Array of strings.
    TextArray { max_items: usize, max_len: usize },
    /// Array of nested objects described by `fields`.
    ObjectArray {
        max_items: usize,
        fields: &'static [FieldSpec],
    },
}

/// One field of an import record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: true,
            kind,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: false,
            kind,
        }
    }
}

const fn text(max: usize) -> FieldKind {
    FieldKind::Text { max }
}

const TAGS: FieldKind = FieldKind::TextArray {
    max_items: 50,
    max_len: 100,
};

const YEAR: FieldKind = FieldKind::Integer { min: 0, max: 9999 };

const PRICE: FieldKind = FieldKind::Number { max: MAX_PRICE };

pub const BRAND_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("handle", FieldKind::Handle),
    FieldSpec::required("name", text(255)),
    FieldSpec::optional("description", text(5000)),
    FieldSpec::optional("logo_url", text(2048)),
    FieldSpec::optional("banner_url", text(2048)),
    FieldSpec::optional("website_url", text(2048)),
    FieldSpec::optional("country", text(100)),
    FieldSpec::optional("founded_year", YEAR),
    FieldSpec::optional("is_featured", FieldKind::Boolean),
    FieldSpec::optional("tags", TAGS),
];

pub const COLLECTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("handle", FieldKind::Handle),
    FieldSpec::required("name", text(255)),
    FieldSpec::optional("description", text(5000)),
    FieldSpec::optional("brand_name", text(255)),
    FieldSpec::optional("image_url", text(2048)),
    FieldSpec::optional("season", text(100)),
    FieldSpec::optional("year", YEAR),
    FieldSpec::optional("is_featured", FieldKind::Boolean),
    FieldSpec::optional("tags", TAGS),
];

pub const IMAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("url", text(2048)),
    FieldSpec::optional("alt_text", text(500)),
];

pub const VARIANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", text(255)),
    FieldSpec::optional("sku", text(100)),
    FieldSpec::optional("size", text(50)),
    FieldSpec::optional("color", text(100)),
    FieldSpec::optional("price", PRICE),
    FieldSpec::optional(
        "inventory_quantity",
        FieldKind::Integer {
            min: 0,
            max: 2_147_483_647,
        },
    ),
];

pub const PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("handle", FieldKind::Handle),
    FieldSpec::required("title", text(500)),
    FieldSpec::optional("description", text(10_000)),
    FieldSpec::optional("brand_name", text(255)),
    FieldSpec::optional("product_type", text(255)),
    FieldSpec::optional("material", text(500)),
    FieldSpec::optional("price", PRICE),
    FieldSpec::optional("compare_at_price", PRICE),
    FieldSpec::optional("currency_code", text(3)),
    FieldSpec::optional("is_published", FieldKind::Boolean),
    FieldSpec::optional("tags", TAGS),
    FieldSpec::optional(
        "collection_handles",
        FieldKind::TextArray {
            max_items: 100,
            max_len: 255,
        },
    ),
    FieldSpec::optional(
        "images",
        FieldKind::ObjectArray {
            max_items: 50,
            fields: IMAGE_FIELDS,
        },
    ),
    FieldSpec::optional(
        "variants",
        FieldKind::ObjectArray {
            max_items: 100,
            fields: VARIANT_FIELDS,
        },
    ),
];
