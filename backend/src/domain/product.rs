//! Catalogue product model.
//!
//! Prices are stored in minor currency units (integer cents) so arithmetic on
//! order totals stays exact.

use std::fmt;

use uuid::Uuid;

/// Maximum allowed length for a product name.
pub const PRODUCT_NAME_MAX: usize = 128;

/// Validation errors returned by the product constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyName,
    NameTooLong { max: usize },
    NegativePrice,
    NegativeStock,
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "product name must be at most {max} characters")
            }
            Self::NegativePrice => write!(f, "price must not be negative"),
            Self::NegativeStock => write!(f, "stock must not be negative"),
        }
    }
}

impl std::error::Error for ProductValidationError {}

/// Validated product attributes without an identity.
///
/// Used both for creation and for full updates, mirroring the write shape of
/// the products endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    name: String,
    description: Option<String>,
    brand: Option<String>,
    size: Option<String>,
    color: Option<String>,
    material: Option<String>,
    price_cents: i64,
    stock: i32,
}

/// Raw inputs for [`ProductDraft::new`].
#[derive(Debug, Clone, Default)]
pub struct ProductDraftParts {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

impl ProductDraft {
    /// Validate raw parts into a draft.
    pub fn new(parts: ProductDraftParts) -> Result<Self, ProductValidationError> {
        let ProductDraftParts {
            name,
            description,
            brand,
            size,
            color,
            material,
            price_cents,
            stock,
        } = parts;

        if name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if name.chars().count() > PRODUCT_NAME_MAX {
            return Err(ProductValidationError::NameTooLong {
                max: PRODUCT_NAME_MAX,
            });
        }
        if price_cents < 0 {
            return Err(ProductValidationError::NegativePrice);
        }
        if stock < 0 {
            return Err(ProductValidationError::NegativeStock);
        }

        Ok(Self {
            name,
            description,
            brand,
            size,
            color,
            material,
            price_cents,
            stock,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Unit price in minor currency units.
    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    /// Units available for sale.
    pub fn stock(&self) -> i32 {
        self.stock
    }
}

/// Catalogue product.
///
/// ## Invariants
/// - `price_cents >= 0` and `stock >= 0`, enforced by [`ProductDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: Uuid,
    draft: ProductDraft,
}

impl Product {
    /// Attach an identity to a validated draft.
    pub fn new(id: Uuid, draft: ProductDraft) -> Self {
        Self { id, draft }
    }

    /// Stable product identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Validated product attributes.
    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }
}
