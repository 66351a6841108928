//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::{ItemId, ItemIdError};

/// Errors that can occur when building a [`NewLineItem`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The product id is invalid.
    #[error("invalid item id: {0}")]
    Id(#[from] ItemIdError),
    /// The display name is empty or whitespace only.
    #[error("item name cannot be empty")]
    EmptyName,
}

/// One product line in the cart.
///
/// This is also the persisted shape: a cart is stored as a JSON array of
/// `{id, name, category, quantity}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique key within the ledger.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Display category, empty when the product has none.
    #[serde(default)]
    pub category: String,
    /// Always at least 1 while the line is in a ledger.
    pub quantity: u32,
}

/// Input to [`Ledger::add`](crate::Ledger::add).
///
/// Construction guarantees a non-empty id and name. Quantity defaults to 1;
/// a requested quantity of 0 is treated the same as no quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    id: ItemId,
    name: String,
    category: String,
    quantity: u32,
}

impl NewLineItem {
    /// Build an add request for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or `name` is empty after trimming.
    pub fn new(id: &str, name: &str) -> Result<Self, LineItemError> {
        let id = ItemId::parse(id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(LineItemError::EmptyName);
        }

        Ok(Self {
            id,
            name: name.to_owned(),
            category: String::new(),
            quantity: 1,
        })
    }

    /// Set the display category.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        category.trim().clone_into(&mut self.category);
        self
    }

    /// Set how many units to add. Zero falls back to 1.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = if quantity == 0 { 1 } else { quantity };
        self
    }

    /// The product id.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Units to add.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
        }
    }
}
