//! CLI command implementations.
//!
//! Commands return the text to print so they can be tested without a
//! terminal.

pub mod cart;
pub mod checkout;

use pestshop_core::{CheckoutError, ItemIdError, LineItemError, PhoneNumberError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The product given to `add` is invalid.
    #[error("{0}")]
    LineItem(#[from] LineItemError),

    /// The product id is invalid.
    #[error("invalid item id: {0}")]
    ItemId(#[from] ItemIdError),

    /// The checkout phone number is invalid.
    #[error("invalid phone number: {0}")]
    Phone(#[from] PhoneNumberError),

    /// The order could not be composed.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
}
