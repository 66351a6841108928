//! Core types for Pestshop.
//!
//! This module provides type-safe wrappers for the cart's domain values.

pub mod id;
pub mod line_item;
pub mod phone;

pub use id::{ItemId, ItemIdError};
pub use line_item::{LineItem, LineItemError, NewLineItem};
pub use phone::{PhoneNumber, PhoneNumberError};
