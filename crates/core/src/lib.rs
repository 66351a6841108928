//! Pestshop Core - cart state, checkout hand-off and widget logic.
//!
//! This crate is shared by all Pestshop components:
//! - `storefront` - HTTP server hosting the cart for browsers
//! - `cli` - Command-line cart backed by files
//!
//! # Architecture
//!
//! The core crate performs no network I/O. Storage goes through the
//! synchronous [`KeyValueStore`] trait, navigation through the [`Navigator`]
//! trait, and rendering through [`ViewSink`]; hosts supply the
//! implementations.
//!
//! # Modules
//!
//! - [`types`] - Validated ids, line items and phone numbers
//! - [`cart`] - Ledger, persistence adapter and view derivation
//! - [`checkout`] - Order summary composition and chat hand-off
//! - [`widgets`] - Carousel, popup trigger, scroll state and gallery filter

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;
pub mod widgets;

pub use cart::{
    CART_STORAGE_KEY, CartListener, CartStore, CartView, FileStore, KeyValueStore, Ledger,
    LineView, MemoryStore, StorageError, ViewSink, ViewSync,
};
pub use checkout::{
    CheckoutError, CheckoutMessage, Composer, Handoff, HandoffConfig, MessageTemplate, Navigator,
    Platform, compose, dispatch,
};
pub use types::*;
