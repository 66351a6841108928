//! Checkout: order summary composition and chat hand-off.

pub mod composer;
pub mod dispatch;

pub use composer::{CheckoutError, CheckoutMessage, Composer, MessageTemplate, compose};
pub use dispatch::{
    DEFAULT_FALLBACK_DELAY, Handoff, HandoffConfig, Navigator, Platform, dispatch,
};
