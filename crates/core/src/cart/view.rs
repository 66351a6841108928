//! Derived cart view state.
//!
//! [`ViewSync`] subscribes to a [`Ledger`](super::Ledger) and pushes a fresh
//! [`CartView`] to its [`ViewSink`] whenever the visible state changes. The
//! sink decides how to draw it.

use serde::Serialize;

use super::ledger::CartListener;
use crate::types::LineItem;

/// Badge counts above this are shown as `99+`.
pub const BADGE_MAX: u32 = 99;

/// Display data for one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
}

/// Everything a cart widget needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<LineView>,
    pub total_count: u32,
    /// Badge text, empty when the cart is empty.
    pub badge: String,
    pub checkout_enabled: bool,
}

impl CartView {
    /// Render the view for a cart state.
    #[must_use]
    pub fn render(items: &[LineItem], total_count: u32) -> Self {
        let badge = match total_count {
            0 => String::new(),
            n if n > BADGE_MAX => format!("{BADGE_MAX}+"),
            n => n.to_string(),
        };

        Self {
            lines: items
                .iter()
                .map(|line| LineView {
                    id: line.id.to_string(),
                    name: line.name.clone(),
                    category: line.category.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            total_count,
            badge,
            checkout_enabled: total_count > 0,
        }
    }

    /// The view of an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::render(&[], 0)
    }
}

impl Default for CartView {
    fn default() -> Self {
        Self::empty()
    }
}

/// Destination for rendered views.
pub trait ViewSink: Send {
    fn show(&mut self, view: CartView);
}

/// Ledger listener that renders views into a sink.
///
/// A view identical to the last one shown is not pushed again.
#[derive(Debug)]
pub struct ViewSync<V> {
    sink: V,
    last: Option<CartView>,
}

impl<V: ViewSink> ViewSync<V> {
    pub const fn new(sink: V) -> Self {
        Self { sink, last: None }
    }

    /// The most recently shown view.
    #[must_use]
    pub const fn current(&self) -> Option<&CartView> {
        self.last.as_ref()
    }
}

impl<V: ViewSink> CartListener for ViewSync<V> {
    fn ledger_changed(&mut self, items: &[LineItem], total_count: u32) {
        let view = CartView::render(items, total_count);
        if self.last.as_ref() == Some(&view) {
            return;
        }
        self.sink.show(view.clone());
        self.last = Some(view);
    }
}
