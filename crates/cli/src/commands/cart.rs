//! Cart commands.
//!
//! Each command applies one ledger operation and returns the cart as it
//! looks afterwards.

use std::fmt::Write as _;

use pestshop_core::{CartView, ItemId, KeyValueStore, Ledger, NewLineItem};

use super::CommandError;

/// Run `op` against the ledger and render the view it leaves behind.
fn apply<S, T>(ledger: &mut Ledger<S>, op: impl FnOnce(&mut Ledger<S>) -> T) -> (T, CartView)
where
    S: KeyValueStore,
{
    let output = op(ledger);
    let view = CartView::render(&ledger.items(), ledger.total_count());
    (output, view)
}

/// Add a product, merging with an existing line.
///
/// # Errors
///
/// Returns an error if `id` or `name` is empty.
pub fn add<S: KeyValueStore>(
    ledger: &mut Ledger<S>,
    id: &str,
    name: &str,
    category: Option<&str>,
    quantity: Option<u32>,
) -> Result<String, CommandError> {
    let mut item = NewLineItem::new(id, name)?;
    if let Some(category) = category {
        item = item.with_category(category);
    }
    if let Some(quantity) = quantity {
        item = item.with_quantity(quantity);
    }

    let ((), view) = apply(ledger, |ledger| ledger.add(item));
    tracing::info!(id, total = view.total_count, "Added to cart");
    Ok(render(&view))
}

/// Remove a line. Unknown ids leave the cart unchanged.
///
/// # Errors
///
/// Returns an error if `id` is empty.
pub fn remove<S: KeyValueStore>(ledger: &mut Ledger<S>, id: &str) -> Result<String, CommandError> {
    let id = ItemId::parse(id)?;
    let (removed, view) = apply(ledger, |ledger| ledger.remove(&id));
    if !removed {
        tracing::warn!(id = %id, "Item not in cart");
    }
    Ok(render(&view))
}

/// Set a line's quantity; zero or less removes it.
///
/// # Errors
///
/// Returns an error if `id` is empty.
pub fn set<S: KeyValueStore>(
    ledger: &mut Ledger<S>,
    id: &str,
    quantity: i64,
) -> Result<String, CommandError> {
    let id = ItemId::parse(id)?;
    let (_, view) = apply(ledger, |ledger| ledger.set_quantity(&id, quantity));
    Ok(render(&view))
}

/// Empty the cart.
pub fn clear<S: KeyValueStore>(ledger: &mut Ledger<S>) -> String {
    let ((), view) = apply(ledger, Ledger::clear);
    render(&view)
}

/// Print the cart.
#[must_use]
pub fn show<S: KeyValueStore>(ledger: &Ledger<S>) -> String {
    render(&CartView::render(&ledger.items(), ledger.total_count()))
}

/// Plain-text rendering of a cart view.
#[must_use]
pub fn render(view: &CartView) -> String {
    if view.lines.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for line in &view.lines {
        let _ = write!(out, "{:>4} x {} [{}]", line.quantity, line.name, line.id);
        if !line.category.is_empty() {
            let _ = write!(out, " ({})", line.category);
        }
        out.push('\n');
    }
    let _ = write!(out, "Total items: {}", view.total_count);
    out
}
