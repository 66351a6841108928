//! The authoritative in-memory cart.

use core::fmt;

use super::store::{CartStore, KeyValueStore, MemoryStore};
use crate::types::{ItemId, LineItem, NewLineItem};

/// Receives the cart state after every effective mutation.
///
/// Closures of the shape `FnMut(&[LineItem], u32)` implement this trait.
pub trait CartListener: Send {
    /// Called with the current items and their summed quantity.
    fn ledger_changed(&mut self, items: &[LineItem], total_count: u32);
}

impl<F> CartListener for F
where
    F: FnMut(&[LineItem], u32) + Send,
{
    fn ledger_changed(&mut self, items: &[LineItem], total_count: u32) {
        self(items, total_count);
    }
}

/// Ordered list of cart lines, persisted after every mutation.
///
/// Lines keep insertion order. Adding an id that is already present merges
/// into the existing line instead of appending a second row.
///
/// # Example
///
/// ```
/// use pestshop_core::{Ledger, NewLineItem};
///
/// let mut ledger = Ledger::in_memory();
/// let bait = NewLineItem::new("A", "Termite Bait")?.with_category("Baiting");
///
/// ledger.add(bait.clone());
/// ledger.add(bait.with_quantity(2));
///
/// assert_eq!(ledger.len(), 1);
/// assert_eq!(ledger.total_count(), 3);
/// # Ok::<(), pestshop_core::LineItemError>(())
/// ```
pub struct Ledger<S: KeyValueStore> {
    items: Vec<LineItem>,
    store: CartStore<S>,
    listeners: Vec<Box<dyn CartListener>>,
}

impl Ledger<MemoryStore> {
    /// An empty ledger backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new())
    }
}

impl<S: KeyValueStore> Ledger<S> {
    /// Open the ledger stored in `backend`, or an empty one.
    pub fn open(backend: S) -> Self {
        Self::with_store(CartStore::new(backend))
    }

    /// Open the ledger through an already configured adapter.
    pub fn with_store(store: CartStore<S>) -> Self {
        let items = store.load();
        tracing::debug!(lines = items.len(), "Cart ledger opened");
        Self {
            items,
            store,
            listeners: Vec::new(),
        }
    }

    /// Register a change listener.
    ///
    /// The listener is called once immediately with the current state, then
    /// after every mutation.
    pub fn subscribe(&mut self, mut listener: impl CartListener + 'static) {
        listener.ledger_changed(&self.items, self.total_count());
        self.listeners.push(Box::new(listener));
    }

    /// Add units of a product, merging with an existing line of the same id.
    ///
    /// The incoming quantity is added to the existing one, so a batch add of
    /// three units after one unit yields four.
    pub fn add(&mut self, item: NewLineItem) {
        if let Some(existing) = self.items.iter_mut().find(|line| &line.id == item.id()) {
            existing.quantity = existing.quantity.saturating_add(item.quantity());
            tracing::debug!(id = %existing.id, quantity = existing.quantity, "Merged cart line");
        } else {
            let line = item.into_line_item();
            tracing::debug!(id = %line.id, quantity = line.quantity, "Appended cart line");
            self.items.push(line);
        }
        self.commit();
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        let removed = self.items.len() != before;
        if removed {
            tracing::debug!(%id, "Removed cart line");
            self.commit();
        }
        removed
    }

    /// Replace the quantity of the line for `id`.
    ///
    /// A quantity of zero or less removes the line. Unknown ids are ignored.
    /// Returns whether the ledger changed.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let Some(line) = self.items.iter_mut().find(|line| &line.id == id) else {
            return false;
        };
        if line.quantity == quantity {
            return false;
        }
        line.quantity = quantity;
        tracing::debug!(%id, quantity, "Updated cart line quantity");
        self.commit();
        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        tracing::debug!("Cleared cart");
        self.commit();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, line| sum.saturating_add(line.quantity))
    }

    /// A copy of the current lines.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop the ledger and return its storage backend.
    pub fn into_store(self) -> S {
        self.store.into_backend()
    }

    fn commit(&mut self) {
        self.store.save(&self.items);
        let total = self.total_count();
        for listener in &mut self.listeners {
            listener.ledger_changed(&self.items, total);
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("items", &self.items)
            .field("key", &self.store.key())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::parse(s).unwrap()
    }

    fn new_item(s: &str) -> NewLineItem {
        NewLineItem::new(s, &format!("Product {s}")).unwrap()
    }

    fn sum(ledger: &Ledger<MemoryStore>) -> u32 {
        ledger.items().iter().map(|line| line.quantity).sum()
    }

    #[test]
    fn test_add_merge_set_zero_scenario() {
        let mut ledger = Ledger::in_memory();
        let bait = NewLineItem::new("A", "Termite Bait")
            .unwrap()
            .with_category("Baiting");

        ledger.add(bait.clone());
        assert_eq!(ledger.total_count(), 1);

        ledger.add(bait.with_quantity(2));
        let items = ledger.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "A");
        assert_eq!(items[0].quantity, 3);
        assert_eq!(ledger.total_count(), 3);

        assert!(ledger.set_quantity(&id("A"), 0));
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_count(), 0);
    }

    #[test]
    fn test_merge_does_not_reorder() {
        let mut ledger = Ledger::in_memory();
        ledger.add(new_item("A"));
        ledger.add(new_item("B"));
        ledger.add(new_item("A").with_quantity(4));

        let ids: Vec<_> = ledger.items().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![id("A"), id("B")]);
        assert_eq!(ledger.get(&id("A")).unwrap().quantity, 5);
    }

    #[test]
    fn test_merge_keeps_first_display_fields() {
        let mut ledger = Ledger::in_memory();
        ledger.add(NewLineItem::new("A", "Termite Bait").unwrap());
        ledger.add(NewLineItem::new("A", "Renamed").unwrap());
        assert_eq!(ledger.get(&id("A")).unwrap().name, "Termite Bait");
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let build = || {
            let mut ledger = Ledger::in_memory();
            ledger.add(new_item("A"));
            ledger.add(new_item("B").with_quantity(2));
            ledger.add(new_item("C"));
            ledger
        };

        let mut via_set = build();
        let mut via_remove = build();
        via_set.set_quantity(&id("B"), 0);
        via_remove.remove(&id("B"));

        assert_eq!(via_set.items(), via_remove.items());
        assert_eq!(via_set.len(), 2);
    }

    #[test]
    fn test_negative_quantity_removes() {
        let mut ledger = Ledger::in_memory();
        ledger.add(new_item("A"));
        assert!(ledger.set_quantity(&id("A"), -3));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut ledger = Ledger::in_memory();
        ledger.add(new_item("A"));

        assert!(!ledger.remove(&id("Z")));
        assert!(!ledger.set_quantity(&id("Z"), 5));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_count(), 1);
    }

    #[test]
    fn test_items_is_a_snapshot() {
        let mut ledger = Ledger::in_memory();
        ledger.add(new_item("A"));

        let mut snapshot = ledger.items();
        snapshot[0].quantity = 99;
        snapshot.clear();

        assert_eq!(ledger.total_count(), 1);
    }

    #[test]
    fn test_total_count_matches_sum_over_mixed_operations() {
        let mut ledger = Ledger::in_memory();
        let ids = ["A", "B", "C", "D"];
        let mut seed: u64 = 0x2545_f491;

        for _ in 0..500 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let pick = ids[usize::try_from((seed >> 33) % 4).unwrap()];
            let amount = i64::try_from((seed >> 40) % 6).unwrap() - 1;

            match (seed >> 20) % 3 {
                0 => ledger.add(new_item(pick).with_quantity(u32::try_from(amount.max(0)).unwrap())),
                1 => {
                    ledger.remove(&id(pick));
                }
                _ => {
                    ledger.set_quantity(&id(pick), amount);
                }
            }

            assert_eq!(ledger.total_count(), sum(&ledger));
            assert!(ledger.items().iter().all(|line| line.quantity >= 1));
        }
    }

    #[test]
    fn test_quantity_saturates() {
        let mut ledger = Ledger::in_memory();
        ledger.add(new_item("A").with_quantity(u32::MAX));
        ledger.add(new_item("A").with_quantity(10));
        assert_eq!(ledger.total_count(), u32::MAX);

        ledger.set_quantity(&id("A"), i64::MAX);
        assert_eq!(ledger.get(&id("A")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut ledger = Ledger::in_memory();
        ledger.add(new_item("A"));
        ledger.add(new_item("B"));
        ledger.set_quantity(&id("B"), 7);

        let expected = ledger.items();
        let reopened = Ledger::open(ledger.into_store());
        assert_eq!(reopened.items(), expected);
    }

    #[test]
    fn test_failed_persistence_keeps_memory_state() {
        let mut ledger = Ledger::open(MemoryStore::with_quota(8));
        ledger.add(new_item("A").with_quantity(2));

        assert_eq!(ledger.total_count(), 2);
        assert!(Ledger::open(ledger.into_store()).is_empty());
    }

    #[test]
    fn test_listener_sees_every_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut ledger = Ledger::in_memory();
        ledger.subscribe(move |items: &[LineItem], total: u32| {
            sink.lock().unwrap().push((items.len(), total));
        });

        ledger.add(new_item("A"));
        ledger.add(new_item("A"));
        ledger.remove(&id("missing"));
        ledger.clear();

        assert_eq!(*seen.lock().unwrap(), vec![(0, 0), (1, 1), (1, 2), (0, 0)]);
    }

    #[test]
    fn test_independent_instances() {
        let mut first = Ledger::in_memory();
        let second = Ledger::in_memory();
        first.add(new_item("A"));
        assert!(second.is_empty());
    }
}
