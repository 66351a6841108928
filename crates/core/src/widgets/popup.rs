//! Marketing popup trigger.
//!
//! The popup opens once, either after a delay or when the visitor has
//! scrolled far enough, whichever comes first. Dismissal is remembered in
//! the same key-value storage as the cart so it is not shown again.

use std::time::Duration;

use crate::cart::KeyValueStore;

/// Storage key recording that the popup was dismissed.
pub const POPUP_DISMISSED_KEY: &str = "pestshop:popup-dismissed";

/// Decides when the popup opens.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupTrigger {
    delay: Duration,
    scroll_threshold: f64,
    shown: bool,
}

impl PopupTrigger {
    /// `scroll_threshold` is a fraction of the page height, clamped to 0..=1.
    #[must_use]
    pub fn new(delay: Duration, scroll_threshold: f64) -> Self {
        Self {
            delay,
            scroll_threshold: scroll_threshold.clamp(0.0, 1.0),
            shown: false,
        }
    }

    /// Build a trigger that stays closed if `store` records a dismissal.
    ///
    /// Unreadable storage or an unexpected stored value counts as not
    /// dismissed.
    #[must_use]
    pub fn restore(delay: Duration, scroll_threshold: f64, store: &impl KeyValueStore) -> Self {
        let dismissed = match store.get(POPUP_DISMISSED_KEY) {
            Ok(Some(value)) => value == "true",
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read popup state");
                false
            }
        };

        Self {
            shown: dismissed,
            ..Self::new(delay, scroll_threshold)
        }
    }

    /// Whether the popup should open now.
    #[must_use]
    pub fn should_show(&self, elapsed: Duration, scroll_fraction: f64) -> bool {
        !self.shown && (elapsed >= self.delay || scroll_fraction >= self.scroll_threshold)
    }

    /// Record that the popup opened.
    pub const fn mark_shown(&mut self) {
        self.shown = true;
    }

    /// Record that the visitor closed the popup, persisting the choice.
    ///
    /// Storage failures are logged; the trigger still stays closed for the
    /// rest of the session.
    pub fn dismiss(&mut self, store: &mut impl KeyValueStore) {
        self.shown = true;
        if let Err(e) = store.set(POPUP_DISMISSED_KEY, "true".to_string()) {
            tracing::warn!(error = %e, "Failed to persist popup dismissal");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::MemoryStore;

    const DELAY: Duration = Duration::from_secs(15);

    #[test]
    fn test_triggers_on_delay() {
        let trigger = PopupTrigger::new(DELAY, 0.5);
        assert!(!trigger.should_show(Duration::from_secs(14), 0.1));
        assert!(trigger.should_show(DELAY, 0.1));
    }

    #[test]
    fn test_triggers_on_scroll() {
        let trigger = PopupTrigger::new(DELAY, 0.5);
        assert!(trigger.should_show(Duration::ZERO, 0.5));
    }

    #[test]
    fn test_shows_once() {
        let mut trigger = PopupTrigger::new(DELAY, 0.5);
        trigger.mark_shown();
        assert!(!trigger.should_show(DELAY, 1.0));
    }

    #[test]
    fn test_threshold_is_clamped() {
        let trigger = PopupTrigger::new(DELAY, 3.0);
        assert!(trigger.should_show(Duration::ZERO, 1.0));
    }

    #[test]
    fn test_dismissal_survives_restore() {
        let mut store = MemoryStore::new();
        let mut trigger = PopupTrigger::restore(DELAY, 0.5, &store);
        assert!(trigger.should_show(DELAY, 0.0));

        trigger.dismiss(&mut store);

        let restored = PopupTrigger::restore(DELAY, 0.5, &store);
        assert!(!restored.should_show(DELAY, 1.0));
    }

    #[test]
    fn test_unexpected_stored_value_is_not_dismissed() {
        let mut store = MemoryStore::new();
        store.set(POPUP_DISMISSED_KEY, "{garbage".to_string()).unwrap();
        assert!(PopupTrigger::restore(DELAY, 0.5, &store).should_show(DELAY, 0.0));
    }

    #[test]
    fn test_dismiss_with_full_storage_still_closes() {
        let mut store = MemoryStore::with_quota(0);
        let mut trigger = PopupTrigger::new(DELAY, 0.5);
        trigger.dismiss(&mut store);
        assert!(!trigger.should_show(DELAY, 1.0));
    }
}
