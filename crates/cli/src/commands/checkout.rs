//! Checkout command.

use std::fmt::Write as _;
use std::time::Duration;

use pestshop_core::{
    HandoffConfig, KeyValueStore, Ledger, Navigator, PhoneNumber, Platform, compose, dispatch,
};

use super::CommandError;

/// Collects navigation requests as printable lines.
#[derive(Debug, Default)]
struct PrintNavigator {
    lines: Vec<String>,
}

impl Navigator for PrintNavigator {
    fn navigate(&mut self, url: &str) {
        self.lines.push(format!("Open: {url}"));
    }

    fn navigate_after(&mut self, delay: Duration, url: &str) {
        self.lines.push(format!(
            "If the app does not open within {}ms: {url}",
            delay.as_millis()
        ));
    }
}

/// Compose the cart into an order summary and list the hand-off links.
///
/// # Errors
///
/// Returns an error if the phone number is invalid or the cart is empty.
pub fn run<S: KeyValueStore>(
    ledger: &Ledger<S>,
    phone: &str,
    platform: Platform,
    fallback_ms: Option<u64>,
) -> Result<String, CommandError> {
    let mut config = HandoffConfig::new(PhoneNumber::parse(phone)?);
    if let Some(ms) = fallback_ms {
        config = config.with_fallback_delay(Duration::from_millis(ms));
    }

    let message = compose(&ledger.items())?;

    let mut navigator = PrintNavigator::default();
    dispatch(&message, platform, &config, &mut navigator);

    let mut out = String::from(message.as_str());
    out.push_str("\n\n");
    let _ = write!(out, "{}", navigator.lines.join("\n"));
    Ok(out)
}
