//! Choosing and attempting the chat hand-off navigation.
//!
//! Mobile devices get a direct deep link. Desktops first try the native app
//! scheme and fall back to the web client if the page is still open after a
//! short delay. Neither path is retried and nothing confirms delivery.

use std::time::Duration;

use super::composer::CheckoutMessage;
use crate::types::PhoneNumber;

/// Default wait before the desktop web fallback.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(2500);

/// User-Agent fragments that identify a device with a native chat client.
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "mobile",
];

/// The requesting device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mobile,
    Desktop,
}

impl Platform {
    /// Classify a `User-Agent` header value. Unknown agents are desktops.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if MOBILE_MARKERS.iter().any(|marker| ua.contains(marker)) {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Where hand-off links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    /// Destination number.
    pub phone: PhoneNumber,
    /// Mobile deep-link base; the phone is appended as a path segment.
    pub mobile_base: String,
    /// Native app URI prefix used on desktop.
    pub app_scheme: String,
    /// Web client base used as the desktop fallback.
    pub web_base: String,
    /// How long the desktop attempt gets before falling back.
    pub fallback_delay: Duration,
}

impl HandoffConfig {
    /// Configuration for the standard chat endpoints.
    #[must_use]
    pub fn new(phone: PhoneNumber) -> Self {
        Self {
            phone,
            mobile_base: "https://wa.me".to_string(),
            app_scheme: "whatsapp://send".to_string(),
            web_base: "https://web.whatsapp.com/send".to_string(),
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }

    /// Override the desktop fallback delay.
    #[must_use]
    pub const fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// `<mobile_base>/<phone>?text=<message>`
    #[must_use]
    pub fn mobile_link(&self, message: &CheckoutMessage) -> String {
        format!(
            "{}/{}?text={}",
            self.mobile_base.trim_end_matches('/'),
            self.phone,
            urlencoding::encode(message.as_str())
        )
    }

    /// `<app_scheme>?phone=<phone>&text=<message>`
    #[must_use]
    pub fn native_link(&self, message: &CheckoutMessage) -> String {
        with_query(&self.app_scheme, &self.phone, message)
    }

    /// `<web_base>?phone=<phone>&text=<message>`
    #[must_use]
    pub fn web_link(&self, message: &CheckoutMessage) -> String {
        with_query(&self.web_base, &self.phone, message)
    }
}

fn with_query(base: &str, phone: &PhoneNumber, message: &CheckoutMessage) -> String {
    format!(
        "{base}?phone={phone}&text={}",
        urlencoding::encode(message.as_str())
    )
}

/// A planned hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// Navigate straight to `url`.
    Direct { url: String },
    /// Navigate to `native`; if the page is still open after `delay`,
    /// navigate to `fallback`.
    NativeWithFallback {
        native: String,
        fallback: String,
        delay: Duration,
    },
}

impl Handoff {
    /// Build the hand-off for a platform without performing it.
    #[must_use]
    pub fn plan(message: &CheckoutMessage, platform: Platform, config: &HandoffConfig) -> Self {
        match platform {
            Platform::Mobile => Self::Direct {
                url: config.mobile_link(message),
            },
            Platform::Desktop => Self::NativeWithFallback {
                native: config.native_link(message),
                fallback: config.web_link(message),
                delay: config.fallback_delay,
            },
        }
    }
}

/// The host's navigation primitives.
///
/// A browser host leaves the page on `navigate`, and `navigate_after` is
/// implicitly cancelled if the page is gone by then.
pub trait Navigator {
    fn navigate(&mut self, url: &str);
    fn navigate_after(&mut self, delay: Duration, url: &str);
}

/// Plan the hand-off for `platform` and attempt it through `navigator`.
///
/// Returns the attempted hand-off.
pub fn dispatch(
    message: &CheckoutMessage,
    platform: Platform,
    config: &HandoffConfig,
    navigator: &mut impl Navigator,
) -> Handoff {
    let handoff = Handoff::plan(message, platform, config);
    match &handoff {
        Handoff::Direct { url } => navigator.navigate(url),
        Handoff::NativeWithFallback {
            native,
            fallback,
            delay,
        } => {
            navigator.navigate(native);
            navigator.navigate_after(*delay, fallback);
        }
    }
    tracing::info!(?platform, "Checkout hand-off attempted");
    handoff
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::checkout::compose;
    use crate::types::{ItemId, LineItem};

    #[derive(Debug, Default)]
    struct Recorded {
        now: Vec<String>,
        later: Vec<(Duration, String)>,
    }

    impl Navigator for Recorded {
        fn navigate(&mut self, url: &str) {
            self.now.push(url.to_string());
        }

        fn navigate_after(&mut self, delay: Duration, url: &str) {
            self.later.push((delay, url.to_string()));
        }
    }

    fn message() -> CheckoutMessage {
        compose(&[LineItem {
            id: ItemId::parse("A").unwrap(),
            name: "Termite Bait".to_string(),
            category: "Baiting".to_string(),
            quantity: 1,
        }])
        .unwrap()
    }

    fn config() -> HandoffConfig {
        HandoffConfig::new(PhoneNumber::parse("+52 55 1234 5678").unwrap())
    }

    #[test]
    fn test_platform_detection() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        let android = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36";
        let desktop = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0";

        assert_eq!(Platform::from_user_agent(iphone), Platform::Mobile);
        assert_eq!(Platform::from_user_agent(android), Platform::Mobile);
        assert_eq!(Platform::from_user_agent(desktop), Platform::Desktop);
        assert_eq!(Platform::from_user_agent(""), Platform::Desktop);
    }

    #[test]
    fn test_mobile_dispatch_is_direct() {
        let mut nav = Recorded::default();
        let handoff = dispatch(&message(), Platform::Mobile, &config(), &mut nav);

        assert_eq!(nav.now.len(), 1);
        assert!(nav.later.is_empty());
        assert!(nav.now[0].starts_with("https://wa.me/525512345678?text=Hello%21%20I%20would"));
        assert!(matches!(handoff, Handoff::Direct { .. }));
    }

    #[test]
    fn test_desktop_dispatch_schedules_fallback() {
        let mut nav = Recorded::default();
        dispatch(&message(), Platform::Desktop, &config(), &mut nav);

        assert_eq!(nav.now.len(), 1);
        assert!(nav.now[0].starts_with("whatsapp://send?phone=525512345678&text="));
        assert_eq!(nav.later.len(), 1);
        assert_eq!(nav.later[0].0, DEFAULT_FALLBACK_DELAY);
        assert!(
            nav.later[0]
                .1
                .starts_with("https://web.whatsapp.com/send?phone=525512345678&text=")
        );
    }

    #[test]
    fn test_message_is_fully_encoded() {
        let link = config().mobile_link(&message());
        let (_, text) = link.split_once("?text=").unwrap();
        assert!(!text.contains(' '));
        assert!(!text.contains('\n'));
        assert!(text.contains("%0A"));
        assert_eq!(urlencoding::decode(text).unwrap(), message().as_str());
    }

    #[test]
    fn test_custom_delay() {
        let config = config().with_fallback_delay(Duration::from_secs(4));
        match Handoff::plan(&message(), Platform::Desktop, &config) {
            Handoff::NativeWithFallback { delay, .. } => {
                assert_eq!(delay, Duration::from_secs(4));
            }
            Handoff::Direct { .. } => panic!("desktop must use the fallback strategy"),
        }
    }
}
