//! Integration tests for Pestshop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pestshop-integration-tests
//! ```
//!
//! The storefront router is driven in-process with `tower::ServiceExt`, so
//! no server or network is needed.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart routes and per-session isolation
//! - `storefront_checkout` - Checkout hand-off responses
//! - `core_scenarios` - Ledger, store and composer working together

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use pestshop_core::{HandoffConfig, PhoneNumber};
use pestshop_storefront::{app, config::StorefrontConfig, state::AppState};
use tower::ServiceExt;

/// Destination number used by test configurations.
pub const TEST_PHONE: &str = "15550109999";

/// User agent of a phone browser.
pub const MOBILE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

/// User agent of a desktop browser.
pub const DESKTOP_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Storefront configuration for tests.
///
/// # Panics
///
/// Panics if [`TEST_PHONE`] is not a valid phone number.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    let phone = PhoneNumber::parse(TEST_PHONE).expect("test phone is valid");

    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
        handoff: HandoffConfig::new(phone).with_fallback_delay(Duration::from_millis(2500)),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A header's value as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One browser talking to the storefront.
///
/// The session cookie is carried between requests the way a browser would.
/// Clones share the router and start from the same cookie, like tabs of one
/// browser.
#[derive(Clone)]
pub struct TestContext {
    app: Router,
    cookie: Option<String>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// A browser against a fresh storefront.
    #[must_use]
    pub fn new() -> Self {
        Self::with_app(app(AppState::new(test_config())))
    }

    /// A browser against an existing router.
    ///
    /// Clones of one router share their session store, so two contexts built
    /// from the same router behave like two browsers on one server.
    #[must_use]
    pub fn with_app(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// The router this browser talks to.
    #[must_use]
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// The current session cookie, if the server has set one.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Send a `GET`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.get_as(path, DESKTOP_UA).await
    }

    /// Send a `GET` with a specific user agent.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn get_as(&mut self, path: &str, user_agent: &str) -> TestResponse {
        let request = self
            .request("GET", path)
            .header(header::USER_AGENT, user_agent)
            .body(Body::empty())
            .expect("request builds");
        self.send(request).await
    }

    /// Send a form `POST`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_form(&mut self, path: &str, form: &str) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request builds");
        self.send(request).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.trim().to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
