//! Checkout hand-off to the chat app.
//!
//! The cart is composed into an order summary and handed to the chat app
//! with a deep link. Mobile browsers are redirected straight to it; desktop
//! browsers get a short page that opens the native app and falls back to the
//! web client through a `Refresh` header.

use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use pestshop_core::{Navigator, Platform, dispatch};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_session::with_cart;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Desktop hand-off page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/handoff.html")]
pub struct HandoffTemplate {
    pub native: String,
    pub fallback: String,
    pub fallback_secs: u64,
}

/// Records navigation requests and turns them into an HTTP response.
#[derive(Debug, Default)]
pub struct ResponseNavigator {
    immediate: Option<String>,
    fallback: Option<(Duration, String)>,
}

impl Navigator for ResponseNavigator {
    fn navigate(&mut self, url: &str) {
        self.immediate = Some(url.to_string());
    }

    fn navigate_after(&mut self, delay: Duration, url: &str) {
        self.fallback = Some((delay, url.to_string()));
    }
}

impl ResponseNavigator {
    /// Build the response for the recorded navigation.
    ///
    /// # Errors
    ///
    /// Returns an internal error if nothing was recorded or a URL cannot be
    /// used as a header value.
    pub fn finish(self) -> Result<Response> {
        let Some(target) = self.immediate else {
            return Err(AppError::Internal("no hand-off navigation recorded".to_string()));
        };

        match self.fallback {
            None => {
                let location = header_value(&target)?;
                Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
            }
            Some((delay, fallback)) => {
                let fallback_secs = refresh_seconds(delay);
                let refresh = header_value(&format!("{fallback_secs}; url={fallback}"))?;
                Ok((
                    [(header::REFRESH, refresh)],
                    HandoffTemplate {
                        native: target,
                        fallback,
                        fallback_secs,
                    },
                )
                    .into_response())
            }
        }
    }
}

/// `Refresh` only takes whole seconds; round up so the app gets the full delay.
fn refresh_seconds(delay: Duration) -> u64 {
    let secs = delay.as_secs();
    if delay.subsec_nanos() > 0 { secs + 1 } else { secs }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("invalid hand-off header: {e}")))
}

/// Compose the cart into a chat message and hand it off.
///
/// # Errors
///
/// Returns 409 if the cart is empty; no navigation happens in that case.
#[instrument(skip(state, session, headers))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let (items, _) = with_cart(state.carts(), &session, |ledger| ledger.items()).await;

    let message = state.composer().compose(&items).inspect_err(|_| {
        tracing::info!("Checkout refused: cart is empty");
    })?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let platform = Platform::from_user_agent(user_agent);

    let lines = items.len().to_string();
    add_breadcrumb(
        "checkout",
        "Started chat checkout",
        Some(&[("lines", lines.as_str())]),
    );

    let mut navigator = ResponseNavigator::default();
    dispatch(&message, platform, state.handoff(), &mut navigator);
    navigator.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_seconds_rounds_up() {
        assert_eq!(refresh_seconds(Duration::from_millis(2500)), 3);
        assert_eq!(refresh_seconds(Duration::from_secs(2)), 2);
        assert_eq!(refresh_seconds(Duration::ZERO), 0);
    }

    #[test]
    fn test_direct_navigation_redirects() {
        let mut nav = ResponseNavigator::default();
        nav.navigate("https://wa.me/15550109999?text=hi");

        let response = nav.finish().unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://wa.me/15550109999?text=hi"
        );
    }

    #[test]
    fn test_fallback_navigation_sets_refresh() {
        let mut nav = ResponseNavigator::default();
        nav.navigate("whatsapp://send?phone=1&text=hi");
        nav.navigate_after(
            Duration::from_secs(2),
            "https://web.whatsapp.com/send?phone=1&text=hi",
        );

        let response = nav.finish().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::REFRESH).unwrap(),
            "2; url=https://web.whatsapp.com/send?phone=1&text=hi"
        );
    }

    #[test]
    fn test_nothing_recorded_is_internal_error() {
        assert!(matches!(
            ResponseNavigator::default().finish(),
            Err(AppError::Internal(_))
        ));
    }
}
