//! Application state shared across handlers.

use std::sync::Arc;

use pestshop_core::{Composer, HandoffConfig};

use crate::cart_session::CartRegistry;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    composer: Composer,
    carts: CartRegistry,
}

impl AppState {
    /// Create a new application state using the built-in message template.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_composer(config, Composer::default())
    }

    /// Create a new application state with a custom composer.
    #[must_use]
    pub fn with_composer(config: StorefrontConfig, composer: Composer) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                composer,
                carts: CartRegistry::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the checkout message composer.
    #[must_use]
    pub fn composer(&self) -> &Composer {
        &self.inner.composer
    }

    /// Get a reference to the per-browser cart storage.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the chat hand-off configuration.
    #[must_use]
    pub fn handoff(&self) -> &HandoffConfig {
        &self.inner.config.handoff
    }
}
