//! Per-browser carts held on the server.
//!
//! The session only carries a cart id. The cart itself is a core
//! [`MemoryStore`] in the [`CartRegistry`], behind a mutex that is held for
//! the whole load, mutate and save cycle, so concurrent requests from one
//! browser apply one after another.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use pestshop_core::{
    CART_STORAGE_KEY, CartView, KeyValueStore, Ledger, MemoryStore, ViewSink, ViewSync,
};
use tokio::sync::{Mutex, watch};
use tower_sessions::Session;
use uuid::Uuid;

/// Session keys used by cart requests.
pub mod session_keys {
    /// Id of the browser's cart in the [`CartRegistry`](super::CartRegistry).
    pub const CART_ID: &str = "cart_id";
}

/// Carts idle longer than this are dropped, matching the session cookie's
/// inactivity window.
pub const CART_IDLE_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on carts kept at once.
const MAX_CARTS: u64 = 100_000;

/// Storage limit per cart, in the range browsers give a site.
const CART_QUOTA_BYTES: usize = 64 * 1024;

type CartHandle = Arc<Mutex<MemoryStore>>;

/// The ledger type handlers operate on.
pub type CartLedger<'a> = Ledger<&'a mut MemoryStore>;

/// Server-side cart storage keyed by the id kept in each session.
///
/// Cheaply cloneable; clones share the same carts.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<Uuid, CartHandle>,
}

impl Default for CartRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CartRegistry {
    /// Registry with the default size limit and idle expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(MAX_CARTS, CART_IDLE_EXPIRY)
    }

    /// Registry keeping at most `max_carts`, dropping carts idle for `idle`.
    #[must_use]
    pub fn with_limits(max_carts: u64, idle: Duration) -> Self {
        let carts = Cache::builder()
            .max_capacity(max_carts)
            .time_to_idle(idle)
            .build();
        Self { carts }
    }

    /// The cart for `id`, created empty if unknown or expired.
    async fn open(&self, id: Uuid) -> CartHandle {
        self.carts
            .get_with(id, async { new_cart(MemoryStore::with_quota(CART_QUOTA_BYTES)) })
            .await
    }

    async fn insert(&self, id: Uuid, store: MemoryStore) {
        self.carts.insert(id, new_cart(store)).await;
    }
}

fn new_cart(store: MemoryStore) -> CartHandle {
    Arc::new(Mutex::new(store))
}

/// Get the cart id from the session.
async fn get_cart_id(session: &Session) -> Option<Uuid> {
    let raw = match session.get::<String>(session_keys::CART_ID).await {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart id from session");
            return None;
        }
    };

    match raw.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed cart id in session");
            None
        }
    }
}

/// [`ViewSink`] publishing into a watch channel.
struct WatchSink(watch::Sender<CartView>);

impl ViewSink for WatchSink {
    fn show(&mut self, view: CartView) {
        self.0.send_replace(view);
    }
}

/// Open a ledger over `store`, run `op`, and capture the resulting view.
fn run_ledger<T>(
    store: &mut MemoryStore,
    op: impl FnOnce(&mut CartLedger<'_>) -> T,
) -> (T, CartView) {
    let (tx, rx) = watch::channel(CartView::empty());
    let mut ledger = Ledger::open(store);
    ledger.subscribe(ViewSync::new(WatchSink(tx)));
    let output = op(&mut ledger);
    let view = rx.borrow().clone();
    (output, view)
}

/// Open the browser's cart, run `op` on it, and return the op's result with
/// the resulting view.
///
/// A browser without a cart gets one on its first mutation; reads leave the
/// session untouched.
pub async fn with_cart<T, F>(carts: &CartRegistry, session: &Session, op: F) -> (T, CartView)
where
    F: FnOnce(&mut CartLedger<'_>) -> T + Send,
    T: Send,
{
    if let Some(id) = get_cart_id(session).await {
        let cart = carts.open(id).await;
        let mut store = cart.lock().await;
        return run_ledger(&mut store, op);
    }

    let mut store = MemoryStore::with_quota(CART_QUOTA_BYTES);
    let result = run_ledger(&mut store, op);

    if matches!(store.get(CART_STORAGE_KEY), Ok(Some(_))) {
        let id = Uuid::new_v4();
        carts.insert(id, store).await;
        if let Err(e) = session.insert(session_keys::CART_ID, id.to_string()).await {
            tracing::warn!(error = %e, "Failed to store cart id in session");
        }
        tracing::debug!(cart_id = %id, "Created cart");
    }

    result
}

/// The browser's current cart view.
pub async fn current_view(carts: &CartRegistry, session: &Session) -> CartView {
    with_cart(carts, session, |_| ()).await.1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pestshop_core::NewLineItem;

    fn session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_read_does_not_create_cart() {
        let carts = CartRegistry::new();
        let session = session();

        let view = current_view(&carts, &session).await;
        assert_eq!(view, CartView::empty());
        assert!(session.get::<String>(session_keys::CART_ID).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_mutation_assigns_cart() {
        let carts = CartRegistry::new();
        let session = session();

        let ((), view) = with_cart(&carts, &session, |ledger| {
            ledger.add(NewLineItem::new("A", "Termite Bait").unwrap());
        })
        .await;
        assert_eq!(view.total_count, 1);
        assert!(get_cart_id(&session).await.is_some());

        let again = current_view(&carts, &session).await;
        assert_eq!(again.total_count, 1);
    }

    #[tokio::test]
    async fn test_malformed_cart_id_is_ignored() {
        let carts = CartRegistry::new();
        let session = session();
        session
            .insert(session_keys::CART_ID, "not-a-uuid")
            .await
            .unwrap();

        assert!(get_cart_id(&session).await.is_none());
        assert_eq!(current_view(&carts, &session).await, CartView::empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_are_serialized() {
        let carts = CartRegistry::new();
        let session = session();
        with_cart(&carts, &session, |ledger| {
            ledger.add(NewLineItem::new("A", "Ant Gel").unwrap());
        })
        .await;

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let carts = carts.clone();
                let session = session.clone();
                tokio::spawn(async move {
                    with_cart(&carts, &session, |ledger| {
                        ledger.add(NewLineItem::new("A", "Ant Gel").unwrap());
                    })
                    .await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(current_view(&carts, &session).await.total_count, 51);
    }
}
