//! Cart state: ledger, persistence and view derivation.
//!
//! Mutations flow ledger → store (synchronous save) → listeners. Nothing in
//! this module blocks or performs network I/O.

pub mod ledger;
pub mod store;
pub mod view;

pub use ledger::{CartListener, Ledger};
pub use store::{CART_STORAGE_KEY, CartStore, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use view::{CartView, LineView, ViewSink, ViewSync};
