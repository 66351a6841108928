//! Durable key-value slots and the cart's persistence adapter.
//!
//! [`KeyValueStore`] models a per-browser storage slot: string keys, string
//! values, synchronous access, writes that may be refused. [`CartStore`]
//! layers the cart's JSON layout on top and never lets a storage problem
//! reach the caller.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::types::LineItem;

/// Key under which the cart is stored.
pub const CART_STORAGE_KEY: &str = "pestshop:cart";

/// Errors reported by a [`KeyValueStore`] backend.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// The write would exceed the backend's size limit.
    #[error("storage quota exceeded ({needed} bytes needed, limit {limit})")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Storage is disabled or otherwise not reachable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A synchronous string key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the write.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// =============================================================================
// Memory backend
// =============================================================================

/// In-memory store with an optional byte quota.
///
/// The quota counts key and value bytes across all entries, the way browser
/// storage limits are usually accounted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once `bytes` would be exceeded.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    /// Bytes currently held.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// File backend
// =============================================================================

/// One file per key inside a directory.
///
/// Keys are mapped to file names by replacing every character outside
/// `[A-Za-z0-9_-]` with `_`, so `pestshop:cart` lives in `pestshop_cart.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the storage directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        // Readers never observe a partially written file.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Cart adapter
// =============================================================================

/// Loads and saves the cart under [`CART_STORAGE_KEY`].
///
/// Both directions fail soft: problems are logged and replaced by an empty
/// cart (on load) or ignored (on save).
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Wrap a backend using the default cart key.
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, CART_STORAGE_KEY)
    }

    /// Wrap a backend using a custom key.
    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// The storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored cart.
    ///
    /// Returns an empty list when nothing is stored, when the backend cannot
    /// be read, or when the stored value is not a valid cart.
    pub fn load(&self) -> Vec<LineItem> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read stored cart");
                return Vec::new();
            }
        };

        match parse_cart(&raw) {
            Ok(items) => items,
            Err(reason) => {
                tracing::warn!(key = %self.key, %reason, "Discarding malformed stored cart");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored cart with `items`.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn save(&mut self, items: &[LineItem]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.backend.set(&self.key, json) {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist cart");
        }
    }

    /// Borrow the backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Return the backend.
    pub fn into_backend(self) -> S {
        self.backend
    }
}

/// Parse and validate a stored cart.
fn parse_cart(raw: &str) -> Result<Vec<LineItem>, String> {
    let items: Vec<LineItem> = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if item.quantity == 0 {
            return Err(format!("item {} has zero quantity", item.id));
        }
        if item.name.trim().is_empty() {
            return Err(format!("item {} has an empty name", item.id));
        }
        if !seen.insert(&item.id) {
            return Err(format!("item {} appears more than once", item.id));
        }
    }

    Ok(items)
}
