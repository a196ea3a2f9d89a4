//! Durable key-value slot with best-effort persistence.
//!
//! The slot reads the backing store once at open, then serves reads from
//! memory and writes back on every mutation. Persistence failures degrade to
//! a warning; the in-memory value stays authoritative for the session.

use anyhow::{anyhow, Context, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Synchronous text key-value store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Durable store backed by a sled tree on disk.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)
            .with_context(|| format!("failed to open store at {:?}", path))?;
        Ok(Self { db })
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key)? {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| anyhow!("stored value for {:?} is not UTF-8: {}", key, e))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key, value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// Ephemeral store; used by tests and as a fallback when no disk path is
/// available.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A (key, current value) pair kept in sync with a durable store.
///
/// Exactly one in-memory slot per key per process is the assumption consumers
/// rely on; the favorites access point wraps exactly one.
pub struct PersistedSlot<T> {
    key: String,
    store: Arc<dyn KvStore>,
    value: RwLock<T>,
}

impl<T> PersistedSlot<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Reads the store once; an absent key or unparseable text falls back to
    /// `initial` without raising.
    pub fn open(store: Arc<dyn KvStore>, key: &str, initial: T) -> Self {
        let value = match store.get(key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("stored value for {:?} failed to parse, using initial: {}", key, e);
                    initial
                }
            },
            Ok(None) => initial,
            Err(e) => {
                warn!("failed to read stored value for {:?}, using initial: {}", key, e);
                initial
            }
        };

        Self {
            key: key.to_string(),
            store,
            value: RwLock::new(value),
        }
    }

    /// Current in-memory value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replaces the value and writes it back before returning.
    pub fn set(&self, next: T) {
        let mut value = self.value.write();
        *value = next;
        self.persist(&value);
    }

    /// Computes the next value from the previous one under a single lock
    /// scope, so no reader can observe an intermediate state.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let mut value = self.value.write();
        *value = f(&value);
        self.persist(&value);
    }

    /// Mutates in place; persists only when the closure reports a change.
    /// Returns whether anything changed.
    pub fn mutate(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let mut value = self.value.write();
        let changed = f(&mut value);
        if changed {
            self.persist(&value);
        }
        changed
    }

    fn persist(&self, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                warn!("failed to serialize value for {:?}: {}", self.key, e);
                return;
            }
        };
        if let Err(e) = self.store.put(&self.key, &serialized) {
            warn!("failed to persist {:?}, keeping in-memory value: {}", self.key, e);
        }
    }
}
