//! Shared-instance cache keyed by object-defining attributes.
//!
//! Callers describe a value by its identifying fields; the cache hands back
//! an `Arc` to the single instance stored for those fields, constructing it
//! on first request. Entries are immutable once created and live as long as
//! the cache that owns them.

mod error;
mod key;

pub use error::{CacheError, CacheResult, InvalidKey};
pub use key::{CacheKey, FiniteF64, IntoCacheKey, KeyField};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Shared-instance cache with get-or-create semantics.
///
/// Each distinct key maps to exactly one entry: repeated requests return the
/// identical `Arc`, never an equal-by-value copy, and construction runs at
/// most once per key even when first-time callers race from multiple
/// threads. Entries are never removed or replaced.
///
/// The cache is an explicitly owned value. Hold it where shared lookups are
/// needed and drop it to release every entry at once.
pub struct KeyedInstanceCache<T> {
    inner: Mutex<Inner<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct Inner<T> {
    entries: HashMap<CacheKey, Arc<T>>,
    /// Field count of the stored keys, fixed by the first insertion.
    arity: Option<usize>,
}

impl<T> KeyedInstanceCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                arity: None,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the entry for `fields`, constructing it on first request.
    ///
    /// `build` receives the derived key and runs at most once per distinct
    /// key; all callers that derive the same key share one `Arc`.
    pub fn get_or_create<K, F>(&self, fields: K, build: F) -> CacheResult<Arc<T>>
    where
        K: IntoCacheKey,
        F: FnOnce(&CacheKey) -> T,
    {
        self.try_get_or_create(fields, |key| Ok::<T, std::convert::Infallible>(build(key)))
    }

    /// Like [`get_or_create`](Self::get_or_create), for fallible construction.
    ///
    /// A build failure surfaces as [`CacheError::ConstructionFailed`] and
    /// leaves the key unoccupied, so a later request may try again.
    pub fn try_get_or_create<K, F, E>(&self, fields: K, build: F) -> CacheResult<Arc<T>>
    where
        K: IntoCacheKey,
        F: FnOnce(&CacheKey) -> Result<T, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let key = fields.into_cache_key()?;
        // Lookup and construction happen under one lock so racing callers
        // for a new key observe a single winning entry.
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.check_arity(&key)?;

        if let Some(entry) = inner.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key = %key, "cache hit");
            return Ok(Arc::clone(entry));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = build(&key).map_err(|e| {
            let source = e.into();
            tracing::warn!(key = %key, error = %source, "entry construction failed");
            CacheError::ConstructionFailed { source }
        })?;

        let entry = Arc::new(value);
        inner.arity = Some(key.len());
        inner.entries.insert(key.clone(), Arc::clone(&entry));
        tracing::debug!(key = %key, entries = inner.entries.len(), "entry constructed");
        Ok(entry)
    }

    /// Look up the entry for `fields` without constructing one.
    pub fn get<K: IntoCacheKey>(&self, fields: K) -> CacheResult<Option<Arc<T>>> {
        let key = fields.into_cache_key()?;
        let inner = self.inner.lock().expect("cache mutex poisoned");
        inner.check_arity(&key)?;
        Ok(inner.entries.get(&key).map(Arc::clone))
    }

    /// Number of distinct entries currently stored.
    pub fn count(&self) -> usize {
        self.inner
            .lock()
            .expect("cache mutex poisoned")
            .entries
            .len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Snapshot of the hit/miss counters and entry count.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.count(),
        }
    }
}

impl<T> Default for KeyedInstanceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Inner<T> {
    fn check_arity(&self, key: &CacheKey) -> Result<(), InvalidKey> {
        match self.arity {
            Some(expected) if key.len() != expected => Err(InvalidKey::ArityMismatch {
                expected,
                found: key.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Snapshot of cache counters for display or serialization.
///
/// A miss is counted for every request that found no entry, including
/// requests whose construction then failed.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}
