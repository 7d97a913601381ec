//! Compute-once-per-key canonicalization cache.
//!
//! [`CanonicalCache::get_or_create`] runs the constructor for a key at most
//! once per session. The map lock is held only long enough to find or insert
//! the key's slot; construction then runs under that slot alone, so unrelated
//! keys are built in parallel and a slow constructor (for example one that
//! calls into the resolution delegate) never blocks other keys.
//!
//! Constructors may call `get_or_create` for other keys. A thread that asks
//! for a key it is itself still constructing gets [`Reentrant`] back instead
//! of deadlocking; other threads asking for that key wait for the result.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

/// Returned when a constructor asks for the key it is constructing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("construction re-entered its own key")]
pub struct Reentrant;

struct Slot<V> {
    value: OnceLock<V>,
    builder: Mutex<Option<ThreadId>>,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            value: OnceLock::new(),
            builder: Mutex::new(None),
        }
    }

    fn builder(&self) -> Option<ThreadId> {
        *self.builder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_builder(&self, builder: Option<ThreadId>) {
        *self.builder.lock().unwrap_or_else(PoisonError::into_inner) = builder;
    }
}

/// Clears the builder marker even if the constructor unwinds.
struct BuildGuard<'a, V>(&'a Slot<V>);

impl<V> Drop for BuildGuard<'_, V> {
    fn drop(&mut self) {
        self.0.set_builder(None);
    }
}

/// A session-scoped map from key to a value constructed exactly once.
pub struct CanonicalCache<K, V> {
    slots: Mutex<HashMap<K, Arc<Slot<V>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K, V> Default for CanonicalCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> CanonicalCache<K, V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, running `construct` if no value exists yet.
    ///
    /// Concurrent callers for the same key all observe the single value the
    /// winning constructor produced. Results are stored as returned, so a
    /// value that encodes a failure is cached like any other.
    pub fn get_or_create<F>(&self, key: &K, construct: F) -> Result<V, Reentrant>
    where
        F: FnOnce() -> V,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(key) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let slot = Arc::new(Slot::new());
                    slots.insert(key.clone(), Arc::clone(&slot));
                    slot
                }
            }
        };

        if let Some(value) = slot.value.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }
        if slot.builder() == Some(thread::current().id()) {
            return Err(Reentrant);
        }

        let value = slot.value.get_or_init(|| {
            slot.set_builder(Some(thread::current().id()));
            let _guard = BuildGuard(slot.as_ref());
            self.misses.fetch_add(1, Ordering::Relaxed);
            construct()
        });
        Ok(value.clone())
    }

    /// Returns the value for `key` if it has been constructed.
    pub fn get(&self, key: &K) -> Option<V> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.value.get().cloned())
    }

    /// Number of keys seen, including ones still under construction.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no key has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since the cache was created.
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
