//! Shared handles for multi-threaded callers.
//!
//! The registry and store are single-threaded: blocking I/O, `&mut self`
//! mutation, no interior locking. Callers that need to share them across
//! threads take one mutual-exclusion guard around the whole pair rather
//! than finer locks through the catalog.

use crate::codec::Codec;
use crate::registry::PathRegistry;
use crate::store::RecordStore;
use parking_lot::Mutex;
use std::sync::Arc;

/// A registry/store pair owned together.
pub struct Stowage<C: Codec> {
    pub registry: PathRegistry,
    pub store: RecordStore<C>,
}

/// Cloneable handle holding one lock around a [`Stowage`] pair.
pub struct SharedStowage<C: Codec> {
    inner: Arc<Mutex<Stowage<C>>>,
}

impl<C: Codec> SharedStowage<C> {
    pub fn new(registry: PathRegistry, store: RecordStore<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Stowage { registry, store })),
        }
    }

    /// Run `f` with exclusive access to the registry/store pair.
    pub fn with<R>(&self, f: impl FnOnce(&mut Stowage<C>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

impl<C: Codec> Clone for SharedStowage<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
