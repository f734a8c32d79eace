//! Identity-keyed resource deduplication.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Each distinct key is assigned the next document index the first time it
//! is registered; later registrations return the same index. Host resources
//! are keyed by `Arc` pointer identity through [`ArcKey`], which also holds a
//! strong reference so an address cannot be reused while the session lives.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexSet;

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The key was seen before.
    Existing(u32),
    /// The key was added; the caller must append the matching document entry.
    New(u32),
}

impl Registration {
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Existing(index) | Self::New(index) => index,
        }
    }

    #[must_use]
    pub const fn is_new(self) -> bool {
        matches!(self, Self::New(_))
    }
}

/// Insertion-ordered key → index map.
#[derive(Debug, Clone)]
pub struct ResourceRegistry<K: Hash + Eq> {
    keys: IndexSet<K>,
}

impl<K: Hash + Eq> Default for ResourceRegistry<K> {
    fn default() -> Self {
        Self {
            keys: IndexSet::new(),
        }
    }
}

impl<K: Hash + Eq> ResourceRegistry<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: K) -> Registration {
        let (index, inserted) = self.keys.insert_full(key);
        if inserted {
            Registration::New(index as u32)
        } else {
            Registration::Existing(index as u32)
        }
    }

    /// Absent handles register nothing and yield `None`.
    pub fn register_optional(&mut self, key: Option<K>) -> Option<Registration> {
        key.map(|k| self.register(k))
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<u32> {
        self.keys.get_index_of(key).map(|i| i as u32)
    }

    /// Look up `key`, or build its document entry with `build` and register it.
    ///
    /// The key is only registered when `build` succeeds, so a failure never
    /// leaves an index without a matching document entry.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        build: impl FnOnce(u32) -> std::result::Result<(), E>,
    ) -> std::result::Result<u32, E> {
        if let Some(index) = self.get(&key) {
            return Ok(index);
        }
        let index = self.keys.len() as u32;
        build(index)?;
        self.keys.insert(key);
        Ok(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Hashes and compares an `Arc` by the address it points to.
pub struct ArcKey<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> ArcKey<T> {
    #[must_use]
    pub fn new(arc: &Arc<T>) -> Self {
        Self(Arc::clone(arc))
    }
}

impl<T: ?Sized> Clone for ArcKey<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for ArcKey<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for ArcKey<T> {}

impl<T: ?Sized> Hash for ArcKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).cast::<()>().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for ArcKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArcKey({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}
