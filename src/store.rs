//! Published snapshot store.
//!
//! Hosts read the current snapshot through the store while rebuilds happen
//! elsewhere; a publish swaps the whole snapshot atomically. A failed build
//! never reaches the store, so readers keep the last good snapshot.

use crate::catalog::Snapshot;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<Snapshot>>>,
    epoch: AtomicU64,
}

impl CatalogStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Process-wide store shared by the CLI and embedding hosts.
    #[must_use]
    pub fn global() -> &'static CatalogStore {
        static GLOBAL: CatalogStore = CatalogStore::new();
        &GLOBAL
    }

    /// The currently published snapshot, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Publish a snapshot, stamping it with the next epoch. Readers observe
    /// either the previous snapshot or the new one, never a mix.
    pub fn publish(&self, mut snapshot: Snapshot) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        snapshot.meta.epoch = epoch;
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(Arc::new(snapshot));
        epoch
    }

    /// Drop the published snapshot. The epoch counter is left alone so a
    /// later publish never reuses an epoch.
    pub fn clear(&self) {
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = None;
    }

    /// Epoch of the most recent publish, 0 if none has happened.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}
