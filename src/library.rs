//! All configured collections, each behind its own lock.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::store::CollectionStore;
use crate::types::{CollectionId, DoctorReport};

/// Independent engines for every configured collection.
///
/// Reads of one collection run concurrently; an edit holds that collection's write lock
/// from mutation through save. Collections never share a lock.
#[derive(Debug)]
pub struct Library {
    store: CollectionStore,
    collections: BTreeMap<CollectionId, Arc<RwLock<Catalog>>>,
}

impl Library {
    /// Validate `config` and load every configured collection.
    pub fn open(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        let store = CollectionStore::new(config);
        let mut collections = BTreeMap::new();
        for collection in &store.config().collections {
            let catalog = store.load_catalog(collection.id)?;
            tracing::info!(
                collection = %collection.id,
                pages = catalog.page_count(),
                items = catalog.item_count(),
                "collection loaded"
            );
            collections.insert(collection.id, Arc::new(RwLock::new(catalog)));
        }
        Ok(Self { store, collections })
    }

    #[must_use]
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn collection_ids(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.collections.keys().copied()
    }

    /// Shared handle for callers that manage locking themselves.
    pub fn handle(&self, id: CollectionId) -> Result<Arc<RwLock<Catalog>>> {
        self.collections
            .get(&id)
            .cloned()
            .ok_or(CatalogError::CollectionNotLoaded { id })
    }

    /// Run `f` against a consistent snapshot of one collection.
    pub fn read<T>(&self, id: CollectionId, f: impl FnOnce(&Catalog) -> T) -> Result<T> {
        let handle = self.handle(id)?;
        let guard = handle.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&guard))
    }

    /// Apply `f` and persist the result.
    ///
    /// If `f` fails nothing is written and the in-memory state is restored. If the save
    /// fails, memory is restored too and the previous state is written back over any
    /// derived file the failed save already replaced. The forward index is never
    /// half-written.
    pub fn edit<T>(
        &self,
        id: CollectionId,
        f: impl FnOnce(&mut Catalog) -> Result<T>,
    ) -> Result<T> {
        let handle = self.handle(id)?;
        let mut guard = handle.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = guard.clone();
        let outcome = match f(&mut guard) {
            Ok(value) => self.store.save(&guard).map(|()| value).inspect_err(|_| {
                if let Err(err) = self.store.save(&snapshot) {
                    tracing::error!(collection = %id, error = %err, "previous state could not be written back");
                }
            }),
            Err(err) => Err(err),
        };
        if let Err(err) = &outcome {
            tracing::warn!(collection = %id, error = %err, "edit rolled back");
            *guard = snapshot;
        }
        outcome
    }

    /// Re-read a collection from disk, e.g. after the forward index was edited by hand.
    pub fn reload(&self, id: CollectionId) -> Result<()> {
        let fresh = self.store.load_catalog(id)?;
        let handle = self.handle(id)?;
        let mut guard = handle.write().unwrap_or_else(PoisonError::into_inner);
        *guard = fresh;
        Ok(())
    }

    /// Check the persisted inverse index of `id` against its forward index.
    pub fn doctor(&self, id: CollectionId) -> Result<DoctorReport> {
        let persisted = self.store.load_inverse_raw(id)?;
        self.read(id, |catalog| catalog.doctor(&persisted))
    }

    /// Rebuild derived files from the forward index and report the resulting state.
    pub fn repair(&self, id: CollectionId) -> Result<DoctorReport> {
        self.edit(id, |catalog| {
            catalog.rebuild_inverse_index();
            Ok(())
        })?;
        self.doctor(id)
    }
}
