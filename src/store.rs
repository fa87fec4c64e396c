//! JSON persistence for collections.
//!
//! Reads go through `fs-err` so I/O errors name the offending path; writes go through
//! `atomic-write-file`, so a crash mid-save leaves the previous file in place.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::config::{CatalogConfig, CollectionConfig};
use crate::constants::BACKUP_TIMESTAMP_FORMAT;
use crate::error::{CatalogError, Result};
use crate::schema::{
    self, ForwardDocument, InverseDocument, RawForwardIndex, RawInverseIndex, SeasonsDocument,
};
use crate::types::{CollectionId, ForwardIndex, PageId, SchemaTag, Season};

/// Loads and saves the files of every configured collection under one data directory.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    config: CatalogConfig,
}

impl CollectionStore {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn collection(&self, id: CollectionId) -> Result<&CollectionConfig> {
        self.config
            .collection(id)
            .ok_or(CatalogError::CollectionNotLoaded { id })
    }

    #[must_use]
    pub fn path_for(&self, file: &str) -> PathBuf {
        self.config.data_dir.join(file)
    }

    /// Read and decode the forward index of `id`.
    #[instrument(target = "lookbook::store", skip(self))]
    pub fn load(&self, id: CollectionId) -> Result<(ForwardIndex, SchemaTag)> {
        let collection = self.collection(id)?;
        let path = self.path_for(&collection.page_items_file);
        let raw: RawForwardIndex = read_json(&path)?;
        let forward = schema::decode(&raw, collection.schema, &collection.taxonomy())
            .map_err(|err| CatalogError::malformed(&path, err.to_string()))?;
        tracing::debug!(pages = forward.len(), "forward index loaded");
        Ok((forward, collection.schema))
    }

    /// Load a ready-to-use [`Catalog`], seasons included when the collection tracks them.
    pub fn load_catalog(&self, id: CollectionId) -> Result<Catalog> {
        let collection = self.collection(id)?;
        let (forward, _) = self.load(id)?;
        let catalog = Catalog::from_config(collection, &self.config.normalization, forward);
        if collection.page_seasons_file.is_some() {
            let seasons = self.load_seasons(id)?;
            return Ok(catalog.with_seasons(seasons));
        }
        Ok(catalog)
    }

    /// The inverse index exactly as stored, for comparison by [`Catalog::doctor`].
    pub fn load_inverse_raw(&self, id: CollectionId) -> Result<RawInverseIndex> {
        let collection = self.collection(id)?;
        read_json(&self.path_for(&collection.clothing_index_file))
    }

    /// Page seasons of `id`; a missing seasons file means no assignments yet.
    pub fn load_seasons(&self, id: CollectionId) -> Result<BTreeMap<PageId, Season>> {
        let collection = self.collection(id)?;
        let Some(file) = collection.page_seasons_file.as_deref() else {
            return Ok(BTreeMap::new());
        };
        let path = self.path_for(file);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw: BTreeMap<String, Season> = read_json(&path)?;
        raw.into_iter()
            .map(|(key, season)| {
                PageId::parse(&key)
                    .map(|page| (page, season))
                    .map_err(|err| CatalogError::malformed(&path, err.to_string()))
            })
            .collect()
    }

    /// Write the forward index and every derived file of `catalog`.
    ///
    /// All files are staged before any is committed, and the forward index is committed
    /// last: a failed save leaves the forward index on disk as it was.
    #[instrument(target = "lookbook::store", skip_all, fields(collection = %catalog.id()))]
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let collection = self.collection(catalog.id())?;
        let mut staged = vec![StagedWrite::prepare(
            self.path_for(&collection.clothing_index_file),
            &InverseDocument(catalog.inverse()),
        )?];
        if let (Some(file), Some(stats)) = (
            collection.category_stats_file.as_deref(),
            catalog.category_stats(),
        ) {
            staged.push(StagedWrite::prepare(self.path_for(file), stats)?);
        }
        if let (Some(file), Some(seasons)) =
            (collection.page_seasons_file.as_deref(), catalog.seasons())
        {
            staged.push(StagedWrite::prepare(
                self.path_for(file),
                &SeasonsDocument(seasons),
            )?);
        }
        staged.push(StagedWrite::prepare(
            self.path_for(&collection.page_items_file),
            &ForwardDocument {
                forward: catalog.forward(),
                schema: collection.schema,
            },
        )?);

        for write in staged {
            if let Some(dir) = self.config.backup_dir.as_deref() {
                backup(&write.path, dir)?;
            }
            write.commit()?;
        }
        tracing::info!(
            pages = catalog.page_count(),
            items = catalog.item_count(),
            "collection saved"
        );
        Ok(())
    }
}

/// A fully written temporary file waiting to replace `path`.
struct StagedWrite {
    path: PathBuf,
    atomic: AtomicWriteFile,
}

impl StagedWrite {
    fn prepare<T: Serialize + ?Sized>(path: PathBuf, value: &T) -> Result<Self> {
        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');
        let mut atomic = AtomicWriteFile::options()
            .open(&path)
            .map_err(|err| CatalogError::store_io(&path, err))?;
        atomic
            .write_all(&bytes)
            .map_err(|err| CatalogError::store_io(&path, err))?;
        Ok(Self { path, atomic })
    }

    fn commit(self) -> Result<()> {
        let Self { path, atomic } = self;
        atomic.commit().map_err(|err| CatalogError::store_io(&path, err))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs_err::read_to_string(path).map_err(|err| CatalogError::store_io(path, err))?;
    serde_json::from_str(&text).map_err(|err| CatalogError::malformed(path, err.to_string()))
}

/// Copy `path` to `<dir>/<stem>_<timestamp>.json` when it exists.
fn backup(path: &Path, dir: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs_err::create_dir_all(dir).map_err(|err| CatalogError::store_io(dir, err))?;
    let stem = path
        .file_stem()
        .map_or_else(|| "collection".into(), |stem| stem.to_string_lossy());
    let stamp = chrono::Local::now().format(BACKUP_TIMESTAMP_FORMAT);
    let target = dir.join(format!("{stem}_{stamp}.json"));
    fs_err::copy(path, &target).map_err(|err| CatalogError::store_io(&target, err))?;
    log::info!("backed up {} to {}", path.display(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> CollectionStore {
        CollectionStore::new(CatalogConfig::default().with_data_dir(dir))
    }

    #[test]
    fn missing_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path()).load(CollectionId::Summer).unwrap_err();
        assert!(matches!(err, CatalogError::StoreIo { .. }));
        assert!(err.is_store_error());
    }

    #[test]
    fn non_sequence_page_value_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("page_items.json"), r#"{"page_1": "Prada bag"}"#).unwrap();
        let err = store(dir.path()).load(CollectionId::Summer).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedStore { .. }));

        fs_err::write(dir.path().join("page_items.json"), r#"{"cover": ["Prada bag"]}"#).unwrap();
        let err = store(dir.path()).load(CollectionId::Summer).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedStore { .. }));
    }

    #[test]
    fn backups_copy_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        let config = CatalogConfig::default()
            .with_data_dir(dir.path())
            .with_backup_dir(&backups);
        fs_err::write(dir.path().join("page_items.json"), r#"{"page_1": ["Prada bag"]}"#).unwrap();
        let store = CollectionStore::new(config);
        let catalog = store.load_catalog(CollectionId::Summer).unwrap();
        store.save(&catalog).unwrap();
        let copies: Vec<_> = fs_err::read_dir(&backups)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(copies.len(), 1);
        assert!(copies[0].starts_with("page_items_"));
    }
}
