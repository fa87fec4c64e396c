//! Catalog configuration: data locations, per-collection schema and taxonomy, and the
//! normalization gazetteer.
//!
//! Every field has a default reproducing the original three-collection deployment, so an
//! empty JSON object is a valid config file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME, DATA_DIR_ENV_VAR, DEFAULT_BRANDS,
    DEFAULT_COLLAB_MARKERS, DEFAULT_CONNECTORS,
};
use crate::error::{CatalogError, Result};
use crate::types::{CollectionId, SchemaTag, Taxonomy};

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Top-level configuration consumed by [`crate::Library`] and [`crate::CollectionStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding every collection's JSON files.
    pub data_dir: PathBuf,
    /// When set, each save first copies the previous file here with a timestamp suffix.
    pub backup_dir: Option<PathBuf>,
    pub collections: Vec<CollectionConfig>,
    pub normalization: NormalizationConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backup_dir: None,
            collections: CollectionId::ALL
                .iter()
                .map(|id| CollectionConfig::for_collection(*id))
                .collect(),
            normalization: NormalizationConfig::default(),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    #[must_use]
    pub fn with_backup_dir(mut self, backup_dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(backup_dir.into());
        self
    }

    #[must_use]
    pub fn with_collections(mut self, collections: Vec<CollectionConfig>) -> Self {
        self.collections = collections;
        self
    }

    /// Parse a JSON config file, apply the data-dir env override, and validate.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs_err::read_to_string(path).map_err(|err| CatalogError::store_io(path, err))?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Locate a config file: `$LOOKBOOK_CONFIG`, then the platform config dir, else defaults.
    pub fn discover() -> Result<Self> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_json_file(Path::new(&explicit));
        }
        if let Some(dir) = dirs_next::config_dir() {
            let candidate = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "using discovered config");
                return Self::from_json_file(&candidate);
            }
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV_VAR) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for collection in &self.collections {
            if !seen.insert(collection.id) {
                return Err(CatalogError::InvalidConfig {
                    reason: format!("collection {} configured twice", collection.id),
                });
            }
            collection.validate()?;
        }
        if self.normalization.brands.iter().any(|b| b.trim().is_empty()) {
            return Err(CatalogError::InvalidConfig {
                reason: "brand gazetteer contains an empty entry".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn collection(&self, id: CollectionId) -> Option<&CollectionConfig> {
        self.collections.iter().find(|collection| collection.id == id)
    }
}

/// Files, schema, and taxonomy of one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub id: CollectionId,
    pub schema: SchemaTag,
    /// Ordered category taxonomy; `Other` is appended when missing.
    pub categories: Vec<String>,
    /// Forward index file (page → items), relative to `data_dir`.
    pub page_items_file: String,
    /// Inverse index file (item → pages), relative to `data_dir`.
    pub clothing_index_file: String,
    /// Category stats file; required for categorized collections.
    #[serde(default)]
    pub category_stats_file: Option<String>,
    /// Page → season file; only the fall/winter collection uses one by default.
    #[serde(default)]
    pub page_seasons_file: Option<String>,
    /// Directory of `page_<N>` images, relative to `data_dir`.
    #[serde(default)]
    pub image_dir: Option<String>,
}

impl CollectionConfig {
    /// Defaults matching the original deployment layout.
    #[must_use]
    pub fn for_collection(id: CollectionId) -> Self {
        match id {
            CollectionId::Summer => Self {
                id,
                schema: SchemaTag::Simple,
                categories: to_strings(&["Tops", "Bottoms", "Footwear", "Accessories"]),
                page_items_file: "page_items.json".into(),
                clothing_index_file: "clothing_index.json".into(),
                category_stats_file: None,
                page_seasons_file: None,
                image_dir: Some("summer_pages".into()),
            },
            CollectionId::Spring => Self {
                id,
                schema: SchemaTag::Categorized,
                categories: to_strings(&[
                    "Tops",
                    "Bottoms",
                    "Outerwear",
                    "Knitwear",
                    "Footwear",
                    "Accessories",
                ]),
                page_items_file: "spring_page_items.json".into(),
                clothing_index_file: "spring_clothing_index.json".into(),
                category_stats_file: Some("spring_category_stats.json".into()),
                page_seasons_file: None,
                image_dir: Some("spring_pages".into()),
            },
            CollectionId::Fw => Self {
                id,
                schema: SchemaTag::Categorized,
                categories: to_strings(&[
                    "Outerwear",
                    "Suits",
                    "Knitwear",
                    "Layering",
                    "Tops",
                    "Bottoms",
                    "Footwear",
                    "Accessories",
                ]),
                page_items_file: "fw_page_items.json".into(),
                clothing_index_file: "fw_clothing_index.json".into(),
                category_stats_file: Some("fw_category_stats.json".into()),
                page_seasons_file: Some("page_seasons.json".into()),
                image_dir: Some("fw_pages".into()),
            },
        }
    }

    #[must_use]
    pub fn taxonomy(&self) -> Taxonomy {
        Taxonomy::new(self.id, &self.categories)
    }

    fn validate(&self) -> Result<()> {
        if self.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(CatalogError::InvalidConfig {
                reason: format!("collection {} has an empty taxonomy", self.id),
            });
        }
        if self.schema.has_categories() && self.category_stats_file.is_none() {
            return Err(CatalogError::InvalidConfig {
                reason: format!(
                    "categorized collection {} needs a category_stats_file",
                    self.id
                ),
            });
        }
        if self.page_items_file == self.clothing_index_file {
            return Err(CatalogError::InvalidConfig {
                reason: format!(
                    "collection {} uses the same file for both indexes",
                    self.id
                ),
            });
        }
        Ok(())
    }
}

/// Gazetteer and artifact lists driving [`crate::Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Known brand names; two of them in one string marks a glued dual-item line.
    pub brands: Vec<String>,
    /// Stray leading tokens stripped from the front of a name.
    pub connectors: Vec<String>,
    /// Tokens joining two brands into a single collaboration.
    pub collab_markers: Vec<String>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            brands: to_strings(DEFAULT_BRANDS),
            connectors: to_strings(DEFAULT_CONNECTORS),
            collab_markers: to_strings(DEFAULT_COLLAB_MARKERS),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
