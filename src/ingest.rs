//! Boundary with the OCR text producer and the page image directory.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::types::{AmbiguousName, ItemKey, PageId};

/// Anything that turns a page image into raw text lines.
///
/// Lines are taken as-is; the normalization rules do all cleaning.
pub trait TextProducer {
    fn extract_lines(&self, image: &Path) -> Result<Vec<String>>;
}

impl<F> TextProducer for F
where
    F: Fn(&Path) -> Result<Vec<String>>,
{
    fn extract_lines(&self, image: &Path) -> Result<Vec<String>> {
        self(image)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub page: Option<PageId>,
    pub added: Vec<ItemKey>,
    /// Cleaned names already on the page. A split line can land one half here and the
    /// other in `added`.
    pub duplicates: Vec<String>,
    /// Lines the rules could not split safely.
    pub ambiguous: Vec<AmbiguousName>,
    /// Lines that cleaned down to nothing.
    pub skipped: usize,
}

/// Extract `image` with `producer` and add every usable line to `page`.
///
/// Each line is cleaned and split first, then every resulting name is added on its own.
/// Duplicate, ambiguous, and empty lines are recorded in the report instead of failing
/// the page; only producer errors and taxonomy errors abort.
pub fn ingest_page(
    catalog: &mut Catalog,
    page: PageId,
    producer: &dyn TextProducer,
    image: &Path,
) -> Result<IngestReport> {
    let lines = producer.extract_lines(image)?;
    let mut report = IngestReport {
        page: Some(page),
        ..IngestReport::default()
    };
    for line in lines {
        let names = match catalog.normalizer().normalize(&line) {
            Ok(names) => names,
            Err(CatalogError::NormalizationAmbiguous { brands, .. }) => {
                report.ambiguous.push(AmbiguousName {
                    page,
                    name: line,
                    brands,
                });
                continue;
            }
            Err(CatalogError::EmptyName) => {
                report.skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };
        for name in names {
            match catalog.add_item_to_page(page, &name.name, None) {
                Ok(keys) => report.added.extend(keys),
                Err(CatalogError::DuplicateItemOnPage { .. }) => report.duplicates.push(name.name),
                Err(err) => return Err(err),
            }
        }
    }
    tracing::info!(
        %page,
        added = report.added.len(),
        duplicates = report.duplicates.len(),
        ambiguous = report.ambiguous.len(),
        "page ingested"
    );
    Ok(report)
}

/// Sequentially numbered page images (`page_<N>.<ext>`) in one directory.
#[derive(Debug, Clone, Default)]
pub struct PageImages {
    pages: Vec<(PageId, PathBuf)>,
}

impl PageImages {
    /// List the page images in `dir` without reading them. Other files are ignored.
    pub fn scan(dir: &Path) -> Result<Self> {
        static PAGE_IMAGE: OnceCell<std::result::Result<Regex, String>> = OnceCell::new();
        let regex = PAGE_IMAGE.get_or_init(|| {
            Regex::new(r"(?i)^page_(\d+)\.(png|jpe?g|webp)$").map_err(|err| err.to_string())
        });
        let regex = match regex {
            Ok(re) => re,
            Err(msg) => {
                tracing::error!(target = "lookbook::ingest", error = %msg, "page image regex init failed");
                return Ok(Self::default());
            }
        };

        let mut pages = Vec::new();
        let entries = fs_err::read_dir(dir).map_err(|err| CatalogError::store_io(dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| CatalogError::store_io(dir, err))?;
            let file_name = entry.file_name();
            let Some(captures) = regex.captures(&file_name.to_string_lossy()).map(|c| c[1].to_string())
            else {
                continue;
            };
            match PageId::parse(&captures) {
                Ok(page) => pages.push((page, entry.path())),
                Err(_) => tracing::debug!(file = %file_name.to_string_lossy(), "skipping page_0 image"),
            }
        }
        pages.sort();
        pages.dedup_by(|later, earlier| later.0 == earlier.0);
        Ok(Self { pages })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[must_use]
    pub fn path(&self, page: PageId) -> Option<&Path> {
        self.pages
            .iter()
            .find(|(candidate, _)| *candidate == page)
            .map(|(_, path)| path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageId, &Path)> {
        self.pages.iter().map(|(page, path)| (*page, path.as_path()))
    }

    /// Pages numbered below the highest one that have no image.
    #[must_use]
    pub fn gaps(&self) -> Vec<PageId> {
        let Some((last, _)) = self.pages.last() else {
            return Vec::new();
        };
        (1..=last.number())
            .map(PageId::new)
            .filter(|page| self.path(*page).is_none())
            .collect()
    }
}
