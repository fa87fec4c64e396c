//! Page season assignments for collections that track them.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::types::{ItemKey, PageId, Season, SeasonView};

impl Catalog {
    fn seasons_mut(&mut self) -> Result<&mut BTreeMap<PageId, Season>> {
        let id = self.id;
        self.seasons.as_mut().ok_or_else(|| CatalogError::InvalidConfig {
            reason: format!("collection {id} does not track page seasons"),
        })
    }

    /// Assign `season` to every page in `pages`; all pages must exist.
    pub fn set_page_season(&mut self, pages: &[PageId], season: Season) -> Result<()> {
        if let Some(page) = pages.iter().find(|page| !self.forward.contains_key(*page)) {
            return Err(CatalogError::PageNotFound { page: *page });
        }
        let seasons = self.seasons_mut()?;
        for page in pages {
            seasons.insert(*page, season);
        }
        tracing::debug!(pages = pages.len(), %season, "page seasons set");
        Ok(())
    }

    /// Assign `season` to every page the item appears on. Returns those pages.
    pub fn set_item_season(&mut self, key: &ItemKey, season: Season) -> Result<Vec<PageId>> {
        let pages = self.pages_for_item(key);
        if pages.is_empty() {
            return Err(CatalogError::ItemNotFound { key: key.clone() });
        }
        self.set_page_season(&pages, season)?;
        Ok(pages)
    }

    pub fn clear_page_season(&mut self, page: PageId) -> Result<Option<Season>> {
        Ok(self.seasons_mut()?.remove(&page))
    }

    #[must_use]
    pub fn season_of(&self, page: PageId) -> Option<Season> {
        self.seasons.as_ref()?.get(&page).copied()
    }

    /// Pages belonging to `season`; a `both` page belongs to fall and winter.
    #[must_use]
    pub fn pages_in_season(&self, season: Season) -> Vec<PageId> {
        self.seasons
            .iter()
            .flatten()
            .filter(|(_, assigned)| assigned.covers(season))
            .map(|(page, _)| *page)
            .collect()
    }

    /// Items restricted to the pages of one season, each listing only those pages.
    #[must_use]
    pub fn season_view(&self, season: Season) -> SeasonView {
        let pages = self.pages_in_season(season);
        let wanted: BTreeSet<PageId> = pages.iter().copied().collect();
        let mut items: Vec<_> = self
            .inverse
            .values()
            .filter_map(|record| {
                let mut summary = self.summarize(record);
                summary.pages.retain(|page| wanted.contains(page));
                (!summary.pages.is_empty()).then_some(summary)
            })
            .collect();
        items.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        SeasonView {
            season,
            pages,
            items,
        }
    }
}
