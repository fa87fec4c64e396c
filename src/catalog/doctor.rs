//! Consistency check of a persisted inverse index against the forward index.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::schema::RawInverseIndex;
use crate::types::{
    Category, DoctorFinding, DoctorFindingCode, DoctorReport, DoctorSeverity, DoctorStatus,
    ItemKey, PageId,
};

#[derive(Default)]
struct PersistedItem {
    name: String,
    pages: BTreeSet<PageId>,
}

impl Catalog {
    /// Compare `persisted` with the inverse index derived from the forward index and flag
    /// data that needs an operator: category drift, leftover OCR artifacts, glued names.
    ///
    /// Index findings mean a rebuild plus save repairs the collection; data findings need
    /// review.
    #[must_use]
    pub fn doctor(&self, persisted: &RawInverseIndex) -> DoctorReport {
        let mut findings = Vec::new();

        let mut on_disk: BTreeMap<ItemKey, PersistedItem> = BTreeMap::new();
        for (name, refs) in persisted {
            let key = self.normalizer.key_of(name);
            let item = on_disk.entry(key).or_insert_with(|| PersistedItem {
                name: name.clone(),
                pages: BTreeSet::new(),
            });
            for page_ref in refs {
                match page_ref.page() {
                    Ok(page) => {
                        item.pages.insert(page);
                    }
                    Err(err) => findings.push(
                        DoctorFinding::new(
                            DoctorFindingCode::InvalidPageRef,
                            DoctorSeverity::Error,
                            err.to_string(),
                        )
                        .with_item(name.clone()),
                    ),
                }
            }
        }

        for (key, record) in &self.inverse {
            match on_disk.get(key) {
                None => findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::MissingIndexItem,
                        DoctorSeverity::Error,
                        format!("'{}' appears on {} page(s) but is not indexed", record.name, record.pages.len()),
                    )
                    .with_item(record.name.clone()),
                ),
                Some(item) if item.pages != record.pages => findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::StalePageList,
                        DoctorSeverity::Warning,
                        format!(
                            "index lists {} page(s) for '{}', pages carry it on {}",
                            item.pages.len(),
                            record.name,
                            record.pages.len()
                        ),
                    )
                    .with_item(record.name.clone()),
                ),
                Some(_) => {}
            }
        }
        for (key, item) in &on_disk {
            if !self.inverse.contains_key(key) {
                findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::OrphanIndexItem,
                        DoctorSeverity::Error,
                        format!("'{}' is indexed but no page carries it", item.name),
                    )
                    .with_item(item.name.clone()),
                );
            }
        }

        findings.extend(self.data_findings());

        let index_problem = findings.iter().any(|finding| {
            matches!(
                finding.code,
                DoctorFindingCode::OrphanIndexItem
                    | DoctorFindingCode::MissingIndexItem
                    | DoctorFindingCode::StalePageList
                    | DoctorFindingCode::InvalidPageRef
            )
        });
        let status = if index_problem {
            DoctorStatus::NeedsRebuild
        } else if findings.is_empty() {
            DoctorStatus::Clean
        } else {
            DoctorStatus::NeedsReview
        };
        tracing::debug!(collection = %self.id, findings = findings.len(), ?status, "doctor finished");

        DoctorReport {
            collection: self.id,
            status,
            findings,
            derived_items: self.inverse.len(),
            persisted_items: persisted.len(),
        }
    }

    fn data_findings(&self) -> Vec<DoctorFinding> {
        let mut findings = Vec::new();

        let mut categories: BTreeMap<ItemKey, BTreeSet<&Category>> = BTreeMap::new();
        let mut seen_names: BTreeSet<(&str, PageId)> = BTreeSet::new();
        for (page, entries) in &self.forward {
            for entry in entries {
                categories.entry(entry.key(&self.normalizer)).or_default().insert(&entry.category);
                seen_names.insert((entry.name.as_str(), *page));
            }
        }
        for (key, distinct) in categories {
            if distinct.len() > 1 {
                let name = self.inverse.get(&key).map_or(key.as_str(), |r| r.name.as_str());
                let listed: Vec<&str> = distinct.iter().map(|c| c.as_str()).collect();
                findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::CategoryDrift,
                        DoctorSeverity::Warning,
                        format!("'{name}' is filed under {}", listed.join(", ")),
                    )
                    .with_item(name),
                );
            }
        }

        let mut reported: BTreeSet<&str> = BTreeSet::new();
        for (name, page) in seen_names {
            if !reported.insert(name) {
                continue;
            }
            match self.normalizer.normalize(name) {
                Ok(names) if names.len() > 1 => findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::DualItemName,
                        DoctorSeverity::Warning,
                        format!("'{name}' looks like two items"),
                    )
                    .with_item(name)
                    .with_page(page),
                ),
                Err(CatalogError::NormalizationAmbiguous { brands, .. }) => findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::DualItemName,
                        DoctorSeverity::Warning,
                        format!("'{name}' names {} brands", brands.len()),
                    )
                    .with_item(name)
                    .with_page(page),
                ),
                Ok(names) if names.first().is_some_and(|clean| clean.name != name) => findings.push(
                    DoctorFinding::new(
                        DoctorFindingCode::UncleanName,
                        DoctorSeverity::Info,
                        format!("'{name}' still carries OCR artifacts"),
                    )
                    .with_item(name)
                    .with_page(page),
                ),
                _ => {}
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::types::{CollectionId, SchemaTag, Taxonomy};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new(
            CollectionId::Summer,
            SchemaTag::Simple,
            Taxonomy::new(CollectionId::Summer, ["Tops", "Footwear"]),
            Normalizer::default(),
        );
        catalog.add_item_to_page(PageId::new(1), "Alden loafer", None).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Alden loafer", None).unwrap();
        catalog.add_item_to_page(PageId::new(2), "Sunspel tee", None).unwrap();
        catalog
    }

    fn raw(json: &str) -> RawInverseIndex {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn matching_index_is_clean() {
        let report = catalog().doctor(&raw(
            r#"{"Alden loafer": ["page_1", "page_2"], "Sunspel tee": ["page_2"]}"#,
        ));
        assert!(report.is_clean(), "{:?}", report.findings);
        assert_eq!(report.derived_items, 2);
    }

    #[test]
    fn stale_index_needs_rebuild() {
        let report = catalog().doctor(&raw(
            r#"{"Alden loafer": [1], "Prada bag": ["page_4"], "Sunspel tee": ["page_2", "cover"]}"#,
        ));
        assert_eq!(report.status, DoctorStatus::NeedsRebuild);
        for code in [
            DoctorFindingCode::StalePageList,
            DoctorFindingCode::OrphanIndexItem,
            DoctorFindingCode::InvalidPageRef,
        ] {
            assert_eq!(report.findings_with(code).count(), 1, "{code:?}");
        }
        assert_eq!(report.findings_with(DoctorFindingCode::MissingIndexItem).count(), 0);
    }

    #[test]
    fn data_problems_need_review() {
        let mut catalog = catalog();
        catalog.forward.get_mut(&PageId::new(1)).unwrap().push(crate::types::ItemEntry::new(
            "i Prada bag Gucci belt",
            Category::other(),
        ));
        catalog.forward.get_mut(&PageId::new(2)).unwrap()[1].category =
            catalog.taxonomy.resolve(Some("Tops"));
        catalog.add_item_to_page(PageId::new(3), "Sunspel tee", Some("Footwear")).unwrap();
        catalog.rebuild_inverse_index();
        let persisted = raw(
            r#"{"Alden loafer": ["page_1", "page_2"], "Sunspel tee": ["page_2", "page_3"],
                "i Prada bag Gucci belt": ["page_1"]}"#,
        );
        let report = catalog.doctor(&persisted);
        assert_eq!(report.status, DoctorStatus::NeedsReview, "{:?}", report.findings);
        assert_eq!(report.findings_with(DoctorFindingCode::CategoryDrift).count(), 1);
        assert_eq!(report.findings_with(DoctorFindingCode::DualItemName).count(), 1);
    }
}
