//! On-disk item representations and their mapping to the uniform in-memory shape.
//!
//! Forward-index files hold either bare strings (simple schema) or `{name, category}`
//! objects (categorized schema). Past this module every entry is an [`ItemEntry`].

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::types::{
    Category, ForwardIndex, InverseIndex, ItemEntry, PageId, SchemaTag, Season, Taxonomy,
};

/// One forward-index entry as it appears in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    Bare(String),
    Object {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

impl RawEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Bare(name) | Self::Object { name, .. } => name,
        }
    }
}

/// Forward index as parsed from disk: page key → entries.
pub type RawForwardIndex = BTreeMap<String, Vec<RawEntry>>;

/// A page reference inside a persisted inverse index; older files store bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPageRef {
    Key(String),
    Number(u32),
}

impl RawPageRef {
    pub fn page(&self) -> Result<PageId> {
        match self {
            Self::Key(key) => PageId::parse(key),
            Self::Number(number) => PageId::parse(&number.to_string()),
        }
    }
}

/// Inverse index as parsed from disk: display name → page refs.
pub type RawInverseIndex = BTreeMap<String, Vec<RawPageRef>>;

/// Convert raw forward-index data into pages of uniform entries.
///
/// Unknown or missing categories become `Other`. Bare strings in a simple collection may
/// carry a `"name (Category)"` suffix, which sets the category while the name stays as
/// written. Entries whose name is blank are dropped.
pub fn decode(raw: &RawForwardIndex, schema: SchemaTag, taxonomy: &Taxonomy) -> Result<ForwardIndex> {
    let mut forward = ForwardIndex::new();
    for (page_key, entries) in raw {
        let page = PageId::parse(page_key)?;
        let decoded = forward.entry(page).or_default();
        for entry in entries {
            if entry.name().trim().is_empty() {
                tracing::warn!(%page, "dropping blank item entry");
                continue;
            }
            decoded.push(decode_entry(entry, schema, taxonomy));
        }
    }
    Ok(forward)
}

fn decode_entry(entry: &RawEntry, schema: SchemaTag, taxonomy: &Taxonomy) -> ItemEntry {
    match entry {
        RawEntry::Bare(name) => {
            let category = match split_category_suffix(name) {
                Some((_, suffix)) => taxonomy.resolve(Some(suffix)),
                None => Category::other(),
            };
            ItemEntry::new(name.clone(), category)
        }
        RawEntry::Object { name, category } => {
            let resolved = taxonomy.resolve(category.as_deref());
            if schema.has_categories() {
                if let Some(given) = category.as_deref() {
                    if taxonomy.lookup(given).is_none() {
                        tracing::warn!(item = %name, category = given, "unknown category, using Other");
                    }
                }
            }
            ItemEntry::new(name.clone(), resolved)
        }
    }
}

/// Exact inverse of [`decode`] for well-formed input.
#[must_use]
pub fn encode(forward: &ForwardIndex, schema: SchemaTag) -> RawForwardIndex {
    forward
        .iter()
        .map(|(page, entries)| {
            (
                page.key(),
                entries.iter().map(|entry| encode_entry(entry, schema)).collect(),
            )
        })
        .collect()
}

#[must_use]
pub fn encode_entry(entry: &ItemEntry, schema: SchemaTag) -> RawEntry {
    match schema {
        SchemaTag::Simple => RawEntry::Bare(entry.name.clone()),
        SchemaTag::Categorized => RawEntry::Object {
            name: entry.name.clone(),
            category: Some(entry.category.as_str().to_string()),
        },
    }
}

/// Split `"The Row loafer (Footwear)"` into `("The Row loafer", "Footwear")`.
#[must_use]
pub fn split_category_suffix(name: &str) -> Option<(&str, &str)> {
    static SUFFIX: OnceCell<std::result::Result<Regex, String>> = OnceCell::new();
    let regex = SUFFIX.get_or_init(|| {
        Regex::new(r"^(?P<label>.*\S)\s*\((?P<category>[^()]+)\)\s*$").map_err(|err| err.to_string())
    });
    let regex = match regex {
        Ok(re) => re,
        Err(msg) => {
            tracing::error!(target = "lookbook::schema", error = %msg, "category suffix regex init failed");
            return None;
        }
    };
    let captures = regex.captures(name)?;
    let label = captures.name("label")?.as_str();
    let category = captures.name("category")?.as_str().trim();
    Some((label, category))
}

/// Display label of a stored name: the category suffix is dropped when it names a
/// taxonomy member.
#[must_use]
pub fn display_label(name: &str, taxonomy: &Taxonomy) -> String {
    match split_category_suffix(name) {
        Some((label, suffix)) if taxonomy.lookup(suffix).is_some() => label.to_string(),
        _ => name.to_string(),
    }
}

/// Forward index serialized in numeric page order (`page_2` before `page_10`).
pub(crate) struct ForwardDocument<'a> {
    pub forward: &'a ForwardIndex,
    pub schema: SchemaTag,
}

impl Serialize for ForwardDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.forward.len()))?;
        for (page, entries) in self.forward {
            let raw: Vec<RawEntry> = entries
                .iter()
                .map(|entry| encode_entry(entry, self.schema))
                .collect();
            map.serialize_entry(&page.key(), &raw)?;
        }
        map.end()
    }
}

/// Inverse index serialized as display name → ascending page keys.
pub(crate) struct InverseDocument<'a>(pub &'a InverseIndex);

impl Serialize for InverseDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let ordered: BTreeMap<&str, Vec<String>> = self
            .0
            .values()
            .map(|record| {
                (
                    record.name.as_str(),
                    record.pages.iter().map(|page| page.key()).collect(),
                )
            })
            .collect();
        ordered.serialize(serializer)
    }
}

/// Page seasons serialized in numeric page order.
pub(crate) struct SeasonsDocument<'a>(pub &'a BTreeMap<PageId, Season>);

impl Serialize for SeasonsDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (page, season) in self.0 {
            map.serialize_entry(&page.key(), season)?;
        }
        map.end()
    }
}
