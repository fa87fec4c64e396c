//! Identifier types shared across the engine, store, and query surfaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::PAGE_KEY_PREFIX;
use crate::error::{CatalogError, Result};

/// One page of a collection, numbered from 1. Rendered as `page_<N>` on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(u32);

impl PageId {
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Parse `page_<N>` or a bare `<N>`; page numbers start at 1.
    pub fn parse(key: &str) -> Result<Self> {
        let trimmed = key.trim();
        let digits = trimmed.strip_prefix(PAGE_KEY_PREFIX).unwrap_or(trimmed);
        match digits.parse::<u32>() {
            Ok(number) if number > 0 => Ok(Self(number)),
            _ => Err(CatalogError::InvalidPageKey {
                key: key.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn key(self) -> String {
        format!("{PAGE_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PAGE_KEY_PREFIX}{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonical identity of an item: lowercase, punctuation-free, whitespace-collapsed name.
///
/// Never displayed; two display names with the same key are the same item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    /// Derive the key for a display name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(crate::normalize::canonical_key(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three seasonal datasets. Each is an independent engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionId {
    Summer,
    Spring,
    Fw,
}

impl CollectionId {
    pub const ALL: [CollectionId; 3] = [Self::Summer, Self::Spring, Self::Fw];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summer => "summer",
            Self::Spring => "spring",
            Self::Fw => "fw",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Summer => "Summer",
            Self::Spring => "Spring",
            Self::Fw => "Fall/Winter",
        }
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summer" => Ok(Self::Summer),
            "spring" => Ok(Self::Spring),
            "fw" | "fall/winter" | "fall-winter" => Ok(Self::Fw),
            _ => Err(CatalogError::UnknownCollection { id: s.to_string() }),
        }
    }
}

/// On-disk shape of forward-index entries.
///
/// - `simple`: bare strings.
/// - `categorized`: `{ "name": ..., "category": ... }` objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaTag {
    Simple,
    Categorized,
}

impl SchemaTag {
    #[must_use]
    pub fn has_categories(self) -> bool {
        matches!(self, Self::Categorized)
    }
}

/// Season assigned to a fall/winter page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Fall,
    Winter,
    Both,
}

impl Season {
    /// Whether a page tagged `self` shows up when browsing `wanted`.
    #[must_use]
    pub fn covers(self, wanted: Season) -> bool {
        self == wanted || self == Season::Both
    }

    #[must_use]
    pub fn from_flags(fall: bool, winter: bool) -> Option<Self> {
        match (fall, winter) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Fall),
            (false, true) => Some(Self::Winter),
            (false, false) => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fall => "fall",
            Self::Winter => "winter",
            Self::Both => "both",
        })
    }
}
