//! Cleaning rules for OCR-derived item names.
//!
//! - Strip stray leading tokens (isolated letters, connector words, bullets) and collapse
//!   whitespace.
//! - Split two brand+descriptor phrases OCR glued into one line, using the brand gazetteer.
//! - Derive the canonical [`ItemKey`] used for identity and merging.
//!
//! Everything here is pure: no I/O, no randomness, same input → same output.

use smallvec::SmallVec;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::NormalizationConfig;
use crate::error::{CatalogError, Result};
use crate::types::ItemKey;

/// Trailing characters OCR leaves after a name ("loafer,").
const TRAILING_JUNK: &[char] = &[',', ';', ':', '·', '•', '|', '*'];

/// Lowercase, diacritic-free, punctuation-free, whitespace-collapsed form of `name`.
#[must_use]
pub fn canonical_key(name: &str) -> String {
    let stripped: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    collapse_whitespace(&stripped.to_lowercase())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"-Prada"` → `"Prada"`; `None` when there is nothing to trim or nothing would remain.
fn trim_leading_symbols(token: &str) -> Option<String> {
    let trimmed = token.trim_start_matches(|c: char| !c.is_alphanumeric());
    (!trimmed.is_empty() && trimmed.len() != token.len()).then(|| trimmed.to_string())
}

/// A cleaned display name together with its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub name: String,
    pub key: ItemKey,
}

impl NormalizedName {
    fn from_tokens(tokens: &[String]) -> Result<Self> {
        let mut tokens = tokens.to_vec();
        trim_trailing(&mut tokens);
        let name = tokens.join(" ");
        let key = ItemKey::from_name(&name);
        if key.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        Ok(Self { name, key })
    }
}

/// One or two cleaned names; two when a glued dual-item line was split.
pub type NormalizedNames = SmallVec<[NormalizedName; 2]>;

#[derive(Debug, Clone)]
struct Brand {
    name: String,
    tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct BrandHit {
    start: usize,
    end: usize,
    brand: usize,
}

/// Gazetteer-driven name cleaner. Swap the configuration to change brands or artifacts;
/// the engine never looks inside.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Longest brands first so "Polo Ralph Lauren" wins over "Ralph Lauren".
    brands: Vec<Brand>,
    connectors: Vec<String>,
    collab_markers: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizationConfig::default())
    }
}

impl Normalizer {
    #[must_use]
    pub fn new(config: &NormalizationConfig) -> Self {
        let mut brands: Vec<Brand> = config
            .brands
            .iter()
            .map(|name| Brand {
                name: name.trim().to_string(),
                tokens: name
                    .split_whitespace()
                    .map(canonical_key)
                    .filter(|token| !token.is_empty())
                    .collect(),
            })
            .filter(|brand| !brand.tokens.is_empty())
            .collect();
        brands.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
        Self {
            brands,
            connectors: lowercase_all(&config.connectors),
            collab_markers: lowercase_all(&config.collab_markers),
        }
    }

    /// Clean a raw OCR line into one or two names.
    ///
    /// Fails with `NormalizationAmbiguous` when more than two brand phrases are present and
    /// with `EmptyName` when nothing survives cleaning.
    pub fn normalize(&self, raw: &str) -> Result<NormalizedNames> {
        let tokens = self.clean_tokens(raw);
        if tokens.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        let groups = self.brand_groups(&tokens);
        let mut names = NormalizedNames::new();
        match groups.len() {
            0 | 1 => names.push(NormalizedName::from_tokens(&tokens)?),
            2 => {
                let split_at = groups[1].0;
                let first = NormalizedName::from_tokens(&tokens[..split_at])?;
                let second = NormalizedName::from_tokens(&tokens[split_at..])?;
                let same = first.key == second.key;
                names.push(first);
                if !same {
                    names.push(second);
                }
            }
            _ => {
                return Err(CatalogError::NormalizationAmbiguous {
                    raw: raw.to_string(),
                    brands: groups.into_iter().map(|(_, brands)| brands).collect(),
                });
            }
        }
        Ok(names)
    }

    /// Clean without splitting; used for operator-typed names (rename, merge result).
    pub fn clean(&self, raw: &str) -> Result<NormalizedName> {
        NormalizedName::from_tokens(&self.clean_tokens(raw))
    }

    /// Identity of a stored name: the key of its cleaned form, so `"i The Row loafer"` and
    /// `"The Row loafer"` are one item. Empty when nothing survives cleaning.
    #[must_use]
    pub fn key_of(&self, name: &str) -> ItemKey {
        self.clean(name)
            .map_or_else(|_| ItemKey::from_name(name), |clean| clean.key)
    }

    /// Brands recognised in `name`, in order of appearance.
    #[must_use]
    pub fn detect_brands(&self, name: &str) -> Vec<String> {
        let tokens: Vec<String> = name.split_whitespace().map(str::to_string).collect();
        self.brand_hits(&tokens)
            .into_iter()
            .map(|hit| self.brands[hit.brand].name.clone())
            .collect()
    }

    /// True when cleaning would change the stored name.
    #[must_use]
    pub fn has_artifacts(&self, name: &str) -> bool {
        match self.clean(name) {
            Ok(clean) => clean.name != name,
            Err(_) => true,
        }
    }

    fn clean_tokens(&self, raw: &str) -> Vec<String> {
        let text: String = raw
            .nfc()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let mut tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        self.strip_leading(&mut tokens);
        trim_trailing(&mut tokens);
        tokens
    }

    fn strip_leading(&self, tokens: &mut Vec<String>) {
        while tokens.len() > 1 {
            let first = tokens[0].as_str();
            if !first.chars().any(char::is_alphanumeric) {
                tokens.remove(0);
                continue;
            }
            if let Some(trimmed) = trim_leading_symbols(first) {
                tokens[0] = trimmed;
                continue;
            }
            let next_capitalised = starts_uppercase_or_digit(&tokens[1]);
            let lower = first.to_lowercase();
            let single_letter = first.chars().count() == 1 && first.chars().all(char::is_alphabetic);
            let is_connector = self.connectors.contains(&lower);
            if (single_letter && (is_connector || next_capitalised))
                || (is_connector && next_capitalised)
            {
                tokens.remove(0);
                continue;
            }
            if let Some(rest) = self.unglue(first, &tokens[1..]) {
                tokens[0] = rest;
                continue;
            }
            break;
        }
        if let Some(trimmed) = tokens.first().and_then(|first| trim_leading_symbols(first)) {
            tokens[0] = trimmed;
        }
    }

    /// `byLoro Piana ...` → `Loro Piana ...` when the remainder starts with a known brand.
    fn unglue(&self, first: &str, following: &[String]) -> Option<String> {
        for connector in &self.connectors {
            let Some(rest) = first.strip_prefix(connector.as_str()) else {
                continue;
            };
            if rest.is_empty() || !starts_uppercase_or_digit(rest) {
                continue;
            }
            let mut candidate = Vec::with_capacity(following.len() + 1);
            candidate.push(rest.to_string());
            candidate.extend(following.iter().cloned());
            if self
                .brand_hits(&candidate)
                .first()
                .is_some_and(|hit| hit.start == 0)
            {
                return Some(rest.to_string());
            }
        }
        None
    }

    fn brand_hits(&self, tokens: &[String]) -> Vec<BrandHit> {
        let keys: Vec<String> = tokens.iter().map(|token| canonical_key(token)).collect();
        let mut hits = Vec::new();
        let mut index = 0;
        while index < keys.len() {
            let matched = self.brands.iter().enumerate().find(|(_, brand)| {
                let end = index + brand.tokens.len();
                end <= keys.len() && keys[index..end] == brand.tokens[..]
            });
            match matched {
                Some((brand, entry)) => {
                    let end = index + entry.tokens.len();
                    hits.push(BrandHit {
                        start: index,
                        end,
                        brand,
                    });
                    index = end;
                }
                None => index += 1,
            }
        }
        hits
    }

    /// Brand phrases: adjacent hits or hits joined by a collab marker count as one.
    /// Returns (start token, brand label) per phrase.
    fn brand_groups(&self, tokens: &[String]) -> Vec<(usize, String)> {
        let mut groups: Vec<(usize, usize, String)> = Vec::new();
        for hit in self.brand_hits(tokens) {
            let name = self.brands[hit.brand].name.clone();
            if let Some((_, end, label)) = groups.last_mut() {
                let gap = &tokens[*end..hit.start];
                let joined = gap.is_empty()
                    || (gap.len() == 1 && self.collab_markers.contains(&gap[0].to_lowercase()));
                if joined {
                    label.push_str(" x ");
                    label.push_str(&name);
                    *end = hit.end;
                    continue;
                }
            }
            groups.push((hit.start, hit.end, name));
        }
        groups
            .into_iter()
            .map(|(start, _, label)| (start, label))
            .collect()
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

fn starts_uppercase_or_digit(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

fn trim_trailing(tokens: &mut Vec<String>) {
    while tokens
        .last()
        .is_some_and(|token| !token.chars().any(char::is_alphanumeric) && !token.ends_with(')'))
    {
        tokens.pop();
    }
    if let Some(last) = tokens.last_mut() {
        let trimmed = last.trim_end_matches(TRAILING_JUNK);
        if trimmed.len() != last.len() {
            *last = trimmed.to_string();
        }
    }
}
