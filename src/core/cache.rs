use crate::domain::model::Category;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

const CACHE_COMMENT: &str = "Card type data derived from the Scryfall API (https://scryfall.com). \
     Not affiliated with or endorsed by Scryfall.";
const CACHE_VERSION: &str = "2.0";

/// Persistent card name -> category mapping, shared across runs so released
/// decks never trigger repeat lookups. Unbounded, no eviction: printed deck
/// lists do not change.
#[derive(Debug, Clone, Default)]
pub struct CardTypeCache {
    entries: BTreeMap<String, Category>,
}

#[derive(Serialize)]
struct CacheFile<'a> {
    #[serde(rename = "_comment")]
    comment: &'static str,
    #[serde(rename = "_cache_version")]
    version: &'static str,
    #[serde(flatten)]
    cards: &'a BTreeMap<String, Category>,
}

impl CardTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Category> {
        self.entries.get(name).copied()
    }

    pub fn put(&mut self, name: impl Into<String>, category: Category) {
        self.entries.insert(name.into(), category);
    }

    /// Merge a persisted JSON dump into this cache. Persisted entries win on
    /// conflict. Keys starting with `_` are file metadata and are skipped;
    /// both plain string values and the legacy `{"type": "..."}` object form
    /// are accepted. Returns the number of entries merged.
    pub fn merge_json(&mut self, data: &[u8]) -> Result<usize> {
        let document: serde_json::Value = serde_json::from_slice(data)?;
        let object = document.as_object().ok_or_else(|| EtlError::ProcessingError {
            message: "cache file is not a JSON object".to_string(),
        })?;

        let mut merged = 0;
        for (name, value) in object {
            if name.starts_with('_') {
                continue;
            }
            let label = match value {
                serde_json::Value::String(label) => Some(label.as_str()),
                serde_json::Value::Object(card) => card.get("type").and_then(|v| v.as_str()),
                _ => None,
            };
            match label.and_then(Category::parse) {
                Some(category) => {
                    self.entries.insert(name.clone(), category);
                    merged += 1;
                }
                None => {
                    tracing::warn!("ignoring unrecognized cache entry for {:?}: {}", name, value);
                }
            }
        }
        Ok(merged)
    }

    /// Full dump as pretty JSON: metadata header first, then card entries in
    /// sorted key order so successive dumps diff cleanly.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let file = CacheFile {
            comment: CACHE_COMMENT,
            version: CACHE_VERSION,
            cards: &self.entries,
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let data = std::fs::read(path)?;
        self.merge_json(&data)
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
