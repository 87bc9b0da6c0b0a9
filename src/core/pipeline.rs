use crate::core::cache::CardTypeCache;
use crate::core::classify::{DisabledLookup, IntervalGate, ScryfallLookup, TypeClassifier};
use crate::core::extract::extract;
use crate::core::format::{deck_filename, format_deck};
use crate::core::normalize::normalize;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Deck, RawDeck, ThemeSet};
use crate::domain::ports::CardLookup;
use crate::utils::error::Result;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;

/// Expected size of a printed JumpStart deck. Not enforced, only warned on.
const EXPECTED_DECK_SIZE: u32 = 20;

pub struct DeckPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    classifier: Mutex<TypeClassifier<Box<dyn CardLookup>, IntervalGate>>,
}

impl<S: Storage, C: ConfigProvider> DeckPipeline<S, C> {
    pub fn new(storage: S, config: C, cache: CardTypeCache) -> Self {
        let lookup: Box<dyn CardLookup> = if config.offline() {
            Box::new(DisabledLookup)
        } else {
            Box::new(ScryfallLookup::new(config.api_endpoint()))
        };
        let gate = IntervalGate::new(Duration::from_millis(config.request_interval_ms()));
        Self {
            storage,
            config,
            classifier: Mutex::new(TypeClassifier::new(cache, lookup, gate)),
        }
    }

    /// Recover the cache after a run so batch callers can carry it to the
    /// next source.
    pub fn into_cache(self) -> CardTypeCache {
        self.classifier.into_inner().into_cache()
    }

    fn set_name(&self) -> String {
        match self.config.set_name() {
            Some(name) => name.to_string(),
            None => Path::new(self.config.output_path())
                .file_name()
                .map(|n| n.to_string_lossy().to_uppercase())
                .unwrap_or_else(|| "UNNAMED SET".to_string()),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DeckPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawDeck>> {
        let mut decks = Vec::new();
        for input in self.config.input_files() {
            tracing::debug!("reading {}", input);
            let bytes = std::fs::read(input)?;
            let html = String::from_utf8_lossy(&bytes);
            let mut extracted = extract(self.config.dialect(), &html)?;
            tracing::info!("{}: {} deck blocks", input, extracted.len());
            decks.append(&mut extracted);
        }
        Ok(decks)
    }

    async fn transform(&self, raw_decks: Vec<RawDeck>) -> Result<ThemeSet> {
        let mut classifier = self.classifier.lock().await;
        let mut decks = Vec::with_capacity(raw_decks.len());

        for raw in raw_decks {
            let mut cards = Vec::with_capacity(raw.lines.len());
            for line in &raw.lines {
                let card = match normalize(line) {
                    Ok(card) => card,
                    Err(e) => {
                        tracing::warn!("skipping line in {:?}: {}", raw.theme, e);
                        continue;
                    }
                };
                let category = classifier.classify(&card.name).await;
                cards.push((card, category));
            }

            let total: u32 = cards.iter().map(|(card, _)| card.quantity).sum();
            if total != EXPECTED_DECK_SIZE {
                tracing::warn!("{:?} has {} cards, expected {}", raw.theme, total, EXPECTED_DECK_SIZE);
            }

            decks.push(Deck {
                theme: raw.theme,
                variant: raw.variant,
                cards,
            });
        }

        Ok(ThemeSet {
            name: self.set_name(),
            decks,
        })
    }

    async fn load(&self, set: ThemeSet) -> Result<String> {
        for deck in &set.decks {
            let filename = deck_filename(deck);
            let text = format_deck(deck);
            if self.config.dry_run() {
                tracing::info!("[dry-run] would write {}", filename);
            } else {
                tracing::debug!("writing {}", filename);
                self.storage.write_file(&filename, text.as_bytes()).await?;
            }
        }

        // Deck files on disk stay valid even if the cache dump fails.
        if !self.config.dry_run() {
            let classifier = self.classifier.lock().await;
            let cache_path = Path::new(self.config.cache_file());
            match classifier.cache().save_file(cache_path) {
                Ok(()) => tracing::info!(
                    "saved {} cached card types to {}",
                    classifier.cache().len(),
                    self.config.cache_file()
                ),
                Err(e) => tracing::warn!("failed to save card type cache: {}", e),
            }
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, Dialect};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        async fn file_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.files.lock().await.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_files: Vec<String>,
        dialect: Dialect,
        output_path: String,
        cache_file: String,
        set_name: Option<String>,
        dry_run: bool,
    }

    impl Default for MockConfig {
        fn default() -> Self {
            Self {
                input_files: vec![],
                dialect: Dialect::Tagged,
                output_path: "decks/TEST".to_string(),
                cache_file: "unused-cache.json".to_string(),
                set_name: Some("TEST".to_string()),
                dry_run: true, // keep unit tests off the real filesystem
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_files(&self) -> &[String] {
            &self.input_files
        }
        fn dialect(&self) -> Dialect {
            self.dialect
        }
        fn output_path(&self) -> &str {
            &self.output_path
        }
        fn cache_file(&self) -> &str {
            &self.cache_file
        }
        fn api_endpoint(&self) -> &str {
            "http://localhost:1/unused"
        }
        fn request_interval_ms(&self) -> u64 {
            0
        }
        fn set_name(&self) -> Option<&str> {
            self.set_name.as_deref()
        }
        fn offline(&self) -> bool {
            true
        }
        fn dry_run(&self) -> bool {
            self.dry_run
        }
    }

    fn seeded_cache() -> CardTypeCache {
        let mut cache = CardTypeCache::new();
        cache.put("Vendilion Clique", Category::Creatures);
        cache
    }

    #[tokio::test]
    async fn transform_classifies_with_preseeded_cache_and_no_network() {
        let pipeline = DeckPipeline::new(MockStorage::default(), MockConfig::default(), seeded_cache());

        let raw = vec![RawDeck {
            theme: "Faeries".to_string(),
            variant: None,
            lines: vec![
                "1 Vendilion Clique".to_string(),
                "2 Island".to_string(),
                "1 Random rare or mythic rare".to_string(),
            ],
        }];

        let set = pipeline.transform(raw).await.unwrap();
        assert_eq!(set.name, "TEST");
        assert_eq!(set.decks.len(), 1);

        let text = format_deck(&set.decks[0]);
        assert_eq!(
            text,
            "FAERIES\n\
             //Creatures (1)\n1 Vendilion Clique\n\
             //Lands (2)\n2 Island\n\
             //Special (1)\n1 Random rare or mythic rare\n"
        );
    }

    #[tokio::test]
    async fn transform_skips_bad_lines_and_keeps_the_deck() {
        let pipeline = DeckPipeline::new(MockStorage::default(), MockConfig::default(), seeded_cache());

        let raw = vec![RawDeck {
            theme: "Faeries".to_string(),
            variant: None,
            lines: vec!["0 Broken".to_string(), "2 Island".to_string()],
        }];

        let set = pipeline.transform(raw).await.unwrap();
        assert_eq!(set.decks[0].cards.len(), 1);
        assert_eq!(set.decks[0].cards[0].0.name, "Island");
    }

    #[tokio::test]
    async fn offline_misses_become_unknown() {
        let pipeline = DeckPipeline::new(
            MockStorage::default(),
            MockConfig::default(),
            CardTypeCache::new(),
        );

        let raw = vec![RawDeck {
            theme: "Mystery".to_string(),
            variant: None,
            lines: vec!["1 Some Unheard Of Card".to_string()],
        }];

        let set = pipeline.transform(raw).await.unwrap();
        assert_eq!(set.decks[0].cards[0].1, Category::Unknown);
    }

    #[tokio::test]
    async fn load_writes_one_file_per_theme_variant() {
        let storage = MockStorage::default();
        let cache_dir = tempfile::TempDir::new().unwrap();
        let config = MockConfig {
            dry_run: false,
            cache_file: cache_dir
                .path()
                .join("cache.json")
                .to_str()
                .unwrap()
                .to_string(),
            ..MockConfig::default()
        };
        let pipeline = DeckPipeline::new(storage.clone(), config, CardTypeCache::new());

        let set = ThemeSet {
            name: "TEST".to_string(),
            decks: vec![
                Deck {
                    theme: "Faeries".to_string(),
                    variant: Some(1),
                    cards: vec![(
                        crate::domain::model::NormalizedCard {
                            quantity: 7,
                            name: "Island".to_string(),
                        },
                        Category::Lands,
                    )],
                },
                Deck {
                    theme: "Faeries".to_string(),
                    variant: Some(2),
                    cards: vec![],
                },
            ],
        };

        let output = pipeline.load(set).await.unwrap();
        assert_eq!(output, "decks/TEST");
        assert_eq!(
            storage.file_names().await,
            vec!["FAERIES (1).txt", "FAERIES (2).txt"]
        );

        let text = storage.get_file("FAERIES (1).txt").await.unwrap();
        assert_eq!(
            String::from_utf8(text).unwrap(),
            "FAERIES (1)\n//Lands (7)\n7 Island\n"
        );
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let storage = MockStorage::default();
        let pipeline = DeckPipeline::new(storage.clone(), MockConfig::default(), CardTypeCache::new());

        let set = ThemeSet {
            name: "TEST".to_string(),
            decks: vec![Deck {
                theme: "Faeries".to_string(),
                variant: None,
                cards: vec![],
            }],
        };

        pipeline.load(set).await.unwrap();
        assert!(storage.file_names().await.is_empty());
    }

    #[tokio::test]
    async fn into_cache_returns_entries_learned_during_the_run() {
        let pipeline = DeckPipeline::new(
            MockStorage::default(),
            MockConfig::default(),
            CardTypeCache::new(),
        );

        let raw = vec![RawDeck {
            theme: "Lands".to_string(),
            variant: None,
            lines: vec!["7 Island".to_string()],
        }];
        pipeline.transform(raw).await.unwrap();

        let cache = pipeline.into_cache();
        assert_eq!(cache.get("Island"), Some(Category::Lands));
    }
}
