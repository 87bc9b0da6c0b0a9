use crate::core::cache::CardTypeCache;
use crate::core::normalize::BASIC_LANDS;
use crate::domain::model::Category;
use crate::domain::ports::{CardLookup, RequestGate};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

pub const SCRYFALL_API: &str = "https://api.scryfall.com/cards/named";

/// Scryfall asks for at least 50-100ms between requests; match the upper bound.
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 100;

/// Exact-name lookup against the Scryfall named-card endpoint. A miss
/// (404 or any non-success status) is `None`, not an error.
pub struct ScryfallLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl ScryfallLookup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CardLookup for ScryfallLookup {
    async fn type_line(&self, name: &str) -> Result<Option<String>> {
        tracing::debug!("looking up {:?} at {}", name, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("exact", name)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("lookup for {:?} returned {}", name, response.status());
            return Ok(None);
        }

        let document: serde_json::Value = response.json().await?;
        Ok(document
            .get("type_line")
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }
}

/// Offline mode: every query misses without touching the network.
pub struct DisabledLookup;

#[async_trait]
impl CardLookup for DisabledLookup {
    async fn type_line(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Enforces a minimum delay since the previous external query.
pub struct IntervalGate {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl IntervalGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }
}

#[async_trait]
impl RequestGate for IntervalGate {
    async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Resolves card names to categories: placeholder and basic-land short
/// circuits first, then the cache, then one throttled external lookup per
/// unseen name. Lookup failures classify as Unknown and are not retried
/// within a run. The cache is owned explicitly so tests and batch runs can
/// carry it between classifiers.
pub struct TypeClassifier<L: CardLookup, G: RequestGate> {
    cache: CardTypeCache,
    lookup: L,
    gate: G,
}

impl<L: CardLookup, G: RequestGate> TypeClassifier<L, G> {
    pub fn new(cache: CardTypeCache, lookup: L, gate: G) -> Self {
        Self { cache, lookup, gate }
    }

    pub fn cache(&self) -> &CardTypeCache {
        &self.cache
    }

    pub fn into_cache(self) -> CardTypeCache {
        self.cache
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub async fn classify(&mut self, name: &str) -> Category {
        if is_special_placeholder(name) {
            self.cache.put(name, Category::Special);
            return Category::Special;
        }

        if is_basic_land(name) {
            self.cache.put(name, Category::Lands);
            return Category::Lands;
        }

        if let Some(category) = self.cache.get(name) {
            return category;
        }

        self.gate.acquire().await;
        let category = match self.lookup.type_line(name).await {
            Ok(Some(type_line)) => {
                let category = classify_type_line(&type_line);
                tracing::debug!("{}: {} -> {}", name, type_line, category);
                category
            }
            Ok(None) => {
                tracing::warn!("no card data for {:?}", name);
                Category::Unknown
            }
            Err(e) => {
                tracing::warn!("lookup failed for {:?}: {}", name, e);
                Category::Unknown
            }
        };

        self.cache.put(name, category);
        category
    }
}

/// Booster slot placeholders like "Random rare or mythic rare" are not real
/// cards and never go to the lookup service.
fn is_special_placeholder(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("rare") && (lower.contains("mythic") || lower.contains("random"))
}

/// Basic lands (including Snow-Covered printings) appear in every deck and
/// are classified without a lookup.
fn is_basic_land(name: &str) -> bool {
    let base = name.strip_prefix("Snow-Covered ").unwrap_or(name);
    BASIC_LANDS.contains(&base)
}

/// Map a Scryfall type line to a category. Only the portion before the
/// em-dash subtype separator counts. Creature dominates every other type;
/// the remaining priority follows the printed type order.
pub fn classify_type_line(type_line: &str) -> Category {
    let type_words = type_line.split('\u{2014}').next().unwrap_or(type_line);

    if type_words.contains("Creature") {
        return Category::Creatures;
    }

    const PRIORITY: [(&str, Category); 6] = [
        ("Planeswalker", Category::Planeswalkers),
        ("Land", Category::Lands),
        ("Artifact", Category::Artifacts),
        ("Enchantment", Category::Enchantments),
        ("Sorcery", Category::Sorceries),
        ("Instant", Category::Instants),
    ];
    for (word, category) in PRIORITY {
        if type_words.contains(word) {
            return category;
        }
    }
    Category::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Lookup stub that records how many queries were issued.
    struct CountingLookup {
        type_line: Option<String>,
        queries: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CardLookup for CountingLookup {
        async fn type_line(&self, _name: &str) -> Result<Option<String>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.type_line.clone())
        }
    }

    /// Gate stub that never sleeps, only counts acquisitions.
    struct NoopGate {
        acquired: usize,
    }

    #[async_trait]
    impl RequestGate for NoopGate {
        async fn acquire(&mut self) {
            self.acquired += 1;
        }
    }

    fn classifier(
        type_line: Option<&str>,
        queries: Arc<AtomicUsize>,
    ) -> TypeClassifier<CountingLookup, NoopGate> {
        TypeClassifier::new(
            CardTypeCache::new(),
            CountingLookup {
                type_line: type_line.map(str::to_string),
                queries,
            },
            NoopGate { acquired: 0 },
        )
    }

    #[tokio::test]
    async fn creature_dominates_every_other_type() {
        assert_eq!(
            classify_type_line("Artifact Creature \u{2014} Golem"),
            Category::Creatures
        );
        assert_eq!(
            classify_type_line("Enchantment Creature \u{2014} God"),
            Category::Creatures
        );
        assert_eq!(
            classify_type_line("Legendary Creature \u{2014} Faerie Wizard"),
            Category::Creatures
        );
    }

    #[tokio::test]
    async fn non_creature_types_follow_priority_order() {
        assert_eq!(classify_type_line("Instant"), Category::Instants);
        assert_eq!(classify_type_line("Sorcery"), Category::Sorceries);
        assert_eq!(
            classify_type_line("Legendary Planeswalker \u{2014} Jace"),
            Category::Planeswalkers
        );
        assert_eq!(classify_type_line("Artifact Land"), Category::Lands);
        assert_eq!(
            classify_type_line("Artifact \u{2014} Equipment"),
            Category::Artifacts
        );
        assert_eq!(
            classify_type_line("Enchantment \u{2014} Aura"),
            Category::Enchantments
        );
        assert_eq!(classify_type_line("Conspiracy"), Category::Unknown);
    }

    #[tokio::test]
    async fn subtypes_after_the_em_dash_are_ignored() {
        // "Urza's Saga" style lines must not classify by their subtype words
        assert_eq!(
            classify_type_line("Land \u{2014} Urza\u{2019}s Saga"),
            Category::Lands
        );
    }

    #[tokio::test]
    async fn warm_cache_issues_zero_additional_queries() {
        let queries = Arc::new(AtomicUsize::new(0));
        let mut classifier = classifier(Some("Creature \u{2014} Faerie Wizard"), queries.clone());

        assert_eq!(classifier.classify("Vendilion Clique").await, Category::Creatures);
        assert_eq!(queries.load(Ordering::SeqCst), 1);

        assert_eq!(classifier.classify("Vendilion Clique").await, Category::Creatures);
        assert_eq!(queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn special_placeholders_skip_the_lookup() {
        let queries = Arc::new(AtomicUsize::new(0));
        let mut classifier = classifier(Some("Creature"), queries.clone());

        assert_eq!(
            classifier.classify("Random rare or mythic rare").await,
            Category::Special
        );
        assert_eq!(
            classifier.classify("Random white rare or mythic rare").await,
            Category::Special
        );
        assert_eq!(classifier.classify("Rare or mythic rare").await, Category::Special);
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn basic_lands_skip_the_lookup() {
        let queries = Arc::new(AtomicUsize::new(0));
        let mut classifier = classifier(None, queries.clone());

        assert_eq!(classifier.classify("Island").await, Category::Lands);
        assert_eq!(classifier.classify("Snow-Covered Swamp").await, Category::Lands);
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_miss_classifies_unknown_without_retry() {
        let queries = Arc::new(AtomicUsize::new(0));
        let mut classifier = classifier(None, queries.clone());

        assert_eq!(classifier.classify("Misspelled Card").await, Category::Unknown);
        assert_eq!(queries.load(Ordering::SeqCst), 1);

        // Unknown is cached for the rest of the run
        assert_eq!(classifier.classify("Misspelled Card").await, Category::Unknown);
        assert_eq!(queries.load(Ordering::SeqCst), 1);

        // the throttle gate was taken exactly once per external query
        assert_eq!(classifier.gate().acquired, 1);
    }

    #[tokio::test]
    async fn preseeded_cache_wins_over_lookup() {
        let mut cache = CardTypeCache::new();
        cache.put("Vendilion Clique", Category::Creatures);
        let queries = Arc::new(AtomicUsize::new(0));
        let mut classifier = TypeClassifier::new(
            cache,
            CountingLookup {
                type_line: Some("Sorcery".to_string()),
                queries: queries.clone(),
            },
            NoopGate { acquired: 0 },
        );

        assert_eq!(classifier.classify("Vendilion Clique").await, Category::Creatures);
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_gate_spaces_out_requests() {
        let mut gate = IntervalGate::new(Duration::from_millis(100));

        let start = Instant::now();
        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        // second acquisition must wait out the remaining interval
        gate.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
