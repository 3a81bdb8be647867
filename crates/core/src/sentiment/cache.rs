use crate::domain::sentiment::SentimentScore;
use crate::sentiment::scorer::SentimentScorer;
use dashmap::DashMap;
use std::sync::Arc;

/// Memoizes scores keyed on the exact input text.
///
/// Scoring is a pure function of the text and the (immutable) lexicon, so an entry
/// never goes stale. Clones share the same map.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    scorer: SentimentScorer,
    entries: Arc<DashMap<String, SentimentScore>>,
    max_entries: usize,
}

impl ScoreCache {
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    pub fn new(scorer: SentimentScorer) -> Self {
        Self::with_capacity(scorer, Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(scorer: SentimentScorer, max_entries: usize) -> Self {
        Self {
            scorer,
            entries: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        if let Some(hit) = self.entries.get(text) {
            return *hit.value();
        }

        let score = self.scorer.score(text);
        if self.entries.len() >= self.max_entries {
            // No eviction order is kept; a full map starts over.
            tracing::debug!(entries = self.entries.len(), "score cache full; clearing");
            self.entries.clear();
        }
        self.entries.insert(text.to_string(), score);
        score
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_returns_identical_score() {
        let cache = ScoreCache::new(SentimentScorer::default());
        let first = cache.score("bullish rally");
        let second = cache.score("bullish rally");
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_on_exact_text() {
        let cache = ScoreCache::new(SentimentScorer::default());
        let a = cache.score("good");
        let b = cache.score("Good ");
        assert_eq!(cache.len(), 2);
        // Same normalized words, so same value, but cached independently.
        assert_eq!(a, b);
        let c = cache.score("bad");
        assert_ne!(a, c);
    }

    #[test]
    fn clears_when_full() {
        let cache = ScoreCache::with_capacity(SentimentScorer::default(), 2);
        cache.score("a");
        cache.score("b");
        cache.score("c");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let cache = ScoreCache::new(SentimentScorer::default());
        let other = cache.clone();
        other.score("moon");
        assert_eq!(cache.len(), 1);
    }
}
