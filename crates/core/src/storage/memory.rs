use crate::domain::news::NewsItem;
use crate::domain::sentiment::SentimentLabel;
use crate::storage::NewsStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

/// Process-local [`NewsStore`], used by dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryNewsStore {
    items: Arc<RwLock<Vec<NewsItem>>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = NewsItem>) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.items.write() {
            for item in items {
                if !guard.iter().any(|i| same_identity(i, &item)) {
                    guard.push(item);
                }
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(
        &self,
        subject: &str,
        pred: impl Fn(&NewsItem) -> bool,
    ) -> anyhow::Result<Vec<NewsItem>> {
        let guard = self
            .items
            .read()
            .map_err(|_| anyhow::anyhow!("memory news store lock poisoned"))?;
        Ok(guard
            .iter()
            .filter(|i| i.subject().eq_ignore_ascii_case(subject) && pred(i))
            .cloned()
            .collect())
    }
}

fn same_identity(a: &NewsItem, b: &NewsItem) -> bool {
    a.identity() == b.identity()
}

fn newest_first(items: &mut [NewsItem]) {
    items.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
}

#[async_trait::async_trait]
impl NewsStore for MemoryNewsStore {
    async fn save(&self, item: &NewsItem) -> anyhow::Result<bool> {
        let mut guard = self
            .items
            .write()
            .map_err(|_| anyhow::anyhow!("memory news store lock poisoned"))?;
        if guard.iter().any(|i| same_identity(i, item)) {
            return Ok(false);
        }
        guard.push(item.clone());
        Ok(true)
    }

    async fn latest(&self, subject: &str, limit: usize) -> anyhow::Result<Vec<NewsItem>> {
        let mut out = self.select(subject, |_| true)?;
        newest_first(&mut out);
        out.truncate(limit);
        Ok(out)
    }

    async fn between(
        &self,
        subject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<NewsItem>> {
        let mut out = self.select(subject, |i| i.published_at() >= start && i.published_at() <= end)?;
        out.sort_by_key(|i| i.published_at());
        Ok(out)
    }

    async fn by_label(
        &self,
        subject: &str,
        label: SentimentLabel,
    ) -> anyhow::Result<Vec<NewsItem>> {
        let mut out = self.select(subject, |i| i.label() == label)?;
        newest_first(&mut out);
        Ok(out)
    }

    async fn search(&self, subject: &str, keyword: &str) -> anyhow::Result<Vec<NewsItem>> {
        let needle = keyword.trim().to_lowercase();
        let mut out = self.select(subject, |i| {
            i.title().to_lowercase().contains(&needle)
                || i.description().to_lowercase().contains(&needle)
        })?;
        newest_first(&mut out);
        Ok(out)
    }
}
