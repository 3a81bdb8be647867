use crate::analytics::{filter_by_window, merge, Aggregator};
use crate::config::AnalyticsOptions;
use crate::domain::analytics::{AnalyticsReport, AnalyticsSummary};
use crate::domain::news::NewsItem;
use crate::domain::outcome::Outcome;
use crate::domain::sentiment::{SentimentLabel, SentimentScore};
use crate::ingest::{CommentaryKind, NewsProvider};
use crate::sentiment::ScoreCache;
use crate::storage::NewsStore;
use crate::time::{Lookback, TimeWindow};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

const NO_PROVIDER: &str = "news provider not configured";
const NO_STORE: &str = "news store not configured";

/// Glues the scoring core to the provider and the store.
///
/// Collaborator failures never surface as errors here: each operation degrades to
/// whatever it could still gather and reports that through [`Outcome`].
#[derive(Clone)]
pub struct NewsAnalyticsService {
    cache: ScoreCache,
    provider: Option<Arc<dyn NewsProvider>>,
    store: Option<Arc<dyn NewsStore>>,
    options: AnalyticsOptions,
}

impl NewsAnalyticsService {
    pub fn new(
        cache: ScoreCache,
        provider: Option<Arc<dyn NewsProvider>>,
        store: Option<Arc<dyn NewsStore>>,
        options: AnalyticsOptions,
    ) -> Self {
        Self {
            cache,
            provider,
            store,
            options,
        }
    }

    pub fn options(&self) -> &AnalyticsOptions {
        &self.options
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator {
            top_items_limit: self.options.top_items_limit,
            topic_limit: self.options.topic_limit,
        }
    }

    pub fn score(&self, text: &str) -> Outcome<SentimentScore> {
        Outcome::computed(self.cache.score(text))
    }

    /// Scores unscored items, collapses duplicates, and summarizes the set as given.
    ///
    /// No time filtering happens here; `window` only labels the summary.
    pub fn summarize(
        &self,
        subject: &str,
        window: Option<&str>,
        items: Vec<NewsItem>,
    ) -> AnalyticsSummary {
        let descriptor = self.window_descriptor(window);
        let scored: Vec<NewsItem> = items.into_iter().map(|i| self.ensure_scored(i)).collect();
        let unique = merge(scored, Vec::new());
        self.aggregator().aggregate(&unique, subject, &descriptor)
    }

    /// Fresh items from the provider, persisted as a side effect.
    ///
    /// Falls back to the newest stored items when the provider is absent or failing.
    pub async fn latest_news(&self, subject: &str, max: Option<usize>) -> Outcome<Vec<NewsItem>> {
        let cap = self.options.max_articles_per_request;
        let max = max.unwrap_or(cap).min(cap);

        let Some(provider) = &self.provider else {
            return self.history_fallback(subject, NO_PROVIDER.to_string()).await;
        };

        match provider.fetch_snippets(subject, max).await {
            Ok(snippets) => {
                let items = self.build_items(provider.as_ref(), subject, &snippets);
                self.persist(subject, &items).await;
                Outcome::computed(items)
            }
            Err(err) => {
                tracing::warn!(subject, error = %err, "news provider failed; using stored history");
                self.history_fallback(subject, format!("news provider failed: {err:#}"))
                    .await
            }
        }
    }

    /// One polling pass: fetch, score and persist. Returns only the newly stored items.
    ///
    /// Unlike [`Self::latest_news`] this does not degrade; a missing or failing provider is an error.
    pub async fn poll(&self, subject: &str, max: usize) -> anyhow::Result<Vec<NewsItem>> {
        let provider = self.provider.as_ref().context(NO_PROVIDER)?;
        anyhow::ensure!(self.store.is_some(), NO_STORE);

        let max = max.min(self.options.max_articles_per_request);
        let snippets = provider
            .fetch_snippets(subject, max)
            .await
            .with_context(|| format!("fetch news snippets failed for subject={subject}"))?;
        let items = self.build_items(provider.as_ref(), subject, &snippets);
        Ok(self.persist(subject, &items).await)
    }

    /// Summary over fresh items plus stored items published within the window.
    pub async fn analyze(&self, subject: &str, window: Option<&str>) -> Outcome<AnalyticsSummary> {
        let descriptor = self.window_descriptor(window);
        let lookback = Lookback::parse(Some(&descriptor), self.options.default_window_hours);

        let fresh = self.latest_news(subject, None).await;
        // Taken after the fetch so fresh items fall inside the window.
        let range = lookback.window_ending(Utc::now());
        let stored = self.stored_between(subject, range).await;

        fresh.zip(stored).map(|(fresh, stored)| {
            let merged = merge(fresh, stored);
            let in_window = filter_by_window(merged, range.start, range.end);
            tracing::info!(subject, window = %descriptor, items = in_window.len(), "aggregating news");
            self.aggregator().aggregate(&in_window, subject, &descriptor)
        })
    }

    /// [`Self::analyze`] with market-moving events and a trend forecast attached.
    pub async fn report(&self, subject: &str, window: Option<&str>) -> Outcome<AnalyticsReport> {
        let events = CommentaryKind::MarketMovingEvents {
            subject: subject.to_string(),
        };
        let forecast = CommentaryKind::TrendForecast {
            subject: subject.to_string(),
        };

        let (summary, events, forecast) = tokio::join!(
            self.analyze(subject, window),
            self.commentary(&events),
            self.commentary(&forecast),
        );

        summary
            .zip(events)
            .zip(forecast)
            .map(|((summary, market_moving_events), trend_forecast)| AnalyticsReport {
                summary,
                market_moving_events,
                trend_forecast,
            })
    }

    pub async fn positive_news(&self, subject: &str, limit: Option<usize>) -> Outcome<Vec<NewsItem>> {
        self.labeled_news(subject, SentimentLabel::Positive, limit)
            .await
    }

    pub async fn negative_news(&self, subject: &str, limit: Option<usize>) -> Outcome<Vec<NewsItem>> {
        self.labeled_news(subject, SentimentLabel::Negative, limit)
            .await
    }

    /// Provider keyword search merged with the stored keyword search.
    pub async fn search_news(&self, subject: &str, keywords: &str) -> Outcome<Vec<NewsItem>> {
        let fresh = match &self.provider {
            Some(provider) => match provider.search_snippets(subject, keywords).await {
                Ok(snippets) => {
                    Outcome::computed(self.build_items(provider.as_ref(), subject, &snippets))
                }
                Err(err) => {
                    tracing::warn!(subject, keywords, error = %err, "news provider search failed");
                    Outcome::fallback(Vec::new(), format!("news provider failed: {err:#}"))
                }
            },
            None => Outcome::fallback(Vec::new(), NO_PROVIDER),
        };

        let stored = match &self.store {
            Some(store) => match store.search(subject, keywords).await {
                Ok(items) => Outcome::computed(items),
                Err(err) => {
                    tracing::warn!(subject, keywords, error = %err, "news store search failed");
                    Outcome::fallback(Vec::new(), format!("news store failed: {err:#}"))
                }
            },
            None => Outcome::fallback(Vec::new(), NO_STORE),
        };

        fresh.zip(stored).map(|(fresh, stored)| merge(fresh, stored))
    }

    /// Provider answer for `kind`, or a fixed "unavailable" message.
    pub async fn commentary(&self, kind: &CommentaryKind) -> Outcome<String> {
        let Some(provider) = &self.provider else {
            return Outcome::fallback(kind.unavailable_message().to_string(), NO_PROVIDER);
        };

        match provider.ask(&kind.prompt()).await {
            Ok(answer) => Outcome::computed(answer),
            Err(err) => {
                tracing::warn!(?kind, error = %err, "news provider commentary failed");
                Outcome::fallback(
                    kind.unavailable_message().to_string(),
                    format!("news provider failed: {err:#}"),
                )
            }
        }
    }

    fn window_descriptor(&self, window: Option<&str>) -> String {
        window
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.options.default_window())
    }

    fn ensure_scored(&self, item: NewsItem) -> NewsItem {
        if item.sentiment().is_some() {
            return item;
        }
        let text = if item.description().trim().is_empty() {
            item.title().to_string()
        } else {
            format!("{} {}", item.title(), item.description())
        };
        let score = self.cache.score(&text);
        item.with_sentiment(Some(score))
    }

    fn build_items(
        &self,
        provider: &dyn NewsProvider,
        subject: &str,
        snippets: &[String],
    ) -> Vec<NewsItem> {
        let now = Utc::now();
        let items: Vec<NewsItem> = snippets
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                NewsItem::from_snippet(s, subject, provider.provider_name(), now, self.cache.scorer())
            })
            .collect();
        // A provider can repeat itself; identity must stay unique within one batch.
        merge(items, Vec::new())
    }

    /// Saves `items` and returns the ones the store did not already have.
    async fn persist(&self, subject: &str, items: &[NewsItem]) -> Vec<NewsItem> {
        let Some(store) = &self.store else {
            return Vec::new();
        };

        let mut inserted = Vec::new();
        for item in items {
            match store.save(item).await {
                Ok(true) => inserted.push(item.clone()),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(subject, title = item.title(), error = %err, "failed to persist news item");
                }
            }
        }
        tracing::info!(subject, fetched = items.len(), inserted = inserted.len(), "persisted news items");
        inserted
    }

    async fn history_fallback(&self, subject: &str, reason: String) -> Outcome<Vec<NewsItem>> {
        let Some(store) = &self.store else {
            return Outcome::fallback(Vec::new(), reason);
        };

        match store.latest(subject, self.options.fallback_history_limit).await {
            Ok(items) => Outcome::fallback(items, reason),
            Err(err) => {
                tracing::warn!(subject, error = %err, "news store failed while serving fallback history");
                Outcome::fallback(Vec::new(), format!("{reason}; news store failed: {err:#}"))
            }
        }
    }

    async fn stored_between(&self, subject: &str, range: TimeWindow) -> Outcome<Vec<NewsItem>> {
        let Some(store) = &self.store else {
            return Outcome::fallback(Vec::new(), NO_STORE);
        };

        match store.between(subject, range.start, range.end).await {
            Ok(items) => Outcome::computed(items),
            Err(err) => {
                tracing::warn!(subject, error = %err, "news store range query failed");
                Outcome::fallback(Vec::new(), format!("news store failed: {err:#}"))
            }
        }
    }

    /// Stored items with `label`, topped up from fresh items when short of `limit`.
    async fn labeled_news(
        &self,
        subject: &str,
        label: SentimentLabel,
        limit: Option<usize>,
    ) -> Outcome<Vec<NewsItem>> {
        let limit = limit.unwrap_or(self.options.default_article_limit);

        let stored = match &self.store {
            Some(store) => match store.by_label(subject, label).await {
                Ok(items) => Outcome::computed(items),
                Err(err) => {
                    tracing::warn!(subject, %label, error = %err, "news store label query failed");
                    Outcome::fallback(Vec::new(), format!("news store failed: {err:#}"))
                }
            },
            None => Outcome::fallback(Vec::new(), NO_STORE),
        };

        let combined = if stored.value.len() < limit {
            let fresh = self
                .latest_news(subject, None)
                .await
                .map(|items| {
                    items
                        .into_iter()
                        .filter(|i| i.label() == label)
                        .collect::<Vec<_>>()
                });
            stored.zip(fresh).map(|(stored, fresh)| merge(stored, fresh))
        } else {
            stored
        };

        combined.map(|mut items| {
            items.truncate(limit);
            items
        })
    }
}

impl std::fmt::Debug for NewsAnalyticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsAnalyticsService")
            .field("provider", &self.provider.as_ref().map(|p| p.provider_name().to_string()))
            .field("store", &self.store.is_some())
            .field("options", &self.options)
            .finish()
    }
}
