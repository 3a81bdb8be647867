use crate::analytics::group::group_by_label;
use crate::analytics::topics::{extract_topics, DEFAULT_TOPIC_LIMIT};
use crate::domain::analytics::{AnalyticsSummary, SentimentCounts};
use crate::domain::news::NewsItem;
use std::cmp::Ordering;

pub const DEFAULT_TOP_ITEMS_LIMIT: usize = 3;

/// Builds [`AnalyticsSummary`] values. Limits are fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    pub top_items_limit: usize,
    pub topic_limit: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            top_items_limit: DEFAULT_TOP_ITEMS_LIMIT,
            topic_limit: DEFAULT_TOPIC_LIMIT,
        }
    }
}

/// [`Aggregator::aggregate`] with default limits.
pub fn aggregate(items: &[NewsItem], subject: &str, window: &str) -> AnalyticsSummary {
    Aggregator::default().aggregate(items, subject, window)
}

impl Aggregator {
    pub fn aggregate(&self, items: &[NewsItem], subject: &str, window: &str) -> AnalyticsSummary {
        if items.is_empty() {
            return AnalyticsSummary::empty(subject, window);
        }

        let groups = group_by_label(items);
        let sentiment_counts = SentimentCounts {
            positive: groups.positive.len(),
            negative: groups.negative.len(),
            neutral: groups.neutral.len(),
        };

        let top_positive_items = top_by_compound(&groups.positive, self.top_items_limit, |a, b| {
            b.total_cmp(&a)
        });
        let top_negative_items = top_by_compound(&groups.negative, self.top_items_limit, |a, b| {
            a.total_cmp(&b)
        });

        AnalyticsSummary {
            subject: subject.to_string(),
            time_range: window.to_string(),
            total_items: items.len(),
            sentiment_counts,
            average_compound: average_compound(items),
            sentiment_trend_delta: trend_delta(items),
            top_topics: extract_topics(items, self.topic_limit),
            top_positive_items,
            top_negative_items,
        }
    }
}

/// Mean compound over scored items; 0.0 when nothing is scored.
pub fn average_compound(items: &[NewsItem]) -> f64 {
    mean(items.iter().filter_map(NewsItem::compound))
}

/// Later-half mean minus earlier-half mean of compound scores, in publish order.
///
/// Only scored items take part. The split index is `n / 2`, so with an odd count
/// the middle item belongs to the later half. Fewer than two scored items give 0.0.
pub fn trend_delta(items: &[NewsItem]) -> f64 {
    let mut scored: Vec<(chrono::DateTime<chrono::Utc>, f64)> = items
        .iter()
        .filter_map(|i| i.compound().map(|c| (i.published_at(), c)))
        .collect();
    if scored.len() < 2 {
        return 0.0;
    }

    // Stable: equal timestamps keep input order.
    scored.sort_by_key(|(at, _)| *at);

    let mid = scored.len() / 2;
    let first = mean(scored[..mid].iter().map(|(_, c)| *c));
    let second = mean(scored[mid..].iter().map(|(_, c)| *c));
    second - first
}

fn top_by_compound(
    bucket: &[&NewsItem],
    limit: usize,
    order: impl Fn(f64, f64) -> Ordering,
) -> Vec<NewsItem> {
    let mut sorted: Vec<&NewsItem> = bucket.to_vec();
    sorted.sort_by(|a, b| {
        order(
            a.compound().unwrap_or(0.0),
            b.compound().unwrap_or(0.0),
        )
    });
    sorted.into_iter().take(limit).cloned().collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
