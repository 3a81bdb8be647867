use crate::domain::sentiment::{SentimentLabel, SentimentScore};
use crate::sentiment::SentimentScorer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Snippets longer than this get a shortened title; the full text stays in the description.
pub const SNIPPET_TITLE_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// A scored (or not-yet-scored) news snippet about one subject.
///
/// Title and description are length-bounded at construction, including when an item
/// is deserialized from an API payload or a stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NewsItemFields")]
pub struct NewsItem {
    title: String,
    description: String,
    subject: String,
    published_at: DateTime<Utc>,
    source: String,
    url: Option<String>,
    sentiment: Option<SentimentScore>,
}

#[derive(Debug, Clone, Deserialize)]
struct NewsItemFields {
    title: String,
    #[serde(default)]
    description: String,
    subject: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sentiment: Option<SentimentScore>,
}

impl From<NewsItemFields> for NewsItem {
    fn from(f: NewsItemFields) -> Self {
        NewsItem::new(f.title, f.description, f.subject, f.published_at, f.source, f.url)
            .with_sentiment(f.sentiment)
    }
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        subject: impl Into<String>,
        published_at: DateTime<Utc>,
        source: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            title: truncate_with_ellipsis(&title.into(), MAX_TITLE_CHARS),
            description: truncate_with_ellipsis(&description.into(), MAX_DESCRIPTION_CHARS),
            subject: subject.into(),
            published_at,
            source: source.into(),
            url,
            sentiment: None,
        }
    }

    /// Builds an item from one raw provider snippet and scores it right away.
    pub fn from_snippet(
        text: &str,
        subject: &str,
        source: &str,
        published_at: DateTime<Utc>,
        scorer: &SentimentScorer,
    ) -> Self {
        let text = text.trim();
        let title = truncate_with_ellipsis(text, SNIPPET_TITLE_CHARS);
        let score = scorer.score(text);

        NewsItem::new(
            title,
            text,
            subject,
            published_at,
            source,
            Some(subject_search_url(subject)),
        )
        .with_sentiment(Some(score))
    }

    pub fn with_sentiment(mut self, sentiment: Option<SentimentScore>) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn sentiment(&self) -> Option<&SentimentScore> {
        self.sentiment.as_ref()
    }

    /// Compound score, if the item has been scored.
    pub fn compound(&self) -> Option<f64> {
        self.sentiment.map(|s| s.compound())
    }

    /// Unscored items count as neutral.
    pub fn label(&self) -> SentimentLabel {
        self.sentiment
            .map(|s| s.label())
            .unwrap_or(SentimentLabel::Neutral)
    }

    /// Deduplication key: two items with equal title and subject are the same item.
    pub fn identity(&self) -> (&str, &str) {
        (&self.title, &self.subject)
    }
}

/// Keeps at most `max_chars` characters, replacing the tail with `...` when cut.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn subject_search_url(subject: &str) -> String {
    format!(
        "https://www.perplexity.ai/search?q={}+news",
        subject.trim().replace(' ', "+")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn long_title_is_truncated_with_marker() {
        let long = "x".repeat(MAX_TITLE_CHARS + 50);
        let item = NewsItem::new(long, "", "BTC", ts(), "test", None);
        assert_eq!(item.title().chars().count(), MAX_TITLE_CHARS);
        assert!(item.title().ends_with("..."));
    }

    #[test]
    fn short_fields_are_untouched() {
        let item = NewsItem::new("Bitcoin rallies", "desc", "BTC", ts(), "test", None);
        assert_eq!(item.title(), "Bitcoin rallies");
        assert_eq!(item.description(), "desc");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let s = "é".repeat(10);
        assert_eq!(truncate_with_ellipsis(&s, 10), s);
        let cut = truncate_with_ellipsis(&s, 5);
        assert_eq!(cut, "éé...");
    }

    #[test]
    fn deserialized_items_are_bounded_too() {
        let v = serde_json::json!({
            "title": "t",
            "description": "d".repeat(MAX_DESCRIPTION_CHARS + 1),
            "subject": "ETH",
            "published_at": ts(),
        });
        let item: NewsItem = serde_json::from_value(v).unwrap();
        assert_eq!(item.description().chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(item.sentiment().is_none());
        assert_eq!(item.label(), SentimentLabel::Neutral);
    }

    #[test]
    fn deserialized_sentiment_is_bounded_too() {
        let v = serde_json::json!({
            "title": "Bitcoin rally",
            "subject": "BTC",
            "published_at": ts(),
            "sentiment": {"positive": 7.0, "negative": -2.0, "neutral": 3.0, "compound": 5.0},
        });
        let item: NewsItem = serde_json::from_value(v).unwrap();
        let s = item.sentiment().unwrap();
        assert_eq!(s.positive(), 1.0);
        assert_eq!(s.negative(), 0.0);
        assert_eq!(s.neutral(), 0.0);
        assert_eq!(item.compound(), Some(1.0));
        assert_eq!(item.label(), SentimentLabel::Positive);
    }

    #[test]
    fn snippet_items_are_scored_and_titled() {
        let scorer = SentimentScorer::default();
        let text = format!("Bitcoin rally continues {}", "and more ".repeat(20));
        let item = NewsItem::from_snippet(&text, "BTC", "provider", ts(), &scorer);
        assert!(item.sentiment().is_some());
        assert_eq!(item.title().chars().count(), SNIPPET_TITLE_CHARS);
        assert_eq!(item.description(), text.trim());
        assert_eq!(
            item.url(),
            Some("https://www.perplexity.ai/search?q=BTC+news")
        );
    }

    #[test]
    fn identity_ignores_other_fields() {
        let a = NewsItem::new("Same", "one", "BTC", ts(), "a", None);
        let b = NewsItem::new("Same", "two", "BTC", ts(), "b", Some("u".into()));
        assert_eq!(a.identity(), b.identity());
    }
}
