use crate::domain::news::NewsItem;
use crate::domain::sentiment::SentimentLabel;
use serde::{Deserialize, Serialize};

/// Per-label item counts. All three labels are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub subject: String,
    /// Free-form window descriptor as the caller passed it, e.g. "24 hours".
    pub time_range: String,
    pub total_items: usize,
    pub sentiment_counts: SentimentCounts,
    pub average_compound: f64,
    /// Mean compound of the later half minus the earlier half; > 0 means improving.
    pub sentiment_trend_delta: f64,
    pub top_topics: Vec<String>,
    pub top_positive_items: Vec<NewsItem>,
    pub top_negative_items: Vec<NewsItem>,
}

impl AnalyticsSummary {
    pub fn empty(subject: impl Into<String>, time_range: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            time_range: time_range.into(),
            total_items: 0,
            sentiment_counts: SentimentCounts::default(),
            average_compound: 0.0,
            sentiment_trend_delta: 0.0,
            top_topics: Vec::new(),
            top_positive_items: Vec::new(),
            top_negative_items: Vec::new(),
        }
    }
}

/// Summary plus the provider's free-text take on recent events and the short-term trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
    pub market_moving_events: String,
    pub trend_forecast: String,
}
