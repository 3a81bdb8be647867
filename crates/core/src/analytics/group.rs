use crate::domain::news::NewsItem;
use crate::domain::sentiment::SentimentLabel;
use chrono::{DateTime, Utc};

/// Items whose publish time lies in `[start, end]`.
pub fn filter_by_window(
    items: Vec<NewsItem>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter(|i| start <= i.published_at() && i.published_at() <= end)
        .collect()
}

/// Exactly three buckets; unscored items land in `neutral`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelGroups<'a> {
    pub positive: Vec<&'a NewsItem>,
    pub negative: Vec<&'a NewsItem>,
    pub neutral: Vec<&'a NewsItem>,
}

impl<'a> LabelGroups<'a> {
    pub fn get(&self, label: SentimentLabel) -> &[&'a NewsItem] {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        }
    }
}

pub fn group_by_label(items: &[NewsItem]) -> LabelGroups<'_> {
    let mut groups = LabelGroups::default();
    for item in items {
        match item.label() {
            SentimentLabel::Positive => groups.positive.push(item),
            SentimentLabel::Negative => groups.negative.push(item),
            SentimentLabel::Neutral => groups.neutral.push(item),
        }
    }
    groups
}
