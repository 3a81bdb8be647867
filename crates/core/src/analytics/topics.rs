use crate::domain::news::NewsItem;
use std::collections::HashMap;

pub const DEFAULT_TOPIC_LIMIT: usize = 10;

/// Tokens this short never count as topics.
const MIN_TOPIC_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "have", "will", "from", "they", "been", "their", "said", "each",
    "which", "would", "there", "what", "about",
];

/// Most frequent words across titles and descriptions, most frequent first.
///
/// Case-insensitive; ties keep first-seen order.
pub fn extract_topics(items: &[NewsItem], limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut next_seen = 0usize;

    for item in items {
        let content = format!("{} {}", item.title(), item.description()).to_lowercase();
        for word in content.split(|c: char| !c.is_ascii_alphanumeric()) {
            if word.len() < MIN_TOPIC_LEN || STOP_WORDS.contains(&word) {
                continue;
            }
            let entry = counts.entry(word.to_string()).or_insert_with(|| {
                next_seen += 1;
                (0, next_seen)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first_seen))| (word, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _, _)| word)
        .collect()
}
