use crate::domain::news::NewsItem;
use std::collections::HashSet;

/// Union of two item sets with duplicate `(title, subject)` identities collapsed.
///
/// The first occurrence wins, scanning `a` and then `b`, and the output keeps that
/// first-seen order.
pub fn merge(a: Vec<NewsItem>, b: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(a.len() + b.len());
    let mut out = Vec::with_capacity(a.len() + b.len());

    for item in a.into_iter().chain(b) {
        let (title, subject) = item.identity();
        if seen.insert((title.to_string(), subject.to_string())) {
            out.push(item);
        }
    }

    out
}
