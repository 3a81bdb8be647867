use chrono::{DateTime, TimeZone, Utc};
use coinpulse_core::analytics::{aggregate, extract_topics, group_by_label, merge};
use coinpulse_core::domain::analytics::AnalyticsSummary;
use coinpulse_core::domain::news::NewsItem;
use coinpulse_core::domain::sentiment::SentimentScore;
use coinpulse_core::sentiment::SentimentScorer;
use coinpulse_core::time::Lookback;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashSet;

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap()
}

fn item(title: &str, h: u32, compound: Option<f64>) -> NewsItem {
    let score = compound.map(|c| {
        if c >= 0.0 {
            SentimentScore::from_sums(c, 0.0)
        } else {
            SentimentScore::from_sums(0.0, -c)
        }
    });
    NewsItem::new(title, "", "BTC", at(h), "test", None).with_sentiment(score)
}

fn identities(items: &[NewsItem]) -> HashSet<(String, String)> {
    items
        .iter()
        .map(|i| (i.title().to_string(), i.subject().to_string()))
        .collect()
}

#[rstest]
#[case("Bitcoin to the moon! Extremely bullish rally")]
#[case("not bad, not good, never a crash")]
#[case("rekt rekt rekt scam rug dump")]
#[case("@whale says #BTC https://x.example/a very very very good")]
#[case("ünïcödé ∑ 1234 --- ...")]
fn scores_stay_in_range(#[case] text: &str) {
    let s = SentimentScorer::default().score(text);
    assert!(s.positive() >= 0.0 && s.positive() <= 1.0);
    assert!(s.negative() >= 0.0 && s.negative() <= 1.0);
    assert!(s.neutral() >= 0.0 && s.neutral() <= 1.0);
    assert!((-1.0..=1.0).contains(&s.compound()));
}

#[test]
fn blank_text_is_neutral() {
    let scorer = SentimentScorer::default();
    assert_eq!(scorer.score(""), SentimentScore::NEUTRAL);
    assert_eq!(scorer.score("   "), SentimentScore::NEUTRAL);
    assert_eq!(scorer.score("").neutral(), 1.0);
}

#[test]
fn negation_flips_polarity() {
    let scorer = SentimentScorer::default();
    assert!(scorer.score("good").compound() > 0.0);
    assert!(scorer.score("not good").compound() <= 0.0);
}

#[test]
fn intensifier_amplifies() {
    let scorer = SentimentScorer::default();
    assert!(scorer.score("very bad").negative() >= scorer.score("the bad").negative());
}

#[test]
fn merge_identity_sets_are_order_independent() {
    let a = vec![item("x", 1, None), item("y", 2, Some(0.5))];
    let b = vec![item("y", 3, Some(-0.5)), item("z", 4, None)];

    let ab = merge(a.clone(), b.clone());
    let ba = merge(b, a.clone());
    assert_eq!(identities(&ab), identities(&ba));

    let aa = merge(a.clone(), a.clone());
    assert_eq!(identities(&aa), identities(&a));
    assert_eq!(aa.len(), a.len());
}

#[test]
fn empty_aggregate_is_all_zero() {
    let s = aggregate(&[], "ETH", "7 days");
    assert_eq!(s, AnalyticsSummary::empty("ETH", "7 days"));
    assert_eq!(s.sentiment_counts.total(), 0);
    assert_eq!(s.average_compound, 0.0);
    assert_eq!(s.sentiment_trend_delta, 0.0);
    assert!(s.top_topics.is_empty());
}

#[test]
fn counts_sum_to_total() {
    let items = vec![
        item("a", 1, Some(0.7)),
        item("b", 2, Some(-0.2)),
        item("c", 3, Some(0.01)),
        item("d", 4, None),
        item("e", 5, Some(-0.9)),
    ];
    let s = aggregate(&items, "BTC", "24 hours");
    assert_eq!(s.sentiment_counts.total(), s.total_items);

    let groups = group_by_label(&items);
    assert_eq!(
        groups.positive.len() + groups.negative.len() + groups.neutral.len(),
        items.len()
    );
}

#[test]
fn improving_sequence_has_positive_trend() {
    let items = vec![
        item("a", 1, Some(-0.8)),
        item("b", 2, Some(-0.6)),
        item("c", 3, Some(0.6)),
        item("d", 4, Some(0.8)),
    ];
    assert!(aggregate(&items, "BTC", "24 hours").sentiment_trend_delta > 0.0);
}

#[rstest]
#[case("3 days", Lookback::Days(3))]
#[case("48 hours", Lookback::Hours(48))]
#[case("soon", Lookback::Hours(24))]
fn window_descriptors(#[case] descriptor: &str, #[case] expected: Lookback) {
    assert_eq!(Lookback::parse(Some(descriptor), 24), expected);
}

#[test]
fn topics_are_case_insensitive_and_filtered() {
    let items = vec![
        NewsItem::new("Bitcoin ETF news", "the ETF said bitcoin will rally", "BTC", at(1), "t", None),
        NewsItem::new("BITCOIN miners", "", "BTC", at(2), "t", None),
    ];
    let topics = extract_topics(&items, 10);
    assert_eq!(topics.first().map(String::as_str), Some("bitcoin"));
    assert!(topics.iter().all(|t| t.len() > 3));
    assert!(!topics.iter().any(|t| t == "said" || t == "will"));
    assert!(!topics.iter().any(|t| t.chars().any(|c| c.is_uppercase())));
}
