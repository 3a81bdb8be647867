use crate::domain::sentiment::SentimentScore;
use crate::sentiment::lexicon::Lexicon;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Multiplier applied to a weighted word that directly follows an intensifier.
pub const INTENSIFIER_MULTIPLIER: f64 = 1.5;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][a-z0-9+.\-]*://\S+").expect("static url regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\w\-]+").expect("static mention regex"));
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\w\-]+").expect("static hashtag regex"));
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s\-]").expect("static charset regex"));

/// Lexicon scorer with one-token lookbehind for intensifiers and negators.
///
/// Stateless apart from the shared lexicon, so clones are cheap and can be used
/// from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: Arc<Lexicon>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::builtin()))
    }
}

impl SentimentScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        if text.trim().is_empty() {
            return SentimentScore::NEUTRAL;
        }

        let words = tokenize(text);

        let mut positive = 0.0;
        let mut negative = 0.0;

        for (i, word) in words.iter().enumerate() {
            let Some(weight) = self.lexicon.weight(word) else {
                continue;
            };

            let mut multiplier = 1.0;
            let mut negated = false;
            if let Some(prev) = i.checked_sub(1).map(|p| words[p].as_str()) {
                if self.lexicon.is_intensifier(prev) {
                    multiplier = INTENSIFIER_MULTIPLIER;
                }
                if self.lexicon.is_negator(prev) {
                    negated = true;
                }
            }

            let signed = (if negated { -weight } else { weight }) * multiplier;
            if signed > 0.0 {
                positive += signed;
            } else if signed < 0.0 {
                negative += signed.abs();
            }
        }

        let word_count = words.len().max(1) as f64;
        let score = SentimentScore::from_sums(
            (positive / word_count).min(1.0),
            (negative / word_count).min(1.0),
        );

        tracing::debug!(
            words = words.len(),
            compound = score.compound(),
            "scored text"
        );
        score
    }
}

/// Lower-cases, strips URLs, mentions and hashtags, and reduces the text to
/// `[a-z0-9-]` words separated by single spaces.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = URL_RE.replace_all(&lower, " ");
    let stripped = MENTION_RE.replace_all(&stripped, " ");
    let stripped = HASHTAG_RE.replace_all(&stripped, " ");
    let cleaned = DISALLOWED_RE.replace_all(&stripped, " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scorer() -> SentimentScorer {
        SentimentScorer::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(
            normalize("Check https://x.com/a?b=1 @whale_alert #BTC ¡BIG news!!"),
            "check big news"
        );
        assert_eq!(normalize("  Layer-2   scaling\t\n"), "layer-2 scaling");
        assert_eq!(normalize("café"), "caf");
    }

    #[test]
    fn blank_text_is_fully_neutral() {
        assert_eq!(scorer().score(""), SentimentScore::NEUTRAL);
        assert_eq!(scorer().score(" \t\n "), SentimentScore::NEUTRAL);
    }

    #[test]
    fn text_with_no_words_after_normalization_is_neutral() {
        assert_eq!(scorer().score("!!! ???"), SentimentScore::NEUTRAL);
    }

    #[test]
    fn single_word_weight_is_divided_by_word_count() {
        let s = scorer().score("bitcoin looks good");
        assert!(approx(s.positive(), 0.5 / 3.0));
        assert!(approx(s.negative(), 0.0));
        assert!(approx(s.neutral(), 1.0 - 0.5 / 3.0));
        assert!(approx(s.compound(), 0.5 / 3.0));
    }

    #[test]
    fn negator_flips_the_next_word_only() {
        let s = scorer().score("not good");
        assert!(approx(s.positive(), 0.0));
        assert!(approx(s.negative(), 0.25));
        assert!(s.compound() < 0.0);

        // "not" two tokens back has no effect.
        let s = scorer().score("not really good");
        assert!(s.compound() > 0.0);
    }

    #[test]
    fn intensifier_amplifies_the_next_word() {
        let s = scorer().score("very bad");
        assert!(approx(s.negative(), 0.75 / 2.0));
        let baseline = scorer().score("the bad");
        assert!(s.negative() > baseline.negative());
    }

    #[test]
    fn domain_terms_score_like_general_ones() {
        let s = scorer().score("rug");
        assert!(approx(s.negative(), 0.9));
        assert!(approx(s.compound(), -0.9));
    }

    #[test]
    fn per_side_mass_is_capped_at_one() {
        let s = scorer().score("very moon");
        // 0.9 * 1.5 / 2 = 0.675, under the cap
        assert!(approx(s.positive(), 0.675));
        let s = scorer().score("moon moon");
        assert!(s.positive() <= 1.0);
    }

    #[test]
    fn mixed_text_nets_out() {
        let s = scorer().score("rally then crash");
        assert!(approx(s.positive(), 0.7 / 3.0));
        assert!(approx(s.negative(), 0.9 / 3.0));
        assert!(s.compound() < 0.0);
    }

    #[test]
    fn non_ascii_input_never_panics() {
        let s = scorer().score("比特币 🚀🚀 очень хорошо");
        assert_eq!(s, SentimentScore::NEUTRAL);
    }
}
