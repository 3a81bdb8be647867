//! Term weights and modifier sets used by the scorer.
//!
//! Weights are stored as magnitudes in `[0, 1]`; the negative vocabularies are
//! negated on lookup. The built-in vocabulary can be replaced by a JSON asset
//! (see [`LexiconAsset`]) without changing lookup semantics.

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

const GENERAL_POSITIVE: &[(&str, f64)] = &[
    ("good", 0.5),
    ("great", 0.7),
    ("excellent", 0.8),
    ("positive", 0.6),
    ("strong", 0.6),
    ("success", 0.7),
    ("profit", 0.7),
    ("growth", 0.6),
    ("increase", 0.5),
    ("rising", 0.6),
    ("surge", 0.8),
    ("boom", 0.8),
    ("promising", 0.6),
    ("optimistic", 0.7),
];

const GENERAL_NEGATIVE: &[(&str, f64)] = &[
    ("bad", 0.5),
    ("terrible", 0.8),
    ("negative", 0.6),
    ("weak", 0.6),
    ("failure", 0.7),
    ("loss", 0.7),
    ("decline", 0.6),
    ("falling", 0.6),
    ("drop", 0.6),
    ("crash", 0.9),
    ("risk", 0.5),
    ("volatile", 0.6),
    ("fear", 0.7),
    ("panic", 0.8),
];

const DOMAIN_POSITIVE: &[(&str, f64)] = &[
    ("moon", 0.9),
    ("lambo", 0.8),
    ("hodl", 0.7),
    ("pump", 0.8),
    ("bullish", 0.8),
    ("rally", 0.7),
    ("ath", 0.8),
    ("adoption", 0.7),
    ("partnership", 0.6),
    ("upgrade", 0.6),
    ("staking", 0.5),
    ("defi", 0.6),
];

const DOMAIN_NEGATIVE: &[(&str, f64)] = &[
    ("dump", 0.8),
    ("bearish", 0.8),
    ("rekt", 0.9),
    ("fud", 0.8),
    ("sell", 0.5),
    ("correction", 0.6),
    ("dip", 0.5),
    ("rug", 0.9),
    ("scam", 0.9),
    ("hack", 0.8),
    ("regulation", 0.6),
    ("ban", 0.8),
];

const INTENSIFIERS: &[&str] = &[
    "very",
    "extremely",
    "highly",
    "super",
    "really",
    "massively",
    "significantly",
];

const NEGATORS: &[&str] = &["not", "no", "never", "none", "without"];

/// On-disk shape of a lexicon. Every field is optional; missing vocabularies are empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconAsset {
    pub domain_positive: BTreeMap<String, f64>,
    pub domain_negative: BTreeMap<String, f64>,
    pub general_positive: BTreeMap<String, f64>,
    pub general_negative: BTreeMap<String, f64>,
    pub intensifiers: Vec<String>,
    pub negators: Vec<String>,
}

/// Immutable vocabulary. Build once, share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Lexicon {
    domain_positive: HashMap<String, f64>,
    domain_negative: HashMap<String, f64>,
    general_positive: HashMap<String, f64>,
    general_negative: HashMap<String, f64>,
    intensifiers: HashSet<String>,
    negators: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    pub fn builtin() -> Self {
        fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
            pairs.iter().map(|(w, v)| (w.to_string(), *v)).collect()
        }
        fn tokens(words: &[&str]) -> HashSet<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            domain_positive: weights(DOMAIN_POSITIVE),
            domain_negative: weights(DOMAIN_NEGATIVE),
            general_positive: weights(GENERAL_POSITIVE),
            general_negative: weights(GENERAL_NEGATIVE),
            intensifiers: tokens(INTENSIFIERS),
            negators: tokens(NEGATORS),
        }
    }

    pub fn from_asset(asset: LexiconAsset) -> anyhow::Result<Self> {
        fn weights(name: &str, m: BTreeMap<String, f64>) -> anyhow::Result<HashMap<String, f64>> {
            let mut out = HashMap::with_capacity(m.len());
            for (word, weight) in m {
                ensure!(
                    weight.is_finite() && (0.0..=1.0).contains(&weight),
                    "{name}: weight for {word:?} must be within [0, 1] (got {weight})"
                );
                let word = word.trim().to_lowercase();
                ensure!(!word.is_empty(), "{name}: empty term");
                out.insert(word, weight);
            }
            Ok(out)
        }
        fn tokens(words: Vec<String>) -> HashSet<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }

        let intensifiers = tokens(asset.intensifiers);
        let negators = tokens(asset.negators);
        if let Some(both) = intensifiers.intersection(&negators).next() {
            anyhow::bail!("token {both:?} is listed as both intensifier and negator");
        }

        Ok(Self {
            domain_positive: weights("domain_positive", asset.domain_positive)?,
            domain_negative: weights("domain_negative", asset.domain_negative)?,
            general_positive: weights("general_positive", asset.general_positive)?,
            general_negative: weights("general_negative", asset.general_negative)?,
            intensifiers,
            negators,
        })
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let asset = serde_json::from_str::<LexiconAsset>(json)
            .context("lexicon asset is not valid JSON")?;
        Self::from_asset(asset)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lexicon asset {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("invalid lexicon asset {}", path.display()))
    }

    /// Loads `LEXICON_PATH` when configured, the built-in vocabulary otherwise.
    pub fn from_settings(settings: &crate::config::Settings) -> anyhow::Result<Self> {
        match settings.lexicon_path.as_deref() {
            Some(path) => {
                let lexicon = Self::from_path(path)?;
                tracing::info!(path, terms = lexicon.len(), "loaded lexicon asset");
                Ok(lexicon)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Signed weight of a normalized word.
    ///
    /// Precedence: domain-positive, domain-negative, general-positive, general-negative.
    pub fn weight(&self, word: &str) -> Option<f64> {
        if let Some(w) = self.domain_positive.get(word) {
            return Some(*w);
        }
        if let Some(w) = self.domain_negative.get(word) {
            return Some(-*w);
        }
        if let Some(w) = self.general_positive.get(word) {
            return Some(*w);
        }
        self.general_negative.get(word).map(|w| -*w)
    }

    pub fn is_intensifier(&self, word: &str) -> bool {
        self.intensifiers.contains(word)
    }

    pub fn is_negator(&self, word: &str) -> bool {
        self.negators.contains(word)
    }

    /// Number of weighted terms across all four vocabularies.
    pub fn len(&self) -> usize {
        self.domain_positive.len()
            + self.domain_negative.len()
            + self.general_positive.len()
            + self.general_negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
