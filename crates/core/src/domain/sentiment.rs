use serde::{Deserialize, Serialize};

/// Compound scores at or beyond this magnitude leave the neutral band.
pub const LABEL_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn from_compound(compound: f64) -> Self {
        if compound >= LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => anyhow::bail!("unknown sentiment label: {other}"),
        }
    }
}

/// Four-valued lexicon score. Fields are private so a score can only come out of
/// [`SentimentScore::from_sums`]; deserialization reads `positive` and `negative` only
/// and rebuilds the rest through it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SentimentScoreFields")]
pub struct SentimentScore {
    positive: f64,
    negative: f64,
    neutral: f64,
    compound: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SentimentScoreFields {
    #[serde(default)]
    positive: f64,
    #[serde(default)]
    negative: f64,
}

impl From<SentimentScoreFields> for SentimentScore {
    fn from(f: SentimentScoreFields) -> Self {
        SentimentScore::from_sums(f.positive, f.negative)
    }
}

impl SentimentScore {
    /// Score of empty or sentiment-free text.
    pub const NEUTRAL: SentimentScore = SentimentScore {
        positive: 0.0,
        negative: 0.0,
        neutral: 1.0,
        compound: 0.0,
    };

    /// Builds a score from normalized positive/negative mass.
    ///
    /// Both inputs are clamped into `[0, 1]`; `neutral` and `compound` are derived
    /// from them, so every invariant of the type holds regardless of the caller.
    pub fn from_sums(positive: f64, negative: f64) -> Self {
        let positive = clamp_unit(positive);
        let negative = clamp_unit(negative);
        let neutral = (1.0 - positive - negative).max(0.0);
        let compound = (positive - negative).clamp(-1.0, 1.0);
        Self {
            positive,
            negative,
            neutral,
            compound,
        }
    }

    pub fn positive(&self) -> f64 {
        self.positive
    }

    pub fn negative(&self) -> f64 {
        self.negative
    }

    pub fn neutral(&self) -> f64 {
        self.neutral
    }

    pub fn compound(&self) -> f64 {
        self.compound
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_compound(self.compound)
    }
}

impl Default for SentimentScore {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds_are_inclusive() {
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(-0.049), SentimentLabel::Neutral);
    }

    #[test]
    fn from_sums_derives_neutral_and_compound() {
        let s = SentimentScore::from_sums(0.3, 0.1);
        assert!((s.neutral() - 0.6).abs() < 1e-9);
        assert!((s.compound() - 0.2).abs() < 1e-9);
        assert_eq!(s.label(), SentimentLabel::Positive);
    }

    #[test]
    fn from_sums_clamps_out_of_range_mass() {
        let s = SentimentScore::from_sums(1.7, -0.2);
        assert_eq!(s.positive(), 1.0);
        assert_eq!(s.negative(), 0.0);
        assert_eq!(s.neutral(), 0.0);
        assert_eq!(s.compound(), 1.0);
    }

    #[test]
    fn deserialization_rederives_neutral_and_compound() {
        let s: SentimentScore = serde_json::from_str(
            r#"{"positive":-3.0,"negative":0.0,"neutral":1.0,"compound":5.0}"#,
        )
        .unwrap();
        assert_eq!(s, SentimentScore::NEUTRAL);
        assert_eq!(s.label(), SentimentLabel::Neutral);

        let s: SentimentScore =
            serde_json::from_str(r#"{"positive":0.1,"negative":0.4,"neutral":0.0,"compound":0.9}"#)
                .unwrap();
        assert!((s.neutral() - 0.5).abs() < 1e-9);
        assert!((s.compound() + 0.3).abs() < 1e-9);
        assert_eq!(s.label(), SentimentLabel::Negative);
    }

    #[test]
    fn serialized_score_reads_back_unchanged() {
        let s = SentimentScore::from_sums(0.25, 0.05);
        let back: SentimentScore = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn label_round_trips_through_str() {
        for label in SentimentLabel::ALL {
            assert_eq!(label.as_str().parse::<SentimentLabel>().unwrap(), label);
        }
        assert!("bullish".parse::<SentimentLabel>().is_err());
    }
}
