use serde::{Deserialize, Serialize};

/// How a value handed back by the analytics service was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Computed,
    /// Some collaborator failed (or is not configured) and defaults filled the gap.
    Fallback { reason: String },
}

/// A value plus whether it was computed normally or assembled from fallback defaults.
///
/// This lets callers tell "no news in the window" apart from "the news provider was down".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl<T> Outcome<T> {
    pub fn computed(value: T) -> Self {
        Self {
            value,
            status: OutcomeStatus::Computed,
        }
    }

    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            status: OutcomeStatus::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.status, OutcomeStatus::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Computed => None,
            OutcomeStatus::Fallback { reason } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            status: self.status,
        }
    }

    /// Carries this outcome's status over to a new value, keeping the first fallback reason.
    pub fn and_status<U>(self, other: Outcome<U>) -> Outcome<U> {
        match self.status {
            OutcomeStatus::Computed => other,
            fallback => Outcome {
                value: other.value,
                status: fallback,
            },
        }
    }

    /// Pairs two outcomes. The pair is a fallback if either side is; the first reason wins.
    pub fn zip<U>(self, other: Outcome<U>) -> Outcome<(T, U)> {
        let Outcome { value, status } = self;
        let paired = other.map(|o| (value, o));
        Outcome { value: (), status }.and_status(paired)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_status_inline() {
        let ok = Outcome::computed(1);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"value": 1, "status": "computed"})
        );

        let fb = Outcome::fallback(0, "provider unavailable");
        assert_eq!(
            serde_json::to_value(&fb).unwrap(),
            json!({"value": 0, "status": "fallback", "reason": "provider unavailable"})
        );
    }

    #[test]
    fn and_status_keeps_first_fallback() {
        let first: Outcome<()> = Outcome::fallback((), "store down");
        let second = Outcome::fallback(5, "provider down");
        let merged = first.and_status(second);
        assert_eq!(merged.value, 5);
        assert_eq!(merged.fallback_reason(), Some("store down"));

        let merged = Outcome::computed(()).and_status(Outcome::computed(7));
        assert!(!merged.is_fallback());
    }

    #[test]
    fn zip_marks_pair_as_fallback_when_either_side_is() {
        let pair = Outcome::computed(1).zip(Outcome::fallback("x", "store down"));
        assert_eq!(pair.value, (1, "x"));
        assert_eq!(pair.fallback_reason(), Some("store down"));

        let pair = Outcome::fallback(1, "provider down").zip(Outcome::fallback(2, "store down"));
        assert_eq!(pair.fallback_reason(), Some("provider down"));

        assert!(!Outcome::computed(1).zip(Outcome::computed(2)).is_fallback());
    }
}
