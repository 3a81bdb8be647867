use chrono::{DateTime, Duration, Months, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const DEFAULT_WINDOW_HOURS: u32 = 24;

static FIRST_INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("static integer regex"));

/// Relative lookback parsed from descriptors like "24 hours", "3 days", "last week".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "lowercase")]
pub enum Lookback {
    Hours(u32),
    Days(u32),
    Weeks(u32),
    Months(u32),
}

impl Lookback {
    /// Heuristic parse; never fails.
    ///
    /// The unit is picked by substring in the order hour, day, week, month. The
    /// magnitude is the first integer literal in the string, or 1 when there is none.
    /// Empty, absent or unit-less descriptors mean `default_hours` hours.
    pub fn parse(descriptor: Option<&str>, default_hours: u32) -> Self {
        let Some(raw) = descriptor.map(str::trim).filter(|s| !s.is_empty()) else {
            return Lookback::Hours(default_hours);
        };

        let lower = raw.to_lowercase();
        let unit: fn(u32) -> Lookback = if lower.contains("hour") {
            Lookback::Hours
        } else if lower.contains("day") {
            Lookback::Days
        } else if lower.contains("week") {
            Lookback::Weeks
        } else if lower.contains("month") {
            Lookback::Months
        } else {
            tracing::debug!(descriptor = raw, default_hours, "unrecognized window; using default");
            return Lookback::Hours(default_hours);
        };

        unit(first_integer(&lower).unwrap_or(1))
    }

    /// Start of the lookback ending at `now`. Saturates at the earliest representable instant.
    pub fn start_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start = match *self {
            Lookback::Hours(n) => now.checked_sub_signed(Duration::hours(i64::from(n))),
            Lookback::Days(n) => now.checked_sub_signed(Duration::days(i64::from(n))),
            Lookback::Weeks(n) => now.checked_sub_signed(Duration::weeks(i64::from(n))),
            Lookback::Months(n) => now.checked_sub_months(Months::new(n)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn window_ending(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: self.start_before(now),
            end: now,
        }
    }
}

/// Closed interval `[start, end]` of publish times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

fn first_integer(s: &str) -> Option<u32> {
    let m = FIRST_INTEGER_RE.find(s)?;
    // Digit runs too large for u32 mean "as far back as possible".
    Some(m.as_str().parse::<u32>().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("24 hours", Lookback::Hours(24))]
    #[case("48 hours", Lookback::Hours(48))]
    #[case("3 days", Lookback::Days(3))]
    #[case("2 weeks", Lookback::Weeks(2))]
    #[case("6 Months", Lookback::Months(6))]
    #[case("last hour", Lookback::Hours(1))]
    #[case("past week", Lookback::Weeks(1))]
    #[case("7days", Lookback::Days(7))]
    #[case("hours and days: 5", Lookback::Hours(5))]
    #[case("soon", Lookback::Hours(DEFAULT_WINDOW_HOURS))]
    #[case("   ", Lookback::Hours(DEFAULT_WINDOW_HOURS))]
    #[case("", Lookback::Hours(DEFAULT_WINDOW_HOURS))]
    fn parses_descriptors(#[case] input: &str, #[case] expected: Lookback) {
        assert_eq!(Lookback::parse(Some(input), DEFAULT_WINDOW_HOURS), expected);
    }

    #[test]
    fn absent_descriptor_uses_configured_default() {
        assert_eq!(Lookback::parse(None, 12), Lookback::Hours(12));
        assert_eq!(Lookback::parse(Some("whenever"), 72), Lookback::Hours(72));
    }

    #[test]
    fn start_before_subtracts_calendar_units() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(
            Lookback::Days(3).start_before(now),
            Utc.with_ymd_and_hms(2026, 3, 28, 12, 0, 0).unwrap()
        );
        assert_eq!(
            Lookback::Hours(48).start_before(now),
            Utc.with_ymd_and_hms(2026, 3, 29, 12, 0, 0).unwrap()
        );
        // Month arithmetic clamps to the last day of the shorter month.
        assert_eq!(
            Lookback::Months(1).start_before(now),
            Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn huge_magnitudes_saturate() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let lb = Lookback::parse(Some("99999999999999 months"), DEFAULT_WINDOW_HOURS);
        assert_eq!(lb, Lookback::Months(u32::MAX));
        assert_eq!(lb.start_before(now), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let w = Lookback::Hours(1).window_ending(now);
        assert!(w.contains(now));
        assert!(w.contains(w.start));
        assert!(!w.contains(w.start - Duration::seconds(1)));
    }
}
