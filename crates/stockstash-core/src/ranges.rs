//! Missing-range calculation over a set of already cached dates.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default minimum width, in days, for a gap to be treated as missing data.
///
/// Daily financial series routinely skip two or three days for weekends
/// and holidays; re-fetching for every such gap would defeat the cache.
/// The threshold is calendar-agnostic, not a trading-day check.
pub const DEFAULT_MIN_GAP_DAYS: i64 = 5;

/// A contiguous date range, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
}

impl Interval {
    /// Creates an interval. Callers must uphold `start <= end`.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days covered, inclusive.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Computes the sub-ranges of `[start, end]` not covered by `dates`.
///
/// `dates` need not be sorted or distinct. Candidate gaps narrower than
/// `min_gap_days` are dropped so ordinary non-trading stretches do not
/// trigger a fetch; with no cached dates at all, the full range is
/// returned regardless of the threshold. The result is in ascending
/// order, non-overlapping, and every interval satisfies `start <= end`.
///
/// Callers must uphold `start <= end` and `min_gap_days >= 1`.
#[must_use]
pub fn missing_ranges(
    dates: &[NaiveDate],
    start: NaiveDate,
    end: NaiveDate,
    min_gap_days: i64,
) -> Vec<Interval> {
    if dates.is_empty() {
        return vec![Interval::new(start, end)];
    }

    let mut dates = dates.to_vec();
    dates.sort_unstable();

    let one_day = Duration::days(1);
    let mut missing = Vec::new();

    // Before cached data
    let first = dates[0];
    if start < first {
        let gap = Interval::new(start, first - one_day);
        if gap.len_days() >= min_gap_days {
            missing.push(gap);
        }
    }

    // Gaps inside cached data
    for pair in dates.windows(2) {
        let gap = Interval::new(pair[0] + one_day, pair[1] - one_day);
        if gap.start <= gap.end && gap.len_days() >= min_gap_days {
            missing.push(gap);
        }
    }

    // After cached data
    let last = dates[dates.len() - 1];
    if end > last {
        let gap = Interval::new(last + one_day, end);
        if gap.len_days() >= min_gap_days {
            missing.push(gap);
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn days(from: &str, to: &str) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut current = d(from);
        while current <= d(to) {
            out.push(current);
            current += Duration::days(1);
        }
        out
    }

    #[test]
    fn test_empty_dates_returns_full_range() {
        let missing = missing_ranges(&[], d("2025-01-01"), d("2025-01-10"), 5);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-01-01"), d("2025-01-10"))]
        );
    }

    #[test]
    fn test_empty_dates_ignores_threshold() {
        // A single-day request with nothing cached is still fetched.
        let missing = missing_ranges(&[], d("2025-01-01"), d("2025-01-01"), 5);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-01-01"), d("2025-01-01"))]
        );
    }

    #[test]
    fn test_full_coverage_has_no_gaps() {
        let dates = days("2025-01-01", "2025-01-31");
        let missing = missing_ranges(&dates, d("2025-01-05"), d("2025-01-20"), 5);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_trailing_gap() {
        // Cached June, request through late August: exactly one trailing gap.
        let dates = days("2025-06-01", "2025-06-29");
        let missing = missing_ranges(&dates, d("2025-06-01"), d("2025-08-29"), 5);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-06-30"), d("2025-08-29"))]
        );
    }

    #[test]
    fn test_leading_gap() {
        let dates = days("2025-06-01", "2025-06-29");
        let missing = missing_ranges(&dates, d("2025-05-01"), d("2025-06-29"), 5);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-05-01"), d("2025-05-31"))]
        );
    }

    #[test]
    fn test_interior_gap() {
        let mut dates = days("2025-01-01", "2025-01-10");
        dates.extend(days("2025-01-20", "2025-01-31"));
        let missing = missing_ranges(&dates, d("2025-01-01"), d("2025-01-31"), 5);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-01-11"), d("2025-01-19"))]
        );
    }

    #[test]
    fn test_weekend_sized_gaps_are_ignored() {
        // Two business weeks with the weekend missing in between.
        let mut dates = days("2025-06-02", "2025-06-06");
        dates.extend(days("2025-06-09", "2025-06-13"));
        let missing = missing_ranges(&dates, d("2025-06-02"), d("2025-06-13"), 5);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_sub_threshold_gap_not_fetched() {
        let dates = vec![d("2025-01-01"), d("2025-01-03")];
        let missing = missing_ranges(&dates, d("2025-01-01"), d("2025-01-03"), 5);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_min_gap_of_one_keeps_single_day() {
        let dates = vec![d("2025-01-01"), d("2025-01-03")];
        let missing = missing_ranges(&dates, d("2025-01-01"), d("2025-01-03"), 1);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-01-02"), d("2025-01-02"))]
        );
    }

    #[test]
    fn test_gaps_are_ascending_and_disjoint() {
        let dates = vec![d("2025-03-01"), d("2025-06-01")];
        let missing = missing_ranges(&dates, d("2025-01-01"), d("2025-09-01"), 5);
        assert_eq!(
            missing,
            vec![
                Interval::new(d("2025-01-01"), d("2025-02-28")),
                Interval::new(d("2025-03-02"), d("2025-05-31")),
                Interval::new(d("2025-06-02"), d("2025-09-01")),
            ]
        );
        for pair in missing.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_unsorted_and_duplicate_input() {
        let dates = vec![d("2025-01-20"), d("2025-01-01"), d("2025-01-01")];
        let missing = missing_ranges(&dates, d("2025-01-01"), d("2025-01-20"), 5);
        assert_eq!(
            missing,
            vec![Interval::new(d("2025-01-02"), d("2025-01-19"))]
        );
    }

    #[test]
    fn test_interval_len_days() {
        assert_eq!(Interval::new(d("2025-01-01"), d("2025-01-01")).len_days(), 1);
        assert_eq!(Interval::new(d("2025-01-01"), d("2025-01-07")).len_days(), 7);
    }
}
