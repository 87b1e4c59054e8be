//! Cycle intervals and acceptance bands.
//!
//! An interval is the day count between two chronologically adjacent start
//! dates. Values outside a band are treated as missed-logging gaps.

use crate::domain::LogEntry;

/// Half-open day range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceBand {
    pub min: i64,
    pub max: i64,
}

impl AcceptanceBand {
    /// Used when building regressor features. Strictly between 15 and 90 days.
    pub const ESTIMATOR: AcceptanceBand = AcceptanceBand { min: 16, max: 90 };

    /// Used by the averaging fallback.
    pub const STATISTICAL: AcceptanceBand = AcceptanceBand { min: 20, max: 45 };

    pub fn contains(&self, days: i64) -> bool {
        days >= self.min && days < self.max
    }

    /// Intervals of `history` that fall inside this band, in chronological order.
    pub fn valid_intervals(&self, history: &[LogEntry]) -> Vec<i64> {
        cycle_intervals(history)
            .into_iter()
            .filter(|&d| self.contains(d))
            .collect()
    }
}

/// All adjacent-pair intervals. `history` must be sorted by `start_date`.
pub fn cycle_intervals(history: &[LogEntry]) -> Vec<i64> {
    history
        .windows(2)
        .map(|pair| (pair[1].start_date - pair[0].start_date).num_days())
        .collect()
}

/// Stable sort by `start_date`. Stores already return this order; callers
/// holding an arbitrary snapshot use it before computing intervals.
pub fn sort_history(history: &mut [LogEntry]) {
    history.sort_by_key(|e| e.start_date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn history(offsets: &[u64]) -> Vec<LogEntry> {
        let day0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        offsets
            .iter()
            .map(|&o| LogEntry::new(day0 + Days::new(o)))
            .collect()
    }

    #[test]
    fn intervals_between_neighbours() {
        assert_eq!(cycle_intervals(&history(&[0, 30, 57])), vec![30, 27]);
        assert!(cycle_intervals(&history(&[0])).is_empty());
        assert!(cycle_intervals(&[]).is_empty());
    }

    #[test]
    fn bands_are_half_open() {
        let s = AcceptanceBand::STATISTICAL;
        assert!(!s.contains(19));
        assert!(s.contains(20));
        assert!(s.contains(44));
        assert!(!s.contains(45));

        let e = AcceptanceBand::ESTIMATOR;
        assert!(!e.contains(15));
        assert!(e.contains(16));
        assert!(e.contains(89));
        assert!(!e.contains(90));
    }

    #[test]
    fn statistical_band_drops_short_gap() {
        // intervals 10 and 26
        let h = history(&[0, 10, 36]);
        assert_eq!(AcceptanceBand::STATISTICAL.valid_intervals(&h), vec![26]);
    }

    #[test]
    fn estimator_band_keeps_long_irregular_cycle() {
        // intervals 60 and 100
        let h = history(&[0, 60, 160]);
        assert_eq!(AcceptanceBand::ESTIMATOR.valid_intervals(&h), vec![60]);
        assert!(AcceptanceBand::STATISTICAL.valid_intervals(&h).is_empty());
    }

    #[test]
    fn estimator_band_excludes_fifteen_day_gap() {
        // intervals 15 and 30
        let h = history(&[0, 15, 45]);
        assert_eq!(AcceptanceBand::ESTIMATOR.valid_intervals(&h), vec![30]);
    }

    #[test]
    fn sort_history_orders_by_start_date() {
        let mut h = history(&[30, 0, 57]);
        sort_history(&mut h);
        assert_eq!(cycle_intervals(&h), vec![30, 27]);
    }
}
