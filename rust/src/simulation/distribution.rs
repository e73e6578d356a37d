//! Sorted completion-date distributions and percentile lookup.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::ScheduleError;

/// Completion dates for one key across every trial, ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionDistribution {
    dates: Vec<NaiveDate>,
}

impl CompletionDistribution {
    pub fn from_unsorted(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn min(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn max(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Date at the 1-indexed rank `ceil(p / 100 * n)`, clamped to `1..=n`.
    ///
    /// `p` is in percent. Returns `Ok(None)` for an empty distribution.
    pub fn percentile(&self, p: f64) -> Result<Option<NaiveDate>, ScheduleError> {
        if !(0.0..=100.0).contains(&p) {
            return Err(ScheduleError::InvalidPercentile(p));
        }
        let n = self.dates.len();
        if n == 0 {
            return Ok(None);
        }
        let rank = (p * n as f64 / 100.0).ceil() as usize;
        Ok(Some(self.dates[rank.clamp(1, n) - 1]))
    }

    /// Number of trials finishing on each date.
    pub fn histogram(&self) -> BTreeMap<NaiveDate, usize> {
        let mut counts = BTreeMap::new();
        for &date in &self.dates {
            *counts.entry(date).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn ten_days() -> CompletionDistribution {
        CompletionDistribution::from_unsorted((1..=10).rev().map(|day| d(2025, 3, day)).collect())
    }

    #[test]
    fn test_sorted_on_construction() {
        let dist = ten_days();
        assert_eq!(dist.min(), Some(d(2025, 3, 1)));
        assert_eq!(dist.max(), Some(d(2025, 3, 10)));
        assert!(dist.dates().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_percentile_rank() {
        let dist = ten_days();
        assert_eq!(dist.percentile(90.0).unwrap(), Some(d(2025, 3, 9)));
        assert_eq!(dist.percentile(50.0).unwrap(), Some(d(2025, 3, 5)));
        assert_eq!(dist.percentile(91.0).unwrap(), Some(d(2025, 3, 10)));
        assert_eq!(dist.percentile(100.0).unwrap(), Some(d(2025, 3, 10)));
        assert_eq!(dist.percentile(0.0).unwrap(), Some(d(2025, 3, 1)));
    }

    #[test]
    fn test_percentile_of_1000_trials() {
        let dates: Vec<NaiveDate> = (0..1000)
            .map(|i| d(2025, 1, 1) + chrono::Duration::days(i))
            .collect();
        let dist = CompletionDistribution::from_unsorted(dates);
        // rank 900, 1-indexed
        assert_eq!(
            dist.percentile(90.0).unwrap(),
            Some(d(2025, 1, 1) + chrono::Duration::days(899))
        );
    }

    #[test]
    fn test_percentile_out_of_range() {
        let dist = ten_days();
        assert_eq!(
            dist.percentile(101.0),
            Err(ScheduleError::InvalidPercentile(101.0))
        );
        assert!(dist.percentile(-1.0).is_err());
        assert!(dist.percentile(f64::NAN).is_err());
    }

    #[test]
    fn test_empty_distribution() {
        let dist = CompletionDistribution::default();
        assert!(dist.is_empty());
        assert_eq!(dist.percentile(90.0).unwrap(), None);
        assert!(dist.histogram().is_empty());
    }

    #[test]
    fn test_histogram_counts() {
        let dist = CompletionDistribution::from_unsorted(vec![
            d(2025, 1, 8),
            d(2025, 1, 7),
            d(2025, 1, 8),
        ]);
        let hist = dist.histogram();
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[&d(2025, 1, 7)], 1);
        assert_eq!(hist[&d(2025, 1, 8)], 2);
    }
}
