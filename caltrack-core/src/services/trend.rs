//! Trend aggregation - moving averages over a window of entries

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{Entry, Result, TrendPoint, TrendWindow, UserId, View};
use crate::ports::EntryRepository;

/// Moving averages, averaging whatever history exists for early points
pub fn aggregate(entries: &[Entry], window: TrendWindow) -> Vec<TrendPoint> {
    smooth(entries, window, false)
}

/// Moving averages that leave both averages `None` until the window is full
pub fn aggregate_strict(entries: &[Entry], window: TrendWindow) -> Vec<TrendPoint> {
    smooth(entries, window, true)
}

fn smooth(entries: &[Entry], window: TrendWindow, strict: bool) -> Vec<TrendPoint> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date);
    // One point per date; a later duplicate replaces the earlier one
    sorted.reverse();
    sorted.dedup_by_key(|e| e.date);
    sorted.reverse();

    let Some(earliest) = sorted.first().map(|e| e.date) else {
        return Vec::new();
    };

    sorted
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (start, full) = match window {
                TrendWindow::Trailing(n) => {
                    let n = n.get();
                    ((i + 1).saturating_sub(n), i + 1 >= n)
                }
                TrendWindow::Period(period) => {
                    let from = period.window_start(entry.date);
                    (sorted.partition_point(|e| e.date < from), earliest <= from)
                }
            };

            if strict && !full {
                return TrendPoint {
                    date: entry.date,
                    avg_weight: None,
                    avg_calories: None,
                };
            }

            let slice = &sorted[start..=i];
            let count = slice.len() as f64;
            TrendPoint {
                date: entry.date,
                avg_weight: Some(slice.iter().map(|e| e.weight).sum::<f64>() / count),
                avg_calories: Some(
                    slice.iter().map(|e| f64::from(e.calories)).sum::<f64>() / count,
                ),
            }
        })
        .collect()
}

/// Headline numbers for a set of entries
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub label: String,
    pub avg_weight: f64,
    pub avg_calories: f64,
    /// Latest weight minus earliest weight
    pub net_change: f64,
    pub entries: usize,
}

impl TrendSummary {
    /// `entries` must be ordered oldest first
    pub fn from_entries(entries: &[Entry]) -> Option<Self> {
        let first = entries.first()?;
        let last = entries.last()?;
        let count = entries.len() as f64;

        Some(Self {
            first_date: first.date,
            last_date: last.date,
            label: date_range_label(first.date, last.date),
            avg_weight: entries.iter().map(|e| e.weight).sum::<f64>() / count,
            avg_calories: entries.iter().map(|e| f64::from(e.calories)).sum::<f64>() / count,
            net_change: last.weight - first.weight,
            entries: entries.len(),
        })
    }
}

/// Compact label for a date span: `Jan 01-05, 2024`, `Jan 28-Feb 03, 2024`
/// or `Dec 30, 2023-Jan 02, 2024`
pub fn date_range_label(start: NaiveDate, end: NaiveDate) -> String {
    if start.year() != end.year() {
        format!("{}-{}", start.format("%b %d, %Y"), end.format("%b %d, %Y"))
    } else if start.month() != end.month() {
        format!("{}-{}", start.format("%b %d"), end.format("%b %d, %Y"))
    } else {
        format!("{}-{}", start.format("%b %d"), end.format("%d, %Y"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub window: String,
    pub strict: bool,
    pub points: Vec<TrendPoint>,
    pub summary: Option<TrendSummary>,
}

pub struct TrendService {
    repository: Arc<dyn EntryRepository>,
}

impl TrendService {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self { repository }
    }

    /// Smoothed series and summary over the entries covered by `view`
    pub fn trend(
        &self,
        user_id: UserId,
        view: View,
        window: TrendWindow,
        strict: bool,
    ) -> Result<TrendReport> {
        let entries = self.repository.latest_entries(user_id, view.limit())?;

        Ok(TrendReport {
            window: window.to_string(),
            strict,
            points: smooth(&entries, window, strict),
            summary: TrendSummary::from_entries(&entries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(date: NaiveDate, weight: f64, calories: i64) -> Entry {
        Entry::new(UserId(1), date, weight, calories).unwrap()
    }

    fn series() -> Vec<Entry> {
        vec![
            entry(d(2024, 1, 3), 72.0, 2200),
            entry(d(2024, 1, 1), 70.0, 2000),
            entry(d(2024, 1, 2), 71.0, 2100),
        ]
    }

    #[test]
    fn test_trailing_lenient() {
        let points = aggregate(&series(), TrendWindow::trailing(2).unwrap());
        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_eq!(points[0].avg_weight, Some(70.0));
        assert_eq!(points[1].avg_weight, Some(70.5));
        assert_eq!(points[2].avg_weight, Some(71.5));
        assert_eq!(points[2].avg_calories, Some(2150.0));
    }

    #[test]
    fn test_trailing_strict() {
        let points = aggregate_strict(&series(), TrendWindow::trailing(2).unwrap());
        assert_eq!(points[0].avg_weight, None);
        assert_eq!(points[0].avg_calories, None);
        assert_eq!(points[1].avg_weight, Some(70.5));
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let points = aggregate_strict(&series(), TrendWindow::trailing(1).unwrap());
        assert!(points.iter().all(|p| p.avg_weight.is_some()));
        assert_eq!(points[2].avg_weight, Some(72.0));
    }

    #[test]
    fn test_period_window_skips_gaps() {
        let entries = vec![
            entry(d(2024, 1, 1), 80.0, 2000),
            entry(d(2024, 1, 5), 79.0, 2000),
            entry(d(2024, 1, 10), 78.0, 1800),
        ];
        let week = TrendWindow::Period(Period::Week);

        let points = aggregate(&entries, week);
        assert_eq!(points[1].avg_weight, Some(79.5));
        // Jan 4..=Jan 10 excludes Jan 1
        assert_eq!(points[2].avg_weight, Some(78.5));

        let strict = aggregate_strict(&entries, week);
        assert_eq!(strict[0].avg_weight, None);
        assert_eq!(strict[1].avg_weight, None);
        assert_eq!(strict[2].avg_weight, Some(78.5));
    }

    #[test]
    fn test_month_window_crosses_month_boundary() {
        let entries = vec![
            entry(d(2024, 3, 28), 74.0, 1400),
            entry(d(2024, 1, 31), 80.0, 2000),
            entry(d(2024, 2, 15), 78.0, 1800),
            entry(d(2024, 2, 28), 77.0, 1700),
            entry(d(2024, 3, 1), 76.0, 1600),
        ];
        let month = TrendWindow::Period(Period::Month);

        let points = aggregate(&entries, month);
        assert_eq!(points[0].avg_weight, Some(80.0));
        assert_eq!(points[1].avg_weight, Some(79.0));
        assert_eq!(points[1].avg_calories, Some(1900.0));
        // Feb 2..=Mar 1 drops Jan 31
        assert_eq!(points[3].avg_weight, Some(77.0));
        assert_eq!(points[3].avg_calories, Some(1700.0));
        // Feb 29..=Mar 28 drops Feb 28, the same day a month earlier
        assert_eq!(points[4].avg_weight, Some(75.0));
        assert_eq!(points[4].avg_calories, Some(1500.0));
    }

    #[test]
    fn test_month_window_strict_until_full_month() {
        let entries = vec![
            entry(d(2024, 1, 31), 80.0, 2000),
            entry(d(2024, 2, 15), 78.0, 1800),
            entry(d(2024, 2, 28), 77.0, 1700),
            entry(d(2024, 3, 1), 76.0, 1600),
            entry(d(2024, 3, 28), 74.0, 1400),
        ];
        let points = aggregate_strict(&entries, TrendWindow::Period(Period::Month));

        let weights: Vec<_> = points.iter().map(|p| p.avg_weight).collect();
        assert_eq!(weights, vec![None, None, None, Some(77.0), Some(75.0)]);
        assert!(points[..3].iter().all(|p| p.avg_calories.is_none()));
        assert_eq!(points[3].avg_calories, Some(1700.0));
    }

    #[test]
    fn test_day_window_is_each_point() {
        let entries = series();
        let day = TrendWindow::Period(Period::Day);

        for points in [aggregate(&entries, day), aggregate_strict(&entries, day)] {
            let weights: Vec<_> = points.iter().map(|p| p.avg_weight).collect();
            assert_eq!(weights, vec![Some(70.0), Some(71.0), Some(72.0)]);
            let calories: Vec<_> = points.iter().map(|p| p.avg_calories).collect();
            assert_eq!(calories, vec![Some(2000.0), Some(2100.0), Some(2200.0)]);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], TrendWindow::default()).is_empty());
    }

    #[test]
    fn test_duplicate_dates_collapse() {
        let entries = vec![entry(d(2024, 1, 1), 70.0, 2000), entry(d(2024, 1, 1), 75.0, 2500)];
        let points = aggregate(&entries, TrendWindow::default());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].avg_weight, Some(75.0));
    }

    #[test]
    fn test_date_range_label() {
        assert_eq!(date_range_label(d(2024, 1, 1), d(2024, 1, 5)), "Jan 01-05, 2024");
        assert_eq!(date_range_label(d(2024, 1, 28), d(2024, 2, 3)), "Jan 28-Feb 03, 2024");
        assert_eq!(
            date_range_label(d(2023, 12, 30), d(2024, 1, 2)),
            "Dec 30, 2023-Jan 02, 2024"
        );
    }

    #[test]
    fn test_summary() {
        let mut entries = series();
        entries.sort_by_key(|e| e.date);
        let summary = TrendSummary::from_entries(&entries).unwrap();
        assert_eq!(summary.avg_weight, 71.0);
        assert_eq!(summary.net_change, 2.0);
        assert_eq!(summary.label, "Jan 01-03, 2024");
        assert!(TrendSummary::from_entries(&[]).is_none());
    }
}
