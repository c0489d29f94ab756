//! Trend window and view types

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Calendar period for a trailing trend window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// First date (inclusive) of the window that ends on `date`
    pub fn window_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => date.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN),
            Period::Month => date
                .checked_sub_months(Months::new(1))
                .and_then(|d| d.checked_add_days(Days::new(1)))
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Size of the moving-average window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendWindow {
    /// The last `n` entries, counting the current one
    Trailing(NonZeroUsize),
    /// Entries dated within a trailing calendar period
    Period(Period),
}

impl TrendWindow {
    pub fn trailing(n: usize) -> Result<Self> {
        NonZeroUsize::new(n)
            .map(TrendWindow::Trailing)
            .ok_or_else(|| Error::invalid_input("trend window must cover at least one entry"))
    }
}

impl Default for TrendWindow {
    fn default() -> Self {
        TrendWindow::Trailing(NonZeroUsize::new(7).unwrap_or(NonZeroUsize::MIN))
    }
}

impl fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendWindow::Trailing(n) => write!(f, "{}", n),
            TrendWindow::Period(Period::Day) => f.write_str("day"),
            TrendWindow::Period(Period::Week) => f.write_str("week"),
            TrendWindow::Period(Period::Month) => f.write_str("month"),
        }
    }
}

impl FromStr for TrendWindow {
    type Err = Error;

    /// `"7"` is a trailing count, `"day"`, `"week"` and `"month"` are periods
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "day" => Ok(TrendWindow::Period(Period::Day)),
            "week" => Ok(TrendWindow::Period(Period::Week)),
            "month" => Ok(TrendWindow::Period(Period::Month)),
            _ => {
                let n: usize = s.parse().map_err(|_| {
                    Error::invalid_input(format!(
                        "unknown trend window '{}' (expected a count, day, week or month)",
                        s
                    ))
                })?;
                TrendWindow::trailing(n)
            }
        }
    }
}

/// One smoothed point; `None` marks insufficient history under a strict window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub avg_weight: Option<f64>,
    pub avg_calories: Option<f64>,
}

/// How much recent history a view covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
    #[default]
    All,
}

impl View {
    /// Number of most recent entries in the view, `None` for everything
    pub fn limit(&self) -> Option<usize> {
        match self {
            View::Week => Some(7),
            View::Month => Some(30),
            View::ThreeMonths => Some(90),
            View::SixMonths => Some(180),
            View::Year => Some(365),
            View::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Week => "1 Week",
            View::Month => "1 Month",
            View::ThreeMonths => "3 Months",
            View::SixMonths => "6 Months",
            View::Year => "1 Year",
            View::All => "All",
        }
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "1w" | "week" | "1week" => Ok(View::Week),
            "1m" | "month" | "1month" => Ok(View::Month),
            "3m" | "3months" => Ok(View::ThreeMonths),
            "6m" | "6months" => Ok(View::SixMonths),
            "1y" | "year" | "1year" => Ok(View::Year),
            "all" => Ok(View::All),
            other => Err(Error::invalid_input(format!(
                "unknown view '{}' (expected 1w, 1m, 3m, 6m, 1y or all)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_start() {
        assert_eq!(Period::Day.window_start(d(2024, 3, 10)), d(2024, 3, 10));
        assert_eq!(Period::Week.window_start(d(2024, 3, 10)), d(2024, 3, 4));
        assert_eq!(Period::Month.window_start(d(2024, 3, 10)), d(2024, 2, 11));
        // Clamped month arithmetic: Mar 31 minus a month is Feb 29 in a leap year
        assert_eq!(Period::Month.window_start(d(2024, 3, 31)), d(2024, 3, 1));
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(
            "7".parse::<TrendWindow>().unwrap(),
            TrendWindow::trailing(7).unwrap()
        );
        assert_eq!(
            "Week".parse::<TrendWindow>().unwrap(),
            TrendWindow::Period(Period::Week)
        );
        assert!("0".parse::<TrendWindow>().is_err());
        assert!("fortnight".parse::<TrendWindow>().is_err());
    }

    #[test]
    fn test_view_limits() {
        assert_eq!("3m".parse::<View>().unwrap().limit(), Some(90));
        assert_eq!("1 Year".parse::<View>().unwrap(), View::Year);
        assert_eq!(View::All.limit(), None);
    }
}
