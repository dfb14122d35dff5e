//! Trailing chart windows

use crate::core::series::TimeSeries;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ChartPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    ThreeYears,
    FiveYears,
    All,
}

impl Display for ChartPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChartPeriod::OneMonth => "1mo",
                ChartPeriod::ThreeMonths => "3mo",
                ChartPeriod::SixMonths => "6mo",
                ChartPeriod::OneYear => "1y",
                ChartPeriod::ThreeYears => "3y",
                ChartPeriod::FiveYears => "5y",
                ChartPeriod::All => "all",
            }
        )
    }
}

impl ChartPeriod {
    /// Window length, or `None` for the whole series.
    pub fn to_duration(&self) -> Option<Duration> {
        match self {
            ChartPeriod::OneMonth => Some(Duration::days(30)),
            ChartPeriod::ThreeMonths => Some(Duration::days(90)),
            ChartPeriod::SixMonths => Some(Duration::days(180)),
            ChartPeriod::OneYear => Some(Duration::days(365)),
            ChartPeriod::ThreeYears => Some(Duration::days(365 * 3)),
            ChartPeriod::FiveYears => Some(Duration::days(365 * 5)),
            ChartPeriod::All => None,
        }
    }

    /// Keeps the rows dated at or after the series' latest date minus the window.
    pub fn filter(&self, series: &TimeSeries) -> TimeSeries {
        let (Some(window), Some(last)) = (self.to_duration(), series.last()) else {
            return series.clone();
        };
        let cutoff = last.date - window;

        let kept = series
            .observations()
            .iter()
            .filter(|o| o.date >= cutoff)
            .copied()
            .collect();
        series.with_observations(kept)
    }
}

impl FromStr for ChartPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1mo" => Ok(ChartPeriod::OneMonth),
            "3mo" => Ok(ChartPeriod::ThreeMonths),
            "6mo" => Ok(ChartPeriod::SixMonths),
            "1y" => Ok(ChartPeriod::OneYear),
            "3y" => Ok(ChartPeriod::ThreeYears),
            "5y" => Ok(ChartPeriod::FiveYears),
            "all" | "max" => Ok(ChartPeriod::All),
            _ => Err(anyhow::anyhow!("Invalid chart period: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::Observation;
    use chrono::NaiveDate;

    fn daily(days: i64) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        TimeSeries::new(
            "SPY",
            (0..days)
                .map(|i| Observation::new(start + Duration::days(i), i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_filter_keeps_trailing_window() {
        let series = daily(400);
        let last = series.last().unwrap().date;

        let filtered = ChartPeriod::OneMonth.filter(&series);
        assert_eq!(filtered.len(), 31);
        assert_eq!(filtered.first().unwrap().date, last - Duration::days(30));
        assert_eq!(filtered.last().unwrap().date, last);
        assert_eq!(filtered.id, "SPY");
    }

    #[test]
    fn test_all_returns_everything() {
        let series = daily(50);
        assert_eq!(ChartPeriod::All.filter(&series), series);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let series = daily(2500);
        for period in [
            ChartPeriod::OneMonth,
            ChartPeriod::ThreeMonths,
            ChartPeriod::SixMonths,
            ChartPeriod::OneYear,
            ChartPeriod::ThreeYears,
            ChartPeriod::FiveYears,
            ChartPeriod::All,
        ] {
            let once = period.filter(&series);
            assert_eq!(period.filter(&once), once, "{period}");
        }
    }

    #[test]
    fn test_wider_window_returns_input() {
        let series = daily(2500);
        let narrow = ChartPeriod::SixMonths.filter(&series);
        assert_eq!(ChartPeriod::OneYear.filter(&narrow), narrow);
        assert_eq!(ChartPeriod::FiveYears.filter(&narrow), narrow);
        assert_eq!(ChartPeriod::All.filter(&narrow), narrow);
    }

    #[test]
    fn test_empty_series() {
        let empty = TimeSeries::new("X", vec![]);
        assert!(ChartPeriod::OneYear.filter(&empty).is_empty());
    }

    #[test]
    fn test_parse_and_display() {
        for s in ["1mo", "3mo", "6mo", "1y", "3y", "5y", "all"] {
            let period: ChartPeriod = s.parse().unwrap();
            assert_eq!(period.to_string(), s);
        }
        assert_eq!("MAX".parse::<ChartPeriod>().unwrap(), ChartPeriod::All);
        assert!("2w".parse::<ChartPeriod>().is_err());
    }
}
