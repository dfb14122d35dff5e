//! Time series types shared by providers, transforms and the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An ordered sequence of observations with unique, strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub id: String,
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Builds a series from unordered observations. Non-finite values are dropped and
    /// the last value wins for a repeated date.
    pub fn new(id: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.retain(|o| o.value.is_finite());
        // Stable sort keeps input order within a date, so reversing before dedup keeps the last.
        observations.sort_by_key(|o| o.date);
        observations.reverse();
        observations.dedup_by_key(|o| o.date);
        observations.reverse();

        Self {
            id: id.into(),
            observations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn min_value(&self) -> Option<f64> {
        self.observations.iter().map(|o| o.value).reduce(f64::min)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.observations.iter().map(|o| o.value).reduce(f64::max)
    }

    /// Returns a series with the same id over a subset of observations.
    pub(crate) fn with_observations(&self, observations: Vec<Observation>) -> Self {
        Self {
            id: self.id.clone(),
            observations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let series = TimeSeries::new(
            "DGS10",
            vec![
                Observation::new(date(2024, 1, 3), 4.0),
                Observation::new(date(2024, 1, 1), 3.9),
                Observation::new(date(2024, 1, 3), 4.1),
                Observation::new(date(2024, 1, 2), 3.95),
            ],
        );

        let dates: Vec<_> = series.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
        // last one wins for the duplicated date
        assert_eq!(series.last().unwrap().value, 4.1);
    }

    #[test]
    fn test_new_drops_non_finite_values() {
        let series = TimeSeries::new(
            "X",
            vec![
                Observation::new(date(2024, 1, 1), f64::NAN),
                Observation::new(date(2024, 1, 2), 1.0),
                Observation::new(date(2024, 1, 3), f64::INFINITY),
            ],
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().date, date(2024, 1, 2));
    }

    #[test]
    fn test_min_max() {
        let series = TimeSeries::new(
            "X",
            vec![
                Observation::new(date(2024, 1, 1), 2.0),
                Observation::new(date(2024, 1, 2), -1.0),
                Observation::new(date(2024, 1, 3), 5.0),
            ],
        );
        assert_eq!(series.min_value(), Some(-1.0));
        assert_eq!(series.max_value(), Some(5.0));

        let empty = TimeSeries::new("X", vec![]);
        assert!(empty.is_empty());
        assert_eq!(empty.min_value(), None);
    }
}
