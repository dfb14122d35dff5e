//! Derived views over a raw series and the latest/prior/delta snapshot.

use crate::core::error::DataError;
use crate::core::series::{Observation, TimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Number of periods a year-over-year change looks back.
pub const YOY_LAG: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    #[default]
    Identity,
    Yoy,
    Diff,
}

impl Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Transform::Identity => "identity",
                Transform::Yoy => "yoy",
                Transform::Diff => "diff",
            }
        )
    }
}

impl FromStr for Transform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" | "raw" => Ok(Transform::Identity),
            "yoy" => Ok(Transform::Yoy),
            "diff" => Ok(Transform::Diff),
            _ => Err(anyhow::anyhow!("Invalid transform: {}", s)),
        }
    }
}

impl Transform {
    /// Leading observations consumed by the transform.
    pub fn lag(&self) -> usize {
        match self {
            Transform::Identity => 0,
            Transform::Diff => 1,
            Transform::Yoy => YOY_LAG,
        }
    }

    /// Derives a new series. Lagged transforms drop the leading entries that have no base;
    /// a year-over-year change against a zero base is undefined and skipped.
    pub fn apply(&self, series: &TimeSeries) -> TimeSeries {
        let lag = self.lag();
        if lag == 0 {
            return series.clone();
        }

        let obs = series.observations();
        let derived = obs
            .iter()
            .zip(obs.iter().skip(lag))
            .filter_map(|(base, current)| {
                let value = match self {
                    Transform::Diff => current.value - base.value,
                    Transform::Yoy => {
                        if base.value == 0.0 {
                            return None;
                        }
                        (current.value / base.value - 1.0) * 100.0
                    }
                    Transform::Identity => current.value,
                };
                Some(Observation::new(current.date, value))
            })
            .collect();

        series.with_observations(derived)
    }
}

/// Latest reading of an indicator, read off the tail of its derived series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub latest: f64,
    pub prior: f64,
    pub delta: f64,
    pub as_of: NaiveDate,
    pub series: TimeSeries,
}

impl IndicatorSnapshot {
    pub fn from_series(series: TimeSeries) -> Result<Self, DataError> {
        let obs = series.observations();
        let [.., prior, latest] = obs else {
            return Err(DataError::InsufficientData {
                needed: 2,
                got: obs.len(),
            });
        };
        let (latest, prior) = (*latest, *prior);

        Ok(Self {
            latest: latest.value,
            prior: prior.value,
            delta: latest.value - prior.value,
            as_of: latest.date,
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Months;

    fn monthly(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeSeries::new(
            "CPIAUCSL",
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Observation::new(start + Months::new(i as u32), *v))
                .collect(),
        )
    }

    #[test]
    fn test_derived_length_is_raw_length_minus_lag() {
        let raw = monthly(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        for transform in [Transform::Identity, Transform::Diff, Transform::Yoy] {
            let derived = transform.apply(&raw);
            assert_eq!(derived.len(), raw.len() - transform.lag(), "{transform}");
            assert_eq!(derived.last().unwrap().date, raw.last().unwrap().date);
        }
    }

    #[test]
    fn test_short_series_saturates_to_empty() {
        let raw = monthly(&[1.0, 2.0, 3.0]);
        assert!(Transform::Yoy.apply(&raw).is_empty());
        assert_eq!(Transform::Diff.apply(&raw).len(), 2);
        assert!(Transform::Diff.apply(&monthly(&[])).is_empty());
    }

    #[test]
    fn test_yoy_values() {
        let mut values = vec![100.0; 12];
        values.push(103.0);
        values.push(99.0);
        let derived = Transform::Yoy.apply(&monthly(&values));

        assert_eq!(derived.len(), 2);
        assert!((derived.observations()[0].value - 3.0).abs() < 1e-9);
        assert!((derived.observations()[1].value + 1.0).abs() < 1e-9);
        assert_eq!(
            derived.observations()[0].date,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_yoy_skips_zero_base() {
        let mut values = vec![0.0];
        values.extend(std::iter::repeat_n(1.0, 12));
        let derived = Transform::Yoy.apply(&monthly(&values));
        assert_eq!(derived.len(), 0);
    }

    #[test]
    fn test_diff_values() {
        let derived = Transform::Diff.apply(&monthly(&[150.0, 155.0, 152.5]));
        let values: Vec<_> = derived.observations().iter().map(|o| o.value).collect();
        assert_eq!(values, vec![5.0, -2.5]);
    }

    #[test]
    fn test_snapshot_delta_is_latest_minus_prior() {
        let snapshot = IndicatorSnapshot::from_series(monthly(&[4.1, 4.3, 3.9])).unwrap();
        assert_eq!(snapshot.latest, 3.9);
        assert_eq!(snapshot.prior, 4.3);
        assert!((snapshot.delta - (3.9 - 4.3)).abs() < 1e-12);
        assert_eq!(snapshot.as_of, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        assert_eq!(snapshot.series.len(), 3);
    }

    #[test]
    fn test_snapshot_requires_two_points() {
        let err = IndicatorSnapshot::from_series(monthly(&[4.1])).unwrap_err();
        assert_eq!(err, DataError::InsufficientData { needed: 2, got: 1 });

        let err = IndicatorSnapshot::from_series(monthly(&[])).unwrap_err();
        assert_eq!(err, DataError::InsufficientData { needed: 2, got: 0 });
    }

    #[test]
    fn test_transform_parse() {
        assert_eq!("YoY".parse::<Transform>().unwrap(), Transform::Yoy);
        assert_eq!("raw".parse::<Transform>().unwrap(), Transform::Identity);
        assert!("pct".parse::<Transform>().is_err());
    }
}
