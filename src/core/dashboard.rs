//! Assembles indicator cards from fetched series.
//!
//! Every failure stays inside its card as an error string; nothing here returns an error to
//! the caller, so one broken source never takes the whole dashboard down.
use crate::core::config::Indicator;
use crate::core::error::DataError;
use crate::core::provider::SeriesSource;
use crate::core::series::TimeSeries;
use crate::core::transform::{IndicatorSnapshot, Transform};
use crate::providers::fetcher::SeriesFetcher;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use tracing::debug;

/// One metric card: the latest reading of an indicator, or why it is missing.
#[derive(Debug, Clone)]
pub struct IndicatorCard {
    pub indicator: Indicator,
    pub snapshot: Option<IndicatorSnapshot>,
    pub source: Option<SeriesSource>,
    pub error: Option<String>,
}

impl IndicatorCard {
    pub fn is_available(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Start of the fetch window for an indicator.
pub fn lookback_start(indicator: &Indicator, today: NaiveDate, default_days: u32) -> NaiveDate {
    let days = indicator.lookback_days.unwrap_or(default_days);
    today - Duration::days(i64::from(days))
}

/// Fetches an indicator's raw series and applies its transform, or `transform` when given.
pub async fn fetch_derived(
    indicator: &Indicator,
    fetcher: &SeriesFetcher,
    transform: Option<Transform>,
    start: NaiveDate,
) -> Result<(TimeSeries, SeriesSource), DataError> {
    let (raw, source) = fetcher.fetch(&indicator.sources, start).await?;
    let transform = transform.unwrap_or(indicator.transform);
    let derived = transform.apply(&raw);
    debug!(
        "Derived {} ({}) from {} raw points: {} points",
        indicator.id,
        transform,
        raw.len(),
        derived.len()
    );
    Ok((derived, source))
}

pub async fn load_indicator(
    indicator: &Indicator,
    fetcher: &SeriesFetcher,
    start: NaiveDate,
) -> IndicatorCard {
    let result = fetch_derived(indicator, fetcher, None, start)
        .await
        .and_then(|(series, source)| {
            IndicatorSnapshot::from_series(series).map(|snapshot| (snapshot, source))
        });

    match result {
        Ok((snapshot, source)) => IndicatorCard {
            indicator: indicator.clone(),
            snapshot: Some(snapshot),
            source: Some(source),
            error: None,
        },
        Err(e) => {
            debug!("Indicator {} unavailable: {}", indicator.id, e);
            IndicatorCard {
                indicator: indicator.clone(),
                snapshot: None,
                source: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Loads all indicators concurrently, preserving their configured order.
/// `update_callback` runs once per finished indicator.
pub async fn load_indicators(
    indicators: &[Indicator],
    fetcher: &SeriesFetcher,
    today: NaiveDate,
    default_lookback_days: u32,
    update_callback: &(dyn Fn() + Send + Sync),
) -> Vec<IndicatorCard> {
    let futures = indicators.iter().map(|indicator| async move {
        let start = lookback_start(indicator, today, default_lookback_days);
        let card = load_indicator(indicator, fetcher, start).await;
        update_callback();
        card
    });
    join_all(futures).await
}
