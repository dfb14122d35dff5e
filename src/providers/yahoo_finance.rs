use crate::core::error::DataError;
use crate::core::provider::SeriesProvider;
use crate::core::series::{Observation, TimeSeries};
use crate::providers::util::{RetryPolicy, browser_client, get_text, looks_blocked, with_retry};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

// YahooSeriesProvider implementation for SeriesProvider
pub struct YahooSeriesProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl YahooSeriesProvider {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, DataError> {
        Ok(YahooSeriesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: browser_client(timeout)?,
            retry,
        })
    }

    async fn fetch_once(&self, symbol: &str, start: NaiveDate) -> Result<TimeSeries, DataError> {
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        let period2 = Utc::now().timestamp();
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            urlencoding::encode(symbol),
            period1,
            period2
        );
        let body = get_text(&self.client, &url, symbol).await?;

        if looks_blocked(&body) {
            debug!("Yahoo returned an HTML page for {}", symbol);
            return Err(DataError::Blocked(symbol.to_string()));
        }

        let data: YahooChartResponse = serde_json::from_str(&body).map_err(|e| {
            DataError::malformed(symbol, format!("failed to parse JSON response: {e}"))
        })?;

        if let Some(error) = data.chart.error {
            debug!(code = %error.code, "Yahoo chart error for {}", symbol);
            return Err(DataError::NoData(symbol.to_string()));
        }

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| DataError::NoData(symbol.to_string()))?;

        let observations = extract_closes(&item);
        if observations.is_empty() {
            return Err(DataError::NoData(symbol.to_string()));
        }
        Ok(TimeSeries::new(symbol, observations))
    }
}

/// Pairs each bar's timestamp with its close, skipping bars without a close.
fn extract_closes(item: &ChartItem) -> Vec<Observation> {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let date = Utc.timestamp_opt(*ts, 0).single()?.date_naive();
            Some(Observation::new(date, close))
        })
        .collect()
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[async_trait]
impl SeriesProvider for YahooSeriesProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    #[instrument(name = "YahooSeriesFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_series(&self, symbol: &str, start: NaiveDate) -> Result<TimeSeries, DataError> {
        with_retry(|| self.fetch_once(symbol, start), self.retry).await
    }
}
