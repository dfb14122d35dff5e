use crate::core::error::DataError;
use crate::core::provider::SeriesProvider;
use crate::core::series::{Observation, TimeSeries};
use crate::providers::util::{RetryPolicy, browser_client, get_text, looks_blocked, with_retry};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, instrument};

/// FRED marks a missing observation with a single dot.
const MISSING_VALUE: &str = ".";

/// Macro series from the FRED graph CSV endpoint.
pub struct FredSeriesProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl FredSeriesProvider {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, DataError> {
        Ok(FredSeriesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: browser_client(timeout)?,
            retry,
        })
    }

    async fn fetch_once(&self, id: &str, start: NaiveDate) -> Result<TimeSeries, DataError> {
        let url = format!(
            "{}/graph/fredgraph.csv?id={}&cosd={}",
            self.base_url,
            urlencoding::encode(id),
            start.format("%Y-%m-%d")
        );
        let body = get_text(&self.client, &url, id).await?;

        if looks_blocked(&body) {
            debug!("FRED returned an HTML page for {}", id);
            return Err(DataError::Blocked(id.to_string()));
        }

        parse_csv(id, &body)
    }
}

/// Parses `date,value` rows after a header line. Missing values are skipped.
fn parse_csv(id: &str, body: &str) -> Result<TimeSeries, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::malformed(id, e.to_string()))?;
    if headers.len() < 2 {
        return Err(DataError::malformed(
            id,
            format!("expected 2 columns, got {}", headers.len()),
        ));
    }

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::malformed(id, e.to_string()))?;
        let (Some(date_str), Some(value_str)) = (record.get(0), record.get(1)) else {
            return Err(DataError::malformed(id, "short row"));
        };

        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| DataError::malformed(id, format!("bad date '{date_str}': {e}")))?;
        if value_str.is_empty() || value_str == MISSING_VALUE {
            continue;
        }
        let value: f64 = value_str
            .parse()
            .map_err(|e| DataError::malformed(id, format!("bad value '{value_str}': {e}")))?;

        observations.push(Observation::new(date, value));
    }

    if observations.is_empty() {
        return Err(DataError::NoData(id.to_string()));
    }
    Ok(TimeSeries::new(id, observations))
}

#[async_trait]
impl SeriesProvider for FredSeriesProvider {
    fn name(&self) -> &'static str {
        "fred"
    }

    #[instrument(name = "FredSeriesFetch", skip(self), fields(id = %id))]
    async fn fetch_series(&self, id: &str, start: NaiveDate) -> Result<TimeSeries, DataError> {
        with_retry(|| self.fetch_once(id, start), self.retry).await
    }
}
