//! Routes indicator sources to providers and falls back between them.

use crate::core::error::DataError;
use crate::core::provider::{SeriesProvider, SeriesSource};
use crate::core::series::TimeSeries;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SeriesFetcher {
    yahoo: Arc<dyn SeriesProvider>,
    fred: Arc<dyn SeriesProvider>,
}

impl SeriesFetcher {
    pub fn new(yahoo: Arc<dyn SeriesProvider>, fred: Arc<dyn SeriesProvider>) -> Self {
        Self { yahoo, fred }
    }

    fn provider_for(&self, source: &SeriesSource) -> &dyn SeriesProvider {
        match source {
            SeriesSource::Yahoo(_) => self.yahoo.as_ref(),
            SeriesSource::Fred(_) => self.fred.as_ref(),
        }
    }

    /// Tries each source in order and returns the first series obtained with the source
    /// that served it. When every source fails the last error is returned.
    pub async fn fetch(
        &self,
        sources: &[SeriesSource],
        start: NaiveDate,
    ) -> Result<(TimeSeries, SeriesSource), DataError> {
        let mut last_error = None;
        for source in sources {
            let provider = self.provider_for(source);
            match provider.fetch_series(source.id(), start).await {
                Ok(series) => {
                    debug!("Fetched {} observations from {}", series.len(), source);
                    return Ok((series, source.clone()));
                }
                Err(e) => {
                    warn!("Source {} failed: {}", source, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::NoData("no sources configured".to_string())))
    }
}
