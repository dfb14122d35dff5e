//! Series retrieval abstractions

use crate::core::error::DataError;
use crate::core::series::TimeSeries;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Where an indicator's raw series comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    Yahoo(String),
    Fred(String),
}

impl SeriesSource {
    pub fn id(&self) -> &str {
        match self {
            SeriesSource::Yahoo(id) | SeriesSource::Fred(id) => id,
        }
    }
}

impl Display for SeriesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesSource::Yahoo(id) => write!(f, "yahoo:{id}"),
            SeriesSource::Fred(id) => write!(f, "fred:{id}"),
        }
    }
}

#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Short provider name, used in cache keys and logs.
    fn name(&self) -> &'static str;

    /// Fetches observations for `id` dated on or after `start`.
    async fn fetch_series(&self, id: &str, start: NaiveDate) -> Result<TimeSeries, DataError>;
}
