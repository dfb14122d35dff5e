//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod log;
pub mod period;
pub mod provider;
pub mod series;
pub mod signal;
pub mod transform;

// Re-export main types for cleaner imports
pub use error::{CommentaryError, DataError};
pub use period::ChartPeriod;
pub use provider::{SeriesProvider, SeriesSource};
pub use series::{Observation, TimeSeries};
pub use signal::{Commentary, CommentaryProvider, Signal};
pub use transform::{IndicatorSnapshot, Transform};
