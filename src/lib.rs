pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::{KeyValueCollection, Store};
use crate::core::config::AppConfig;
use crate::core::error::CommentaryError;
use crate::core::period::ChartPeriod;
use crate::core::transform::Transform;
use crate::providers::caching::CachingSeriesProvider;
use crate::providers::fetcher::SeriesFetcher;
use crate::providers::fred::FredSeriesProvider;
use crate::providers::openai::OpenAiCommentary;
use crate::providers::util::RetryPolicy;
use crate::providers::yahoo_finance::YahooSeriesProvider;
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const SERIES_COLLECTION: &str = "series";

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Dashboard {
        group: Option<String>,
    },
    Series {
        indicator: String,
        period: ChartPeriod,
        transform: Option<Transform>,
    },
    Signal,
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("mktlogic starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let today = chrono::Local::now().date_naive();
    run_with_config(command, &config, today).await
}

/// Opens the cache store; falls back to memory when persistence is off or unavailable.
fn open_store(config: &AppConfig) -> Result<KeyValueStore> {
    if !config.cache.persist {
        return Ok(KeyValueStore::in_memory());
    }
    let data_path = config.default_data_path()?;
    debug!("Using data path: {}", data_path.display());
    Ok(KeyValueStore::open(&data_path))
}

fn series_collection(store: &KeyValueStore, persist: bool) -> Arc<dyn KeyValueCollection> {
    store
        .get_collection(SERIES_COLLECTION, persist, true)
        .or_else(|| store.get_collection(SERIES_COLLECTION, false, true))
        .unwrap_or_else(|| Arc::new(store::memory::MemoryCollection::new()))
}

/// Wires both providers behind the shared TTL cache.
pub fn build_fetcher(
    config: &AppConfig,
    cache: Arc<dyn KeyValueCollection>,
) -> Result<SeriesFetcher> {
    let timeout = Duration::from_secs(config.fetch.timeout_secs);
    let retry = RetryPolicy {
        attempts: config.fetch.attempts,
        delay: Duration::from_millis(config.fetch.retry_delay_ms),
    };
    let ttl = Duration::from_secs(config.cache.ttl_secs);

    let yahoo = YahooSeriesProvider::new(&config.providers.yahoo.base_url, timeout, retry)
        .context("Failed to create Yahoo provider")?;
    let fred = FredSeriesProvider::new(&config.providers.fred.base_url, timeout, retry)
        .context("Failed to create FRED provider")?;

    Ok(SeriesFetcher::new(
        Arc::new(CachingSeriesProvider::new(yahoo, Arc::clone(&cache), ttl)),
        Arc::new(CachingSeriesProvider::new(fred, cache, ttl)),
    ))
}

/// Runs a command against an already loaded configuration, as of `today`.
pub async fn run_with_config(
    command: AppCommand,
    config: &AppConfig,
    today: NaiveDate,
) -> Result<()> {
    let store = open_store(config)?;

    if command == AppCommand::ClearCache {
        return clear_cache(&store, config.cache.persist).await;
    }

    let cache = series_collection(&store, config.cache.persist);
    let fetcher = build_fetcher(config, cache)?;
    let lookback = config.fetch.lookback_days;

    match command {
        AppCommand::Dashboard { group } => {
            cli::dashboard::run(&config.indicators, group.as_deref(), &fetcher, today, lookback)
                .await
        }
        AppCommand::Series {
            indicator,
            period,
            transform,
        } => {
            let indicator = config
                .find_indicator(&indicator)
                .with_context(|| format!("Unknown indicator: {indicator}"))?;
            cli::series::run(indicator, period, transform, &fetcher, today, lookback).await
        }
        AppCommand::Signal => {
            let timeout = Duration::from_secs(config.fetch.timeout_secs.max(60));
            let commentary = match OpenAiCommentary::new(
                &config.llm.base_url,
                &config.llm.model,
                config.llm.resolve_api_key(),
                timeout,
            ) {
                Ok(commentary) => commentary,
                Err(CommentaryError::MissingCredential) => {
                    println!(
                        "{}",
                        cli::ui::style_text(
                            "Commentary is disabled: set llm.api_key or OPENAI_API_KEY.",
                            cli::ui::StyleType::Warning
                        )
                    );
                    return Ok(());
                }
                Err(e) => return Err(e).context("Failed to create commentary client"),
            };
            cli::signal::run(&config.indicators, &fetcher, &commentary, today, lookback).await
        }
        AppCommand::ClearCache => Ok(()),
    }
}

async fn clear_cache(store: &KeyValueStore, persist: bool) -> Result<()> {
    if let Some(collection) = store.get_collection(SERIES_COLLECTION, persist, true) {
        collection.clear().await;
    }
    store.remove_collection(SERIES_COLLECTION);
    info!("Cleared cached series");
    println!("Cache cleared.");
    Ok(())
}
