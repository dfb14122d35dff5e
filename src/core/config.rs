use crate::core::provider::SeriesSource;
use crate::core::transform::Transform;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub lookback_days: Option<u32>,
    /// Primary source first, then fallbacks, written as `- fred: DGS10`.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub sources: Vec<SeriesSource>,
}

fn default_precision() -> usize {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub yahoo: YahooProviderConfig,
    pub fred: FredProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            },
            fred: FredProviderConfig {
                base_url: "https://fred.stlouisfed.org".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Configured key, falling back to `OPENAI_API_KEY`. Blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|| std::env::var("OPENAI_API_KEY").ok())
    }

    fn resolve_api_key_with(&self, env_key: impl FnOnce() -> Option<String>) -> Option<String> {
        let non_blank = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(non_blank)
            .or_else(|| env_key().filter(non_blank))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub attempts: usize,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    pub lookback_days: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            attempts: 3,
            retry_delay_ms: 1000,
            timeout_secs: 10,
            lookback_days: 365 * 6,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 60 * 60,
            persist: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
    pub indicators: Vec<Indicator>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "mktlogic", "mktlogic")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "mktlogic", "mktlogic")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.attempts == 0 {
            bail!("fetch.attempts must be at least 1");
        }
        for indicator in &self.indicators {
            if indicator.sources.is_empty() {
                bail!("Indicator '{}' has no sources", indicator.id);
            }
        }
        Ok(())
    }

    pub fn find_indicator(&self, id: &str) -> Option<&Indicator> {
        self.indicators
            .iter()
            .find(|i| i.id.eq_ignore_ascii_case(id))
    }
}
