use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the default location.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path)
}

/// Writes the example configuration to `path`, refusing to overwrite an existing file.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    println!("Created configuration at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::SeriesSource;
    use crate::core::transform::Transform;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_config_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        setup_at_path(&config_path)?;

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path)?;
        assert!(content.contains("indicators:"));
        assert!(content.contains("providers:"));
        assert!(content.contains("# Example configuration file for mktlogic"));

        let config = AppConfig::load_from_path(&config_path)?;
        assert!(!config.indicators.is_empty());
        Ok(())
    }

    #[test]
    fn test_setup_fails_if_config_exists() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "test")?;

        let result = setup_at_path(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&config_path)?, "test");

        Ok(())
    }

    #[test]
    fn test_example_config_is_valid() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(EXAMPLE_CONFIG)
            .context("Failed to parse example config as YAML")?;
        config.validate()?;

        assert_eq!(config.fetch.attempts, 3);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.llm.model, "gpt-4o");

        let us10y = config.find_indicator("us10y").context("us10y missing")?;
        assert_eq!(
            us10y.sources,
            vec![
                SeriesSource::Fred("DGS10".to_string()),
                SeriesSource::Yahoo("^TNX".to_string())
            ]
        );
        let cpi = config.find_indicator("cpi").context("cpi missing")?;
        assert_eq!(cpi.transform, Transform::Yoy);
        let payrolls = config.find_indicator("payrolls").context("payrolls missing")?;
        assert_eq!(payrolls.transform, Transform::Diff);

        Ok(())
    }
}
