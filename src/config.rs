use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScalerConfig {
    /// Recipe import settings
    #[serde(default)]
    pub import: ImportConfig,
    /// Portion counts used when nothing else is given
    #[serde(default)]
    pub portions: PortionDefaults,
}

/// Configuration for the recipe import adapter
#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Which extractor to use: "simulated" or "json_ld"
    #[serde(default = "default_extractor")]
    pub extractor: String,
    /// Extraction timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Artificial latency of the simulated extractor in milliseconds
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,
    /// User agent sent when fetching recipe pages
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            extractor: default_extractor(),
            timeout_secs: default_timeout_secs(),
            simulated_delay_ms: default_simulated_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Default portion counts
#[derive(Debug, Deserialize, Clone)]
pub struct PortionDefaults {
    #[serde(default = "default_base_portions")]
    pub base: f64,
    #[serde(default = "default_desired_portions")]
    pub desired: f64,
}

impl Default for PortionDefaults {
    fn default() -> Self {
        Self {
            base: default_base_portions(),
            desired: default_desired_portions(),
        }
    }
}

// Default value functions
fn default_extractor() -> String {
    "simulated".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_simulated_delay_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; RecipeScaler/0.1)".to_string()
}

fn default_base_portions() -> f64 {
    4.0
}

fn default_desired_portions() -> f64 {
    6.0
}

impl ScalerConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with SCALER__ prefix
    /// 2. scaler.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: SCALER__IMPORT__TIMEOUT_SECS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`ScalerConfig::load`] for the lookup order.
pub fn load_config() -> Result<ScalerConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("scaler").required(false))
        // Use double underscore for nested: SCALER__IMPORT__EXTRACTOR
        .add_source(
            Environment::with_prefix("SCALER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        let config = ScalerConfig::default();
        assert_eq!(config.import.extractor, "simulated");
        assert_eq!(config.import.timeout_secs, 30);
        assert_eq!(config.import.simulated_delay_ms, 2000);
        assert_eq!(config.portions.base, 4.0);
        assert_eq!(config.portions.desired, 6.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Config::builder()
            .add_source(File::from_str(
                "[import]\nextractor = \"json_ld\"\ntimeout_secs = 5\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: ScalerConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.import.extractor, "json_ld");
        assert_eq!(config.import.timeout_secs, 5);
        assert_eq!(config.import.simulated_delay_ms, 2000);
        assert_eq!(config.portions.desired, 6.0);
    }

    #[test]
    fn test_load_config_without_file() {
        // No scaler.toml in the test working directory; defaults must apply
        let result = load_config();
        assert!(result.is_ok());
    }
}
