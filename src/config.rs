use anyhow::{Context, Result};
use config::builder::{ConfigBuilder, DefaultState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::LanguageModel;

/// Environment variable the web dashboard used for the backend host.
/// Still honoured so existing deployments keep working.
pub const LEGACY_HOSTNAME_VAR: &str = "DOCDASH_API_HOSTNAME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base host of the REST backend, without trailing slash
    pub base_url: String,
    /// Session cookie (`name=value`) seeded into the cookie jar on startup
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("docdash/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    /// How long a toast stays on screen
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,
    /// Locale used as the route prefix (`/{locale}/dashboard/...`)
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_toast_duration() -> u64 {
    4000
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub state: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

/// One entry of the language model catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEntry {
    pub model: LanguageModel,
    /// Context window in tokens; upper bound of the chunk size input
    pub context: u32,
    /// Usage credits an account needs before the model can be selected
    #[serde(default)]
    pub min_usage_credits: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_model_entries")]
    pub catalog: Vec<ModelEntry>,
}

fn default_model_entries() -> Vec<ModelEntry> {
    vec![
        ModelEntry {
            model: LanguageModel::Gpt4oMini,
            context: 128_000,
            min_usage_credits: 0,
            enabled: true,
        },
        ModelEntry {
            model: LanguageModel::Gpt4o,
            context: 128_000,
            min_usage_credits: 100,
            enabled: true,
        },
        ModelEntry {
            model: LanguageModel::Claude35Sonnet,
            context: 200_000,
            min_usage_credits: 0,
            enabled: true,
        },
        ModelEntry {
            model: LanguageModel::Llama2,
            context: 4_096,
            min_usage_credits: 0,
            enabled: false,
        },
    ]
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            catalog: default_model_entries(),
        }
    }
}

/// A fixed credit bundle offered on the first buy-credits step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditPreset {
    pub id: u32,
    pub title: String,
    pub credits: u32,
    /// Display price, e.g. "$5"
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsConfig {
    #[serde(default = "default_presets")]
    pub presets: Vec<CreditPreset>,
    #[serde(default = "default_min_custom_credits")]
    pub min_custom_credits: u32,
    #[serde(default = "default_max_custom_credits")]
    pub max_custom_credits: u32,
}

fn default_presets() -> Vec<CreditPreset> {
    [(1, "Starter", 100, "$1"), (2, "Standard", 500, "$5"), (3, "Plus", 1000, "$10"), (4, "Pro", 5000, "$50")]
        .into_iter()
        .map(|(id, title, credits, price)| CreditPreset {
            id,
            title: title.to_string(),
            credits,
            price: price.to_string(),
        })
        .collect()
}

fn default_min_custom_credits() -> u32 {
    100
}

fn default_max_custom_credits() -> u32 {
    100_000
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            min_custom_credits: default_min_custom_credits(),
            max_custom_credits: default_max_custom_credits(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_extensions")]
    pub accepted_extensions: Vec<String>,
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "txt".to_string(), "docx".to_string()]
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            accepted_extensions: default_extensions(),
        }
    }
}

impl Config {
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".docdash/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Self::defaults_builder()?;

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/docdash/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docdash").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(env_source());

        if let Ok(host) = std::env::var(LEGACY_HOSTNAME_VAR) {
            if !host.is_empty() {
                builder = builder
                    .set_override("api.base_url", host)
                    .context("Failed to apply legacy hostname override")?;
            }
        }

        Self::finish(builder)
    }

    /// Builder seeded with the embedded defaults so docdash works without config files
    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>> {
        let defaults_json = serde_json::to_string(&Config::default())
            .context("Failed to serialize default config")?;
        Ok(config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        )))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to load configuration")?;
        let mut config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Save config to .docdash/config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::local_config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                session_cookie: None,
                user_agent: default_user_agent(),
            },
            ui: UiConfig {
                refresh_rate_ms: 250,
                toast_duration_ms: default_toast_duration(),
                locale: default_locale(),
            },
            logging: LoggingConfig::default(),
            paths: PathsConfig {
                state: ".docdash".to_string(),
            },
            models: ModelsConfig::default(),
            credits: CreditsConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }
}

/// `DOCDASH_API__BASE_URL` -> `api.base_url`: one `_` after the prefix,
/// `__` between nested keys
fn env_source() -> config::Environment {
    config::Environment::with_prefix("DOCDASH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_has_catalog_and_presets() {
        let config = Config::default();
        assert_eq!(config.models.catalog.len(), 4);
        assert_eq!(config.credits.presets[1].credits, 500);
        assert_eq!(config.uploads.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.ui.locale, "en");
    }

    #[test]
    fn test_logs_path_is_under_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let logs = config.logs_path();
        assert!(logs.starts_with(temp_dir.path()));
        assert!(logs.ends_with("logs"));
    }

    #[test]
    fn test_save_and_reload_round_trips_through_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.base_url = "https://api.example.test".to_string();
        config.ui.locale = "es".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.example.test");
        assert_eq!(loaded.ui.locale, "es");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partial.toml");
        std::fs::write(&path, "[ui]\nrefresh_rate_ms = 100\n").unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.ui.refresh_rate_ms, 100);
        assert_eq!(loaded.ui.locale, "en");
        assert_eq!(loaded.credits.presets.len(), 4);
    }

    #[test]
    fn test_env_vars_use_single_underscore_after_prefix() {
        let vars: config::Map<String, String> = [
            ("DOCDASH_API__BASE_URL", "http://env.example/"),
            ("DOCDASH_UI__LOCALE", "de"),
            ("DOCDASH_API_HOSTNAME", "http://legacy.example"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let builder = Config::defaults_builder()
            .unwrap()
            .add_source(env_source().source(Some(vars)));
        let loaded = Config::finish(builder).unwrap();

        assert_eq!(loaded.api.base_url, "http://env.example");
        assert_eq!(loaded.ui.locale, "de");
    }
}
