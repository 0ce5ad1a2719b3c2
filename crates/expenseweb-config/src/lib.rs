//! Configuration management for expenseweb
//!
//! This module handles loading, validation, and management of
//! expenseweb configuration from YAML files: the demo-mode flag, the
//! remote API base URL and the fallback dataset used in demo mode.

pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use error::ConfigResult;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Remote expenses API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL of the API, without the `/expenses` resource path
    #[serde(default)]
    pub base_url: String,
    /// Skip the API entirely and run on the demo dataset
    #[serde(default = "default_false")]
    pub use_demo_mode: bool,
}

fn default_false() -> bool {
    false
}

/// One record of the fallback dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleExpense {
    pub expense_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub date: String,
}

impl SampleExpense {
    pub fn new(expense_id: &str, amount: f64, category: &str, notes: &str, date: &str) -> Self {
        Self {
            expense_id: expense_id.to_string(),
            amount,
            category: category.to_string(),
            notes: notes.to_string(),
            date: date.to_string(),
        }
    }
}

fn default_demo_data() -> Vec<SampleExpense> {
    vec![
        SampleExpense::new("demo-1", 120.0, "Food", "Demo food expense", "2025-01-05T12:00:00Z"),
        SampleExpense::new("demo-2", 350.0, "Travel", "Demo travel charge", "2025-01-10T15:30:00Z"),
    ]
}

/// Page and card display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Page title
    #[serde(default = "default_title")]
    pub title: String,
    /// Symbol printed in front of amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Categories offered in the form and the category filter
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            currency_symbol: default_currency_symbol(),
            categories: default_categories(),
        }
    }
}

fn default_title() -> String {
    "Expense Tracker".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_categories() -> Vec<String> {
    ["Food", "Travel", "Shopping", "Bills", "Health", "Other"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Fallback dataset for demo mode
    #[serde(default = "default_demo_data")]
    pub demo_data: Vec<SampleExpense>,
    /// Display settings
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            demo_data: default_demo_data(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        Self::from_yaml(&content)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path.to_path_buf())
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// The API base URL is not checked here; a bad URL puts
    /// the session in demo mode at load time instead of refusing to start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.ui.currency_symbol.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ui.currency_symbol".to_string(),
                reason: "Currency symbol must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (index, sample) in self.demo_data.iter().enumerate() {
            if sample.expense_id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("demo_data[{}].expense_id", index),
                    reason: "Demo records need an identifier".to_string(),
                });
            }
            if !seen.insert(sample.expense_id.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("Duplicate demo expense id: {}", sample.expense_id),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Whether the base URL is set at all (validity is checked by the client)
    pub fn has_api_base(&self) -> bool {
        !self.api.base_url.trim().is_empty()
    }

    /// Address the UI server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.api.use_demo_mode);
        assert_eq!(config.demo_data.len(), 2);
        assert_eq!(config.demo_data[0].expense_id, "demo-1");
        assert_eq!(config.demo_data[1].category, "Travel");
    }

    #[test]
    fn test_generated_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.demo_data.len(), 2);
        assert_eq!(config.ui.currency_symbol, "₹");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "api:\n  base_url: \"https://example.com/prod/\"\n  use_demo_mode: true\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.api.use_demo_mode);
        assert_eq!(config.api.base_url, "https://example.com/prod/");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.demo_data.len(), 2);
        assert!(config.has_api_base());
    }

    #[test]
    fn test_empty_demo_data_allowed() {
        let config = Config::from_yaml("demo_data: []\n").unwrap();
        assert!(config.demo_data.is_empty());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
    }

    #[test]
    fn test_duplicate_demo_ids_rejected() {
        let yaml = r#"
demo_data:
  - { expense_id: a, amount: 1, category: Food, notes: "", date: "2025-01-01" }
  - { expense_id: a, amount: 2, category: Food, notes: "", date: "2025-01-02" }
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        let config = Config::load_or_default(Path::new("/definitely/not/here.yaml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_unreadable_path_reports_io_error() {
        let dir = std::env::temp_dir();
        let err = Config::load(dir.clone()).unwrap_err();
        match err {
            ConfigError::IoError { path, .. } => assert_eq!(path, dir.display().to_string()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_base_url() {
        let config = Config::default();
        assert!(!config.has_api_base());
    }
}
