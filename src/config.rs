use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use nutriplan_core::DEFAULT_DEBOUNCE;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the cached plan
    pub data_dir: ConfigValue<PathBuf>,
    /// Base URL of the remote plan store (e.g. "http://localhost:5000")
    pub server_url: ConfigValue<Option<String>>,
    /// User the remote plan is stored under
    pub user_id: ConfigValue<Option<String>>,
    /// Quiet period before a change is pushed to the remote store
    pub debounce_ms: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    server_url: Option<String>,
    user_id: Option<String>,
    debounce_ms: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut server_url = ConfigValue::new(None, ConfigSource::Default);
        let mut user_id = ConfigValue::new(None, ConfigSource::Default);
        let mut debounce_ms = ConfigValue::new(
            DEFAULT_DEBOUNCE.as_millis() as u64,
            ConfigSource::Default,
        );
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(url) = file_config.server_url {
                server_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(user) = file_config.user_id {
                user_id = ConfigValue::new(Some(user), ConfigSource::File);
            }
            if let Some(ms) = file_config.debounce_ms {
                debounce_ms = ConfigValue::new(ms, ConfigSource::File);
            }
        }

        if let Ok(dir) = std::env::var("NUTRIPLAN_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("NUTRIPLAN_SERVER_URL") {
            server_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Ok(user) = std::env::var("NUTRIPLAN_USER_ID") {
            user_id = ConfigValue::new(Some(user), ConfigSource::Environment);
        }
        if let Ok(ms) = std::env::var("NUTRIPLAN_DEBOUNCE_MS") {
            let ms = ms
                .parse()
                .map_err(|_| ConfigError::InvalidValue("NUTRIPLAN_DEBOUNCE_MS", ms))?;
            debounce_ms = ConfigValue::new(ms, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            server_url,
            user_id,
            debounce_ms,
            config_file,
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.value)
    }

    /// Returns true if a remote plan store and a user to store under are set.
    pub fn is_remote_configured(&self) -> bool {
        self.server_url.value.as_deref().is_some_and(|url| !url.is_empty())
            && self.user_id.value.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/nutriplan/
    /// - macOS: ~/Library/Application Support/nutriplan/
    /// - Windows: %APPDATA%/nutriplan/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutriplan")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/nutriplan/
    /// - macOS: ~/Library/Application Support/nutriplan/
    /// - Windows: %APPDATA%/nutriplan/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutriplan")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("nutriplan"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.debounce_ms.value, 1000);
        assert_eq!(config.debounce(), Duration::from_secs(1));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/plans").unwrap();
        writeln!(file, "server_url: http://plans.example:5000").unwrap();
        writeln!(file, "user_id: alice").unwrap();
        writeln!(file, "debounce_ms: 250").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/plans"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(
            config.server_url.value.as_deref(),
            Some("http://plans.example:5000")
        );
        assert_eq!(config.user_id.value.as_deref(), Some("alice"));
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert!(config.is_remote_configured());
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: plans\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("plans"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "user_id: fromfile\n").unwrap();

        std::env::set_var("NUTRIPLAN_USER_ID", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.user_id.value.as_deref(), Some("fromenv"));
        assert_eq!(config.user_id.source, ConfigSource::Environment);

        std::env::remove_var("NUTRIPLAN_USER_ID");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_partial_file_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "server_url: http://localhost:5000\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.server_url.source, ConfigSource::File);
        assert!(config.user_id.value.is_none());
        assert!(!config.is_remote_configured());
    }

    #[test]
    fn test_empty_user_id_is_not_remote_configured() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "server_url: http://localhost:5000\nuser_id: \"\"\n",
        )
        .unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.user_id.value.as_deref(), Some(""));
        assert!(!config.is_remote_configured());
    }
}
