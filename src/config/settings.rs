use crate::git::executor::{DEFAULT_TIMEOUT, GitExecutor};
use crate::git::process;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub git: GitSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GitSettings {
    pub program: String,
    pub timeout_seconds: u64,
    /// WHATWG encoding label for git output; UTF-8 when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_encoding: Option<String>,
    /// Run git with `LC_ALL=C` so the English headers the parsers match are printed
    pub force_c_locale: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
            output_encoding: None,
            force_c_locale: true,
        }
    }
}

impl GitSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Resolve `output_encoding`, `None` meaning the UTF-8 default
    pub fn encoding(&self) -> Result<Option<&'static Encoding>, ConfigError> {
        match &self.output_encoding {
            None => Ok(None),
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .map(Some)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(format!("Unknown output encoding: {}", label))
                }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Log every git invocation with its arguments and full result
    pub log_commands: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_commands: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Settings {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitwrap"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from the default location, or defaults if the file is missing
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default_config());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;

        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Validate before saving
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn default_config() -> Self {
        Settings {
            git: GitSettings::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git.program must not be empty".to_string(),
            ));
        }

        if self.git.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        self.git.encoding()?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "logging.level must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Install the configured output encoding process-wide
    pub fn apply_output_encoding(&self) -> Result<(), ConfigError> {
        process::set_output_encoding(self.git.encoding()?);
        Ok(())
    }

    /// Executor configured from these settings
    pub fn executor(&self) -> GitExecutor {
        let executor = GitExecutor::new()
            .with_program(self.git.program.clone())
            .with_timeout(self.git.timeout())
            .with_log_commands(self.logging.log_commands);

        if self.git.force_c_locale {
            executor
        } else {
            executor.without_env("LC_ALL")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let settings = Settings::default_config();
        assert_eq!(settings.git.program, "git");
        assert_eq!(settings.git.timeout_seconds, 10);
        assert!(settings.git.force_c_locale);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.log_commands);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Settings::default_config().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut settings = Settings::default_config();
        settings.git.timeout_seconds = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_validate_unknown_encoding() {
        let mut settings = Settings::default_config();
        settings.git.output_encoding = Some("klingon-8".to_string());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_encoding_labels() {
        let mut settings = Settings::default_config();
        assert_eq!(settings.git.encoding().unwrap(), None);

        settings.git.output_encoding = Some("latin1".to_string());
        assert_eq!(
            settings.git.encoding().unwrap(),
            Some(encoding_rs::WINDOWS_1252)
        );

        settings.git.output_encoding = Some("Shift_JIS".to_string());
        assert_eq!(settings.git.encoding().unwrap(), Some(encoding_rs::SHIFT_JIS));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("[git]\ntimeout_seconds = 3\n").unwrap();
        assert_eq!(settings.git.timeout_seconds, 3);
        assert_eq!(settings.git.program, "git");
        assert_eq!(settings.logging, LoggingConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut settings = Settings::default_config();
        settings.git.timeout_seconds = 42;
        settings.git.output_encoding = Some("utf-8".to_string());
        settings.logging.log_commands = true;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[git]\ntimeout_seconds = 0\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));

        fs::write(&path, "not toml at all [").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_executor_from_settings() {
        let mut settings = Settings::default_config();
        settings.git.timeout_seconds = 7;
        let executor = settings.executor();
        assert_eq!(executor.program(), "git");
        assert_eq!(executor.timeout(), Duration::from_secs(7));
    }
}
