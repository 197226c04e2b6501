pub mod settings;

pub use settings::{ConfigError, GitSettings, LoggingConfig, Settings};
