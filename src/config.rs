use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::logging::{parse_log_level, LogFormat};
use crate::queue::FlushConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "LISTQUEUE_CONFIG";

/// Logging settings as written in the `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSettings {
    /// Console level: error, warn, info, debug, trace or off
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    /// File level; defaults to the console level when a file is set
    pub file_level: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
            file_level: None,
        }
    }
}

impl LoggingSettings {
    pub fn console_level(&self) -> Result<log::LevelFilter> {
        parse_log_level(&self.level).context("Invalid [logging] level")
    }

    pub fn file_level(&self) -> Result<Option<log::LevelFilter>> {
        self.file_level
            .as_deref()
            .map(parse_log_level)
            .transpose()
            .context("Invalid [logging] file-level")
    }
}

/// Feed simulation settings as written in the `[feed]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FeedSettings {
    /// Number of comments to produce
    pub messages: usize,
    /// Produce comments in shuffled batches instead of one at a time
    pub bulk: bool,
    pub bulk_size: usize,
    /// Delay between single comments or batches
    pub produce_interval_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            messages: 100,
            bulk: false,
            bulk_size: 10,
            produce_interval_ms: 20,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub queue: FlushConfig,
    pub logging: LoggingSettings,
    pub feed: FeedSettings,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML content")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML, suitable for `--export-config`
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Write the configuration to `path`
    pub fn export(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        info!("Exported configuration to: {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.queue.validate().context("Invalid [queue] section")?;
        self.logging.console_level()?;
        self.logging.file_level()?;
        if self.feed.bulk_size == 0 {
            anyhow::bail!("Invalid [feed] section: bulk-size must be at least 1");
        }
        Ok(())
    }

    /// File the configuration was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $LISTQUEUE_CONFIG
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("listqueue").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".listqueue.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.listqueue.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.queue, FlushConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.feed.bulk_size, 10);
        assert!(config.source().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_content = r#"
[queue]
queue_threshold = 10
insert_at_top = true

[logging]
format = "json"
file = "/tmp/listqueue.log"
file-level = "trace"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.queue.queue_threshold, 10);
        assert_eq!(config.queue.flush_interval(), Duration::from_millis(1000));
        assert!(config.queue.insert_at_top);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/listqueue.log")));
        assert_eq!(config.logging.file_level().unwrap(), Some(log::LevelFilter::Trace));
        assert_eq!(config.feed, FeedSettings::default());
    }

    #[test]
    fn test_invalid_sections_rejected() {
        assert!(AppConfig::from_toml_str("[queue]\nqueue_threshold = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").is_err());
        assert!(AppConfig::from_toml_str("[feed]\nbulk-size = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[queue\n").is_err());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[feed]\nmessages = 7\nbulk = true\n").unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.feed.messages, 7);
        assert!(config.feed.bulk);
        assert_eq!(config.source(), Some(temp_file.path()));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = AppConfig::load_from_file(Path::new("/nonexistent/listqueue.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/listqueue.toml"));
    }

    #[test]
    fn test_export_round_trip() {
        let mut config = AppConfig::default();
        config.queue.queue_threshold = 25;
        config.feed.produce_interval_ms = 5;

        let temp_file = NamedTempFile::new().unwrap();
        config.export(temp_file.path()).unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.queue, config.queue);
        assert_eq!(loaded.feed, config.feed);
    }

    #[test]
    fn test_discovery_order() {
        let paths = discover_config_files();
        assert_eq!(paths.last(), Some(&PathBuf::from("./.listqueue.toml")));
    }
}
