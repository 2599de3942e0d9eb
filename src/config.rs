use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::defaults::CASE_TYPES;

pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub scraper: ScraperConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    /// Directory where retrieved order PDFs are stored.
    pub downloads_path: String,

    pub log_level: String,

    /// "text" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/court_data.db".to_string(),
            downloads_path: "downloads".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Enables the captcha probe endpoint and shows raw scrape payloads on case pages.
    pub debug: bool,

    /// Signs the session cookie that carries flash messages.
    pub secret_key: String,

    /// Whether to set the Secure flag on the session cookie.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            debug: false,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,

    pub search_path: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Attempts for a network fetch, including the first one
    pub max_retries: u32,

    /// Pause between loading the search form and submitting it
    pub request_delay_seconds: u64,

    /// Pause between failed attempts
    pub retry_delay_seconds: u64,

    pub user_agent: String,

    /// Case types offered on the search form, spelled as the court site lists them
    pub case_types: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://delhihighcourt.nic.in".to_string(),
            search_path: "/app/get-case-type-status".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            request_delay_seconds: 5,
            retry_delay_seconds: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            case_types: CASE_TYPES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl ScraperConfig {
    pub fn search_url(&self) -> Result<url::Url> {
        let base = url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid court base URL: {}", self.base_url))?;
        base.join(&self.search_path)
            .with_context(|| format!("Invalid search path: {}", self.search_path))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Loads `config.toml` (or defaults), then `.env`, then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from: {}", path.display());
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("court-fetcher").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".court-fetcher").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DATABASE_PATH") {
            self.general.database_path = normalize_database_url(&path);
        }
        if let Some(path) = lookup("DOWNLOADS_PATH") {
            self.general.downloads_path = path;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Some(debug) = lookup("DEBUG") {
            self.server.debug = parse_flag(&debug);
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        if let Some(key) = lookup("SECRET_KEY") {
            self.server.secret_key = key;
        }
        if let Some(url) = lookup("COURT_BASE_URL") {
            self.scraper.base_url = url;
        }
        if let Some(timeout) = lookup("SCRAPE_TIMEOUT") {
            self.scraper.timeout_seconds = parse_number("SCRAPE_TIMEOUT", &timeout)?;
        }
        if let Some(retries) = lookup("MAX_RETRIES") {
            self.scraper.max_retries = parse_number("MAX_RETRIES", &retries)?;
        }
        if let Some(delay) = lookup("REQUEST_DELAY") {
            self.scraper.request_delay_seconds = parse_number("REQUEST_DELAY", &delay)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scraper.max_retries == 0 {
            anyhow::bail!("scraper.max_retries must be at least 1");
        }

        if self.scraper.timeout_seconds == 0 {
            anyhow::bail!("scraper.timeout_seconds must be greater than 0");
        }

        if self.scraper.case_types.is_empty() {
            anyhow::bail!("scraper.case_types cannot be empty");
        }

        self.scraper.search_url()?;

        if self.server.secret_key.trim().is_empty() {
            anyhow::bail!("server.secret_key cannot be empty");
        }

        if self.server.secret_key == DEFAULT_SECRET_KEY && !self.server.debug {
            warn!("Using the built-in secret key; set SECRET_KEY for production");
        }

        Ok(())
    }
}

fn normalize_database_url(value: &str) -> String {
    if value.starts_with("sqlite:") {
        value.to_string()
    } else {
        format!("sqlite:{value}")
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{name} must be a number, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scraper.max_retries, 3);
        assert_eq!(config.scraper.timeout_seconds, 30);
        assert_eq!(config.server.port, 5000);
        assert!(!config.server.debug);
        assert_eq!(config.scraper.case_types.len(), CASE_TYPES.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[scraper]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [scraper]
            max_retries = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.scraper.max_retries, 5);
        assert_eq!(config.scraper.search_path, "/app/get-case-type-status");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_PATH", "court.db"),
            ("DEBUG", "True"),
            ("SCRAPE_TIMEOUT", "12"),
            ("MAX_RETRIES", "2"),
            ("REQUEST_DELAY", "0"),
            ("SECRET_KEY", "s3cret"),
        ]);

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.general.database_path, "sqlite:court.db");
        assert!(config.server.debug);
        assert_eq!(config.scraper.timeout_seconds, 12);
        assert_eq!(config.scraper.max_retries, 2);
        assert_eq!(config.scraper.request_delay_seconds, 0);
        assert_eq!(config.server.secret_key, "s3cret");
    }

    #[test]
    fn test_env_override_rejects_garbage_numbers() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "MAX_RETRIES").then(|| "three".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let mut config = Config::default();
        config.scraper.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraper.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_search_url_joins_path() {
        let config = ScraperConfig::default();
        assert_eq!(
            config.search_url().unwrap().as_str(),
            "https://delhihighcourt.nic.in/app/get-case-type-status"
        );
    }
}
