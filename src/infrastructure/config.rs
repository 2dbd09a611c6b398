use crate::domain::error::RinthError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "RINTH_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Personal access token or OAuth bearer token.
    pub token: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_base_url_v3")]
    pub base_url_v3: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_url_v3: default_base_url_v3(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            language: default_language(),
            theme: default_theme(),
            accent_color: default_accent_color(),
            api: ApiConfig::default(),
            logging: Logging::default(),
        }
    }
}

// Defaults
fn default_language() -> String {
    "en".to_string()
}
fn default_theme() -> String {
    "dark".to_string()
}
fn default_accent_color() -> String {
    "#30B27C".to_string()
}
fn default_base_url() -> String {
    "https://api.modrinth.com/v2".to_string()
}
fn default_base_url_v3() -> String {
    "https://api.modrinth.com/v3".to_string()
}
fn default_user_agent() -> String {
    format!("rinth/{}", env!("CARGO_PKG_VERSION"))
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_cache_ttl_ms() -> u64 {
    5000
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

impl Config {
    /// Token from the environment when set, otherwise the stored one.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone().filter(|t| !t.trim().is_empty()))
    }

    /// Update one user-facing setting by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RinthError> {
        match key {
            "language" => match value {
                "en" | "ru" => self.language = value.to_string(),
                _ => {
                    return Err(RinthError::Config(format!(
                        "Unsupported language: {} (expected en or ru)",
                        value
                    )))
                }
            },
            "theme" => match value {
                "dark" | "light" => self.theme = value.to_string(),
                _ => {
                    return Err(RinthError::Config(format!(
                        "Unsupported theme: {} (expected dark or light)",
                        value
                    )))
                }
            },
            "accent_color" => {
                if crate::presentation::theme::parse_hex_color(value).is_none() {
                    return Err(RinthError::Config(format!(
                        "Invalid accent color: {} (expected #RRGGBB)",
                        value
                    )));
                }
                self.accent_color = value.to_string();
            }
            _ => return Err(RinthError::Config(format!("Unknown setting: {}", key))),
        }
        Ok(())
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("rinth").join("config.toml"))
}

pub fn load_config() -> Result<Config, RinthError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// Read a config file, falling back to defaults when it is missing or malformed.
pub fn load_config_from(path: &Path) -> Result<Config, RinthError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        match toml::from_str::<Config>(&content) {
            Ok(config) => return Ok(config),
            Err(e) => {
                eprintln!(
                    "Warning: Failed to parse config file: {}. Using defaults.",
                    e
                );
            }
        }
    }

    Ok(Config::default())
}

pub fn save_config(config: &Config) -> Result<PathBuf, RinthError> {
    let path = get_config_path()
        .ok_or_else(|| RinthError::Config("Cannot determine config directory".to_string()))?;
    save_config_to(&path, config)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<(), RinthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn generate_config_sample() -> Result<(), RinthError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            eprintln!("Config file already exists at: {}", path.display());
            return Ok(());
        }

        save_config_to(&path, &Config::default())?;
        println!("Generated config file at: {}", path.display());
    } else {
        return Err(RinthError::Config(
            "Cannot determine config directory".to_string(),
        ));
    }

    Ok(())
}
