use std::{fs, path::PathBuf};

use serde::Deserialize;
use storefront::Presentation;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "bot.toml";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOT_TOKEN environment variable not set")]
    MissingToken,
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to load {path}: {message}")]
    File { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bot_token: Option<String>,
    pub api_base_url: String,
    pub catalog_path: Option<PathBuf>,
    pub poll_timeout_seconds: u64,
    pub max_concurrent_updates: usize,
    pub shop_name: String,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        let presentation = Presentation::default();
        Self {
            bot_token: None,
            api_base_url: telegram::DEFAULT_API_BASE_URL.into(),
            catalog_path: None,
            poll_timeout_seconds: 30,
            max_concurrent_updates: 16,
            shop_name: presentation.shop_name,
            currency_symbol: presentation.currency_symbol,
        }
    }
}

impl Settings {
    /// The credential is the one setting without a usable default.
    pub fn bot_token(&self) -> Result<&str, ConfigError> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            shop_name: self.shop_name.clone(),
            currency_symbol: self.currency_symbol.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    bot_token: Option<String>,
    api_base_url: Option<String>,
    catalog_path: Option<PathBuf>,
    poll_timeout_seconds: Option<u64>,
    max_concurrent_updates: Option<usize>,
    shop_name: Option<String>,
    currency_symbol: Option<String>,
}

/// Defaults, then `bot.toml` (or `APP__CONFIG_PATH`) when present, then
/// environment variables.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_with(|key| std::env::var(key).ok())
}

/// A missing default `bot.toml` is skipped; an explicitly named file must
/// be readable.
fn load_settings_with(env: impl Fn(&str) -> Option<String>) -> Result<Settings, ConfigError> {
    let explicit = env("APP__CONFIG_PATH");
    let path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());

    let mut settings = Settings::default();
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &path, &raw)?,
        Err(error) if explicit.is_some() => {
            return Err(ConfigError::File {
                path,
                message: error.to_string(),
            })
        }
        Err(_) => {}
    }
    apply_env(&mut settings, &env)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, path: &str, raw: &str) -> Result<(), ConfigError> {
    let file: FileSettings = toml::from_str(raw).map_err(|error| ConfigError::File {
        path: path.to_string(),
        message: error.message().to_string(),
    })?;

    if let Some(v) = file.bot_token {
        settings.bot_token = Some(v);
    }
    if let Some(v) = file.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file.catalog_path {
        settings.catalog_path = Some(v);
    }
    if let Some(v) = file.poll_timeout_seconds {
        settings.poll_timeout_seconds = v;
    }
    if let Some(v) = file.max_concurrent_updates {
        settings.max_concurrent_updates = v;
    }
    if let Some(v) = file.shop_name {
        settings.shop_name = v;
    }
    if let Some(v) = file.currency_symbol {
        settings.currency_symbol = v;
    }

    validate(settings)
}

fn apply_env(
    settings: &mut Settings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = env("BOT_TOKEN") {
        settings.bot_token = Some(v);
    }
    if let Some(v) = env("APP__BOT_TOKEN") {
        settings.bot_token = Some(v);
    }

    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__CATALOG_PATH") {
        settings.catalog_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env("APP__POLL_TIMEOUT_SECONDS") {
        settings.poll_timeout_seconds = v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "APP__POLL_TIMEOUT_SECONDS",
            value: v,
        })?;
    }
    if let Some(v) = env("APP__MAX_CONCURRENT_UPDATES") {
        settings.max_concurrent_updates =
            v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "APP__MAX_CONCURRENT_UPDATES",
                value: v,
            })?;
    }

    if let Some(v) = env("APP__SHOP_NAME") {
        settings.shop_name = v;
    }
    if let Some(v) = env("APP__CURRENCY_SYMBOL") {
        settings.currency_symbol = v;
    }

    validate(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.max_concurrent_updates == 0 {
        return Err(ConfigError::InvalidValue {
            key: "max_concurrent_updates",
            value: "0".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
