//! Layered settings: defaults, optional TOML file, `APP__*` environment.

use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "address_book.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    pub lookup_base_url: String,
    pub database_url: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            lookup_base_url: "http://127.0.0.1:8080".into(),
            database_url: "sqlite://./data/address_book.db".into(),
            log_level: "info".into(),
        }
    }
}

/// Loads settings; a missing file is fine unless it was named explicitly.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<AppSettings> {
    let defaults = AppSettings::default();
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::new(DEFAULT_SETTINGS_FILE, FileFormat::Toml).required(false),
    };

    Config::builder()
        .set_default("lookup_base_url", defaults.lookup_base_url)?
        .set_default("database_url", defaults.database_url)?
        .set_default("log_level", defaults.log_level)?
        .add_source(file)
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()
        .context("failed to load address book settings")?
        .try_deserialize()
        .context("invalid address book settings")
}

/// Accepts bare paths as well as `sqlite:` URLs.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return AppSettings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
