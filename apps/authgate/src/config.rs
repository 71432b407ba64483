use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{ControllerOptions, DEFAULT_API_BASE_URL};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "authgate.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub database_url: String,
    pub request_timeout_secs: u64,
    pub error_display_secs: u64,
    pub refresh_feedback_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_API_BASE_URL.into(),
            database_url: default_database_url(),
            request_timeout_secs: 15,
            error_display_secs: 5,
            refresh_feedback_secs: 2,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            error_display: Duration::from_secs(self.error_display_secs),
            refresh_feedback: Duration::from_secs(self.refresh_feedback_secs),
        }
    }
}

/// Optional keys read from the settings file.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    database_url: Option<String>,
    request_timeout_secs: Option<u64>,
    error_display_secs: Option<u64>,
    refresh_feedback_secs: Option<u64>,
}

/// Defaults, then `authgate.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(file_cfg) = read_settings_file(Path::new(SETTINGS_FILE)) {
        apply_file_settings(&mut settings, file_cfg);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn read_settings_file(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.error_display_secs {
        settings.error_display_secs = v;
    }
    if let Some(v) = file_cfg.refresh_feedback_secs {
        settings.refresh_feedback_secs = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("AUTHGATE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("AUTHGATE_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(parsed) = var("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = parsed;
    }
    if let Some(parsed) = var("APP__ERROR_DISPLAY_SECS").and_then(|v| v.parse().ok()) {
        settings.error_display_secs = parsed;
    }
    if let Some(parsed) = var("APP__REFRESH_FEEDBACK_SECS").and_then(|v| v.parse().ok()) {
        settings.refresh_feedback_secs = parsed;
    }
}

fn default_database_url() -> String {
    let root = dirs::data_local_dir()
        .map(|base| base.join("authgate"))
        .unwrap_or_else(|| PathBuf::from("./data"));
    sqlite_url_for(&root.join("session.sqlite3"))
}

pub fn sqlite_url_for(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
