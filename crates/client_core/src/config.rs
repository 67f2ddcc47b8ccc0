use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8081/api".into(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    pub fn server_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid catalog server url '{}'", self.server_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("catalog server url '{}' cannot carry a path", self.server_url);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Overlays keys from a `catalog.toml` document. Malformed documents
    /// leave the settings untouched.
    pub fn apply_file(&mut self, raw: &str) {
        let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
            return;
        };
        if let Some(v) = file_cfg.server_url {
            self.server_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CATALOG_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
    }
}

/// Defaults, then `catalog.toml` from `dir`, then the process environment.
pub fn load_settings_from(dir: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Ok(raw) = fs::read_to_string(dir.join(SETTINGS_FILE)) {
        settings.apply_file(&raw);
    }
    settings.apply_env(|key| std::env::var(key).ok());
    settings
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new("."))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
