//! Startup configuration.
//!
//! Defaults, then `<config_dir>/foodrelief/config.toml`, then the environment
//! (a `.env` file is honoured). Read once and passed around by value.

use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::realtime::ReconnectPolicy;

pub const ENV_API_URL: &str = "FOODRELIEF_API_URL";
pub const ENV_WS_URL: &str = "FOODRELIEF_WS_URL";
pub const ENV_GOOGLE_CLIENT_ID: &str = "FOODRELIEF_GOOGLE_CLIENT_ID";
pub const ENV_MAPS_API_KEY: &str = "FOODRELIEF_MAPS_API_KEY";
pub const ENV_REQUEST_TIMEOUT: &str = "FOODRELIEF_REQUEST_TIMEOUT_SECS";

/// What a deactivating toggle sends for the emergency details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationPolicy {
    /// Send the held location, description and items unchanged.
    #[default]
    KeepDetails,
    /// Send empty details along with `active = false`.
    ClearDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub ws_url: String,
    pub oauth_client_id: Option<String>,
    pub maps_api_key: Option<String>,
    pub request_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    pub emergency_deactivation: DeactivationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            ws_url: "ws://localhost:5000".to_string(),
            oauth_client_id: None,
            maps_api_key: None,
            request_timeout: Duration::from_secs(15),
            reconnect: ReconnectPolicy::default(),
            emergency_deactivation: DeactivationPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    ws_url: Option<String>,
    oauth_client_id: Option<String>,
    maps_api_key: Option<String>,
    request_timeout_secs: Option<u64>,
    emergency_deactivation: Option<DeactivationPolicy>,
    reconnect: Option<FileReconnect>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileReconnect {
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    multiplier: Option<u32>,
    max_attempts: Option<u32>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("org", "foodrelief", "FoodRelief")?;
        Some(proj.config_dir().join("config.toml"))
    }

    /// Full startup load: file at the default path, `.env`, process env.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
        }

        let mut config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        log::info!(
            "API at {}, push channel at {}",
            config.api_base_url,
            config.ws_url
        );
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        let mut config = Self::default();
        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        if let Some(url) = file.ws_url {
            config.ws_url = url;
        }
        config.oauth_client_id = file.oauth_client_id.filter(|s| !s.is_empty());
        config.maps_api_key = file.maps_api_key.filter(|s| !s.is_empty());
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = request_timeout("request_timeout_secs", secs)?;
        }
        if let Some(policy) = file.emergency_deactivation {
            config.emergency_deactivation = policy;
        }
        if let Some(r) = file.reconnect {
            if let Some(ms) = r.initial_delay_ms {
                config.reconnect.initial_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = r.max_delay_ms {
                config.reconnect.max_delay = Duration::from_millis(ms);
            }
            if let Some(m) = r.multiplier {
                config.reconnect.multiplier = m.max(1);
            }
            if r.max_attempts.is_some() {
                config.reconnect.max_attempts = r.max_attempts;
            }
        }
        Ok(config)
    }

    /// Environment values override whatever is already set.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_WS_URL) {
            self.ws_url = url;
        }
        if let Some(id) = get(ENV_GOOGLE_CLIENT_ID) {
            self.oauth_client_id = Some(id);
        }
        if let Some(key) = get(ENV_MAPS_API_KEY) {
            self.maps_api_key = Some(key);
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::config(format!("{ENV_REQUEST_TIMEOUT}: {e}")))?;
            self.request_timeout = request_timeout(ENV_REQUEST_TIMEOUT, secs)?;
        }
        Ok(())
    }
}

/// A zero timeout would fail every request before it is sent.
fn request_timeout(key: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::config(format!("{key} must be at least 1")));
    }
    Ok(Duration::from_secs(secs))
}
