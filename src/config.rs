//! Client configuration
//!
//! Read from environment variables with defaults suited to local development.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the tutoring backend
    pub api_url: String,
    /// SQLite file holding device-local notes and preferences
    pub data_path: PathBuf,
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_path: default_data_path(std::env::var("HOME").ok()),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("HOMEGROWN_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_path = lookup("HOMEGROWN_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| default_data_path(lookup("HOME")), PathBuf::from);

        let http_timeout = lookup("HOMEGROWN_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .map_or(
                Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
                Duration::from_secs,
            );

        Self {
            api_url,
            data_path,
            http_timeout,
        }
    }
}

fn default_data_path(home: Option<String>) -> PathBuf {
    let home = home.unwrap_or_else(|| "/tmp".to_string());
    PathBuf::from(home).join(".homegrown").join("device.db")
}
