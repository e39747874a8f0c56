//! Configuration management
//!
//! Settings are layered: defaults, then `engine-config.json` in the platform
//! config dir, then `S24_*` environment variables. A fresh checkout runs
//! against a local backend with zero setup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Port the local HTTP/SSE surface listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the Salão24h REST backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Bounded timeout for every backend request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    8123
}

fn default_backend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn backend_url(&self) -> Result<Url> {
        Url::parse(&self.backend_url)
            .with_context(|| format!("invalid backend_url: {}", self.backend_url))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Get config directory (S24_CONFIG_DIR, XDG or platform default)
pub fn get_config_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("S24_CONFIG_DIR") {
        return std::path::PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join("Library/Application Support/salao24h");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return std::path::PathBuf::from(xdg).join("salao24h");
        }
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join(".config/salao24h");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return std::path::PathBuf::from(appdata).join("salao24h");
        }
    }

    // Fallback to current directory
    std::path::PathBuf::from(".")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let builder = ::config::Config::builder()
        // Start with defaults
        .set_default("port", default_port() as i64)?
        .set_default("backend_url", default_backend_url())?
        .set_default("request_timeout_secs", default_request_timeout_secs() as i64)?
        // Load from config file if it exists
        .add_source(
            ::config::File::with_name(&config_dir.join("engine-config").to_string_lossy())
                .required(false),
        )
        // Override with environment variables (S24_PORT, S24_BACKEND_URL, ...)
        .add_source(::config::Environment::with_prefix("S24").try_parsing(true));

    let config: Config = builder.build()?.try_deserialize()?;

    // Validate eagerly so a bad URL fails at startup, not mid-login.
    config.backend_url()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert!(config.backend_url().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn file_fields_deserialize_with_partial_content() {
        let config: Config = serde_json::from_str(r#"{"port": 9999}"#).unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.backend_url, default_backend_url());
    }

    #[test]
    #[serial]
    fn load_config_layers_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("engine-config.json"),
            r#"{"port": 4242, "backend_url": "http://backend.test:3000"}"#,
        )
        .unwrap();
        env::set_var("S24_CONFIG_DIR", dir.path());
        env::set_var("S24_PORT", "5555");

        let config = load_config().expect("config should load");

        env::remove_var("S24_CONFIG_DIR");
        env::remove_var("S24_PORT");

        // Env beats file beats default
        assert_eq!(config.port, 5555);
        assert_eq!(config.backend_url, "http://backend.test:3000");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    #[serial]
    fn missing_config_file_falls_back_to_defaults() {
        env::set_var("S24_CONFIG_DIR", "/tmp/s24-test-nonexistent");

        let config = load_config().expect("config should load");

        env::remove_var("S24_CONFIG_DIR");

        assert_eq!(config.port, default_port());
        assert_eq!(config.backend_url, default_backend_url());
    }
}
