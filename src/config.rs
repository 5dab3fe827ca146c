use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:8788";
const DEFAULT_TOAST_SECS: u64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every endpoint hangs off, e.g. `http://host/api`.
    pub api_url: String,
    /// Origin the edge proxy forwards `/api/*` to.
    pub backend_origin: Option<String>,
    pub proxy_addr: String,
    pub toast_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_url = non_empty_env("QUILL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let backend_origin = non_empty_env("BACKEND_ORIGIN");
        let proxy_addr =
            non_empty_env("QUILL_PROXY_ADDR").unwrap_or_else(|| DEFAULT_PROXY_ADDR.to_string());
        let toast_secs = match non_empty_env("QUILL_TOAST_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("QUILL_TOAST_SECS must be a number, got '{raw}'"))?,
            None => DEFAULT_TOAST_SECS,
        };

        Ok(Self {
            api_url,
            backend_origin,
            proxy_addr,
            toast_secs,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.api_url) {
            bail!(
                "Invalid QUILL_API_URL '{}': expected http:// or https:// URL",
                self.api_url
            );
        }

        if let Some(origin) = &self.backend_origin {
            if !is_http_url(origin) {
                bail!("Invalid BACKEND_ORIGIN '{origin}': expected http:// or https:// URL");
            }
        }

        self.proxy_socket_addr()?;
        Ok(())
    }

    pub fn proxy_socket_addr(&self) -> Result<SocketAddr> {
        self.proxy_addr
            .parse()
            .with_context(|| format!("Invalid proxy listen address '{}'", self.proxy_addr))
    }

    pub fn toast_lifetime(&self) -> Duration {
        Duration::from_secs(self.toast_secs.max(1))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_falls_back_to_defaults() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        for key in [
            "QUILL_API_URL",
            "BACKEND_ORIGIN",
            "QUILL_PROXY_ADDR",
            "QUILL_TOAST_SECS",
        ] {
            std::env::remove_var(key);
        }

        let config = Config::load().expect("defaults load");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.backend_origin, None);
        assert_eq!(config.proxy_addr, DEFAULT_PROXY_ADDR);
        assert_eq!(config.toast_lifetime(), Duration::from_secs(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_rejects_non_numeric_toast_secs() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var("QUILL_TOAST_SECS", "soon");
        assert!(Config::load().is_err());
        std::env::remove_var("QUILL_TOAST_SECS");
    }
}
