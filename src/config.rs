//! Centralized configuration.
//!
//! One place for env-tunables instead of scattered lookups; CLI flags
//! override these values where applicable.
//!
//! Env vars:
//! - COLSNAP_DIR             store root (default "./tables")
//! - COLSNAP_BASE_URL        data source base URL
//! - COLSNAP_HTTP_TIMEOUT_MS per-request timeout (default 10000)

use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_STORE_DIR: &str = "./tables";

#[derive(Clone, Debug)]
pub struct Config {
    /// Store root directory.
    pub store_dir: PathBuf,
    /// Base URL of the upstream JSON source.
    pub base_url: String,
    /// HTTP timeout per request, milliseconds.
    pub http_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_ms: 10_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("COLSNAP_DIR") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.store_dir = PathBuf::from(s);
            }
        }
        if let Ok(v) = std::env::var("COLSNAP_BASE_URL") {
            let s = v.trim().trim_end_matches('/');
            if !s.is_empty() {
                cfg.base_url = s.to_string();
            }
        }
        if let Ok(v) = std::env::var("COLSNAP_HTTP_TIMEOUT_MS") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.http_timeout_ms = n;
            }
        }

        cfg
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store_dir={} base_url={} http_timeout_ms={}",
            self.store_dir.display(),
            self.base_url,
            self.http_timeout_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.http_timeout_ms, 10_000);
    }
}
