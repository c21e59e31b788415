//! Service configuration from the environment (`.env` is loaded by `main`).

use std::str::FromStr;
use crate::{AnalyticsError, Result};

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_BUFFER_MULTIPLIER: f64 = 1.0;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Applied to projections whose request leaves the buffer out.
    pub default_buffer_multiplier: f64,
    /// Upper bound on request bodies; order exports can be large.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            default_buffer_multiplier: DEFAULT_BUFFER_MULTIPLIER,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            default_buffer_multiplier: parse_var(&lookup, "DEFAULT_BUFFER_MULTIPLIER", DEFAULT_BUFFER_MULTIPLIER)?,
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        };
        let buffer = config.default_buffer_multiplier;
        if !buffer.is_finite() || buffer < 0.0 {
            return Err(AnalyticsError::InvalidConfig { key: "DEFAULT_BUFFER_MULTIPLIER", value: buffer.to_string() });
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> String { format!("0.0.0.0:{}", self.port) }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| AnalyticsError::InvalidConfig { key, value: raw }),
    }
}
