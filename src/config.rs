//! Server configuration loaded once at startup.
//!
//! Environment variables override the built-in defaults; CLI flags (parsed in
//! `main.rs`) override both for transport selection and bind address.

use std::env;

/// Default upstream fact provider.
const DEFAULT_API_BASE_URL: &str = "https://catfact.ninja";
/// Default bind host for the HTTP transport.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port for the HTTP transport.
pub const DEFAULT_PORT: u16 = 3002;

/// Client-side rate limiting ceilings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Upstream requests allowed per second.
    pub per_second: u32,
    /// Upstream requests allowed per month.
    pub per_month: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            per_month: 15_000,
        }
    }
}

/// Configuration shared by both transports.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Cat facts API base URL (no trailing slash).
    pub api_base_url: String,
    /// Default number of facts for `get_cat_facts` when `limit` is omitted.
    pub default_limit: u32,
    /// Upper clamp for `limit`.
    pub max_limit: u32,
    /// Lower bound for `max_length`.
    pub min_length: u32,
    /// Upper bound for `max_length`.
    pub max_length: u32,
    /// Rate limiting ceilings for the upstream API.
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_limit: 5,
            max_limit: 100,
            min_length: 1,
            max_length: 500,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("CAT_FACTS_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            default_limit: env_parse("DEFAULT_LIMIT", defaults.default_limit),
            max_limit: env_parse("MAX_LIMIT", defaults.max_limit),
            min_length: env_parse("MIN_LENGTH", defaults.min_length),
            max_length: env_parse("MAX_LENGTH", defaults.max_length),
            rate_limit: RateLimitConfig {
                per_second: env_parse(
                    "RATE_LIMIT_PER_SECOND",
                    defaults.rate_limit.per_second,
                ),
                per_month: env_parse("RATE_LIMIT_PER_MONTH", defaults.rate_limit.per_month),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
