//! HTTP client for the upstream cat facts API.
//!
//! Validation runs before the rate-limit check, and the rate-limit check runs
//! before any network call, so invalid input never consumes a rate-limit slot
//! or triggers a request.

use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::rate_limit::RateLimiter;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Single fact as returned by `GET /fact`.
#[derive(Debug, Deserialize)]
pub struct FactResponse {
    pub fact: String,
    pub length: u32,
}

/// Fact list as returned by `GET /facts`.
#[derive(Debug, Deserialize)]
pub struct FactsResponse {
    pub data: Vec<FactResponse>,
}

/// Client for the upstream fact provider. Each session owns its own instance;
/// only the rate limiter is shared.
pub struct CatFactsClient {
    config: Arc<ServerConfig>,
    limiter: Arc<RateLimiter>,
    http: reqwest::Client,
}

impl CatFactsClient {
    pub fn new(config: Arc<ServerConfig>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            config,
            limiter,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .expect("reqwest client"),
        }
    }

    /// Validate tool arguments without touching the network. `limit` is
    /// clamped rather than rejected, so only `max_length` can fail here.
    pub fn validate_args(&self, max_length: Option<u32>) -> Result<(), ToolError> {
        if let Some(len) = max_length {
            if len < self.config.min_length || len > self.config.max_length {
                return Err(ToolError::Validation(format!(
                    "max_length must be between {} and {}",
                    self.config.min_length, self.config.max_length
                )));
            }
        }
        Ok(())
    }

    /// Fetch one random fact, optionally capped in length.
    pub async fn get_single_fact(&self, max_length: Option<u32>) -> Result<String, ToolError> {
        self.limiter.check_and_count()?;

        let url = self.fact_url(max_length);
        debug!(%url, "Fetching single fact");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::Upstream(response.status()));
        }

        let fact: FactResponse = response.json().await?;
        Ok(format_fact(&fact))
    }

    /// Fetch several facts. `limit` is clamped into `[1, max_limit]` before
    /// the request is constructed.
    pub async fn get_multiple_facts(
        &self,
        limit: Option<u32>,
        max_length: Option<u32>,
    ) -> Result<String, ToolError> {
        self.limiter.check_and_count()?;

        let url = self.facts_url(limit, max_length);
        debug!(%url, "Fetching multiple facts");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::Upstream(response.status()));
        }

        let facts: FactsResponse = response.json().await?;
        Ok(format_facts(&facts))
    }

    fn fact_url(&self, max_length: Option<u32>) -> String {
        let mut url = format!("{}/fact", self.config.api_base_url);
        if let Some(len) = max_length {
            url.push_str(&format!("?max_length={len}"));
        }
        url
    }

    fn facts_url(&self, limit: Option<u32>, max_length: Option<u32>) -> String {
        let limit = self.clamp_limit(limit);
        let mut url = format!("{}/facts?limit={limit}", self.config.api_base_url);
        if let Some(len) = max_length {
            url.push_str(&format!("&max_length={len}"));
        }
        url
    }

    fn clamp_limit(&self, limit: Option<u32>) -> u32 {
        limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit)
    }
}

fn format_fact(fact: &FactResponse) -> String {
    format!("Fact: {}\nLength: {}", fact.fact, fact.length)
}

fn format_facts(facts: &FactsResponse) -> String {
    if facts.data.is_empty() {
        return "no facts found".to_string();
    }
    facts
        .data
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. {} (len {})", i + 1, f.fact, f.length))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;

    fn client() -> CatFactsClient {
        let config = Arc::new(ServerConfig::default());
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            per_second: 100,
            per_month: 100,
        }));
        CatFactsClient::new(config, limiter)
    }

    #[test]
    fn validate_rejects_max_length_out_of_bounds() {
        let client = client();
        assert!(client.validate_args(Some(0)).is_err());
        assert!(client.validate_args(Some(501)).is_err());
        assert!(client.validate_args(Some(1)).is_ok());
        assert!(client.validate_args(Some(500)).is_ok());
        assert!(client.validate_args(None).is_ok());
    }

    #[test]
    fn validation_error_names_the_bounds() {
        let client = client();
        let err = client.validate_args(Some(9999)).unwrap_err();
        assert!(err.to_string().contains("between 1 and 500"));
    }

    #[test]
    fn limit_is_clamped_into_range() {
        let client = client();
        assert_eq!(client.clamp_limit(Some(500)), 100);
        assert_eq!(client.clamp_limit(Some(0)), 1);
        assert_eq!(client.clamp_limit(Some(42)), 42);
        assert_eq!(client.clamp_limit(None), 5);
    }

    #[test]
    fn fact_url_includes_optional_length_cap() {
        let client = client();
        assert_eq!(client.fact_url(None), "https://catfact.ninja/fact");
        assert_eq!(
            client.fact_url(Some(120)),
            "https://catfact.ninja/fact?max_length=120"
        );
    }

    #[test]
    fn facts_url_carries_clamped_limit_and_length() {
        let client = client();
        assert_eq!(
            client.facts_url(Some(2), None),
            "https://catfact.ninja/facts?limit=2"
        );
        assert_eq!(
            client.facts_url(Some(500), Some(80)),
            "https://catfact.ninja/facts?limit=100&max_length=80"
        );
    }

    #[test]
    fn single_fact_formatting() {
        let fact = FactResponse {
            fact: "X".into(),
            length: 1,
        };
        assert_eq!(format_fact(&fact), "Fact: X\nLength: 1");
    }

    #[test]
    fn multiple_fact_formatting_is_one_indexed() {
        let facts = FactsResponse {
            data: vec![
                FactResponse {
                    fact: "A".into(),
                    length: 1,
                },
                FactResponse {
                    fact: "B".into(),
                    length: 1,
                },
            ],
        };
        assert_eq!(format_facts(&facts), "1. A (len 1)\n2. B (len 1)");
    }

    #[test]
    fn empty_fact_list_yields_sentinel() {
        let facts = FactsResponse { data: vec![] };
        assert_eq!(format_facts(&facts), "no facts found");
    }
}
