use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// A single price fetch can fail three ways; none of them is retried
/// anywhere in the system.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{symbol}: upstream returned {status}")]
    Status { symbol: String, status: StatusCode },
    #[error("{symbol}: request failed: {source}")]
    Transport {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{symbol}: malformed price body: {source}")]
    Body {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// True for the failure class the upstream produces routinely:
    /// a 404 for a symbol it does not serve. Logged at debug, not warn.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            FetchError::Status { status, .. } if *status == StatusCode::NOT_FOUND
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } | FetchError::Body { source, .. } => {
                source.status()
            }
        }
    }
}

/// Upstream body is { symbol, price, currency, last_refreshed, source };
/// only `price` is consumed. An absent or null price decodes to the 0.0
/// "never fetched" sentinel, which the refresher filters out.
#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    price: Option<f64>,
}

/// Seam between the refresher and the network, so the loop is testable
/// against a scripted source.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError>;
}

/// Production source: one GET per symbol against the price API.
pub struct HttpPriceClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPriceClient {
    /// The request timeout must stay below the refresh interval so a hung
    /// upstream cannot stack in-flight ticks.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceClient {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = format!("{}/price/{}", self.base_url, symbol);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                symbol: symbol.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status,
            });
        }

        let body: PriceResponse =
            response.json().await.map_err(|source| FetchError::Body {
                symbol: symbol.to_string(),
                source,
            })?;

        Ok(body.price.unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_the_expected_failure() {
        let err = FetchError::Status {
            symbol: "TA35".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(err.is_expected());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn server_errors_are_not_expected() {
        let err = FetchError::Status {
            symbol: "ETH".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(!err.is_expected());
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn price_body_decodes_the_price_field_only() {
        let body: PriceResponse = serde_json::from_str(
            r#"{"symbol":"ETH","price":3500.0,"currency":"USD","last_refreshed":"2024-01-01","source":"test"}"#,
        )
        .unwrap();
        assert_eq!(body.price, Some(3500.0));
    }

    #[test]
    fn absent_or_null_price_decodes_to_none() {
        let absent: PriceResponse = serde_json::from_str(r#"{"symbol":"ETH"}"#).unwrap();
        assert_eq!(absent.price, None);

        let null: PriceResponse =
            serde_json::from_str(r#"{"symbol":"ETH","price":null}"#).unwrap();
        assert_eq!(null.price, None);
    }
}
