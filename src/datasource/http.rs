//! HTTP implementations of the price feed and swap relay boundaries.

use super::{PriceFeed, PriceFeedError, PriceQuote, SwapError, SwapExecutor, SwapReceipt};
use crate::domain::{Price, PricePoint, TimeMs, TokenAddress};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Price feed client over a JSON quote service.
#[derive(Debug, Clone)]
pub struct HttpPriceFeed {
    client: Client,
    base_url: String,
}

impl HttpPriceFeed {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn get_json(&self, url: String) -> Result<serde_json::Value, PriceFeedError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(15)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                backoff::Error::transient(PriceFeedError::Network(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(PriceFeedError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(PriceFeedError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(PriceFeedError::Http {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(PriceFeedError::Parse(e.to_string())))
        })
        .await
    }
}

fn parse_price_field(value: &serde_json::Value) -> Option<Price> {
    match value {
        serde_json::Value::String(s) => Price::parse(s).ok(),
        serde_json::Value::Number(n) => Price::parse(&n.to_string()).ok(),
        _ => None,
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn latest_price(&self, address: &TokenAddress) -> Result<PriceQuote, PriceFeedError> {
        debug!("Fetching latest price for {}", address);
        let url = format!("{}/v1/price/{}", self.base_url, address);
        let body = self.get_json(url).await?;

        let price = body
            .get("price")
            .and_then(parse_price_field)
            .ok_or_else(|| PriceFeedError::Parse("Missing price field".to_string()))?;
        if !price.is_positive() {
            return Err(PriceFeedError::Unavailable(address.to_string()));
        }

        let as_of = body
            .get("asOf")
            .and_then(|v| v.as_i64())
            .map(TimeMs::new)
            .unwrap_or_else(TimeMs::now);

        Ok(PriceQuote { price, as_of })
    }

    async fn price_history(
        &self,
        address: &TokenAddress,
    ) -> Result<Vec<PricePoint>, PriceFeedError> {
        debug!("Fetching price history for {}", address);
        let url = format!("{}/v1/price/{}/history", self.base_url, address);
        let body = self.get_json(url).await?;

        let entries = body
            .as_array()
            .ok_or_else(|| PriceFeedError::Parse("Expected array response".to_string()))?;

        let mut points = Vec::new();
        for entry in entries {
            match parse_history_point(entry) {
                Some(point) => points.push(point),
                None => warn!("Skipping malformed history point for {}", address),
            }
        }
        points.sort_by_key(|p| p.at);
        Ok(points)
    }
}

fn parse_history_point(entry: &serde_json::Value) -> Option<PricePoint> {
    let price = entry.get("price").and_then(parse_price_field)?;
    let at = entry.get("timestamp").and_then(|v| v.as_i64())?;
    if !price.is_positive() {
        return None;
    }
    Some(PricePoint {
        price,
        at: TimeMs::new(at),
    })
}

/// Swap relay client. Swaps are not idempotent, so requests are sent
/// exactly once with no retry; a network failure is reported as-is and the
/// caller refunds any provisionally spent resource.
#[derive(Debug, Clone)]
pub struct HttpSwapRelay {
    client: Client,
    base_url: String,
}

impl HttpSwapRelay {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl SwapExecutor for HttpSwapRelay {
    async fn execute_swap(
        &self,
        token: &TokenAddress,
        usdc_amount: Price,
    ) -> Result<SwapReceipt, SwapError> {
        debug!("Executing swap: {} USDC into {}", usdc_amount, token);
        let payload = serde_json::json!({
            "tokenAddress": token.as_str(),
            "usdcAmount": usdc_amount,
        });

        let response = self
            .client
            .post(format!("{}/v1/swap", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SwapError::Network(e.to_string()))?;

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SwapError::Network(e.to_string()))?;

        let success = body.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
        if !success {
            let reason = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(SwapError::Rejected(reason));
        }

        let tx_id = body
            .get("txId")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let fill_price = body.get("fillPrice").and_then(parse_price_field);

        Ok(SwapReceipt { tx_id, fill_price })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_point_valid() {
        let entry = serde_json::json!({"price": "1.25", "timestamp": 1000});
        let point = parse_history_point(&entry).unwrap();
        assert_eq!(point.price, Price::parse("1.25").unwrap());
        assert_eq!(point.at, TimeMs::new(1000));
    }

    #[test]
    fn test_parse_history_point_rejects_bad_price() {
        assert!(parse_history_point(&serde_json::json!({"price": "0", "timestamp": 1000})).is_none());
        assert!(parse_history_point(&serde_json::json!({"timestamp": 1000})).is_none());
        assert!(parse_history_point(&serde_json::json!({"price": "1.5"})).is_none());
    }

    #[test]
    fn test_parse_price_field_accepts_number_and_string() {
        assert_eq!(
            parse_price_field(&serde_json::json!("2.5")),
            Some(Price::parse("2.5").unwrap())
        );
        assert_eq!(
            parse_price_field(&serde_json::json!(2.5)),
            Some(Price::parse("2.5").unwrap())
        );
        assert_eq!(parse_price_field(&serde_json::json!(null)), None);
    }
}
