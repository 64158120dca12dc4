//! Boundary abstractions: the external price feed and the swap executor.
//!
//! Failures here are never fatal to the core; the orchestration layer
//! treats them as "no update this tick" or reports a failed capture.

use crate::domain::{Price, PricePoint, TimeMs, TokenAddress};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::{HttpPriceFeed, HttpSwapRelay};
pub use mock::{MockPriceFeed, MockSwapExecutor};

/// A price observation with its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Price,
    pub as_of: TimeMs,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PriceFeedError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("No price available for {0}")]
    Unavailable(String),
}

/// Read-only source of token prices.
#[async_trait]
pub trait PriceFeed: Send + Sync + fmt::Debug {
    /// Latest known price for a token. Zero or negative prices must be
    /// rejected by the implementation as [`PriceFeedError::Unavailable`].
    async fn latest_price(&self, address: &TokenAddress) -> Result<PriceQuote, PriceFeedError>;

    /// Historical observations, oldest first.
    async fn price_history(
        &self,
        address: &TokenAddress,
    ) -> Result<Vec<PricePoint>, PriceFeedError>;
}

/// Confirmation of an executed capture swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub tx_id: String,
    /// Unit price paid, when the executor reports it.
    pub fill_price: Option<Price>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap rejected: {0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Executes a token purchase for a USDC amount. The core only reacts to
/// the outcome; verification happens on the other side of this boundary.
#[async_trait]
pub trait SwapExecutor: Send + Sync + fmt::Debug {
    async fn execute_swap(
        &self,
        token: &TokenAddress,
        usdc_amount: Price,
    ) -> Result<SwapReceipt, SwapError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_feed_error_display() {
        let err = PriceFeedError::Network("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = PriceFeedError::Http {
            status: 429,
            message: "Too many requests".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too many requests");

        let err = PriceFeedError::Unavailable("0xdead".to_string());
        assert_eq!(err.to_string(), "No price available for 0xdead");
    }

    #[test]
    fn test_swap_error_display() {
        let err = SwapError::Rejected("slippage".to_string());
        assert_eq!(err.to_string(), "Swap rejected: slippage");
    }
}
