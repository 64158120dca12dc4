//! Mock price feed and swap executor for tests.

use super::{PriceFeed, PriceFeedError, PriceQuote, SwapError, SwapExecutor, SwapReceipt};
use crate::domain::{Price, PricePoint, TimeMs, TokenAddress};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Price feed backed by predefined observations.
#[derive(Debug, Default)]
pub struct MockPriceFeed {
    points: Mutex<HashMap<TokenAddress, Vec<PricePoint>>>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one observation (builder style).
    pub fn with_price(self, address: TokenAddress, price: Price, at: TimeMs) -> Self {
        self.push_price(address, price, at);
        self
    }

    /// Seed one observation on a shared instance, for mid-test updates.
    pub fn push_price(&self, address: TokenAddress, price: Price, at: TimeMs) {
        self.points
            .lock()
            .expect("mock feed poisoned")
            .entry(address)
            .or_default()
            .push(PricePoint { price, at });
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn latest_price(&self, address: &TokenAddress) -> Result<PriceQuote, PriceFeedError> {
        let points = self.points.lock().expect("mock feed poisoned");
        let latest = points
            .get(address)
            .and_then(|v| v.last())
            .ok_or_else(|| PriceFeedError::Unavailable(address.to_string()))?;
        Ok(PriceQuote {
            price: latest.price,
            as_of: latest.at,
        })
    }

    async fn price_history(
        &self,
        address: &TokenAddress,
    ) -> Result<Vec<PricePoint>, PriceFeedError> {
        let points = self.points.lock().expect("mock feed poisoned");
        Ok(points.get(address).cloned().unwrap_or_default())
    }
}

/// Swap executor with a scripted outcome.
#[derive(Debug)]
pub struct MockSwapExecutor {
    outcome: Result<SwapReceipt, SwapError>,
}

impl MockSwapExecutor {
    /// Executor that confirms every swap with the given tx id.
    pub fn succeeding(tx_id: &str, fill_price: Option<Price>) -> Self {
        Self {
            outcome: Ok(SwapReceipt {
                tx_id: tx_id.to_string(),
                fill_price,
            }),
        }
    }

    /// Executor that rejects every swap.
    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(SwapError::Rejected(reason.to_string())),
        }
    }
}

#[async_trait]
impl SwapExecutor for MockSwapExecutor {
    async fn execute_swap(
        &self,
        _token: &TokenAddress,
        _usdc_amount: Price,
    ) -> Result<SwapReceipt, SwapError> {
        self.outcome.clone()
    }
}
