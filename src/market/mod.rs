//! Market data access
//!
//! Prices are fetched fresh for every request; nothing is cached.

use crate::models::PriceQuote;
use crate::Result;
use async_trait::async_trait;

pub mod yahoo;
pub use yahoo::YahooFinanceClient;

/// Trait for current-price lookups
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Current trade price for a ticker symbol
    async fn current_price(&self, symbol: &str) -> Result<PriceQuote>;
}
