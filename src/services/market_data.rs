//! Price collaborator interface

use crate::error::Result;
use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataProvider {
    /// Up to `limit` candles in ascending timestamp order, most recent last.
    ///
    /// The last bar may still be in progress; callers decide whether to use it
    /// by looking at `Candle::closed`.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>>;
}
