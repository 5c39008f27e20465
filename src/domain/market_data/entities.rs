pub use super::value_objects::{Price, Symbol, Timestamp, Volume};
use serde::{Deserialize, Serialize};

/// Value Object - OHLCV sample for one time bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OHLCV {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl OHLCV {
    pub fn new(open: Price, high: Price, low: Price, close: Price, volume: Volume) -> Self {
        Self { open, high, low, close, volume }
    }
}

/// Domain entity - Candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    pub ohlcv: OHLCV,
}

impl Candle {
    pub fn new(timestamp: Timestamp, ohlcv: OHLCV) -> Self {
        Self { timestamp, ohlcv }
    }

    /// Up candles color the volume bar green, everything else red.
    pub fn is_bullish(&self) -> bool {
        self.ohlcv.close >= self.ohlcv.open
    }
}

/// Current price and 24h change for one symbol, read from the bulk listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: Symbol,
    pub current_price: Price,
    pub change_percent_24h: f64,
    pub volume_24h: Volume,
}

/// Enforce the candle-sequence invariant: strictly ascending timestamps with
/// no duplicates. On a duplicate timestamp the later record wins.
pub fn sort_and_dedup(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp);
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match out.last_mut() {
            Some(last) if last.timestamp == candle.timestamp => *last = candle,
            _ => out.push(candle),
        }
    }
    out
}
