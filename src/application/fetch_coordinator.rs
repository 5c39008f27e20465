use std::rc::Rc;

use serde::Deserialize;

use crate::application::candle_cache::{CacheEntry, CandleCache};
use crate::domain::config::{DISPLAY_TZ_OFFSET_SECS, KLINE_FETCH_LIMIT};
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    Candle, MarketKey, OHLCV, Price, PriceSnapshot, Symbol, TimeInterval, Timestamp, Volume,
    sort_and_dedup,
};

/// One raw kline record as the backend reports it: millisecond timestamp,
/// decimal prices and volume.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KlineRecord {
    pub time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One row of the bulk current-price listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TickerRecord {
    pub symbol: String,
    pub current_price: f64,
    pub price_change_percent: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Trait seam over the dashboard backend. The browser build implements this
/// with gloo-net; tests swap in a scripted mock.
#[allow(async_fn_in_trait)]
pub trait MarketDataApi {
    async fn fetch_klines(
        &self,
        symbol: &Symbol,
        interval: TimeInterval,
        limit: usize,
    ) -> FetchResult<Vec<KlineRecord>>;

    async fn fetch_price_listing(&self) -> FetchResult<Vec<TickerRecord>>;
}

/// Produces `(candles, snapshot)` pairs for a market key, consulting the
/// injected cache first. Cancellation wrapping belongs to the session; the
/// coordinator never applies results to session state itself.
pub struct FetchCoordinator<A> {
    api: Rc<A>,
    cache: Rc<CandleCache>,
}

impl<A: MarketDataApi> FetchCoordinator<A> {
    pub fn new(api: Rc<A>, cache: Rc<CandleCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &CandleCache {
        &self.cache
    }

    /// TTL-checked cache lookup; no network touched.
    pub fn cached(&self, key: &MarketKey) -> Option<CacheEntry> {
        self.cache.get(key)
    }

    /// Fetch candle history and the matching price snapshot, normalize and
    /// cache the result. Both requests must succeed.
    pub async fn fetch_fresh(
        &self,
        key: &MarketKey,
    ) -> FetchResult<(Vec<Candle>, PriceSnapshot)> {
        get_logger().info(
            LogComponent::Application("FetchCoordinator"),
            &format!("📡 fetching {} candles for {}", KLINE_FETCH_LIMIT, key),
        );

        let records =
            self.api.fetch_klines(&key.symbol, key.interval, KLINE_FETCH_LIMIT).await?;
        let listing = self.api.fetch_price_listing().await?;

        let snapshot = select_snapshot(&listing, &key.symbol)?;
        let candles = normalize_klines(records);

        self.cache.put(key.clone(), candles.clone(), snapshot.clone());

        get_logger().info(
            LogComponent::Application("FetchCoordinator"),
            &format!("✅ {} candles cached for {}", candles.len(), key),
        );
        Ok((candles, snapshot))
    }
}

/// Convert wire records into the domain sequence: milliseconds to seconds,
/// the display timezone offset, and the ascending/no-duplicate invariant.
pub fn normalize_klines(records: Vec<KlineRecord>) -> Vec<Candle> {
    let candles = records
        .into_iter()
        .map(|r| {
            Candle::new(
                Timestamp::new(r.time as i64 / 1000 + DISPLAY_TZ_OFFSET_SECS),
                OHLCV::new(
                    Price::new(r.open),
                    Price::new(r.high),
                    Price::new(r.low),
                    Price::new(r.close),
                    Volume::new(r.volume),
                ),
            )
        })
        .collect();
    sort_and_dedup(candles)
}

/// Pick the listing entry for `symbol` by exact match.
pub fn select_snapshot(listing: &[TickerRecord], symbol: &Symbol) -> FetchResult<PriceSnapshot> {
    listing
        .iter()
        .find(|t| t.symbol == symbol.value())
        .map(|t| PriceSnapshot {
            symbol: symbol.clone(),
            current_price: Price::new(t.current_price),
            change_percent_24h: t.price_change_percent,
            volume_24h: Volume::new(t.volume),
        })
        .ok_or_else(|| FetchError::Data(format!("symbol {} missing from price listing", symbol)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DISPLAY_TZ_OFFSET_SECS;

    fn record(time_ms: u64, close: f64) -> KlineRecord {
        KlineRecord { time: time_ms, open: close, high: close, low: close, close, volume: 1.0 }
    }

    #[test]
    fn normalization_converts_and_orders() {
        let candles = normalize_klines(vec![
            record(2_000, 2.0),
            record(1_000, 1.0),
            record(2_000, 3.0),
        ]);

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp.value(), 1 + DISPLAY_TZ_OFFSET_SECS);
        assert_eq!(candles[1].timestamp.value(), 2 + DISPLAY_TZ_OFFSET_SECS);
        // duplicate millisecond bucket: later record wins
        assert_eq!(candles[1].ohlcv.close.value(), 3.0);
    }

    #[test]
    fn snapshot_requires_exact_symbol_match() {
        let listing = vec![TickerRecord {
            symbol: "BTCUSDT".to_string(),
            current_price: 50_000.0,
            price_change_percent: 1.5,
            volume: 123.0,
        }];

        let snap = select_snapshot(&listing, &Symbol::from("BTCUSDT")).unwrap();
        assert_eq!(snap.current_price.value(), 50_000.0);

        let missing = select_snapshot(&listing, &Symbol::from("ETHUSDT"));
        assert!(matches!(missing, Err(FetchError::Data(_))));
    }
}
