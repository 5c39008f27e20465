use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::clock::Clock;
use crate::domain::config::CACHE_TTL_MS;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, MarketKey, PriceSnapshot};

/// One memoized fetch result for a `(symbol, interval)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub candles: Vec<Candle>,
    pub snapshot: PriceSnapshot,
    pub fetched_at_ms: u64,
}

/// Time-bounded memo of chart data, shared by every session in the process.
///
/// Constructed once and injected into the fetch coordinator; the clock is a
/// dependency so TTL behavior is deterministic under test. Expired entries
/// are evicted lazily on lookup.
pub struct CandleCache {
    clock: Rc<dyn Clock>,
    entries: RefCell<HashMap<MarketKey, CacheEntry>>,
}

impl CandleCache {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self { clock, entries: RefCell::new(HashMap::new()) }
    }

    /// A hit requires the key to be present and younger than the TTL.
    pub fn get(&self, key: &MarketKey) -> Option<CacheEntry> {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.get(key)?;
        let age_ms = self.clock.now_ms().saturating_sub(entry.fetched_at_ms);
        if age_ms < CACHE_TTL_MS {
            get_logger().debug(
                LogComponent::Application("CandleCache"),
                &format!("cache hit for {} (age {}ms)", key, age_ms),
            );
            Some(entry.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    pub fn put(&self, key: MarketKey, candles: Vec<Candle>, snapshot: PriceSnapshot) {
        let entry = CacheEntry { candles, snapshot, fetched_at_ms: self.clock.now_ms() };
        self.entries.borrow_mut().insert(key, entry);
    }

    /// Force the next lookup for `key` to miss, so an auto-refresh tick hits
    /// the network instead of reusing stale candles.
    pub fn invalidate(&self, key: &MarketKey) {
        self.entries.borrow_mut().remove(key);
    }
}
