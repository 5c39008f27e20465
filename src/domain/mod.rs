pub mod chart;
pub mod clock;
pub mod errors;
pub mod logging;
pub mod market_data;

/// Tuning constants shared by the whole pipeline.
pub mod config {
    /// Cached candle data is served for this long before a refetch.
    pub const CACHE_TTL_MS: u64 = 30_000;

    /// Auto-refresh tick period for an open session.
    pub const AUTO_REFRESH_INTERVAL_MS: u64 = 10_000;

    /// Maximum number of candles requested per kline fetch.
    pub const KLINE_FETCH_LIMIT: usize = 120;

    /// Page size for the bulk price listing, large enough for every symbol.
    pub const PRICE_LISTING_PAGE_LIMIT: usize = 1000;

    /// Chart times are shifted into KST for display. The offset is applied
    /// once during normalization so candles, volume and moving averages all
    /// share the same axis.
    pub const DISPLAY_TZ_OFFSET_SECS: i64 = 9 * 3600;
}
