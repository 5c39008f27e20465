use derive_more::{Constructor, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - decimal price
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Constructor, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - traded volume
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Constructor, Serialize, Deserialize)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Value Object - candle time in epoch seconds (post-normalization)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Constructor, Serialize,
    Deserialize,
)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Value Object - trading symbol, uppercased exact-match identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct Symbol(String);

impl Symbol {
    pub fn value(&self) -> &str {
        &self.0
    }

    /// The backend keys everything by USDT pairs; bare symbols get the
    /// suffix appended ("BTC" -> "BTCUSDT").
    pub fn ensure_usdt(self) -> Symbol {
        if self.0.ends_with("USDT") { self } else { Symbol(format!("{}USDT", self.0)) }
    }

    /// Base asset without the quote suffix, for display ("BTCUSDT" -> "BTC").
    pub fn base_asset(&self) -> &str {
        self.0.strip_suffix("USDT").unwrap_or(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_uppercase())
    }
}

/// Value Object - candle bucket width offered by the chart panel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumString, AsRefStr,
    Serialize, Deserialize,
)]
pub enum TimeInterval {
    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,

    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,

    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    FourHours,

    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    OneDay,
}

impl TimeInterval {
    pub fn as_query_str(&self) -> &str {
        self.as_ref()
    }

    pub fn duration_secs(&self) -> i64 {
        match self {
            Self::FifteenMinutes => 15 * 60,
            Self::OneHour => 60 * 60,
            Self::FourHours => 4 * 60 * 60,
            Self::OneDay => 24 * 60 * 60,
        }
    }
}

/// Value Object - moving-average window offered as an overlay
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, AsRefStr, Serialize,
    Deserialize,
)]
pub enum MaPeriod {
    #[strum(serialize = "ma7")]
    Ma7,
    #[strum(serialize = "ma25")]
    Ma25,
    #[strum(serialize = "ma99")]
    Ma99,
}

impl MaPeriod {
    pub fn period(&self) -> usize {
        match self {
            Self::Ma7 => 7,
            Self::Ma25 => 25,
            Self::Ma99 => 99,
        }
    }
}

/// Composite identity of one cache entry and one chart session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketKey {
    pub symbol: Symbol,
    pub interval: TimeInterval,
}

impl MarketKey {
    pub fn new(symbol: Symbol, interval: TimeInterval) -> Self {
        Self { symbol, interval }
    }
}

impl std::fmt::Display for MarketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.symbol, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_uppercased_and_suffixed() {
        assert_eq!(Symbol::from("btc").ensure_usdt().value(), "BTCUSDT");
        assert_eq!(Symbol::from("ETHUSDT").ensure_usdt().value(), "ETHUSDT");
        assert_eq!(Symbol::from("XRPUSDT").base_asset(), "XRP");
    }

    #[test]
    fn interval_query_strings() {
        assert_eq!(TimeInterval::FifteenMinutes.as_query_str(), "15m");
        assert_eq!(TimeInterval::OneDay.as_query_str(), "1d");
        assert_eq!(TimeInterval::FourHours.duration_secs(), 14_400);
    }
}
