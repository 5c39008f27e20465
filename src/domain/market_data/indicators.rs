use super::{Candle, Price, Timestamp};

/// One point of a derived moving-average series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaPoint {
    pub time: Timestamp,
    pub value: Price,
}

/// Arithmetic mean of closing prices over a sliding window.
///
/// Returns one point per index `>= period - 1`; shorter inputs yield an
/// empty series, so entries before the window are dropped rather than
/// emitted as sentinels. The window sum is recomputed per point: the
/// sum-then-divide rounding is part of the contract, so no running-sum
/// shortcut here. Inputs are at most a few hundred candles.
pub fn simple_moving_average(candles: &[Candle], period: usize) -> Vec<MaPoint> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(candles.len() - period + 1);
    for i in (period - 1)..candles.len() {
        let sum: f64 = candles[i + 1 - period..=i].iter().map(|c| c.ohlcv.close.value()).sum();
        points.push(MaPoint {
            time: candles[i].timestamp,
            value: Price::new(sum / period as f64),
        });
    }
    points
}
