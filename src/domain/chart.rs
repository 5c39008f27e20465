//! Pure view-model construction for the chart surface.
//!
//! A `ChartView` is everything a drawing surface needs for one full redraw:
//! candle bodies, direction-colored volume bars, the visible moving-average
//! polylines and the ranges for a full-content axis fit. Building it is
//! side-effect free so the whole render contract is testable without a
//! canvas.

use crate::domain::market_data::{
    Candle, MaPeriod, MaPoint, PriceSnapshot, TimeInterval, Timestamp, simple_moving_average,
};

/// One volume histogram bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeBar {
    pub time: Timestamp,
    pub volume: f64,
    pub bullish: bool,
}

/// Inclusive bounds used for the full-content fit after each update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRanges {
    pub time_min: i64,
    pub time_max: i64,
    pub price_min: f64,
    pub price_max: f64,
    pub volume_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub interval: TimeInterval,
    pub candles: Vec<Candle>,
    pub volume: Vec<VolumeBar>,
    pub averages: Vec<(MaPeriod, Vec<MaPoint>)>,
    pub snapshot: Option<PriceSnapshot>,
    pub ranges: Option<ViewRanges>,
}

impl ChartView {
    /// Derive the full view from the current candle sequence. Every series is
    /// rebuilt from scratch; the surface replaces its data rather than
    /// appending.
    pub fn build(
        interval: TimeInterval,
        candles: &[Candle],
        snapshot: Option<&PriceSnapshot>,
        visible_averages: &[MaPeriod],
    ) -> Self {
        let volume = candles
            .iter()
            .map(|c| VolumeBar {
                time: c.timestamp,
                volume: c.ohlcv.volume.value(),
                bullish: c.is_bullish(),
            })
            .collect();

        let averages: Vec<(MaPeriod, Vec<MaPoint>)> = visible_averages
            .iter()
            .map(|&p| (p, simple_moving_average(candles, p.period())))
            .collect();

        let ranges = Self::compute_ranges(candles, &averages);

        Self {
            interval,
            candles: candles.to_vec(),
            volume,
            averages,
            snapshot: snapshot.cloned(),
            ranges,
        }
    }

    fn compute_ranges(
        candles: &[Candle],
        averages: &[(MaPeriod, Vec<MaPoint>)],
    ) -> Option<ViewRanges> {
        let first = candles.first()?;
        let last = candles.last()?;

        let mut price_min = f64::INFINITY;
        let mut price_max = f64::NEG_INFINITY;
        let mut volume_max: f64 = 0.0;
        for c in candles {
            price_min = price_min.min(c.ohlcv.low.value());
            price_max = price_max.max(c.ohlcv.high.value());
            volume_max = volume_max.max(c.ohlcv.volume.value());
        }
        // overlay lines must stay inside the fitted price pane
        for (_, series) in averages {
            for p in series {
                price_min = price_min.min(p.value.value());
                price_max = price_max.max(p.value.value());
            }
        }

        Some(ViewRanges {
            time_min: first.timestamp.value(),
            time_max: last.timestamp.value(),
            price_min,
            price_max,
            volume_max,
        })
    }

    /// Index of the candle carrying `time`, for mapping overlay points onto
    /// the bar axis.
    pub fn index_of_time(&self, time: Timestamp) -> Option<usize> {
        self.candles.binary_search_by_key(&time, |c| c.timestamp).ok()
    }
}

/// Handle to one persistent drawing surface.
///
/// A session creates its surface at most once and reuses it across every
/// data refresh; only session teardown releases it.
pub trait ChartSurface {
    /// Replace all series data with the given view and refit the time axis
    /// to the full content.
    fn update(&mut self, view: &ChartView);

    /// Release the surface. Called exactly once, at session end.
    fn teardown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{OHLCV, Price, Volume};

    fn candle(i: i64, open: f64, close: f64, volume: f64) -> Candle {
        Candle::new(
            Timestamp::new(i * 3600),
            OHLCV::new(
                Price::new(open),
                Price::new(open.max(close) + 1.0),
                Price::new(open.min(close) - 1.0),
                Price::new(close),
                Volume::new(volume),
            ),
        )
    }

    #[test]
    fn volume_bars_follow_candle_direction() {
        let candles = vec![candle(0, 10.0, 12.0, 5.0), candle(1, 12.0, 11.0, 7.0)];
        let view = ChartView::build(TimeInterval::OneHour, &candles, None, &[]);

        assert!(view.volume[0].bullish);
        assert!(!view.volume[1].bullish);
        let ranges = view.ranges.unwrap();
        assert_eq!(ranges.volume_max, 7.0);
        assert_eq!(ranges.time_min, 0);
        assert_eq!(ranges.time_max, 3600);
    }

    #[test]
    fn only_visible_averages_are_built() {
        let candles: Vec<Candle> =
            (0..30).map(|i| candle(i, 10.0 + i as f64, 11.0 + i as f64, 1.0)).collect();
        let view = ChartView::build(TimeInterval::OneHour, &candles, None, &[MaPeriod::Ma7, MaPeriod::Ma25]);

        assert_eq!(view.averages.len(), 2);
        assert_eq!(view.averages[0].0, MaPeriod::Ma7);
        assert_eq!(view.averages[0].1.len(), 24);
        assert_eq!(view.averages[1].1.len(), 6);
    }

    #[test]
    fn empty_input_has_no_ranges() {
        let view = ChartView::build(TimeInterval::OneHour, &[], None, &[MaPeriod::Ma7]);
        assert!(view.ranges.is_none());
        assert!(view.candles.is_empty());
    }
}
