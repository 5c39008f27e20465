//! Canvas-2D drawing surface.
//!
//! One `CanvasSurface` is bound to one `<canvas>` element for the lifetime
//! of a session. Every `update` is a full redraw from the view model:
//! candlesticks and overlays in the price pane, a volume histogram in a
//! reserved pane beneath it, both on the same bar axis.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::domain::chart::{ChartSurface, ChartView, ViewRanges};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::MaPeriod;
use crate::time_utils::format_time_label;

const BACKGROUND: &str = "#1e1e2f";
const GRID: &str = "#2b2b43";
const TEXT: &str = "#d1d4dc";
const UP: &str = "#10b981";
const DOWN: &str = "#ef4444";
const UP_DIM: &str = "rgba(16, 185, 129, 0.45)";
const DOWN_DIM: &str = "rgba(239, 68, 68, 0.45)";
const LAST_PRICE: &str = "#f39c12";

const MARGIN_TOP: f64 = 8.0;
const MARGIN_RIGHT: f64 = 64.0;
const MARGIN_BOTTOM: f64 = 20.0;
const VOLUME_PANE_RATIO: f64 = 0.18;
const PANE_GAP: f64 = 6.0;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Bind to the canvas with the given element id. Returns `None` (and
    /// logs) when the element or its 2d context is unavailable.
    pub fn attach(canvas_id: &str) -> Option<Self> {
        let result = (|| {
            let document = web_sys::window()?.document()?;
            let canvas: HtmlCanvasElement =
                document.get_element_by_id(canvas_id)?.dyn_into().ok()?;
            let ctx: CanvasRenderingContext2d =
                canvas.get_context("2d").ok()??.dyn_into().ok()?;
            Some(Self { canvas, ctx })
        })();

        if result.is_none() {
            get_logger().error(
                LogComponent::Infrastructure("CanvasSurface"),
                &format!("❌ canvas '{}' not available for charting", canvas_id),
            );
        }
        result
    }

    fn width(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn height(&self) -> f64 {
        self.canvas.height() as f64
    }

    fn set_fill(&self, color: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(color));
    }

    fn set_stroke(&self, color: &str) {
        self.ctx.set_stroke_style(&JsValue::from_str(color));
    }

    fn clear(&self) {
        self.set_fill(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, self.width(), self.height());
    }

    fn draw(&self, view: &ChartView) {
        self.clear();
        let Some(ranges) = view.ranges else {
            return;
        };

        let layout = Layout::fit(self.width(), self.height(), &ranges, view.candles.len());

        self.draw_grid(view, &layout);
        self.draw_volume(view, &layout);
        self.draw_candles(view, &layout);
        self.draw_averages(view, &layout);
        self.draw_last_price(view, &layout);
    }

    fn draw_grid(&self, view: &ChartView, layout: &Layout) {
        self.ctx.set_line_width(1.0);
        self.set_stroke(GRID);
        self.set_fill(TEXT);
        self.ctx.set_font("10px sans-serif");

        // horizontal price lines
        let steps = 5;
        for i in 0..=steps {
            let price = layout.price_min
                + (layout.price_max - layout.price_min) * (i as f64 / steps as f64);
            let y = layout.price_y(price);
            self.ctx.begin_path();
            self.ctx.move_to(0.0, y);
            self.ctx.line_to(layout.plot_width, y);
            self.ctx.stroke();
            let _ = self.ctx.fill_text(&format!("{:.2}", price), layout.plot_width + 6.0, y + 3.0);
        }

        // a handful of time labels along the bottom
        let n = view.candles.len();
        if n == 0 {
            return;
        }
        let labels = 4.min(n);
        for i in 0..labels {
            let idx = i * (n - 1) / labels.max(1);
            let x = layout.bar_x(idx);
            let label = format_time_label(view.candles[idx].timestamp.value(), view.interval);
            let _ = self.ctx.fill_text(&label, x - 12.0, layout.height - 6.0);
        }
    }

    fn draw_candles(&self, view: &ChartView, layout: &Layout) {
        let body_width = (layout.bar_step * 0.7).max(1.0);
        for (i, candle) in view.candles.iter().enumerate() {
            let x = layout.bar_x(i);
            let color = if candle.is_bullish() { UP } else { DOWN };
            self.set_stroke(color);
            self.set_fill(color);

            // wick
            self.ctx.begin_path();
            self.ctx.move_to(x, layout.price_y(candle.ohlcv.high.value()));
            self.ctx.line_to(x, layout.price_y(candle.ohlcv.low.value()));
            self.ctx.stroke();

            // body (at least 1px so dojis stay visible)
            let open_y = layout.price_y(candle.ohlcv.open.value());
            let close_y = layout.price_y(candle.ohlcv.close.value());
            let top = open_y.min(close_y);
            let h = (open_y - close_y).abs().max(1.0);
            self.ctx.fill_rect(x - body_width / 2.0, top, body_width, h);
        }
    }

    fn draw_volume(&self, view: &ChartView, layout: &Layout) {
        if layout.volume_max <= 0.0 {
            return;
        }
        let body_width = (layout.bar_step * 0.7).max(1.0);
        for (i, bar) in view.volume.iter().enumerate() {
            let x = layout.bar_x(i);
            let h = layout.volume_pane_height * (bar.volume / layout.volume_max);
            self.set_fill(if bar.bullish { UP_DIM } else { DOWN_DIM });
            self.ctx.fill_rect(
                x - body_width / 2.0,
                layout.volume_bottom - h,
                body_width,
                h,
            );
        }
    }

    fn draw_averages(&self, view: &ChartView, layout: &Layout) {
        self.ctx.set_line_width(1.5);
        for (period, series) in &view.averages {
            if series.is_empty() {
                continue;
            }
            self.set_stroke(ma_color(*period));
            self.ctx.begin_path();
            let mut started = false;
            for point in series {
                let Some(idx) = view.index_of_time(point.time) else {
                    continue;
                };
                let x = layout.bar_x(idx);
                let y = layout.price_y(point.value.value());
                if started {
                    self.ctx.line_to(x, y);
                } else {
                    self.ctx.move_to(x, y);
                    started = true;
                }
            }
            self.ctx.stroke();
        }
        self.ctx.set_line_width(1.0);
    }

    fn draw_last_price(&self, view: &ChartView, layout: &Layout) {
        let Some(snapshot) = &view.snapshot else {
            return;
        };
        let price = snapshot.current_price.value();
        if price < layout.price_min || price > layout.price_max {
            return;
        }
        let y = layout.price_y(price);
        self.set_stroke(LAST_PRICE);
        self.ctx.begin_path();
        self.ctx.move_to(0.0, y);
        self.ctx.line_to(layout.plot_width, y);
        self.ctx.stroke();
        self.set_fill(LAST_PRICE);
        let _ = self.ctx.fill_text(&format!("{:.2}", price), layout.plot_width + 6.0, y - 4.0);
    }
}

impl ChartSurface for CanvasSurface {
    fn update(&mut self, view: &ChartView) {
        self.draw(view);
    }

    fn teardown(&mut self) {
        self.clear();
    }
}

fn ma_color(period: MaPeriod) -> &'static str {
    match period {
        MaPeriod::Ma7 => "#f59e0b",
        MaPeriod::Ma25 => "#3b82f6",
        MaPeriod::Ma99 => "#a855f7",
    }
}

/// Pixel mapping for one full-content fit: price pane above, volume pane
/// below, shared bar axis.
struct Layout {
    height: f64,
    plot_width: f64,
    bar_step: f64,
    price_min: f64,
    price_max: f64,
    price_top: f64,
    price_height: f64,
    volume_max: f64,
    volume_bottom: f64,
    volume_pane_height: f64,
}

impl Layout {
    fn fit(width: f64, height: f64, ranges: &ViewRanges, candle_count: usize) -> Self {
        let plot_width = (width - MARGIN_RIGHT).max(1.0);
        let plot_height = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let volume_pane_height = plot_height * VOLUME_PANE_RATIO;
        let price_height = plot_height - volume_pane_height - PANE_GAP;

        // pad the fitted price range so extremes don't touch the pane edges
        let span = (ranges.price_max - ranges.price_min).max(f64::EPSILON);
        let price_min = ranges.price_min - span * 0.04;
        let price_max = ranges.price_max + span * 0.04;

        Self {
            height,
            plot_width,
            bar_step: plot_width / candle_count.max(1) as f64,
            price_min,
            price_max,
            price_top: MARGIN_TOP,
            price_height,
            volume_max: ranges.volume_max,
            volume_bottom: MARGIN_TOP + plot_height,
            volume_pane_height,
        }
    }

    fn bar_x(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.bar_step
    }

    fn price_y(&self, price: f64) -> f64 {
        let t = (price - self.price_min) / (self.price_max - self.price_min);
        self.price_top + self.price_height * (1.0 - t)
    }
}
