use leptos::*;

use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::application::candle_cache::CandleCache;
use crate::application::session::{ChartSession, SessionState, SessionStatus};
use crate::domain::market_data::{MaPeriod, Symbol, TimeInterval};
use crate::infrastructure::http::DashboardHttpClient;
use crate::infrastructure::rendering::CanvasSurface;
use crate::infrastructure::services::BrowserClock;
use strum::IntoEnumIterator;

/// Symbols the dashboard tracks, in display order.
const COIN_SYMBOLS: [&str; 5] = ["BTCUSDT", "ETHUSDT", "BNBUSDT", "XRPUSDT", "ADAUSDT"];

const CANVAS_ID: &str = "chart-canvas";

/// The concrete session wired against the browser stack.
pub type LiveSession = ChartSession<DashboardHttpClient, CanvasSurface>;

/// Spawn session work on the local executor. `None` means a warm cache hit
/// already resolved everything synchronously.
fn run(work: Option<LocalBoxFuture<'static, ()>>) {
    if let Some(work) = work {
        spawn_local(work);
    }
}

fn format_price(value: f64) -> String {
    if value >= 100.0 {
        format!("${:.2}", value)
    } else {
        format!("${:.4}", value)
    }
}

fn format_volume(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.1}", value)
    }
}

/// Root component: coin strip plus the chart panel, sharing one session.
#[component]
pub fn App() -> impl IntoView {
    let cache = Rc::new(CandleCache::new(Rc::new(BrowserClock)));
    let api = Rc::new(DashboardHttpClient::new());
    let session = LiveSession::new(api, cache, || CanvasSurface::attach(CANVAS_ID));

    let (state, set_state) = create_signal(session.state());
    session.set_observer(move |s: &SessionState| set_state.set(s.clone()));

    // ESC closes the panel, same as the close button.
    {
        let session = session.clone();
        window_event_listener(ev::keydown, move |event| {
            if event.key() == "Escape" {
                session.close();
            }
        });
    }

    view! {
        <style>{STYLES}</style>
        <div class="dashboard">
            <div class="dashboard-title">"Coin Dashboard"</div>
            <SymbolStrip session=session.clone() state=state />
            <ChartPanel session=session state=state />
        </div>
    }
}

/// Row of coin buttons; clicking one opens (or reopens) the chart session.
#[component]
fn SymbolStrip(session: LiveSession, state: ReadSignal<SessionState>) -> impl IntoView {
    let buttons = COIN_SYMBOLS
        .iter()
        .map(|&sym| {
            let session = session.clone();
            let symbol = Symbol::from(sym);
            let label = symbol.base_asset().to_string();
            let is_active = {
                let symbol = symbol.clone();
                move || state.with(|s| s.symbol.as_ref() == Some(&symbol))
            };
            view! {
                <button
                    class="coin-btn"
                    class:active=is_active
                    on:click=move |_| run(session.open(symbol.clone()))
                >
                    {label}
                </button>
            }
        })
        .collect_view();

    view! { <div class="symbol-strip">{buttons}</div> }
}

/// The chart panel itself. The canvas stays mounted even while Idle so the
/// render surface can attach as soon as the first data lands.
#[component]
fn ChartPanel(session: LiveSession, state: ReadSignal<SessionState>) -> impl IntoView {
    let is_idle = move || state.with(|s| s.status == SessionStatus::Idle);
    let is_loading = move || state.with(|s| s.status == SessionStatus::Loading);
    let error_text = move || state.with(|s| s.error.clone());

    let title = move || {
        state.with(|s| match &s.symbol {
            Some(symbol) => format!("{}/USDT", symbol.base_asset()),
            None => String::new(),
        })
    };
    let price_text = move || {
        state.with(|s| {
            s.snapshot
                .as_ref()
                .map(|snap| format_price(snap.current_price.value()))
                .unwrap_or_default()
        })
    };
    let change_pct = move || {
        state.with(|s| s.snapshot.as_ref().map(|snap| snap.change_percent_24h))
    };
    let change_text = move || {
        change_pct()
            .map(|pct| format!("{:+.2}%", pct))
            .unwrap_or_default()
    };
    let change_is_up = move || change_pct().unwrap_or(0.0) >= 0.0;
    let volume_text = move || {
        state.with(|s| {
            s.snapshot
                .as_ref()
                .map(|snap| format!("Vol {}", format_volume(snap.volume_24h.value())))
                .unwrap_or_default()
        })
    };

    let interval_buttons = TimeInterval::iter()
        .map(|interval| {
            let session = session.clone();
            let is_active = move || state.with(|s| s.interval == interval);
            view! {
                <button
                    class="tf-btn"
                    class:active=is_active
                    on:click=move |_| run(session.set_timeframe(interval))
                >
                    {interval.as_query_str().to_string()}
                </button>
            }
        })
        .collect_view();

    let ma_buttons = MaPeriod::iter()
        .map(|period| {
            let session = session.clone();
            let is_active =
                move || state.with(|s| s.visible_averages.contains(&period));
            view! {
                <button
                    class="ma-btn"
                    class:active=is_active
                    on:click=move |_| run(session.toggle_average(period))
                >
                    {format!("MA{}", period.period())}
                </button>
            }
        })
        .collect_view();

    let auto_refresh_on = move || state.with(|s| s.auto_refresh);
    let toggle_auto = {
        let session = session.clone();
        move |_| {
            let enabled = state.with_untracked(|s| s.auto_refresh);
            session.set_auto_refresh(!enabled);
        }
    };
    let close = {
        let session = session.clone();
        move |_| session.close()
    };

    view! {
        <div class="chart-panel" class:hidden=is_idle>
            <div class="panel-header">
                <div class="panel-title">
                    <span class="symbol-name">{title}</span>
                    <span class="price">{price_text}</span>
                    <span class="change" class:up=change_is_up class:down=move || !change_is_up()>
                        {change_text}
                    </span>
                    <span class="volume">{volume_text}</span>
                </div>
                <button class="close-btn" on:click=close>"×"</button>
            </div>

            <div class="panel-controls">
                <div class="tf-group">{interval_buttons}</div>
                <div class="ma-group">{ma_buttons}</div>
                <button class="refresh-btn" class:active=auto_refresh_on on:click=toggle_auto>
                    {move || if auto_refresh_on() { "Auto 10s: on" } else { "Auto 10s: off" }}
                </button>
            </div>

            <div class="canvas-wrap">
                <canvas id=CANVAS_ID width="900" height="520"></canvas>
                <Show when=is_loading>
                    <div class="overlay">
                        <div class="spinner"></div>
                    </div>
                </Show>
                <Show when=move || error_text().is_some()>
                    <div class="error-banner">
                        {move || error_text().unwrap_or_default()}
                    </div>
                </Show>
            </div>
        </div>
    }
}

const STYLES: &str = r#"
body {
    margin: 0;
    background: #12121c;
}

.dashboard {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    color: #d1d4dc;
    min-height: 100vh;
    padding: 24px;
}

.dashboard-title {
    font-size: 22px;
    font-weight: 700;
    margin-bottom: 16px;
}

.symbol-strip {
    display: flex;
    gap: 8px;
    margin-bottom: 16px;
}

.coin-btn, .tf-btn, .ma-btn, .refresh-btn {
    background: #2b2b43;
    color: #d1d4dc;
    border: 1px solid #3a3a55;
    border-radius: 6px;
    padding: 6px 14px;
    cursor: pointer;
    font-size: 13px;
}

.coin-btn:hover, .tf-btn:hover, .ma-btn:hover, .refresh-btn:hover {
    background: #3a3a55;
}

.coin-btn.active, .tf-btn.active, .ma-btn.active, .refresh-btn.active {
    background: #10b981;
    border-color: #10b981;
    color: #fff;
}

.chart-panel {
    background: #1e1e2f;
    border: 1px solid #2b2b43;
    border-radius: 10px;
    padding: 16px;
    max-width: 940px;
}

.chart-panel.hidden {
    display: none;
}

.panel-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 12px;
}

.panel-title {
    display: flex;
    align-items: baseline;
    gap: 12px;
}

.symbol-name {
    font-size: 18px;
    font-weight: 700;
}

.price {
    font-size: 18px;
    font-family: 'Courier New', monospace;
}

.change.up { color: #10b981; }
.change.down { color: #ef4444; }

.volume {
    color: #8b8ea0;
    font-size: 13px;
}

.close-btn {
    background: none;
    border: none;
    color: #d1d4dc;
    font-size: 22px;
    cursor: pointer;
    line-height: 1;
}

.panel-controls {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 12px;
}

.tf-group, .ma-group {
    display: flex;
    gap: 6px;
}

.canvas-wrap {
    position: relative;
}

canvas {
    display: block;
    border-radius: 6px;
}

.overlay {
    position: absolute;
    inset: 0;
    display: flex;
    align-items: center;
    justify-content: center;
    background: rgba(18, 18, 28, 0.6);
    border-radius: 6px;
}

.spinner {
    width: 36px;
    height: 36px;
    border: 3px solid #2b2b43;
    border-top-color: #10b981;
    border-radius: 50%;
    animation: spin 0.8s linear infinite;
}

@keyframes spin {
    to { transform: rotate(360deg); }
}

.error-banner {
    position: absolute;
    top: 12px;
    left: 12px;
    right: 12px;
    background: rgba(239, 68, 68, 0.9);
    color: #fff;
    padding: 8px 12px;
    border-radius: 6px;
    font-size: 13px;
    text-align: center;
}
"#;

/// Mount the dashboard into `<body>`.
pub fn mount_chart_app() {
    mount_to_body(App);
}
