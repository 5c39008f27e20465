use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, LocalBoxFuture};

use crate::application::candle_cache::CandleCache;
use crate::application::fetch_coordinator::{FetchCoordinator, MarketDataApi};
use crate::domain::chart::{ChartSurface, ChartView};
use crate::domain::errors::FetchError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    Candle, MaPeriod, MarketKey, PriceSnapshot, Symbol, TimeInterval,
};

/// Lifecycle of one chart session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No symbol selected; nothing rendered.
    Idle,
    /// Fetch in flight with no warm cache hit; spinner shown.
    Loading,
    /// Data rendered, live.
    Ready,
    /// Non-cancellation fetch failure; banner shown, prior data kept.
    Errored,
}

/// Observable state exposed to the page composition layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub symbol: Option<Symbol>,
    pub interval: TimeInterval,
    pub candles: Vec<Candle>,
    pub snapshot: Option<PriceSnapshot>,
    pub error: Option<String>,
    pub visible_averages: Vec<MaPeriod>,
    pub auto_refresh: bool,
}

/// What triggered a refresh. Auto-refresh ticks with prior data keep the
/// stale view on screen instead of flashing the spinner.
#[derive(Debug, Clone, Copy)]
enum RefreshKind {
    UserAction,
    AutoRefresh { had_prior: bool },
}

struct SessionInner<S> {
    symbol: Option<Symbol>,
    interval: TimeInterval,
    status: SessionStatus,
    candles: Vec<Candle>,
    snapshot: Option<PriceSnapshot>,
    error: Option<String>,
    visible_averages: Vec<MaPeriod>,
    auto_refresh: bool,
    /// Monotonic per-session fetch counter; a completion whose generation is
    /// no longer current must never touch state, abort or not.
    generation: u64,
    in_flight: Option<AbortHandle>,
    ticker: Option<AbortHandle>,
    surface: Option<S>,
}

/// The live binding between a selected symbol/timeframe and a rendered
/// chart. Cheap-clone handle; clones share one session.
///
/// State-changing operations return the fetch work as a future for the
/// caller to spawn (`spawn_local` in the browser, a `LocalPool` in tests),
/// or `None` when a warm cache hit resolved everything synchronously.
pub struct ChartSession<A, S> {
    inner: Rc<RefCell<SessionInner<S>>>,
    coordinator: Rc<FetchCoordinator<A>>,
    surface_factory: Rc<dyn Fn() -> Option<S>>,
    observer: Rc<RefCell<Option<Box<dyn Fn(&SessionState)>>>>,
}

impl<A, S> Clone for ChartSession<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            coordinator: Rc::clone(&self.coordinator),
            surface_factory: Rc::clone(&self.surface_factory),
            observer: Rc::clone(&self.observer),
        }
    }
}

impl<A, S> ChartSession<A, S>
where
    A: MarketDataApi + 'static,
    S: ChartSurface + 'static,
{
    pub fn new(
        api: Rc<A>,
        cache: Rc<CandleCache>,
        surface_factory: impl Fn() -> Option<S> + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SessionInner {
                symbol: None,
                interval: TimeInterval::OneHour,
                status: SessionStatus::Idle,
                candles: Vec::new(),
                snapshot: None,
                error: None,
                visible_averages: vec![MaPeriod::Ma7, MaPeriod::Ma25, MaPeriod::Ma99],
                auto_refresh: false,
                generation: 0,
                in_flight: None,
                ticker: None,
                surface: None,
            })),
            coordinator: Rc::new(FetchCoordinator::new(api, cache)),
            surface_factory: Rc::new(surface_factory),
            observer: Rc::new(RefCell::new(None)),
        }
    }

    /// Called after every state transition. The callback must not call
    /// `set_observer` reentrantly.
    pub fn set_observer(&self, observer: impl Fn(&SessionState) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn state(&self) -> SessionState {
        let inner = self.inner.borrow();
        SessionState {
            status: inner.status,
            symbol: inner.symbol.clone(),
            interval: inner.interval,
            candles: inner.candles.clone(),
            snapshot: inner.snapshot.clone(),
            error: inner.error.clone(),
            visible_averages: inner.visible_averages.clone(),
            auto_refresh: inner.auto_refresh,
        }
    }

    /// Select a symbol for viewing. A different symbol tears down the
    /// previous surface and starts a fresh session.
    pub fn open(&self, symbol: Symbol) -> Option<LocalBoxFuture<'static, ()>> {
        let symbol = symbol.ensure_usdt();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.symbol.as_ref() != Some(&symbol) {
                inner.generation += 1;
                if let Some(handle) = inner.in_flight.take() {
                    handle.abort();
                }
                if let Some(mut surface) = inner.surface.take() {
                    surface.teardown();
                }
                inner.candles.clear();
                inner.snapshot = None;
                inner.error = None;
                inner.symbol = Some(symbol.clone());
            }
        }
        get_logger().info(
            LogComponent::Application("ChartSession"),
            &format!("opening session for {}", symbol),
        );
        self.refresh(RefreshKind::UserAction)
    }

    /// Tear the session down: cancel in-flight work and the refresh ticker,
    /// release the surface, go Idle. Late completions are rejected by the
    /// generation bump.
    pub fn close(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.symbol.is_none() && inner.status == SessionStatus::Idle {
                return;
            }
            inner.generation += 1;
            if let Some(handle) = inner.in_flight.take() {
                handle.abort();
            }
            if let Some(handle) = inner.ticker.take() {
                handle.abort();
            }
            if let Some(mut surface) = inner.surface.take() {
                surface.teardown();
            }
            inner.symbol = None;
            inner.candles.clear();
            inner.snapshot = None;
            inner.error = None;
            inner.auto_refresh = false;
            inner.status = SessionStatus::Idle;
        }
        get_logger().info(LogComponent::Application("ChartSession"), "session closed");
        self.notify();
    }

    pub fn set_timeframe(&self, interval: TimeInterval) -> Option<LocalBoxFuture<'static, ()>> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.interval == interval {
                return None;
            }
            inner.interval = interval;
            if inner.symbol.is_none() {
                drop(inner);
                self.notify();
                return None;
            }
        }
        self.refresh(RefreshKind::UserAction)
    }

    pub fn toggle_average(&self, period: MaPeriod) -> Option<LocalBoxFuture<'static, ()>> {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(pos) = inner.visible_averages.iter().position(|&p| p == period) {
                inner.visible_averages.remove(pos);
            } else {
                inner.visible_averages.push(period);
                inner.visible_averages.sort_by_key(|p| p.period());
            }
            if inner.symbol.is_none() {
                drop(inner);
                self.notify();
                return None;
            }
        }
        self.refresh(RefreshKind::UserAction)
    }

    /// Start or stop the 10s refresh ticker, in lockstep with the flag.
    pub fn set_auto_refresh(&self, enabled: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.auto_refresh == enabled {
                return;
            }
            inner.auto_refresh = enabled;
            if !enabled {
                if let Some(handle) = inner.ticker.take() {
                    handle.abort();
                }
            }
        }
        if enabled {
            self.start_ticker();
        }
        self.notify();
    }

    /// One auto-refresh cycle: drop the cache entry for the active key, then
    /// refetch without flashing the spinner over data already on screen.
    pub fn auto_refresh_tick(&self) -> Option<LocalBoxFuture<'static, ()>> {
        let (key, had_prior) = {
            let inner = self.inner.borrow();
            let symbol = inner.symbol.clone()?;
            (MarketKey::new(symbol, inner.interval), !inner.candles.is_empty())
        };
        self.coordinator.cache().invalidate(&key);
        self.refresh(RefreshKind::AutoRefresh { had_prior })
    }

    #[cfg(target_arch = "wasm32")]
    fn start_ticker(&self) {
        use crate::domain::config::AUTO_REFRESH_INTERVAL_MS;
        use std::time::Duration;

        let (handle, registration) = AbortHandle::new_pair();
        self.inner.borrow_mut().ticker = Some(handle);

        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let ticker = Abortable::new(
                async move {
                    loop {
                        gloo_timers::future::sleep(Duration::from_millis(
                            AUTO_REFRESH_INTERVAL_MS,
                        ))
                        .await;
                        if let Some(work) = this.auto_refresh_tick() {
                            work.await;
                        }
                    }
                },
                registration,
            );
            let _ = ticker.await;
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn start_ticker(&self) {
        // Off the browser there is no timer source; tests drive
        // `auto_refresh_tick` directly.
    }

    /// Run the fetch pipeline for the current key. Supersedes any request
    /// already in flight; at most one is outstanding per session.
    fn refresh(&self, kind: RefreshKind) -> Option<LocalBoxFuture<'static, ()>> {
        let (key, generation, show_loading) = {
            let mut inner = self.inner.borrow_mut();
            let symbol = inner.symbol.clone()?;
            let key = MarketKey::new(symbol, inner.interval);

            inner.generation += 1;
            let generation = inner.generation;
            if let Some(handle) = inner.in_flight.take() {
                handle.abort();
            }

            let show_loading = match kind {
                RefreshKind::UserAction => true,
                RefreshKind::AutoRefresh { had_prior } => !had_prior,
            };
            if show_loading {
                inner.status = SessionStatus::Loading;
                inner.error = None;
            }
            (key, generation, show_loading)
        };
        if show_loading {
            self.notify();
        }

        if let Some(entry) = self.coordinator.cached(&key) {
            self.apply_success(generation, entry.candles, entry.snapshot);
            return None;
        }

        let (handle, registration) = AbortHandle::new_pair();
        self.inner.borrow_mut().in_flight = Some(handle);

        let this = self.clone();
        Some(
            async move {
                match Abortable::new(this.coordinator.fetch_fresh(&key), registration).await {
                    Err(futures::future::Aborted) => {
                        get_logger().debug(
                            LogComponent::Application("ChartSession"),
                            &format!("superseded fetch for {} discarded", key),
                        );
                    }
                    Ok(Ok((candles, snapshot))) => {
                        this.apply_success(generation, candles, snapshot);
                    }
                    Ok(Err(err)) => this.apply_failure(generation, err),
                }
            }
            .boxed_local(),
        )
    }

    fn apply_success(&self, generation: u64, candles: Vec<Candle>, snapshot: PriceSnapshot) {
        {
            let mut inner = self.inner.borrow_mut();
            if generation != inner.generation {
                return;
            }
            inner.in_flight = None;
            inner.candles = candles;
            inner.snapshot = Some(snapshot);
            inner.error = None;
            inner.status = SessionStatus::Ready;

            if inner.surface.is_none() {
                inner.surface = (self.surface_factory)();
            }
            let view = ChartView::build(
                inner.interval,
                &inner.candles,
                inner.snapshot.as_ref(),
                &inner.visible_averages,
            );
            if let Some(surface) = inner.surface.as_mut() {
                surface.update(&view);
            }
        }
        self.notify();
    }

    fn apply_failure(&self, generation: u64, err: FetchError) {
        if err.is_cancellation() {
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            if generation != inner.generation {
                return;
            }
            inner.in_flight = None;
            inner.status = SessionStatus::Errored;
            inner.error = err.user_message().map(str::to_string);
        }
        get_logger().warn(
            LogComponent::Application("ChartSession"),
            &format!("fetch failed: {}", err),
        );
        self.notify();
    }

    fn notify(&self) {
        let state = self.state();
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&state);
        }
    }
}
