#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use coin_chart_wasm::application::fetch_coordinator::{
    KlineRecord, MarketDataApi, TickerRecord,
};
use coin_chart_wasm::application::session::SessionState;
use coin_chart_wasm::domain::chart::{ChartSurface, ChartView};
use coin_chart_wasm::domain::clock::Clock;
use coin_chart_wasm::domain::errors::{FetchError, FetchResult};
use coin_chart_wasm::domain::market_data::{Symbol, TimeInterval};

/// Fixed clock backed by a shared cell, advanced explicitly by tests.
#[derive(Clone)]
pub struct MockClock(Rc<Cell<u64>>);

impl MockClock {
    pub fn new(start_ms: u64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Synthetic kline history: hourly buckets, strictly increasing closes.
pub fn kline_fixture(count: usize) -> Vec<KlineRecord> {
    (0..count)
        .map(|i| {
            let close = 100.0 + i as f64;
            KlineRecord {
                time: (1_700_000_000 + i as u64 * 3_600) * 1_000,
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10.0 + i as f64,
            }
        })
        .collect()
}

pub fn ticker(symbol: &str, price: f64, change: f64) -> TickerRecord {
    TickerRecord {
        symbol: symbol.to_string(),
        current_price: price,
        price_change_percent: change,
        volume: 1_000.0,
    }
}

pub fn default_listing() -> Vec<TickerRecord> {
    vec![ticker("BTCUSDT", 50_000.0, 2.5), ticker("ETHUSDT", 3_000.0, -1.2)]
}

/// One scripted kline reply: either immediate, or held open until the test
/// fires the oneshot sender.
pub enum KlineReply {
    Ready(FetchResult<Vec<KlineRecord>>),
    Deferred(oneshot::Receiver<FetchResult<Vec<KlineRecord>>>),
}

/// Scripted stand-in for the dashboard backend. Replies are consumed in
/// order; when the script runs out, the default fixture is served.
pub struct MockApi {
    klines: RefCell<VecDeque<KlineReply>>,
    listing: RefCell<Vec<TickerRecord>>,
    pub kline_calls: Cell<usize>,
    pub listing_calls: Cell<usize>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            klines: RefCell::new(VecDeque::new()),
            listing: RefCell::new(default_listing()),
            kline_calls: Cell::new(0),
            listing_calls: Cell::new(0),
        }
    }

    pub fn push_klines(&self, reply: FetchResult<Vec<KlineRecord>>) {
        self.klines.borrow_mut().push_back(KlineReply::Ready(reply));
    }

    /// Queue a reply that blocks until the returned sender is fired, so a
    /// test can interleave completions.
    pub fn defer_klines(&self) -> oneshot::Sender<FetchResult<Vec<KlineRecord>>> {
        let (tx, rx) = oneshot::channel();
        self.klines.borrow_mut().push_back(KlineReply::Deferred(rx));
        tx
    }

    pub fn set_listing(&self, listing: Vec<TickerRecord>) {
        *self.listing.borrow_mut() = listing;
    }
}

impl MarketDataApi for MockApi {
    async fn fetch_klines(
        &self,
        _symbol: &Symbol,
        _interval: TimeInterval,
        limit: usize,
    ) -> FetchResult<Vec<KlineRecord>> {
        self.kline_calls.set(self.kline_calls.get() + 1);
        let reply = self.klines.borrow_mut().pop_front();
        match reply {
            None => Ok(kline_fixture(limit)),
            Some(KlineReply::Ready(result)) => result,
            Some(KlineReply::Deferred(rx)) => match rx.await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Network("mock reply dropped".to_string())),
            },
        }
    }

    async fn fetch_price_listing(&self) -> FetchResult<Vec<TickerRecord>> {
        self.listing_calls.set(self.listing_calls.get() + 1);
        Ok(self.listing.borrow().clone())
    }
}

/// What a surface saw in one `update` call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRecord {
    pub candle_count: usize,
    /// (period, series length) per visible overlay.
    pub ma_lens: Vec<(usize, usize)>,
}

#[derive(Default)]
pub struct SurfaceLog {
    pub updates: Vec<UpdateRecord>,
    pub teardowns: usize,
    pub created: usize,
}

/// Surface that records every update and teardown into a shared log.
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl ChartSurface for RecordingSurface {
    fn update(&mut self, view: &ChartView) {
        let ma_lens =
            view.averages.iter().map(|(p, series)| (p.period(), series.len())).collect();
        self.log
            .borrow_mut()
            .updates
            .push(UpdateRecord { candle_count: view.candles.len(), ma_lens });
    }

    fn teardown(&mut self) {
        self.log.borrow_mut().teardowns += 1;
    }
}

pub fn surface_factory(log: &Rc<RefCell<SurfaceLog>>) -> impl Fn() -> Option<RecordingSurface> + use<> {
    let log = Rc::clone(log);
    move || {
        log.borrow_mut().created += 1;
        Some(RecordingSurface { log: Rc::clone(&log) })
    }
}

/// Observer that appends every notified state to a shared list.
pub fn state_log() -> (Rc<RefCell<Vec<SessionState>>>, impl Fn(&SessionState) + 'static) {
    let log: Rc<RefCell<Vec<SessionState>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, move |state: &SessionState| sink.borrow_mut().push(state.clone()))
}

/// Spawn session work when a fetch actually went async.
pub fn spawn(spawner: &LocalSpawner, work: Option<LocalBoxFuture<'static, ()>>) {
    if let Some(work) = work {
        spawner.spawn_local(work).unwrap();
    }
}
