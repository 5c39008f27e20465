mod common;

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::LocalPool;

use coin_chart_wasm::application::candle_cache::CandleCache;
use coin_chart_wasm::application::session::{ChartSession, SessionStatus};
use coin_chart_wasm::domain::market_data::{Symbol, TimeInterval};
use common::{
    MockApi, MockClock, RecordingSurface, SurfaceLog, kline_fixture, spawn, surface_factory,
};

type TestSession = ChartSession<MockApi, RecordingSurface>;

fn setup() -> (Rc<MockApi>, TestSession, Rc<RefCell<SurfaceLog>>) {
    let api = Rc::new(MockApi::new());
    let clock = MockClock::new(1_000_000);
    let cache = Rc::new(CandleCache::new(Rc::new(clock)));
    let log = Rc::new(RefCell::new(SurfaceLog::default()));
    let session = ChartSession::new(Rc::clone(&api), cache, surface_factory(&log));
    (api, session, log)
}

#[test]
fn late_reply_from_superseded_fetch_is_discarded() {
    let (api, session, log) = setup();
    let mut pool = LocalPool::new();

    let first_reply = api.defer_klines();
    let second_reply = api.defer_klines();

    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();
    assert_eq!(session.state().status, SessionStatus::Loading);

    // supersede the hanging fetch before it resolves
    spawn(&pool.spawner(), session.set_timeframe(TimeInterval::FourHours));
    pool.run_until_stalled();

    // the first fetch completes out of order; its 50 candles must never land
    let _ = first_reply.send(Ok(kline_fixture(50)));
    pool.run_until_stalled();
    assert_eq!(session.state().status, SessionStatus::Loading);
    assert!(session.state().candles.is_empty());

    second_reply.send(Ok(kline_fixture(120))).unwrap();
    pool.run_until_stalled();

    let state = session.state();
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.interval, TimeInterval::FourHours);
    assert_eq!(state.candles.len(), 120);
    assert_eq!(log.borrow().updates.len(), 1);
    assert_eq!(log.borrow().created, 1);
}

#[test]
fn close_mid_flight_rejects_the_completion() {
    let (api, session, log) = setup();
    let mut pool = LocalPool::new();

    let reply = api.defer_klines();
    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();
    assert_eq!(session.state().status, SessionStatus::Loading);

    session.close();

    let _ = reply.send(Ok(kline_fixture(120)));
    pool.run_until_stalled();

    let state = session.state();
    assert_eq!(state.status, SessionStatus::Idle);
    assert!(state.candles.is_empty());
    assert_eq!(log.borrow().updates.len(), 0);
    assert_eq!(log.borrow().created, 0);
}

#[test]
fn rapid_symbol_switches_settle_on_the_last() {
    let (api, session, log) = setup();
    let mut pool = LocalPool::new();

    let btc_reply = api.defer_klines();
    let eth_reply = api.defer_klines();

    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();
    spawn(&pool.spawner(), session.open(Symbol::from("ETHUSDT")));
    pool.run_until_stalled();

    let _ = btc_reply.send(Ok(kline_fixture(30)));
    eth_reply.send(Ok(kline_fixture(120))).unwrap();
    pool.run_until_stalled();

    let state = session.state();
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.symbol, Some(Symbol::from("ETHUSDT")));
    assert_eq!(state.candles.len(), 120);
    assert_eq!(log.borrow().updates.len(), 1);
}
