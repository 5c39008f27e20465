mod common;

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::LocalPool;

use coin_chart_wasm::application::candle_cache::CandleCache;
use coin_chart_wasm::application::session::{ChartSession, SessionStatus};
use coin_chart_wasm::domain::errors::FetchError;
use coin_chart_wasm::domain::market_data::Symbol;
use common::{MockApi, MockClock, RecordingSurface, SurfaceLog, spawn, state_log, surface_factory};

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
fn flag_follows_set_auto_refresh() {
    let (_api, session, _log) = setup();

    assert!(!session.state().auto_refresh);
    session.set_auto_refresh(true);
    assert!(session.state().auto_refresh);
    session.set_auto_refresh(false);
    assert!(!session.state().auto_refresh);
}

#[test]
fn tick_bypasses_the_cache() {
    let (api, session, log) = setup();
    let mut pool = LocalPool::new();

    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();
    assert_eq!(api.kline_calls.get(), 1);

    // still inside the TTL; the tick must refetch anyway
    spawn(&pool.spawner(), session.auto_refresh_tick());
    pool.run_until_stalled();

    assert_eq!(api.kline_calls.get(), 2);
    assert_eq!(log.borrow().updates.len(), 2);
    assert_eq!(session.state().status, SessionStatus::Ready);
}

#[test]
fn tick_with_data_on_screen_never_shows_loading() {
    let (_api, session, _log) = setup();
    let mut pool = LocalPool::new();

    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();

    let (states, observer) = state_log();
    session.set_observer(observer);

    spawn(&pool.spawner(), session.auto_refresh_tick());
    assert_eq!(session.state().status, SessionStatus::Ready);
    pool.run_until_stalled();

    let statuses: Vec<SessionStatus> = states.borrow().iter().map(|s| s.status).collect();
    assert_eq!(statuses, vec![SessionStatus::Ready]);
}

#[test]
fn tick_without_prior_data_shows_loading() {
    let (api, session, _log) = setup();
    let mut pool = LocalPool::new();

    api.push_klines(Err(FetchError::Network("HTTP 502".to_string())));
    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();
    assert_eq!(session.state().status, SessionStatus::Errored);

    spawn(&pool.spawner(), session.auto_refresh_tick());
    assert_eq!(session.state().status, SessionStatus::Loading);
    pool.run_until_stalled();

    assert_eq!(session.state().status, SessionStatus::Ready);
}

#[test]
fn tick_failure_keeps_the_stale_view() {
    let (api, session, log) = setup();
    let mut pool = LocalPool::new();

    spawn(&pool.spawner(), session.open(Symbol::from("BTCUSDT")));
    pool.run_until_stalled();

    api.push_klines(Err(FetchError::Network("HTTP 500".to_string())));
    spawn(&pool.spawner(), session.auto_refresh_tick());
    pool.run_until_stalled();

    let state = session.state();
    assert_eq!(state.status, SessionStatus::Errored);
    assert_eq!(state.candles.len(), 120);
    assert_eq!(log.borrow().updates.len(), 1);
}

#[test]
fn idle_session_has_no_tick_work() {
    let (_api, session, _log) = setup();
    assert!(session.auto_refresh_tick().is_none());
}
