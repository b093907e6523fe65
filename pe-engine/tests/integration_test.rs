//! Integration tests for pe-engine
//!
//! Full ticks through the orchestrator against replayed candles and the paper
//! executor.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use pe_engine::prelude::*;

const INDEX: &str = "NSE:NIFTY50-INDEX";
const OPTION: &str = "NSE:NIFTY24JUL24050PE";

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 3, 45, 0).unwrap()
}

/// `count` candles spaced `step` apart, closing at `close` (open = close)
fn flat(count: i64, step: Duration, close: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::new(base_time() + step * i as i32, close, close, close, close, 1000.0))
        .collect()
}

/// Flat candles followed by one candle with the given open and close
fn flat_then(count: i64, step: Duration, close: f64, last_open: f64, last_close: f64) -> Vec<Candle> {
    let mut candles = flat(count - 1, step, close);
    let ts = base_time() + step * (count - 1) as i32;
    candles.push(Candle::new(
        ts,
        last_open,
        last_open.max(last_close),
        last_open.min(last_close),
        last_close,
        1000.0,
    ));
    candles
}

/// 19 option closes alternating 90/110, then `last`
fn choppy_option(last: f64) -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..19)
        .map(|i| {
            let close = if i % 2 == 0 { 90.0 } else { 110.0 };
            Candle::new(base_time() + Duration::minutes(5 * i), close, close, close, close, 0.0)
        })
        .collect();
    candles.push(Candle::new(base_time() + Duration::minutes(95), last, last, last, last, 0.0));
    candles
}

/// Index at 24030, clear of HTF confluence, bearish breakout on 30m,
/// option series that hits both exits on the first poll.
fn trade_ready_storage() -> DataStorage {
    let mut storage = DataStorage::new();
    storage.set_candles(INDEX, Timeframe::Minutes(1), flat_then(30, Duration::minutes(1), 24000.0, 24010.0, 24030.0));
    storage.set_candles(INDEX, Timeframe::Day, flat_then(60, Duration::days(1), 24000.0, 24000.0, 24300.0));
    storage.set_candles(INDEX, Timeframe::Minutes(240), flat_then(60, Duration::hours(4), 24000.0, 24000.0, 24300.0));
    storage.set_candles(INDEX, Timeframe::Minutes(30), flat_then(20, Duration::minutes(30), 24000.0, 24400.0, 24300.0));
    storage.set_candles(INDEX, Timeframe::Minutes(15), flat(20, Duration::minutes(15), 24000.0));
    storage.set_candles(INDEX, Timeframe::Minutes(10), flat(20, Duration::minutes(10), 24000.0));
    storage.set_candles(OPTION, Timeframe::Minutes(5), flat_then(20, Duration::minutes(5), 100.0, 110.0, 110.0));
    storage
}

/// Keeps every message it is asked to send
#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct BrokenNotifier;

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn notify(&self, _text: &str) -> Result<()> {
        Err(EngineError::Notification("bot was blocked by the user".to_string()))
    }
}

/// Serves one scripted option series per poll; everything else from storage
struct ScriptedProvider {
    storage: DataStorage,
    option_polls: Mutex<VecDeque<Vec<Candle>>>,
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn get_candles(&self, symbol: &str, timeframe: Timeframe, lookback_days: u32) -> Result<CandleSeries> {
        if symbol == OPTION {
            let mut polls = self.option_polls.lock().unwrap();
            let candles = if polls.len() > 1 {
                polls.pop_front().unwrap()
            } else {
                polls.front().cloned().unwrap_or_default()
            };
            return Ok(candles.into());
        }
        self.storage.get_candles(symbol, timeframe, lookback_days).await
    }
}

fn orchestrator(
    data: Arc<dyn MarketDataProvider>,
    orders: Arc<PaperExecutor>,
    notifier: Arc<dyn Notifier>,
) -> Orchestrator {
    Orchestrator::new(StrategyConfig::new("24JUL"), data, orders, notifier)
}

#[tokio::test]
async fn test_full_trade_cycle() {
    let data = Arc::new(trade_ready_storage());
    let paper = Arc::new(PaperExecutor::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = orchestrator(data.clone(), paper.clone(), notifier.clone());

    let outcome = engine.run_once().await.unwrap();

    let TickOutcome::Traded { signal, entry_order, position } = outcome else {
        panic!("expected a trade");
    };
    assert!(signal.is_entry());
    assert_eq!(signal.reason, SignalReason::Breakout { timeframe: Timeframe::Minutes(30) });
    assert_eq!(entry_order.symbol, OPTION);
    assert_eq!(entry_order.quantity, 50);
    assert!(position.is_closed());
    assert!(position.partial_exit_done);

    assert_eq!(paper.quantities(OrderSide::Buy), vec![50]);
    assert_eq!(paper.quantities(OrderSide::Sell), vec![25, 25]);
    assert!(paper.orders().iter().all(|o| o.symbol == OPTION));
    assert!(!engine.is_trade_in_progress());

    let messages = notifier.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("BUY"));
    assert!(messages[1].contains("50% EXIT"));
    assert!(messages[2].contains("FINAL EXIT"));
}

#[tokio::test]
async fn test_daily_confluence_short_circuits() {
    let mut storage = DataStorage::new();
    storage.set_candles(INDEX, Timeframe::Minutes(1), flat(30, Duration::minutes(1), 24000.0));
    storage.set_candles(INDEX, Timeframe::Day, flat(60, Duration::days(1), 24000.0));
    let data = Arc::new(storage);
    let paper = Arc::new(PaperExecutor::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = orchestrator(data.clone(), paper.clone(), notifier.clone());

    let outcome = engine.run_once().await.unwrap();

    let TickOutcome::NoEntry(signal) = outcome else {
        panic!("expected no entry");
    };
    assert!(signal.confluence);
    assert!(!signal.is_entry());
    assert_eq!(
        signal.reason,
        SignalReason::Confluence { timeframe: Timeframe::Day, ema_period: 5 }
    );
    // 240 and the lower timeframes are never requested
    assert_eq!(
        data.fetches(),
        vec![format!("{}:1", INDEX), format!("{}:1D", INDEX)]
    );
    assert_eq!(paper.attempts(), 0);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_no_breakout_waits_for_confirmation() {
    let mut storage = trade_ready_storage();
    storage.set_candles(INDEX, Timeframe::Minutes(30), flat(20, Duration::minutes(30), 24000.0));
    let data = Arc::new(storage);
    let paper = Arc::new(PaperExecutor::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = orchestrator(data.clone(), paper.clone(), notifier.clone());

    let outcome = engine.run_once().await.unwrap();

    assert!(matches!(outcome, TickOutcome::NoEntry(ref s) if s.reason == SignalReason::NoBreakout));
    assert_eq!(paper.attempts(), 0);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("waiting for LTF confirmation"));
}

#[tokio::test]
async fn test_thin_lower_timeframe_is_skipped() {
    let mut storage = trade_ready_storage();
    // too short for a 20-period band
    storage.set_candles(INDEX, Timeframe::Minutes(30), flat_then(5, Duration::minutes(30), 24000.0, 24400.0, 24300.0));
    storage.set_candles(INDEX, Timeframe::Minutes(15), flat_then(20, Duration::minutes(15), 24000.0, 24400.0, 24300.0));
    let data = Arc::new(storage);
    let paper = Arc::new(PaperExecutor::new());
    let engine = orchestrator(data, paper.clone(), Arc::new(LogNotifier));

    let outcome = engine.run_once().await.unwrap();

    let TickOutcome::Traded { signal, .. } = outcome else {
        panic!("expected a trade");
    };
    assert_eq!(signal.reason, SignalReason::Breakout { timeframe: Timeframe::Minutes(15) });
    assert_eq!(paper.quantities(OrderSide::Sell), vec![25, 25]);
}

#[tokio::test]
async fn test_missing_index_data_fails_tick() {
    let data = Arc::new(DataStorage::new());
    let paper = Arc::new(PaperExecutor::new());
    let engine = orchestrator(data, paper.clone(), Arc::new(LogNotifier));

    let result = engine.run_once().await;

    assert!(matches!(result, Err(EngineError::DataUnavailable { .. })));
    assert_eq!(paper.attempts(), 0);
    assert!(!engine.is_trade_in_progress());
}

#[tokio::test]
async fn test_failed_buy_opens_nothing() {
    let data = Arc::new(trade_ready_storage());
    let paper = Arc::new(PaperExecutor::new());
    let engine = orchestrator(data, paper.clone(), Arc::new(LogNotifier));

    paper.reject_next(1);
    let result = engine.run_once().await;

    assert!(matches!(result, Err(ref e) if e.is_order_failure()));
    assert!(paper.orders().is_empty());
    assert!(!engine.is_trade_in_progress());

    // the guard was released, so the next tick trades
    let outcome = engine.run_once().await.unwrap();
    assert!(matches!(outcome, TickOutcome::Traded { .. }));
}

#[tokio::test]
async fn test_notification_failures_do_not_stop_trade() {
    let data = Arc::new(trade_ready_storage());
    let paper = Arc::new(PaperExecutor::new());
    let engine = orchestrator(data, paper.clone(), Arc::new(BrokenNotifier));

    let outcome = engine.run_once().await.unwrap();

    assert!(matches!(outcome, TickOutcome::Traded { .. }));
    assert_eq!(paper.quantities(OrderSide::Sell), vec![25, 25]);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_tick_is_skipped() {
    let data = Arc::new(ScriptedProvider {
        storage: trade_ready_storage(),
        option_polls: Mutex::new(VecDeque::from(vec![
            choppy_option(95.0),
            choppy_option(102.0),
            choppy_option(130.0),
        ])),
    });
    let paper = Arc::new(PaperExecutor::new());
    let engine = Arc::new(orchestrator(data, paper.clone(), Arc::new(LogNotifier)));

    let running = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run_once().await }
    });

    // first poll has run and the exit loop is sleeping
    tokio::time::sleep(StdDuration::from_secs(1)).await;
    assert!(engine.is_trade_in_progress());
    assert!(matches!(engine.run_once().await.unwrap(), TickOutcome::Skipped));
    assert_eq!(paper.quantities(OrderSide::Buy), vec![50]);

    let outcome = running.await.unwrap().unwrap();
    assert!(matches!(outcome, TickOutcome::Traded { .. }));
    // partial on the second poll, final on the third
    assert_eq!(paper.quantities(OrderSide::Sell), vec![25, 25]);
    assert_eq!(paper.quantities(OrderSide::Buy), vec![50]);
    assert!(!engine.is_trade_in_progress());
}
