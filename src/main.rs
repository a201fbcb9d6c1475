use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use tickdeck::TickdeckError;
use tickdeck::backtest::{BacktestReport, macd_vwap, sma_crossover};
use tickdeck::config::{AppConfig, BacktestConfig, fetch_config};
use tickdeck::control::{ControlClient, ControlCommand, dispatch_symbol_requests};
use tickdeck::data_loader::load_market_data;
use tickdeck::decoder::Payload;
use tickdeck::indicators::{IndicatorParams, IndicatorSet};
use tickdeck::ingest::Feed;
use tickdeck::models::StreamKind;
use tickdeck::models::candle::CandleHistory;
use tickdeck::models::window::WindowRegistry;

/// Pause between polling rounds when no feed had anything queued.
const IDLE_POLL: Duration = Duration::from_millis(100);

fn main() -> Result<(), TickdeckError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?;

    if let Some(path) = &app_config.data_file {
        analyze_file(path, &app_config.backtest)?;
    }

    stream(&app_config)
}

/// Runs the indicator set and both strategies over a historical file.
fn analyze_file(path: &Path, backtest: &BacktestConfig) -> Result<(), TickdeckError> {
    let prices = load_market_data(path)?;
    let set = IndicatorSet::compute(&prices, &IndicatorParams::from(backtest));
    info!(
        bars = prices.len(),
        rsi = set.rsi.values.last().copied(),
        vwap = set.vwap.values.last().copied(),
        "Computed indicators"
    );

    let capital = backtest.starting_capital;
    let runs = [
        (
            "sma_crossover",
            sma_crossover(&prices, backtest.fast_sma, backtest.slow_sma, capital),
        ),
        (
            "macd_vwap",
            macd_vwap(
                &prices,
                backtest.macd_fast,
                backtest.macd_slow,
                backtest.macd_signal,
                capital,
            ),
        ),
    ];
    for (strategy, trades) in runs {
        let report = BacktestReport::from_trades(&trades, capital);
        info!(
            strategy,
            rows = trades.len(),
            round_trips = report.round_trips,
            total_pnl = report.total_pnl,
            win_rate = report.win_rate,
            max_drawdown = report.max_drawdown,
            "Backtest report"
        );
        debug!(strategy, report = %serde_json::to_string(&report)?, "Backtest report JSON");
    }
    Ok(())
}

/// Subscribes to the live streams and routes quotes to a single window.
fn stream(app_config: &AppConfig) -> Result<(), TickdeckError> {
    let mut registry = WindowRegistry::new(1, Vec::new());
    let Some(window) = registry.open_window() else {
        return Ok(());
    };
    registry.request_symbol(window, &app_config.symbol)?;

    let mut control =
        ControlClient::connect(&app_config.control.endpoint, app_config.control.timeout)?;
    dispatch_symbol_requests(&mut registry, &mut control);
    if let Err(e) = control.request(&ControlCommand::FireKlines(app_config.symbol.clone())) {
        warn!("Historical candle request failed: {e}");
    }

    let capacity = app_config.feeds.queue_capacity;
    let mut feeds = vec![
        Feed::connect(&app_config.feeds.quote_endpoint, StreamKind::Quote, capacity)?,
        Feed::connect(&app_config.feeds.candle_endpoint, StreamKind::Candle, capacity)?,
        Feed::connect(&app_config.feeds.latency_endpoint, StreamKind::Latency, capacity)?,
    ];
    let mut candles = CandleHistory::new();

    while feeds.iter().any(|f| f.is_running() || f.pending() > 0) {
        let mut received = false;
        for feed in &mut feeds {
            let Some(payload) = feed.poll() else {
                continue;
            };
            received = true;
            match payload {
                Payload::Quote(quote) => {
                    if registry.apply_quote(&quote) > 0 {
                        debug!(
                            symbol = %quote.symbol,
                            bid = quote.bid_price,
                            ask = quote.ask_price,
                            "Quote"
                        );
                    }
                }
                Payload::CandleBatch(batch) if batch.is_valid() => {
                    candles.extend_from_batch(&batch);
                    if let Some(latest) = candles.latest() {
                        info!(count = candles.len(), close = latest.close, "Candles updated");
                    }
                }
                Payload::Latency(report) if report.is_valid() => {
                    info!(message = %report.message, "Latency");
                }
                other => debug!(error = other.error(), "Skipped undecodable message"),
            }
        }
        if !received {
            thread::sleep(IDLE_POLL);
        }
    }

    info!("All feeds closed");
    Ok(())
}
