//! Summary statistics of a trade log.

use serde::Serialize;

use crate::models::trade::{OrderType, Trade};

/// Profit and loss summary of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub starting_capital: f64,
    pub final_equity: f64,
    /// Final equity minus starting capital, open position included.
    pub total_pnl: f64,
    pub realized_pnl: f64,
    /// Number of SELL rows.
    pub round_trips: usize,
    /// Fraction of round trips closed at a profit, `0.0` without any.
    pub win_rate: f64,
    pub average_trade_pnl: f64,
    /// Largest peak-to-trough fall in equity.
    pub max_drawdown: f64,
    /// `max_drawdown` as a fraction of the peak it fell from.
    pub max_drawdown_pct: f64,
}

impl BacktestReport {
    pub fn from_trades(trades: &[Trade], starting_capital: f64) -> Self {
        let mut round_trips = 0;
        let mut wins = 0;
        let mut closed_pnl = 0.0;
        let mut previous_realized = 0.0;

        let mut peak = starting_capital;
        let mut max_drawdown = 0.0;
        let mut max_drawdown_pct = 0.0;

        for trade in trades {
            if trade.order_type == OrderType::Sell {
                let pnl = trade.realized_pnl - previous_realized;
                round_trips += 1;
                closed_pnl += pnl;
                if pnl > 0.0 {
                    wins += 1;
                }
            }
            previous_realized = trade.realized_pnl;

            let equity = trade.total_equity_value;
            if equity > peak {
                peak = equity;
            }
            let drawdown = peak - equity;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
                max_drawdown_pct = if peak > 0.0 { drawdown / peak } else { 0.0 };
            }
        }

        let final_equity = trades
            .last()
            .map_or(starting_capital, |t| t.total_equity_value);
        let (win_rate, average_trade_pnl) = if round_trips > 0 {
            (
                f64::from(wins) / round_trips as f64,
                closed_pnl / round_trips as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            starting_capital,
            final_equity,
            total_pnl: final_equity - starting_capital,
            realized_pnl: previous_realized,
            round_trips,
            win_rate,
            average_trade_pnl,
            max_drawdown,
            max_drawdown_pct,
        }
    }
}
