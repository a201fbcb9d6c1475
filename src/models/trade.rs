//! Backtest trade log models.

use std::fmt;

use serde::Serialize;

/// Action recorded for one backtest iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Buy,
    Sell,
    Hold,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "BUY",
            OrderType::Sell => "SELL",
            OrderType::Hold => "HOLD",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a backtest trade log.
///
/// Rows are produced once per iteration and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    /// Date label of the bar the action executes on.
    pub execution_date: String,
    pub order_type: OrderType,
    /// Shares traded by this row; zero for HOLD.
    pub shares: u64,
    /// Open price of the execution bar.
    pub strike_price: f64,
    pub unrealized_pnl: f64,
    /// Cumulative realized profit and loss.
    pub realized_pnl: f64,
    pub total_equity_value: f64,
    /// Position after this row's action.
    pub held_shares: u64,
}
