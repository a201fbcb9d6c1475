//! Market-data ingestion, technical indicators and crossover backtesting
//! for a live quote dashboard.
//!
//! The ingestion side receives quote, candle and latency streams from an
//! external publisher on background threads and hands them to the UI thread
//! through lock-free queues. The analysis side computes SMA, EMA, RSI, MACD
//! and VWAP over price series and replays crossover strategies against them.

pub mod backtest;
pub mod config;
pub mod control;
pub mod data_loader;
pub mod decoder;
pub mod error;
pub mod indicators;
pub mod ingest;
pub mod models;
pub mod transport;

pub use error::{Result, TickdeckError};
