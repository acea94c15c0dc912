//! Core domain types and logic.

pub mod sample;
pub mod candle;
pub mod resample;
pub mod heikin_ashi;
pub mod ledger;
pub mod signal;
pub mod engine;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
