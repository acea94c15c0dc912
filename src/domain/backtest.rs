//! Replay parameters.
//!
//! A validated `ReplayConfig` is everything the pipeline needs besides the
//! sample source itself.

use super::resample::ResampleMode;
use std::fmt;

/// Which candles the strategy sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandleKind {
    #[default]
    Raw,
    HeikinAshi,
}

impl CandleKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Some(CandleKind::Raw),
            "heikin_ashi" | "heikin-ashi" | "ha" => Some(CandleKind::HeikinAshi),
            _ => None,
        }
    }
}

impl fmt::Display for CandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleKind::Raw => write!(f, "raw"),
            CandleKind::HeikinAshi => write!(f, "heikin_ashi"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    pub initial_cash: f64,
    /// Inclusive, unix seconds.
    pub start: i64,
    /// Inclusive, unix seconds.
    pub end: i64,
    pub interval: i64,
    pub mode: ResampleMode,
    pub window_size: usize,
    pub candles: CandleKind,
}
