#![allow(dead_code)]

use tickreplay::domain::backtest::{CandleKind, ReplayConfig};
use tickreplay::domain::candle::Candle;
use tickreplay::domain::error::ReplayError;
use tickreplay::domain::resample::ResampleMode;
pub use tickreplay::domain::sample::Sample;
use tickreplay::domain::sample::within_range;
use tickreplay::ports::data_port::DataPort;

pub struct MockDataPort {
    pub samples: Vec<Sample>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            error: None,
        }
    }

    pub fn with_samples(mut self, samples: Vec<Sample>) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), ReplayError> {
        match &self.error {
            Some(reason) => Err(ReplayError::Data {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_samples(&self, start: i64, end: i64) -> Result<Vec<Sample>, ReplayError> {
        self.check()?;
        Ok(within_range(&self.samples, start, end))
    }

    fn get_data_range(&self) -> Result<Option<(i64, i64, usize)>, ReplayError> {
        self.check()?;
        Ok(match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                Some((first.timestamp, last.timestamp, self.samples.len()))
            }
            _ => None,
        })
    }
}

/// One sample per minute starting at timestamp 0.
pub fn minute_samples(prices: &[f64]) -> Vec<Sample> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Sample::new(i as i64 * 60, p))
        .collect()
}

pub fn flat_candles(prices: &[f64]) -> Vec<Candle> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Candle::flat(i as i64 * 60, p))
        .collect()
}

/// Closes rising by 1 for `up` candles, then falling by 1 for `down` candles.
pub fn rise_then_fall(start: f64, up: usize, down: usize) -> Vec<f64> {
    let peak = start + up as f64;
    (0..=up)
        .map(|i| start + i as f64)
        .chain((1..=down).map(|i| peak - i as f64))
        .collect()
}

pub fn sample_config(end: i64) -> ReplayConfig {
    ReplayConfig {
        initial_cash: 1000.0,
        start: 0,
        end,
        interval: 1,
        mode: ResampleMode::Count,
        window_size: 5,
        candles: CandleKind::Raw,
    }
}
