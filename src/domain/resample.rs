//! Resampling of raw samples into candles.
//!
//! Two policies are available:
//! - [`resample`] (count-based, the default): every window of `interval`
//!   consecutive samples is aggregated into one OHLC candle, so no sample is
//!   lost.
//! - [`sample_by_time`] (time-based): keeps one flat candle per sample whose
//!   timestamp has advanced at least `interval` seconds past the last kept
//!   sample. Samples in between are discarded.

use super::candle::Candle;
use super::error::ResampleError;
use super::sample::Sample;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMode {
    #[default]
    Count,
    Time,
}

impl ResampleMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "count" => Some(ResampleMode::Count),
            "time" => Some(ResampleMode::Time),
            _ => None,
        }
    }

    pub fn apply(self, samples: &[Sample], interval: i64) -> Result<Vec<Candle>, ResampleError> {
        match self {
            ResampleMode::Count => resample(samples, interval),
            ResampleMode::Time => sample_by_time(samples, interval),
        }
    }
}

impl fmt::Display for ResampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleMode::Count => write!(f, "count"),
            ResampleMode::Time => write!(f, "time"),
        }
    }
}

/// Checked in order: empty input, interval, sample ordering.
fn check_input(samples: &[Sample], interval: i64) -> Result<(), ResampleError> {
    if samples.is_empty() {
        return Err(ResampleError::EmptyInput);
    }
    if interval < 1 {
        return Err(ResampleError::InvalidInterval { interval });
    }
    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(ResampleError::OutOfOrder {
                index: index + 1,
                timestamp: pair[1].timestamp,
                previous: pair[0].timestamp,
            });
        }
    }
    Ok(())
}

/// Aggregate consecutive windows of `interval` samples into candles.
///
/// Produces `ceil(samples.len() / interval)` candles; the final window may be
/// shorter than `interval`.
pub fn resample(samples: &[Sample], interval: i64) -> Result<Vec<Candle>, ResampleError> {
    check_input(samples, interval)?;

    let window = usize::try_from(interval).unwrap_or(usize::MAX);
    let candles = samples
        .chunks(window)
        .map(|chunk| {
            let first = chunk[0];
            let last = chunk[chunk.len() - 1];
            let (high, low) = chunk.iter().fold((first.price, first.price), |(h, l), s| {
                (h.max(s.price), l.min(s.price))
            });
            Candle {
                timestamp: first.timestamp,
                open: first.price,
                high,
                low,
                close: last.price,
            }
        })
        .collect();

    Ok(candles)
}

/// Keep sparse snapshots at least `interval` seconds apart.
pub fn sample_by_time(samples: &[Sample], interval: i64) -> Result<Vec<Candle>, ResampleError> {
    check_input(samples, interval)?;

    let mut candles = Vec::new();
    let mut last_kept: Option<i64> = None;

    for sample in samples {
        let keep = match last_kept {
            None => true,
            // a gap too wide for i64 is always far enough
            Some(ts) => sample
                .timestamp
                .checked_sub(ts)
                .is_none_or(|gap| gap >= interval),
        };
        if keep {
            candles.push(Candle::flat(sample.timestamp, sample.price));
            last_kept = Some(sample.timestamp);
        }
    }

    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn minutes(prices: &[f64]) -> Vec<Sample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Sample::new(i as i64 * 60, p))
            .collect()
    }

    #[test]
    fn flat_series_interval_one() {
        let samples = minutes(&[100.0; 5]);
        let candles = resample(&samples, 1).unwrap();
        assert_eq!(candles.len(), 5);
        for (i, c) in candles.iter().enumerate() {
            assert_eq!(c.timestamp, i as i64 * 60);
            assert_eq!(*c, Candle::flat(c.timestamp, 100.0));
        }
    }

    #[test]
    fn window_aggregates_ohlc() {
        let samples = minutes(&[10.0, 12.0, 8.0, 11.0]);
        let candles = resample(&samples, 4).unwrap();
        assert_eq!(
            candles,
            vec![Candle {
                timestamp: 0,
                open: 10.0,
                high: 12.0,
                low: 8.0,
                close: 11.0,
            }]
        );
    }

    #[test]
    fn short_final_window_is_emitted() {
        let samples = minutes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let candles = resample(&samples, 2).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[2], Candle::flat(240, 5.0));
        assert_eq!(candles[1].timestamp, 120);
        assert_eq!(candles[1].open, 3.0);
        assert_eq!(candles[1].close, 4.0);
    }

    #[test]
    fn interval_larger_than_input() {
        let samples = minutes(&[3.0, 1.0, 2.0]);
        let candles = resample(&samples, 100).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].high, 3.0);
        assert_eq!(candles[0].low, 1.0);
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(resample(&[], 1), Err(ResampleError::EmptyInput));
        assert_eq!(sample_by_time(&[], 60), Err(ResampleError::EmptyInput));
    }

    #[test]
    fn empty_input_is_reported_before_interval() {
        assert_eq!(resample(&[], 0), Err(ResampleError::EmptyInput));
        assert_eq!(sample_by_time(&[], -1), Err(ResampleError::EmptyInput));
    }

    #[test]
    fn interval_is_reported_before_ordering() {
        let samples = vec![Sample::new(60, 1.0), Sample::new(0, 2.0)];
        assert_eq!(
            resample(&samples, 0),
            Err(ResampleError::InvalidInterval { interval: 0 })
        );
    }

    #[test]
    fn zero_interval_fails() {
        let samples = minutes(&[1.0]);
        assert_eq!(
            resample(&samples, 0),
            Err(ResampleError::InvalidInterval { interval: 0 })
        );
        assert_eq!(
            sample_by_time(&samples, -5),
            Err(ResampleError::InvalidInterval { interval: -5 })
        );
    }

    #[test]
    fn unordered_input_fails() {
        let samples = vec![Sample::new(60, 1.0), Sample::new(0, 2.0)];
        assert_eq!(
            resample(&samples, 1),
            Err(ResampleError::OutOfOrder {
                index: 1,
                timestamp: 0,
                previous: 60,
            })
        );
    }

    #[test]
    fn equal_timestamps_are_accepted() {
        let samples = vec![Sample::new(0, 1.0), Sample::new(0, 2.0)];
        assert_eq!(resample(&samples, 1).unwrap().len(), 2);
    }

    #[test]
    fn time_sampling_skips_intermediate_samples() {
        let samples = minutes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let candles = sample_by_time(&samples, 120).unwrap();
        assert_eq!(
            candles,
            vec![
                Candle::flat(0, 1.0),
                Candle::flat(120, 3.0),
                Candle::flat(240, 5.0)
            ]
        );
    }

    #[test]
    fn time_sampling_measures_from_last_kept_sample() {
        let samples = vec![
            Sample::new(0, 1.0),
            Sample::new(50, 2.0),
            Sample::new(70, 3.0),
            Sample::new(130, 4.0),
        ];
        let candles = sample_by_time(&samples, 60).unwrap();
        let stamps: Vec<i64> = candles.iter().map(|c| c.timestamp).collect();
        assert_eq!(stamps, vec![0, 70, 130]);
    }

    #[test]
    fn time_sampling_handles_extreme_timestamps() {
        let samples = vec![Sample::new(i64::MIN, 1.0), Sample::new(i64::MAX, 2.0)];
        let candles = sample_by_time(&samples, 60).unwrap();
        assert_eq!(
            candles,
            vec![Candle::flat(i64::MIN, 1.0), Candle::flat(i64::MAX, 2.0)]
        );

        let samples = vec![
            Sample::new(i64::MAX - 10, 1.0),
            Sample::new(i64::MAX, 2.0),
        ];
        assert_eq!(sample_by_time(&samples, 60).unwrap().len(), 1);
        assert_eq!(sample_by_time(&samples, i64::MAX).unwrap().len(), 1);
    }

    #[test]
    fn mode_parse_and_dispatch() {
        assert_eq!(ResampleMode::parse("Count"), Some(ResampleMode::Count));
        assert_eq!(ResampleMode::parse(" time "), Some(ResampleMode::Time));
        assert_eq!(ResampleMode::parse("ticks"), None);

        let samples = minutes(&[1.0, 2.0, 3.0]);
        assert_eq!(ResampleMode::Count.apply(&samples, 3).unwrap().len(), 1);
        assert_eq!(ResampleMode::Time.apply(&samples, 60).unwrap().len(), 3);
    }

    fn sample_series() -> impl Strategy<Value = Vec<Sample>> {
        prop::collection::vec((0i64..600, 0.01f64..10_000.0), 1..200).prop_map(|steps| {
            let mut ts = 0i64;
            steps
                .into_iter()
                .map(|(dt, price)| {
                    ts += dt;
                    Sample::new(ts, price)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn candle_count_is_ceil_of_len_over_interval(
            samples in sample_series(),
            interval in 1i64..50,
        ) {
            let candles = resample(&samples, interval).unwrap();
            let expected = samples.len().div_ceil(interval as usize);
            prop_assert_eq!(candles.len(), expected);
            for c in &candles {
                prop_assert!(c.is_consistent());
            }
        }

        #[test]
        fn time_sampling_never_grows(
            samples in sample_series(),
            interval in 1i64..3_600,
        ) {
            let candles = sample_by_time(&samples, interval).unwrap();
            prop_assert!(!candles.is_empty());
            prop_assert!(candles.len() <= samples.len());
            for pair in candles.windows(2) {
                prop_assert!(pair[1].timestamp - pair[0].timestamp >= interval);
            }
        }
    }
}
