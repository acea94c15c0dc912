//! Trading signals computed from recent closing prices.

/// What a policy wants the engine to do on the current candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hold,
    GoLong,
    GoShort,
}

/// A strategy's decision function.
///
/// `closes` holds the rolling window of closing prices, oldest first, with
/// the current candle's close last.
pub trait SignalPolicy {
    fn decide(&self, closes: &[f64]) -> Signal;

    fn name(&self) -> &str;
}

/// Arithmetic mean, `None` when there are no prices.
pub fn sma<'a, I>(prices: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (sum, count) = prices
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, count), p| (sum + *p, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Goes long when the close drops below the window's moving average and
/// reverses short when it rises above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingAverageCrossover;

impl SignalPolicy for MovingAverageCrossover {
    fn decide(&self, closes: &[f64]) -> Signal {
        let (Some(&close), Some(average)) = (closes.last(), sma(closes)) else {
            return Signal::Hold;
        };

        if close < average {
            Signal::GoLong
        } else if close > average {
            Signal::GoShort
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &str {
        "Moving Average Crossover"
    }
}
