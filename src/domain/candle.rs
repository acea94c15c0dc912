//! OHLC candle representation.
//!
//! Raw candles (from the resampler) and Heikin-Ashi candles share this type.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Timestamp of the first sample that went into the candle.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// A candle whose four prices are all `price`.
    pub fn flat(timestamp: i64, price: f64) -> Self {
        Candle {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    /// low <= min(open, close) <= max(open, close) <= high
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }

    /// (open + high + low + close) / 4
    pub fn average_price(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
