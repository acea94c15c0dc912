//! Heikin-Ashi candle derivation.

use super::candle::Candle;

/// Derive a Heikin-Ashi candle from a raw candle and the previously derived one.
///
/// The first candle of a series (`previous == None`) is passed through unchanged.
pub fn transform(candle: &Candle, previous: Option<&Candle>) -> Candle {
    let Some(prev) = previous else {
        return *candle;
    };

    let open = (prev.open + prev.close) / 2.0;
    let close = candle.average_price();
    Candle {
        timestamp: candle.timestamp,
        open,
        high: candle.high.max(open).max(close),
        low: candle.low.min(open).min(close),
        close,
    }
}

/// Derive a full Heikin-Ashi series from raw candles.
pub fn heikin_ashi(candles: &[Candle]) -> Vec<Candle> {
    let mut derived: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        let next = transform(candle, derived.last());
        derived.push(next);
    }
    derived
}
