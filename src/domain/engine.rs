//! Strategy execution loop.
//!
//! Candles are consumed strictly in order. Each close is pushed into a FIFO
//! window of `window_size` closes and the [`SignalPolicy`] decides whether to
//! reverse into a long or a short. A rejected ledger operation is recorded
//! and the rest of that candle's orders are skipped; the run continues with
//! the next candle. After the last candle every open position is closed at
//! the last close.

use std::collections::VecDeque;

use super::candle::Candle;
use super::error::{LedgerError, ReplayError};
use super::ledger::{Ledger, TransactionKind};
use super::signal::{sma, Signal, SignalPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub timestamp: i64,
    pub operation: TransactionKind,
    pub error: LedgerError,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub policy: String,
    pub window_size: usize,
    pub candles_processed: usize,
    pub ledger: Ledger,
    pub rejections: Vec<Rejection>,
    pub equity_curve: Vec<EquityPoint>,
}

pub struct StrategyEngine<'a> {
    ledger: Ledger,
    policy: &'a dyn SignalPolicy,
    window_size: usize,
    window: VecDeque<f64>,
    last_candle: Option<Candle>,
    candles_processed: usize,
    rejections: Vec<Rejection>,
    equity_curve: Vec<EquityPoint>,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(
        ledger: Ledger,
        window_size: usize,
        policy: &'a dyn SignalPolicy,
    ) -> Result<Self, ReplayError> {
        if window_size == 0 {
            return Err(ReplayError::InvalidWindow { window_size });
        }
        Ok(StrategyEngine {
            ledger,
            policy,
            window_size,
            window: VecDeque::with_capacity(window_size + 1),
            last_candle: None,
            candles_processed: 0,
            rejections: Vec::new(),
            equity_curve: Vec::new(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Moving average of the closes currently in the window.
    pub fn moving_average(&self) -> Option<f64> {
        sma(&self.window)
    }

    /// Process one candle. Callers may stop between any two steps.
    pub fn step(&mut self, candle: &Candle) {
        self.window.push_back(candle.close);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        let signal = self.policy.decide(self.window.make_contiguous());
        let (ts, close) = (candle.timestamp, candle.close);

        match signal {
            Signal::GoLong if !self.ledger.has_long() => {
                if self.ledger.has_short() {
                    let number = self.ledger.short_position();
                    if !self.apply(TransactionKind::CloseShort, ts, close, number) {
                        return self.mark(candle);
                    }
                }
                let number = self.ledger.cash() / close;
                self.apply(TransactionKind::Buy, ts, close, number);
            }
            Signal::GoShort if self.ledger.has_long() => {
                let number = self.ledger.long_position();
                if !self.apply(TransactionKind::Sell, ts, close, number) {
                    return self.mark(candle);
                }
                let number = self.ledger.cash() / close;
                self.apply(TransactionKind::Short, ts, close, number);
            }
            _ => {}
        }

        self.mark(candle);
    }

    /// Close every open position at the last candle's close and hand back
    /// the final state.
    pub fn finish(mut self) -> RunReport {
        if let Some(last) = self.last_candle {
            let (ts, close) = (last.timestamp, last.close);
            if self.ledger.has_long() {
                let number = self.ledger.long_position();
                self.apply(TransactionKind::Sell, ts, close, number);
            }
            if self.ledger.has_short() {
                let number = self.ledger.short_position();
                self.apply(TransactionKind::CloseShort, ts, close, number);
            }
            let equity = self.ledger.equity(close);
            if let Some(point) = self.equity_curve.last_mut() {
                point.equity = equity;
            }
        }

        if !self.ledger.is_flat() {
            tracing::warn!(
                long = self.ledger.long_position(),
                short = self.ledger.short_position(),
                "run ended with open positions"
            );
        }

        RunReport {
            policy: self.policy.name().to_string(),
            window_size: self.window_size,
            candles_processed: self.candles_processed,
            ledger: self.ledger,
            rejections: self.rejections,
            equity_curve: self.equity_curve,
        }
    }

    fn mark(&mut self, candle: &Candle) {
        self.equity_curve.push(EquityPoint {
            timestamp: candle.timestamp,
            equity: self.ledger.equity(candle.close),
        });
        self.last_candle = Some(*candle);
        self.candles_processed += 1;
    }

    fn apply(
        &mut self,
        operation: TransactionKind,
        timestamp: i64,
        price: f64,
        number: f64,
    ) -> bool {
        let result = match operation {
            TransactionKind::Buy => self.ledger.buy(timestamp, price, number),
            TransactionKind::Sell => self.ledger.sell(timestamp, price, number),
            TransactionKind::Short => self.ledger.short(timestamp, price, number),
            TransactionKind::CloseShort => self.ledger.close_short(timestamp, price, number),
        };

        match result {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(
                    %operation,
                    timestamp,
                    price,
                    number,
                    %error,
                    "operation rejected"
                );
                self.rejections.push(Rejection {
                    timestamp,
                    operation,
                    error,
                });
                false
            }
        }
    }
}

/// Replay `candles` through `ledger` and return the final state.
pub fn run(
    ledger: Ledger,
    candles: &[Candle],
    window_size: usize,
    policy: &dyn SignalPolicy,
) -> Result<RunReport, ReplayError> {
    let mut engine = StrategyEngine::new(ledger, window_size, policy)?;
    for candle in candles {
        engine.step(candle);
    }
    Ok(engine.finish())
}
