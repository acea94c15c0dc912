//! Wallet ledger: cash, long/short positions and an append-only transaction log.
//!
//! Every operation runs the same checks in order, and the first failure is
//! returned without touching any state:
//! 1. price is finite and positive
//! 2. timestamp is not earlier than the last transaction (equal is allowed)
//! 3. quantity is finite and positive, and `price * quantity` is a finite,
//!    non-zero amount
//! 4. the balance the operation draws on is large enough
//!
//! A quantity whose result would push a balance past `f64::MAX` is rejected
//! as an invalid quantity after the balance check.

use super::error::{LedgerError, Resource};
use std::fmt;

/// Relative slack allowed when comparing a requirement against a balance, so
/// that sizes computed as `cash / price` can always be spent in full.
const BALANCE_TOLERANCE: f64 = 4.0 * f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Buy,
    Sell,
    Short,
    CloseShort,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "buy"),
            TransactionKind::Sell => write!(f, "sell"),
            TransactionKind::Short => write!(f, "short"),
            TransactionKind::CloseShort => write!(f, "close_short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub price: f64,
    pub number: f64,
    pub timestamp: i64,
}

impl Transaction {
    pub fn value(&self) -> f64 {
        self.price * self.number
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_cash: f64,
    cash: f64,
    long_position: f64,
    short_position: f64,
    transactions: Vec<Transaction>,
}

fn exceeds(required: f64, available: f64) -> bool {
    !required.is_finite()
        || required - available > required.abs().max(available.abs()) * BALANCE_TOLERANCE
}

impl Ledger {
    pub fn new(initial_cash: f64) -> Self {
        Ledger {
            initial_cash,
            cash: initial_cash,
            long_position: 0.0,
            short_position: 0.0,
            transactions: Vec::new(),
        }
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn long_position(&self) -> f64 {
        self.long_position
    }

    pub fn short_position(&self) -> f64 {
        self.short_position
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.transactions.last().map(|t| t.timestamp)
    }

    pub fn has_long(&self) -> bool {
        self.long_position > 0.0
    }

    pub fn has_short(&self) -> bool {
        self.short_position > 0.0
    }

    pub fn is_flat(&self) -> bool {
        !self.has_long() && !self.has_short()
    }

    /// cash + long * mark - short * mark
    pub fn equity(&self, mark_price: f64) -> f64 {
        let net = self.long_position - self.short_position;
        if net == 0.0 {
            return self.cash;
        }
        self.cash + net * mark_price
    }

    /// Buy `number` units, paying `price * number` from cash.
    pub fn buy(
        &mut self,
        timestamp: i64,
        price: f64,
        number: f64,
    ) -> Result<Transaction, LedgerError> {
        let cost = self.check_common(timestamp, price, number)?;
        Self::check_sufficient(Resource::Cash, cost, self.cash)?;
        let long = Self::grown(self.long_position, number, number)?;

        self.cash = (self.cash - cost).max(0.0);
        self.long_position = long;
        Ok(self.record(TransactionKind::Buy, timestamp, price, number))
    }

    /// Sell `number` units of the long position, crediting `price * number`.
    pub fn sell(
        &mut self,
        timestamp: i64,
        price: f64,
        number: f64,
    ) -> Result<Transaction, LedgerError> {
        let proceeds = self.check_common(timestamp, price, number)?;
        Self::check_sufficient(Resource::LongPosition, number, self.long_position)?;
        let cash = Self::grown(self.cash, proceeds, number)?;

        self.long_position = (self.long_position - number).max(0.0);
        self.cash = cash;
        Ok(self.record(TransactionKind::Sell, timestamp, price, number))
    }

    /// Sell `number` borrowed units. The proceeds are credited immediately and
    /// the liability is tracked in the short position. Requires the same
    /// amount of cash on hand as margin.
    pub fn short(
        &mut self,
        timestamp: i64,
        price: f64,
        number: f64,
    ) -> Result<Transaction, LedgerError> {
        let proceeds = self.check_common(timestamp, price, number)?;
        Self::check_sufficient(Resource::Cash, proceeds, self.cash)?;
        let cash = Self::grown(self.cash, proceeds, number)?;
        let short = Self::grown(self.short_position, number, number)?;

        self.cash = cash;
        self.short_position = short;
        Ok(self.record(TransactionKind::Short, timestamp, price, number))
    }

    /// Buy back `number` units of the short position, paying `price * number`.
    pub fn close_short(
        &mut self,
        timestamp: i64,
        price: f64,
        number: f64,
    ) -> Result<Transaction, LedgerError> {
        let cost = self.check_common(timestamp, price, number)?;
        Self::check_sufficient(Resource::ShortPosition, number, self.short_position)?;
        Self::check_sufficient(Resource::Cash, cost, self.cash)?;

        self.short_position = (self.short_position - number).max(0.0);
        self.cash = (self.cash - cost).max(0.0);
        Ok(self.record(TransactionKind::CloseShort, timestamp, price, number))
    }

    /// Returns `price * number` once the shared checks pass.
    fn check_common(&self, timestamp: i64, price: f64, number: f64) -> Result<f64, LedgerError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(LedgerError::InvalidPrice { price });
        }
        if let Some(last) = self.last_timestamp() {
            if timestamp < last {
                return Err(LedgerError::TemporalOrder { timestamp, last });
            }
        }
        if !number.is_finite() || number <= 0.0 {
            return Err(LedgerError::InvalidQuantity { number });
        }
        let value = price * number;
        if !value.is_finite() || value <= 0.0 {
            return Err(LedgerError::InvalidQuantity { number });
        }
        Ok(value)
    }

    fn grown(balance: f64, amount: f64, number: f64) -> Result<f64, LedgerError> {
        let total = balance + amount;
        if !total.is_finite() {
            return Err(LedgerError::InvalidQuantity { number });
        }
        Ok(total)
    }

    fn check_sufficient(
        resource: Resource,
        required: f64,
        available: f64,
    ) -> Result<(), LedgerError> {
        if exceeds(required, available) {
            return Err(LedgerError::InsufficientResource {
                resource,
                required,
                available,
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        kind: TransactionKind,
        timestamp: i64,
        price: f64,
        number: f64,
    ) -> Transaction {
        let tx = Transaction {
            kind,
            price,
            number,
            timestamp,
        };
        self.transactions.push(tx);
        tracing::debug!(
            %kind,
            timestamp,
            price,
            number,
            cash = self.cash,
            long = self.long_position,
            short = self.short_position,
            "transaction recorded"
        );
        tx
    }
}
