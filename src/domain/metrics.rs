//! Summary statistics for a finished replay.

use super::engine::{EquityPoint, RunReport};
use super::ledger::TransactionKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_cash: f64,
    pub final_cash: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub transactions: usize,
    pub entries: usize,
    pub rejections: usize,
}

impl Metrics {
    pub fn compute(report: &RunReport) -> Self {
        let ledger = &report.ledger;
        let initial_cash = ledger.initial_cash();
        let final_cash = ledger.cash();

        let total_return = if initial_cash > 0.0 {
            (final_cash - initial_cash) / initial_cash
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&report.equity_curve);

        let entries = ledger
            .transactions()
            .iter()
            .filter(|t| matches!(t.kind, TransactionKind::Buy | TransactionKind::Short))
            .count();

        Metrics {
            initial_cash,
            final_cash,
            total_return,
            max_drawdown,
            max_drawdown_duration,
            transactions: ledger.transactions().len(),
            entries,
            rejections: report.rejections.len(),
        }
    }
}

/// Largest peak-to-trough fall as a fraction of the peak, and the longest
/// run of candles spent below a previous peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            max_dd = max_dd.max(dd);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}
