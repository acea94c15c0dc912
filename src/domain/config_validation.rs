//! Configuration validation.
//!
//! Validates all config fields before a replay runs.

use crate::domain::backtest::CandleKind;
use crate::domain::error::ReplayError;
use crate::domain::resample::ResampleMode;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    validate_initial_cash(config)?;
    validate_range(config)?;
    validate_interval(config)?;
    validate_mode(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    validate_window_size(config)?;
    validate_candles(config)?;
    Ok(())
}

/// Parse a range bound given either as unix seconds or as `YYYY-MM-DD`,
/// which resolves to midnight UTC of that day.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(ts) = value.parse::<i64>() {
        return Some(ts);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn invalid(section: &str, key: &str, reason: &str) -> ReplayError {
    ReplayError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let value = config.get_double("backtest", "initial_cash", 0.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_range(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let start = parse_bound(config, "start")?;
    let end = parse_bound(config, "end")?;

    if start > end {
        return Err(invalid("backtest", "start", "start must not be after end"));
    }
    Ok(())
}

pub(crate) fn parse_bound(config: &dyn ConfigPort, key: &str) -> Result<i64, ReplayError> {
    let raw = config
        .get_string("backtest", key)
        .ok_or_else(|| ReplayError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        })?;
    parse_timestamp(&raw).ok_or_else(|| {
        invalid(
            "backtest",
            key,
            &format!("invalid {key} '{raw}', expected unix seconds or YYYY-MM-DD"),
        )
    })
}

fn validate_interval(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let value = config.get_int("backtest", "interval", 0);
    if value < 1 {
        return Err(invalid(
            "backtest",
            "interval",
            "interval must be an integer of at least 1",
        ));
    }
    Ok(())
}

fn validate_mode(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    match config.get_string("backtest", "mode") {
        None => Ok(()),
        Some(s) if ResampleMode::parse(&s).is_some() => Ok(()),
        Some(_) => Err(invalid("backtest", "mode", "mode must be 'count' or 'time'")),
    }
}

fn validate_window_size(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let value = config.get_int("strategy", "window_size", 0);
    if value < 1 {
        return Err(invalid(
            "strategy",
            "window_size",
            "window_size must be an integer of at least 1",
        ));
    }
    Ok(())
}

fn validate_candles(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    match config.get_string("strategy", "candles") {
        None => Ok(()),
        Some(s) if CandleKind::parse(&s).is_some() => Ok(()),
        Some(_) => Err(invalid(
            "strategy",
            "candles",
            "candles must be 'raw' or 'heikin_ashi'",
        )),
    }
}
