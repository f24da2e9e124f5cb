//! Inbound backtest request: coercion from a loosely typed JSON payload.
//!
//! Requests usually come from a conversational front end where every slot is
//! a string, so numeric fields accept JSON numbers or numeric strings
//! (`"20"`, `"$100,000"`). Absent or null fields fall back to the supplied
//! defaults. A present value that cannot be coerced is an `InvalidParameter`.

use serde::Serialize;
use serde_json::{Map, Value};

use crossback_core::{BacktestError, StrategyConfig};

const TICKER: &str = "stockTicker";
const SHORT_WINDOW: &str = "shortWindow";
const LONG_WINDOW: &str = "longWindow";
const INITIAL_CAPITAL: &str = "initialCapital";
const SHARE_SIZE: &str = "shareSize";

/// A validated request: normalized ticker plus a ready-to-run configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub stock_ticker: String,
    pub config: StrategyConfig,
}

impl BacktestRequest {
    /// Build a request directly, normalizing the ticker.
    pub fn new(stock_ticker: &str, config: StrategyConfig) -> Result<Self, BacktestError> {
        Ok(Self {
            stock_ticker: normalize_ticker(stock_ticker)?,
            config,
        })
    }

    /// Parse a JSON request body.
    pub fn from_json(body: &str, defaults: &StrategyConfig) -> Result<Self, BacktestError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| BacktestError::invalid("request", format!("malformed JSON: {e}")))?;
        Self::from_value(&value, defaults)
    }

    /// Coerce an already-parsed JSON object.
    pub fn from_value(value: &Value, defaults: &StrategyConfig) -> Result<Self, BacktestError> {
        let obj = value
            .as_object()
            .ok_or_else(|| BacktestError::invalid("request", "expected a JSON object"))?;

        let ticker = match field(obj, TICKER) {
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(BacktestError::invalid(
                    TICKER,
                    format!("expected a string, got {other}"),
                ))
            }
            None => return Err(BacktestError::invalid(TICKER, "missing")),
        };

        let mut builder = defaults.to_builder();
        if let Some(v) = field(obj, SHORT_WINDOW) {
            builder = builder.short_window(coerce_count(SHORT_WINDOW, v)? as usize);
        }
        if let Some(v) = field(obj, LONG_WINDOW) {
            builder = builder.long_window(coerce_count(LONG_WINDOW, v)? as usize);
        }
        if let Some(v) = field(obj, INITIAL_CAPITAL) {
            builder = builder.initial_capital(coerce_amount(INITIAL_CAPITAL, v)?);
        }
        if let Some(v) = field(obj, SHARE_SIZE) {
            builder = builder.share_size(coerce_count(SHARE_SIZE, v)?);
        }

        Self::new(ticker, builder.build()?)
    }
}

/// Present, non-null field.
fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

fn normalize_ticker(raw: &str) -> Result<String, BacktestError> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(BacktestError::invalid(TICKER, "must not be blank"));
    }
    if ticker.chars().any(char::is_whitespace) {
        return Err(BacktestError::invalid(
            TICKER,
            format!("'{ticker}' contains whitespace"),
        ));
    }
    Ok(ticker.to_ascii_uppercase())
}

/// Strictly positive whole number.
fn coerce_count(name: &'static str, value: &Value) -> Result<u64, BacktestError> {
    let n = coerce_number(name, value)?;
    if n.fract() != 0.0 {
        return Err(BacktestError::invalid(
            name,
            format!("{n} is not a whole number"),
        ));
    }
    if n <= 0.0 {
        return Err(BacktestError::invalid(
            name,
            format!("must be positive, got {n}"),
        ));
    }
    if n > u32::MAX as f64 {
        return Err(BacktestError::invalid(name, format!("{n} is too large")));
    }
    Ok(n as u64)
}

/// Strictly positive finite amount; currency symbols and separators allowed.
fn coerce_amount(name: &'static str, value: &Value) -> Result<f64, BacktestError> {
    let n = coerce_number(name, value)?;
    if n <= 0.0 {
        return Err(BacktestError::invalid(
            name,
            format!("must be positive, got {n}"),
        ));
    }
    Ok(n)
}

fn coerce_number(name: &'static str, value: &Value) -> Result<f64, BacktestError> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | '_'))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(BacktestError::invalid(
            name,
            format!("cannot interpret {value} as a number"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<BacktestRequest, BacktestError> {
        BacktestRequest::from_value(&value, &StrategyConfig::default())
    }

    fn invalid_name(err: BacktestError) -> &'static str {
        match err {
            BacktestError::InvalidParameter { name, .. } => name,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn numbers_and_strings_both_coerce() {
        let a = parse(json!({
            "stockTicker": "aapl",
            "shortWindow": 10,
            "longWindow": "50",
            "initialCapital": "$25,000",
            "shareSize": 100.0
        }))
        .unwrap();
        assert_eq!(a.stock_ticker, "AAPL");
        assert_eq!(a.config.short_window(), 10);
        assert_eq!(a.config.long_window(), 50);
        assert_eq!(a.config.initial_capital(), 25_000.0);
        assert_eq!(a.config.share_size(), 100);
    }

    #[test]
    fn absent_and_null_fields_take_defaults() {
        let r = parse(json!({ "stockTicker": " msft ", "shortWindow": null })).unwrap();
        assert_eq!(r.stock_ticker, "MSFT");
        assert_eq!(r.config, StrategyConfig::default());
    }

    #[test]
    fn defaults_come_from_caller() {
        let defaults = StrategyConfig::new(5, 15, 1_000.0, 1).unwrap();
        let r = BacktestRequest::from_value(&json!({ "stockTicker": "SPY" }), &defaults).unwrap();
        assert_eq!(r.config, defaults);
    }

    #[test]
    fn missing_or_blank_ticker_is_invalid() {
        assert_eq!(invalid_name(parse(json!({})).unwrap_err()), "stockTicker");
        assert_eq!(
            invalid_name(parse(json!({ "stockTicker": "   " })).unwrap_err()),
            "stockTicker"
        );
        assert_eq!(
            invalid_name(parse(json!({ "stockTicker": 42 })).unwrap_err()),
            "stockTicker"
        );
    }

    #[test]
    fn uncoercible_values_are_invalid() {
        let cases = [
            (json!({ "stockTicker": "X", "shortWindow": "twenty" }), "shortWindow"),
            (json!({ "stockTicker": "X", "longWindow": 0 }), "longWindow"),
            (json!({ "stockTicker": "X", "longWindow": 12.5 }), "longWindow"),
            (json!({ "stockTicker": "X", "initialCapital": -5 }), "initialCapital"),
            (json!({ "stockTicker": "X", "initialCapital": true }), "initialCapital"),
            (json!({ "stockTicker": "X", "shareSize": "-1" }), "shareSize"),
            (json!({ "stockTicker": "X", "shareSize": [1] }), "shareSize"),
        ];
        for (payload, field) in cases {
            assert_eq!(invalid_name(parse(payload).unwrap_err()), field);
        }
    }

    #[test]
    fn malformed_body_is_invalid_request() {
        let err = BacktestRequest::from_json("{not json", &StrategyConfig::default()).unwrap_err();
        assert_eq!(invalid_name(err), "request");
        let err = BacktestRequest::from_json("[1, 2]", &StrategyConfig::default()).unwrap_err();
        assert_eq!(invalid_name(err), "request");
    }
}
