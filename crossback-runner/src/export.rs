//! Export: JSON, CSV, and plain-text renderings of a backtest result.
//!
//! JSON is the full outbound document and round-trips through `import_json`,
//! which rejects schema versions newer than this build understands. CSV is
//! the merged signal table for spreadsheets. The text rendering is the
//! labelled evaluation table.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};

use crate::metrics::MetricsResult;
use crate::result::{BacktestResult, SignalTableRow, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult`, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_default()
}

/// Export the signal table as CSV. Undefined values are empty cells.
pub fn export_signal_table_csv(rows: &[SignalTableRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "close",
        "sma_short",
        "sma_long",
        "signal",
        "entry_exit",
        "position_shares",
        "position_delta",
        "holdings_value",
        "cash_balance",
        "portfolio_value",
        "daily_return",
        "cumulative_return",
    ])?;

    for r in rows {
        let (s, p, ret) = (&r.signal, &r.position, &r.returns);
        wtr.write_record([
            &s.date.to_string(),
            &format!("{:.6}", s.close),
            &opt(s.sma_short, 6),
            &opt(s.sma_long, 6),
            &s.signal.as_i8().to_string(),
            &s.entry_exit.as_i8().to_string(),
            &p.position_shares.to_string(),
            &p.position_delta.to_string(),
            &format!("{:.2}", p.holdings_value),
            &format!("{:.2}", p.cash_balance),
            &format!("{:.2}", p.portfolio_value),
            &opt(ret.daily_return, 8),
            &opt(ret.cumulative_return, 8),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Text ───────────────────────────────────────────────────────────

/// Two-column evaluation table; undefined ratios print as `undefined`.
pub fn render_evaluation(metrics: &MetricsResult) -> String {
    let mut out = String::with_capacity(256);
    for (label, value) in metrics.evaluation_rows() {
        let cell = match value {
            Some(v) => format!("{v:.6}"),
            None => "undefined".to_string(),
        };
        let _ = writeln!(out, "{label:<20}{cell:>16}");
    }
    out
}

/// Short human-readable summary of a run followed by the evaluation table.
pub fn render_summary(result: &BacktestResult) -> String {
    let mut out = String::with_capacity(512);
    let c = &result.config;
    let _ = writeln!(
        out,
        "{} ({:?}) {} to {}, {} bars",
        result.stock_ticker, result.source, result.first_date, result.last_date, result.bar_count
    );
    let _ = writeln!(
        out,
        "SMA {}/{}, {} shares per entry, capital {:.2}",
        c.short_window(),
        c.long_window(),
        c.share_size(),
        c.initial_capital()
    );
    let _ = writeln!(
        out,
        "entries {}, exits {}, final value {:.2}",
        result.entries,
        result.exits,
        result.final_portfolio_value().unwrap_or(c.initial_capital())
    );
    out.push('\n');
    out.push_str(&render_evaluation(&result.metrics));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Ratio;
    use crossback_core::Degeneracy;

    #[test]
    fn undefined_ratio_renders_as_word() {
        let m = MetricsResult {
            annualized_return: 0.0,
            cumulative_return: 0.0,
            annualized_volatility: 0.0,
            sharpe_ratio: Ratio::Undefined {
                reason: Degeneracy::ZeroVolatility,
            },
            sortino_ratio: Ratio::Defined { value: 1.25 },
        };
        let text = render_evaluation(&m);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Annualized Return"));
        assert!(lines[3].starts_with("Sharpe Ratio"));
        assert!(lines[3].ends_with("undefined"));
        assert!(lines[4].ends_with("1.250000"));
    }

    #[test]
    fn empty_table_is_header_only() {
        let csv = export_signal_table_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("date,close,sma_short"));
    }
}
