//! Terminal output: styled text for humans, one JSON object per line for scripts.
//!
//! Uses:
//! - `console` for colors (respects NO_COLOR, auto-disables when piped)
//! - `comfy-table` for SWOT, financial and lead tables
//! - `indicatif` for the spinner while the model works

use std::sync::atomic::{AtomicBool, Ordering};

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use jadwa_core::{FeasibilityStudy, FinancialMetrics};
use jadwa_runtime::report::format_amount;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

// ── Global format flag ─────────────────────────────────────────────

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        JSON_MODE.store(true, Ordering::Relaxed);
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ── JSON envelope ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn envelope(level: &str, message: &str, data: Option<&JsonValue>) -> String {
    let msg = Msg {
        level,
        message,
        data,
    };
    serde_json::to_string(&msg).unwrap_or_else(|_| {
        serde_json::json!({ "level": level, "message": message }).to_string()
    })
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    println!("{}", envelope(level, message, data));
}

// ── Public helpers ─────────────────────────────────────────────────

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).bold().cyan());
    }
}

pub fn success(text: &str) {
    if is_json() {
        emit_json("success", text, None);
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        eprintln!("{}", envelope("error", text, None));
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

pub fn warning(text: &str) {
    if is_json() {
        emit_json("warning", text, None);
    } else {
        println!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

/// Emit a serializable value. Text mode pretty-prints it.
pub fn data<T: Serialize>(label: &str, value: &T) {
    if is_json() {
        let json_val = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        emit_json("data", label, Some(&json_val));
    } else {
        let formatted =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{label}: <?>"));
        println!("{formatted}");
    }
}

/// Print a key-value pair with styled key.
pub fn kv(key: &str, value: &str) {
    if is_json() {
        let data = serde_json::json!({ key: value });
        emit_json("info", key, Some(&data));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

/// A titled block of free text.
pub fn section(title: &str, body: &str) {
    println!();
    println!("{}", style(title).bold().cyan());
    for line in body.trim().lines() {
        println!("  {line}");
    }
}

// ── Tables ─────────────────────────────────────────────────────────

pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn table_header(table: &mut Table, columns: &[&str]) {
    table.set_header(columns.iter().map(|c| {
        Cell::new(c)
            .fg(Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold)
    }));
}

/// Study in text mode. JSON callers serialize the study instead.
pub fn study(study: &FeasibilityStudy, metrics: Option<&FinancialMetrics>) {
    section("Executive summary", &study.summary);

    println!();
    println!("{}", style("SWOT").bold().cyan());
    let mut swot = table();
    table_header(&mut swot, &["", "Points"]);
    for (label, value) in study.swot.entries() {
        swot.add_row(vec![Cell::new(label).fg(Color::Green), Cell::new(value)]);
    }
    println!("{swot}");

    println!();
    println!("{}", style("Financial projection (SAR)").bold().cyan());
    let rows = study.financials.rows();
    if rows.is_empty() {
        println!("  {}", style("no financial data").dim());
    } else {
        let mut financials = table();
        table_header(&mut financials, &["Year", "Revenue", "Profit"]);
        for row in &rows {
            let revenue = row.revenue.map(format_amount).unwrap_or_else(|| "-".to_string());
            financials.add_row(vec![
                Cell::new(&row.year),
                Cell::new(revenue).set_alignment(CellAlignment::Right),
                Cell::new(format_amount(row.profit)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{financials}");
    }

    if let Some(metrics) = metrics {
        if let Some(total) = metrics.total_revenue {
            kv("Total revenue:", &format_amount(total));
        }
        kv("Total profit:", &format_amount(metrics.total_profit));
        if let Some(roc) = metrics.return_on_capital {
            kv("Return on capital:", &format!("{:.1}%", roc * 100.0));
        }
        if let Some(year) = &metrics.payback_year {
            kv("Payback year:", year);
        }
    }

    section("Operating plan", &study.plan);
}

// ── Spinners ───────────────────────────────────────────────────────

/// Spinner on stderr; hidden in JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

pub fn spinner_success(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    if is_json() {
        emit_json("success", message, None);
    } else {
        eprintln!("{} {}", style("✓").green(), message);
    }
}

pub fn spinner_error(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    if !is_json() {
        eprintln!("{} {}", style("✗").red(), message);
    }
}
