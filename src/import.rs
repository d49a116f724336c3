use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ir::Transaction;

/// Header noise lines eBay prepends to its report exports, before the actual
/// column header row.
const REPORT_PREAMBLE_LINES: usize = 11;

/// Row type marker for sales; everything else (payouts, refunds to the bank
/// account) is filtered out.
const ORDER_ROW_TYPE: &str = "Order";

#[derive(Debug, Deserialize)]
struct ReportRecord {
    #[serde(rename = "Type")]
    row_type: String,
    #[serde(rename = "Order number")]
    order_number: String,
    #[serde(rename = "Transaction creation date")]
    creation_date: String,
    #[serde(rename = "Item title", default)]
    item_title: String,
    #[serde(rename = "Item subtotal", default)]
    item_subtotal: String,
}

/// Load every report export in `dir`, filter to order rows, deduplicate by
/// order number (reports overlap when exported for overlapping date ranges)
/// and sort ascending by transaction date.
pub fn load_reports(dir: &Path) -> Result<Vec<Transaction>> {
    let files = report_files(dir)?;
    if files.is_empty() {
        bail!("no .csv report exports found in {}", dir.display());
    }

    let mut transactions = Vec::new();
    let mut seen_orders = HashSet::new();
    for file in files {
        let loaded = load_report(&file)
            .with_context(|| format!("Failed to load report {}", file.display()))?;
        info!("{}: {} order rows", file.display(), loaded.len());
        for transaction in loaded {
            // First occurrence wins
            if seen_orders.insert(transaction.order_number.clone()) {
                transactions.push(transaction);
            }
        }
    }

    transactions.sort_by_key(|transaction| transaction.date);
    Ok(transactions)
}

fn report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
            files.push(path);
        }
    }
    // Deterministic load order regardless of directory iteration order
    files.sort();
    Ok(files)
}

fn load_report(path: &Path) -> Result<Vec<Transaction>> {
    let content = fs::read_to_string(path)?;
    load_report_content(&content)
}

fn load_report_content(content: &str) -> Result<Vec<Transaction>> {
    let body = skip_preamble(content, REPORT_PREAMBLE_LINES);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut transactions = Vec::new();
    for record in reader.deserialize() {
        let record: ReportRecord = record.context("Malformed report row")?;
        if record.row_type != ORDER_ROW_TYPE {
            continue;
        }
        let Some(date) = parse_creation_date(&record.creation_date) else {
            warn!(
                "order {}: unparseable transaction date {:?}, dropping row",
                record.order_number, record.creation_date
            );
            continue;
        };
        // Unparseable subtotals are carried through as None so the
        // aggregation step can log them with their order number.
        let subtotal = parse_subtotal(&record.item_subtotal);
        transactions.push(Transaction {
            date,
            order_number: record.order_number,
            title: record.item_title,
            subtotal,
        });
    }
    Ok(transactions)
}

fn skip_preamble(content: &str, lines: usize) -> &str {
    let mut rest = content;
    for _ in 0..lines {
        match rest.split_once('\n') {
            Some((_line, remainder)) => rest = remainder,
            None => return "",
        }
    }
    rest
}

/// eBay has used a few date formats across report versions.
fn parse_creation_date(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    const DATETIME_FORMATS: [&str; 3] =
        ["%Y-%m-%d %H:%M:%S", "%b-%d-%y %H:%M:%S", "%b-%d-%Y %H:%M:%S"];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%b-%d-%y", "%b-%d-%Y"];
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(datetime);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return Some(date.and_hms_opt(0, 0, 0).expect("midnight is always valid"));
        }
    }
    None
}

fn parse_subtotal(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    let (negative, cell) = match cell.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cell),
    };
    let cell = cell.strip_prefix('$').unwrap_or(cell);
    let cell = cell.replace(',', "");
    let amount = Decimal::from_str_exact(&cell).ok()?;
    Some(if negative { -amount } else { amount })
}
