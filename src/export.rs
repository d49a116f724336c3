use std::path::Path;

use anyhow::{Context, Result};

use crate::ir::{OutputRow, Transaction};

/// Write one finished report. The header row comes from the field names on
/// [`OutputRow`].
pub fn write_rows(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the combined, deduplicated, date-sorted ledger the reports were
/// aggregated from, for manual reconciliation.
pub fn write_raw(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "Order number",
        "Transaction creation date",
        "Item title",
        "Item subtotal",
    ])?;
    for transaction in transactions {
        writer.write_record([
            transaction.order_number.as_str(),
            &transaction.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            transaction.title.as_str(),
            &transaction
                .subtotal
                .map(|amount| format!("{:.2}", amount))
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use super::*;
    use crate::ir::UnitCounts;

    #[test]
    fn writes_rows_with_the_expected_columns_and_two_decimal_sales() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = [OutputRow::new(
            anchor,
            Decimal::new(155, 1), // 15.5
            UnitCounts {
                xx: 0,
                t500: 0,
                d250: 6,
            },
        )];
        write_rows(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            Some("month,day,year,weekday,week number,sales,xx rolls sold,250D rolls sold,500T rolls sold"),
            lines.next(),
        );
        assert_eq!(Some("1,1,2024,0,1,15.50,0,6,0"), lines.next());
        assert_eq!(None, lines.next());
    }

    #[test]
    fn writes_the_raw_ledger_with_empty_cell_for_missing_subtotal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_data_combined.csv");
        let date = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        let transactions = [
            Transaction {
                date: date("2024-01-01 10:00:00"),
                order_number: "11-111".to_string(),
                title: "Kodak Vision3 250D 3x".to_string(),
                subtotal: Some(Decimal::new(1000, 2)),
            },
            Transaction {
                date: date("2024-01-02 11:30:00"),
                order_number: "11-222".to_string(),
                title: "Kodak XX100".to_string(),
                subtotal: None,
            },
        ];
        write_raw(&path, &transactions).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            Some("Order number,Transaction creation date,Item title,Item subtotal"),
            lines.next(),
        );
        assert_eq!(
            Some("11-111,2024-01-01 10:00:00,Kodak Vision3 250D 3x,10.00"),
            lines.next(),
        );
        assert_eq!(Some("11-222,2024-01-02 11:30:00,Kodak XX100,"), lines.next());
    }
}
