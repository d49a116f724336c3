use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

use crate::classify::Rules;
use crate::ir::{OutputRow, Transaction, UnitCounts};
use crate::timeframe::Timeframe;

/// The one open window during an aggregation run. Owned by [`aggregate`] for
/// the duration of a run, so runs for different timeframes are independent.
#[derive(Debug)]
struct Bucket {
    anchor: NaiveDate,
    sales: Decimal,
    units: UnitCounts,
}

impl Bucket {
    fn new(anchor: NaiveDate) -> Self {
        Bucket {
            anchor,
            sales: Decimal::ZERO,
            units: UnitCounts::default(),
        }
    }

    /// Zero the accumulators and re-anchor at the first date of the next
    /// window.
    fn reset(&mut self, anchor: NaiveDate) {
        self.anchor = anchor;
        self.sales = Decimal::ZERO;
        self.units.zero();
    }

    fn add_sale(&mut self, amount: Decimal) {
        self.sales += amount;
    }

    fn to_output_row(&self) -> OutputRow {
        OutputRow::new(self.anchor, self.sales, self.units)
    }
}

/// Walk a date-ordered transaction slice and produce one row per window
/// touched, in chronological order.
///
/// The input must already be deduplicated and sorted ascending by date; that
/// is the loader's job and is not re-verified here. Rows that cannot be
/// classified or have no parseable subtotal are logged and their respective
/// contribution skipped, never aborting the run.
pub fn aggregate(
    transactions: &[Transaction],
    timeframe: Timeframe,
    rules: &Rules,
) -> Vec<OutputRow> {
    let Some(first) = transactions.first() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    let mut bucket = Bucket::new(first.date.date());

    for transaction in transactions {
        let date = transaction.date.date();
        if !timeframe.same_window(bucket.anchor, date) {
            // The emitted row describes the window that just closed, so it
            // uses the previous anchor.
            rows.push(bucket.to_output_row());
            bucket.reset(date);
        }

        match rules.resolve(&transaction.title) {
            Ok(resolved) => bucket.units.add(resolved.product_type, resolved.quantity),
            Err(err) => warn!(
                "order {}: {}; counting its sale but no units",
                transaction.order_number, err
            ),
        }

        match transaction.subtotal {
            Some(amount) => bucket.add_sale(amount),
            None => warn!(
                "order {}: no parseable subtotal, not counted in sales",
                transaction.order_number
            ),
        }
    }

    // The trailing window is still open when the stream ends; it always
    // produces a row, even if it only saw one transaction.
    rows.push(bucket.to_output_row());
    rows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::classify::default_rules;

    fn tx(date: &str, title: &str, subtotal: Option<&str>) -> Transaction {
        Transaction {
            date: NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").unwrap(),
            order_number: format!("order-{}", date),
            title: title.to_string(),
            subtotal: subtotal.map(|s| s.parse().unwrap()),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn empty_input_produces_no_rows() {
        let rules = default_rules().unwrap();
        assert_eq!(
            Vec::<OutputRow>::new(),
            aggregate(&[], Timeframe::Daily, &rules)
        );
    }

    #[test]
    fn single_transaction_still_emits_its_window() {
        let rules = default_rules().unwrap();
        let rows = aggregate(
            &[tx("2024-03-05 14:30:00", "Kodak Vision3 250D 3x", Some("10.00"))],
            Timeframe::Daily,
            &rules,
        );
        assert_eq!(1, rows.len());
        assert_eq!((3, 5, 2024), (rows[0].month, rows[0].day, rows[0].year));
        assert_eq!(dec("10.00"), rows[0].sales);
        assert_eq!(3, rows[0].d250_rolls_sold);
    }

    #[test]
    fn daily_end_to_end() {
        let rules = default_rules().unwrap();
        let rows = aggregate(
            &[
                tx("2024-01-01 09:00:00", "Kodak Vision3 250D 3x", Some("10.00")),
                tx("2024-01-01 17:00:00", "Kodak Vision3 250D 3x", Some("5.00")),
                tx("2024-01-02 08:00:00", "Kodak Double X 100' roll", Some("50.00")),
            ],
            Timeframe::Daily,
            &rules,
        );

        assert_eq!(2, rows.len());

        assert_eq!((1, 1, 2024), (rows[0].month, rows[0].day, rows[0].year));
        assert_eq!(dec("15.00"), rows[0].sales);
        assert_eq!(6, rows[0].d250_rolls_sold);
        assert_eq!(0, rows[0].xx_rolls_sold);
        assert_eq!(0, rows[0].t500_rolls_sold);

        assert_eq!((1, 2, 2024), (rows[1].month, rows[1].day, rows[1].year));
        assert_eq!(dec("50.00"), rows[1].sales);
        assert_eq!(16, rows[1].xx_rolls_sold);
        assert_eq!(0, rows[1].d250_rolls_sold);
    }

    #[test]
    fn intraday_times_do_not_split_a_daily_window() {
        let rules = default_rules().unwrap();
        let rows = aggregate(
            &[
                tx("2024-01-01 00:00:01", "Kodak Vision3 250D 3x", Some("1.00")),
                tx("2024-01-01 23:59:59", "Kodak Vision3 250D 3x", Some("2.00")),
            ],
            Timeframe::Daily,
            &rules,
        );
        assert_eq!(1, rows.len());
        assert_eq!(dec("3.00"), rows[0].sales);
    }

    #[test]
    fn one_row_per_distinct_window_and_last_row_is_last_window() {
        let rules = default_rules().unwrap();
        let transactions = [
            tx("2024-01-01 10:00:00", "Kodak Vision3 500T 2 rolls", Some("20.00")),
            tx("2024-01-15 10:00:00", "Kodak Vision3 500T 2 rolls", Some("20.00")),
            tx("2024-02-03 10:00:00", "Kodak Vision3 500T 2 rolls", Some("20.00")),
            tx("2024-04-09 10:00:00", "Kodak Vision3 500T 2 rolls", Some("20.00")),
        ];
        let rows = aggregate(&transactions, Timeframe::Monthly, &rules);
        // Three distinct months touched (January, February, April)
        assert_eq!(3, rows.len());
        assert_eq!((4, 2024), (rows[2].month, rows[2].year));
    }

    #[test]
    fn amounts_are_conserved_across_windows() {
        let rules = default_rules().unwrap();
        let transactions = [
            tx("2024-01-01 10:00:00", "Kodak Vision3 250D 3x", Some("12.34")),
            tx("2024-01-08 10:00:00", "Kodak Vision3 250D 3x", Some("56.78")),
            tx("2024-01-08 11:00:00", "Kodak Vision3 500T 2 rolls", None),
            tx("2024-02-20 10:00:00", "Kodak XX100", Some("90.12")),
        ];
        let rows = aggregate(&transactions, Timeframe::Weekly, &rules);
        let total: Decimal = rows.iter().map(|row| row.sales).sum();
        // The None subtotal is skipped, everything parseable is counted.
        assert_eq!(dec("159.24"), total);
    }

    #[test]
    fn unresolvable_title_contributes_sales_but_no_units() {
        let rules = default_rules().unwrap();
        let rows = aggregate(
            &[tx("2024-01-01 10:00:00", "Unknown Film Stock", Some("25.00"))],
            Timeframe::Daily,
            &rules,
        );
        assert_eq!(1, rows.len());
        assert_eq!(dec("25.00"), rows[0].sales);
        assert_eq!(0, rows[0].xx_rolls_sold);
        assert_eq!(0, rows[0].t500_rolls_sold);
        assert_eq!(0, rows[0].d250_rolls_sold);
    }

    #[test]
    fn missing_subtotal_still_counts_units() {
        let rules = default_rules().unwrap();
        let rows = aggregate(
            &[tx("2024-01-01 10:00:00", "Kodak Vision3 250D 3x", None)],
            Timeframe::Daily,
            &rules,
        );
        assert_eq!(1, rows.len());
        assert_eq!(Decimal::ZERO, rows[0].sales);
        assert_eq!(3, rows[0].d250_rolls_sold);
    }

    #[test]
    fn weekly_year_wraparound_splits_windows() {
        let rules = default_rules().unwrap();
        let rows = aggregate(
            &[
                tx("2025-01-01 10:00:00", "Kodak Vision3 250D 3x", Some("1.00")),
                tx("2026-01-01 10:00:00", "Kodak Vision3 250D 3x", Some("2.00")),
            ],
            Timeframe::Weekly,
            &rules,
        );
        // Both dates are raw ISO week 1, but of different years.
        assert_eq!(2, rows.len());
    }

    #[test]
    fn timeframes_are_independent_runs_over_the_same_input() {
        let rules = default_rules().unwrap();
        let transactions = [
            tx("2024-01-01 10:00:00", "Kodak Vision3 250D 3x", Some("10.00")),
            tx("2024-01-02 10:00:00", "Kodak Vision3 250D 3x", Some("20.00")),
            tx("2024-01-09 10:00:00", "Kodak Vision3 250D 3x", Some("30.00")),
        ];
        let daily = aggregate(&transactions, Timeframe::Daily, &rules);
        let weekly = aggregate(&transactions, Timeframe::Weekly, &rules);
        let monthly = aggregate(&transactions, Timeframe::Monthly, &rules);
        assert_eq!(3, daily.len());
        assert_eq!(2, weekly.len());
        assert_eq!(1, monthly.len());
        let total = |rows: &[OutputRow]| rows.iter().map(|row| row.sales).sum::<Decimal>();
        assert_eq!(total(&daily), total(&weekly));
        assert_eq!(total(&weekly), total(&monthly));
    }
}
