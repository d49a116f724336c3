use chrono::{Datelike, NaiveDate};

/// The report granularities. Each variant decides whether two dates fall into
/// the same aggregation window; it never carries state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Whether `candidate` belongs to the window anchored at `anchor`.
    ///
    /// Weekly and monthly compare `(year, period)` pairs, not the raw week or
    /// month number. Comparing raw numbers merges e.g. ISO week 1 of two
    /// consecutive years into one window.
    pub fn same_window(self, anchor: NaiveDate, candidate: NaiveDate) -> bool {
        match self {
            Timeframe::Daily => anchor == candidate,
            Timeframe::Weekly => {
                let a = anchor.iso_week();
                let b = candidate.iso_week();
                (a.year(), a.week()) == (b.year(), b.week())
            }
            Timeframe::Monthly => {
                (anchor.year(), anchor.month()) == (candidate.year(), candidate.month())
            }
        }
    }

    pub fn output_filename(self) -> &'static str {
        match self {
            Timeframe::Daily => "daily.csv",
            Timeframe::Weekly => "weekly.csv",
            Timeframe::Monthly => "monthly.csv",
        }
    }
}
