use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// One normalized sale, after the loader has filtered out payouts and
/// deduplicated by order number.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDateTime,
    pub order_number: String,
    pub title: String,
    /// `None` when the report export had no parseable subtotal for this row.
    /// The aggregation step logs the skip so totals can be reconciled later.
    pub subtotal: Option<Decimal>,
}

/// The film stocks we sell. Bulk 100ft rolls of these collapse into the same
/// variant, they just count as 16 cassettes instead of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    /// Double-X (5222)
    Xx,
    /// Vision3 500T
    FiveHundredT,
    /// Vision3 250D
    TwoFiftyD,
}

/// Units sold per product type within one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCounts {
    pub xx: u32,
    pub t500: u32,
    pub d250: u32,
}

impl UnitCounts {
    pub fn zero(&mut self) {
        *self = UnitCounts::default();
    }

    pub fn add(&mut self, product_type: ProductType, count: u32) {
        *self.get_mut(product_type) += count;
    }

    pub fn get(&self, product_type: ProductType) -> u32 {
        match product_type {
            ProductType::Xx => self.xx,
            ProductType::FiveHundredT => self.t500,
            ProductType::TwoFiftyD => self.d250,
        }
    }

    fn get_mut(&mut self, product_type: ProductType) -> &mut u32 {
        match product_type {
            ProductType::Xx => &mut self.xx,
            ProductType::FiveHundredT => &mut self.t500,
            ProductType::TwoFiftyD => &mut self.d250,
        }
    }
}

/// One finished window, ready to be written out. Calendar fields all derive
/// from the window's anchor date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub month: u32,
    pub day: u32,
    pub year: i32,
    /// Monday is 0, matching the numbering the previous reports used.
    pub weekday: u32,
    #[serde(rename = "week number")]
    pub week_number: u32,
    #[serde(serialize_with = "serialize_two_decimals")]
    pub sales: Decimal,
    #[serde(rename = "xx rolls sold")]
    pub xx_rolls_sold: u32,
    #[serde(rename = "250D rolls sold")]
    pub d250_rolls_sold: u32,
    #[serde(rename = "500T rolls sold")]
    pub t500_rolls_sold: u32,
}

impl OutputRow {
    pub fn new(anchor: NaiveDate, sales: Decimal, units: UnitCounts) -> Self {
        OutputRow {
            month: anchor.month(),
            day: anchor.day(),
            year: anchor.year(),
            weekday: anchor.weekday().num_days_from_monday(),
            week_number: anchor.iso_week().week(),
            sales,
            xx_rolls_sold: units.xx,
            d250_rolls_sold: units.d250,
            t500_rolls_sold: units.t500,
        }
    }
}

fn serialize_two_decimals<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", amount))
}
