// src/model/entries.rs

pub type ProductId = String;
pub type LineId = String;
pub type MonthId = String;

/// How fast `line` can produce `product`, in quantity per unit of calendar time.
///
/// A missing entry for a (product, line) pair means the line cannot make the product.
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub product: ProductId,
    pub line: LineId,
    pub rate: f64,
}

/// Usable time of `line` in `month`, already net of downtime.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityEntry {
    pub line: LineId,
    pub month: MonthId,
    pub available_time: f64,
}

/// Quantity of `product` required in `month`.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandEntry {
    pub product: ProductId,
    pub month: MonthId,
    pub quantity: f64,
}

impl RateEntry {
    pub fn new(product: impl Into<String>, line: impl Into<String>, rate: f64) -> Self {
        Self {
            product: product.into(),
            line: line.into(),
            rate,
        }
    }
}

impl CapacityEntry {
    pub fn new(line: impl Into<String>, month: impl Into<String>, available_time: f64) -> Self {
        Self {
            line: line.into(),
            month: month.into(),
            available_time,
        }
    }
}

impl DemandEntry {
    pub fn new(product: impl Into<String>, month: impl Into<String>, quantity: f64) -> Self {
        Self {
            product: product.into(),
            month: month.into(),
            quantity,
        }
    }
}
