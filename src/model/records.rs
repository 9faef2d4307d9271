// src/model/records.rs

use crate::model::entries::{LineId, MonthId, ProductId};
use crate::planning::engine::AllocationStep;
use crate::planning::normalizer::InputWarning;
use serde::Serialize;
use std::collections::BTreeSet;

/// Quantity of `product` to make on `line` in `month`. Never zero in engine output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRecord {
    pub product: ProductId,
    pub line: LineId,
    pub month: MonthId,
    pub quantity: f64,
}

/// Share of a line's monthly time consumed by the allocation.
///
/// `utilization` is `None` when the line has no available time that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationRecord {
    pub line: LineId,
    pub month: MonthId,
    pub consumed_time: f64,
    pub available_time: f64,
    pub utilization: Option<f64>,
}

/// Share of a product's monthly demand covered by the allocation.
///
/// `fill_rate` is `None` when nothing was demanded that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillRecord {
    pub product: ProductId,
    pub month: MonthId,
    pub allocated: f64,
    pub demand: f64,
    pub fill_rate: Option<f64>,
}

/// Distinct identifiers seen across the three input ledgers. Display only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetadata {
    pub products: BTreeSet<ProductId>,
    pub lines: BTreeSet<LineId>,
    pub months: BTreeSet<MonthId>,
}

/// Everything one planning run produces.
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub allocations: Vec<AllocationRecord>,
    pub utilization: Vec<UtilizationRecord>,
    pub fill_rates: Vec<FillRecord>,
    pub metadata: RunMetadata,
    pub warnings: Vec<InputWarning>,
    /// Greedy decisions in the order they were taken.
    pub trace: Vec<AllocationStep>,
}

impl PlanOutcome {
    pub fn allocations_for_product<'a>(
        &'a self,
        product: &'a str,
    ) -> impl Iterator<Item = &'a AllocationRecord> + 'a {
        self.allocations.iter().filter(move |r| r.product == product)
    }

    pub fn utilization_for_line<'a>(
        &'a self,
        line: &'a str,
    ) -> impl Iterator<Item = &'a UtilizationRecord> + 'a {
        self.utilization.iter().filter(move |r| r.line == line)
    }

    pub fn fill_rates_for_product<'a>(
        &'a self,
        product: &'a str,
    ) -> impl Iterator<Item = &'a FillRecord> + 'a {
        self.fill_rates.iter().filter(move |r| r.product == product)
    }

    /// Sum of every allocated quantity in the run.
    pub fn total_allocated(&self) -> f64 {
        self.allocations.iter().map(|r| r.quantity).sum()
    }
}
