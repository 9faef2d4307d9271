// src/planning/metrics.rs

//! Utilization and fill rate derived from an allocation, plus the invariant
//! checks every allocation must pass.

use crate::error::InvariantViolation;
use crate::model::{AllocationRecord, FillRecord, UtilizationRecord};
use crate::planning::config::PlannerConfig;
use crate::planning::normalizer::Ledgers;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub utilization: Vec<UtilizationRecord>,
    pub fill_rates: Vec<FillRecord>,
}

/// One utilization record per calendar entry, ordered by (month, line), and
/// one fill record per demand entry, ordered by (month, product).
///
/// A line-month without available time has no utilization, a product-month
/// without demand has no fill rate. Ratios are capped at 1 to absorb
/// floating-point residue.
pub fn build_metrics(allocations: &[AllocationRecord], ledgers: &Ledgers) -> Metrics {
    let consumed = consumed_time(allocations, ledgers);
    let allocated = allocated_quantity(allocations);

    let mut utilization: BTreeMap<(&str, &str), UtilizationRecord> = BTreeMap::new();
    for ((line, month), &available) in &ledgers.capacity {
        let used = consumed
            .get(&(line.as_str(), month.as_str()))
            .copied()
            .unwrap_or(0.0);
        let ratio = (available > 0.0).then(|| (used / available).min(1.0));
        utilization.insert(
            (month.as_str(), line.as_str()),
            UtilizationRecord {
                line: line.clone(),
                month: month.clone(),
                consumed_time: used,
                available_time: available,
                utilization: ratio,
            },
        );
    }

    let mut fill_rates: BTreeMap<(&str, &str), FillRecord> = BTreeMap::new();
    for ((product, month), &demand) in &ledgers.demand {
        let made = allocated
            .get(&(product.as_str(), month.as_str()))
            .copied()
            .unwrap_or(0.0);
        let ratio = (demand > 0.0).then(|| (made / demand).min(1.0));
        fill_rates.insert(
            (month.as_str(), product.as_str()),
            FillRecord {
                product: product.clone(),
                month: month.clone(),
                allocated: made,
                demand,
                fill_rate: ratio,
            },
        );
    }

    Metrics {
        utilization: utilization.into_values().collect(),
        fill_rates: fill_rates.into_values().collect(),
    }
}

/// Time used per (line, month). Allocations without a positive rate are skipped here;
/// [`verify`] reports them.
fn consumed_time<'r>(
    allocations: &'r [AllocationRecord],
    ledgers: &Ledgers,
) -> BTreeMap<(&'r str, &'r str), f64> {
    let mut consumed = BTreeMap::new();
    for record in allocations {
        let rate = ledgers
            .rates
            .get(&(record.product.clone(), record.line.clone()))
            .copied()
            .unwrap_or(0.0);
        if rate > 0.0 {
            *consumed
                .entry((record.line.as_str(), record.month.as_str()))
                .or_insert(0.0) += record.quantity / rate;
        }
    }
    consumed
}

fn allocated_quantity(allocations: &[AllocationRecord]) -> BTreeMap<(&str, &str), f64> {
    let mut allocated = BTreeMap::new();
    for record in allocations {
        *allocated
            .entry((record.product.as_str(), record.month.as_str()))
            .or_insert(0.0) += record.quantity;
    }
    allocated
}

/// Checks the allocation against the ledgers: non-negative quantities, a rate for every
/// allocated pair, no line-month over its time, no product-month over its demand.
pub fn verify(
    allocations: &[AllocationRecord],
    ledgers: &Ledgers,
    config: &PlannerConfig,
) -> Result<(), InvariantViolation> {
    for record in allocations {
        if !(record.quantity >= 0.0) {
            return Err(InvariantViolation::NegativeValue {
                what: "quantity",
                key: format!("{}/{}/{}", record.product, record.line, record.month),
                value: record.quantity,
            });
        }
        let has_rate = ledgers
            .rates
            .get(&(record.product.clone(), record.line.clone()))
            .is_some_and(|&rate| rate > 0.0);
        if !has_rate && record.quantity > 0.0 {
            return Err(InvariantViolation::InfeasibleAllocation {
                product: record.product.clone(),
                line: record.line.clone(),
                month: record.month.clone(),
            });
        }
    }

    for ((line, month), consumed) in consumed_time(allocations, ledgers) {
        let available = ledgers
            .capacity
            .get(&(line.to_string(), month.to_string()))
            .copied()
            .unwrap_or(0.0);
        if consumed > config.ceiling(available) {
            return Err(InvariantViolation::CapacityExceeded {
                line: line.to_string(),
                month: month.to_string(),
                consumed,
                available,
            });
        }
    }

    for ((product, month), allocated) in allocated_quantity(allocations) {
        let demand = ledgers
            .demand
            .get(&(product.to_string(), month.to_string()))
            .copied()
            .unwrap_or(0.0);
        if allocated > config.ceiling(demand) {
            return Err(InvariantViolation::DemandExceeded {
                product: product.to_string(),
                month: month.to_string(),
                allocated,
                demand,
            });
        }
    }

    Ok(())
}
