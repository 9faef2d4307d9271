// src/planning/summary.rs

use crate::model::{PlanOutcome, ProductId};
use std::collections::BTreeMap;

/// Headline numbers for a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub total_allocated: f64,
    /// Mean over line-months with a defined utilization.
    pub average_utilization: Option<f64>,
    /// Mean over product-months with a defined fill rate.
    pub average_fill_rate: Option<f64>,
    /// Products with the lowest average fill rate, worst first.
    pub service_risk: Vec<(ProductId, f64)>,
}

impl PlanSummary {
    /// Summarizes `outcome`, listing at most `risk_count` products in the service risk view.
    pub fn from_outcome(outcome: &PlanOutcome, risk_count: usize) -> Self {
        let average_utilization = mean(outcome.utilization.iter().filter_map(|r| r.utilization));
        let average_fill_rate = mean(outcome.fill_rates.iter().filter_map(|r| r.fill_rate));

        let mut by_product: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in &outcome.fill_rates {
            if let Some(rate) = record.fill_rate {
                by_product.entry(record.product.as_str()).or_default().push(rate);
            }
        }

        // BTreeMap order plus a stable sort keeps ties in product order.
        let mut service_risk: Vec<(ProductId, f64)> = by_product
            .into_iter()
            .filter_map(|(product, rates)| {
                mean(rates.into_iter()).map(|avg| (product.to_string(), avg))
            })
            .collect();
        service_risk.sort_by(|a, b| a.1.total_cmp(&b.1));
        service_risk.truncate(risk_count);

        Self {
            total_allocated: outcome.total_allocated(),
            average_utilization,
            average_fill_rate,
            service_risk,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
