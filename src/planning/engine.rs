// src/planning/engine.rs

use crate::model::{AllocationRecord, LineId, MonthId, ProductId};
use crate::planning::config::PlannerConfig;
use crate::planning::normalizer::Ledgers;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// What stopped a greedy step from assigning more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepLimit {
    /// The line ran out of time.
    Capacity,
    /// The product's demand was covered.
    Demand,
}

/// One greedy decision, kept so a plan can be explained after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationStep {
    pub month: MonthId,
    pub step: usize,
    pub product: ProductId,
    pub line: LineId,
    pub quantity: f64,
    pub time_used: f64,
    pub limited_by: StepLimit,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub allocations: Vec<AllocationRecord>,
    pub trace: Vec<AllocationStep>,
}

/// Greedy monthly allocator.
///
/// Months are independent. Within a month the product with the largest
/// remaining demand goes first and takes time on its fastest open line; ties
/// go to the lexically smaller product or line id.
pub struct AllocationEngine<'a> {
    ledgers: &'a Ledgers,
    config: &'a PlannerConfig,
    // product -> lines with a positive rate, fastest first, ties by line id
    routes: BTreeMap<&'a str, Vec<(&'a str, f64)>>,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(ledgers: &'a Ledgers, config: &'a PlannerConfig) -> Self {
        let mut routes: BTreeMap<&str, Vec<(&str, f64)>> = BTreeMap::new();
        for ((product, line), &rate) in &ledgers.rates {
            if rate > 0.0 {
                routes
                    .entry(product.as_str())
                    .or_default()
                    .push((line.as_str(), rate));
            }
        }
        for lines in routes.values_mut() {
            lines.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        }

        Self {
            ledgers,
            config,
            routes,
        }
    }

    /// Runs every month in lexical order of the month key.
    pub fn run(&self) -> EngineOutput {
        let months: BTreeSet<&str> = self
            .ledgers
            .capacity
            .keys()
            .map(|(_, month)| month.as_str())
            .chain(self.ledgers.demand.keys().map(|(_, month)| month.as_str()))
            .collect();

        let mut output = EngineOutput::default();
        for month in months {
            self.allocate_month(month, &mut output);
        }
        output
    }

    #[instrument(skip(self, output))]
    fn allocate_month(&self, month: &'a str, output: &mut EngineOutput) {
        let mut pass = MonthPass::open(self.ledgers, month);

        while let Some((product, line, rate)) = self.select(&pass) {
            let step = pass.assign(product, line, rate, self.config);
            debug!(
                step = step.step,
                product = %step.product,
                line = %step.line,
                quantity = step.quantity,
                time_used = step.time_used,
                limited_by = ?step.limited_by,
                "allocated"
            );
            output.trace.push(step);
        }

        let total: f64 = pass.allocated.values().sum();
        info!(
            steps = pass.steps,
            allocated = total,
            unmet_products = pass.remaining_demand.len(),
            "month allocated"
        );

        output.allocations.extend(
            pass.allocated
                .into_iter()
                .filter(|(_, quantity)| *quantity > 0.0)
                .map(|((product, line), quantity)| AllocationRecord {
                    product: product.to_string(),
                    line: line.to_string(),
                    month: month.to_string(),
                    quantity,
                }),
        );
    }

    /// Largest remaining demand with an open line, then that product's fastest open line.
    fn select(&self, pass: &MonthPass<'a>) -> Option<(&'a str, &'a str, f64)> {
        let mut best: Option<(&'a str, f64, &'a str, f64)> = None;

        for (&product, &demand) in &pass.remaining_demand {
            let Some(lines) = self.routes.get(product) else {
                continue;
            };
            let Some(&(line, rate)) = lines
                .iter()
                .find(|(line, _)| pass.remaining_time.contains_key(line))
            else {
                continue;
            };
            if best.map_or(true, |(_, best_demand, _, _)| demand > best_demand) {
                best = Some((product, demand, line, rate));
            }
        }

        best.map(|(product, _, line, rate)| (product, line, rate))
    }
}

/// Working ledgers for one month. Lines and products leave the maps once exhausted.
struct MonthPass<'a> {
    month: &'a str,
    remaining_time: BTreeMap<&'a str, f64>,
    initial_time: BTreeMap<&'a str, f64>,
    remaining_demand: BTreeMap<&'a str, f64>,
    initial_demand: BTreeMap<&'a str, f64>,
    allocated: BTreeMap<(&'a str, &'a str), f64>,
    steps: usize,
}

impl<'a> MonthPass<'a> {
    fn open(ledgers: &'a Ledgers, month: &'a str) -> Self {
        let initial_time: BTreeMap<&str, f64> = ledgers
            .capacity
            .iter()
            .filter(|((_, m), &time)| m == month && time > 0.0)
            .map(|((line, _), &time)| (line.as_str(), time))
            .collect();
        let initial_demand: BTreeMap<&str, f64> = ledgers
            .demand
            .iter()
            .filter(|((_, m), &quantity)| m == month && quantity > 0.0)
            .map(|((product, _), &quantity)| (product.as_str(), quantity))
            .collect();

        Self {
            month,
            remaining_time: initial_time.clone(),
            initial_time,
            remaining_demand: initial_demand.clone(),
            initial_demand,
            allocated: BTreeMap::new(),
            steps: 0,
        }
    }

    fn assign(
        &mut self,
        product: &'a str,
        line: &'a str,
        rate: f64,
        config: &PlannerConfig,
    ) -> AllocationStep {
        let time = self.remaining_time[line];
        let demand = self.remaining_demand[product];
        let capacity_quantity = time * rate;

        let (quantity, time_used, limited_by) = if capacity_quantity <= demand {
            self.remaining_time.remove(line);
            let left = demand - capacity_quantity;
            if config.is_exhausted(left, self.initial_demand[product]) {
                self.remaining_demand.remove(product);
            } else {
                self.remaining_demand.insert(product, left);
            }
            (capacity_quantity, time, StepLimit::Capacity)
        } else {
            self.remaining_demand.remove(product);
            let used = demand / rate;
            let left = time - used;
            if config.is_exhausted(left, self.initial_time[line]) {
                self.remaining_time.remove(line);
            } else {
                self.remaining_time.insert(line, left);
            }
            (demand, used, StepLimit::Demand)
        };

        *self.allocated.entry((product, line)).or_insert(0.0) += quantity;
        self.steps += 1;

        AllocationStep {
            month: self.month.to_string(),
            step: self.steps,
            product: product.to_string(),
            line: line.to_string(),
            quantity,
            time_used,
            limited_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapacityEntry, DemandEntry, RateEntry};
    use crate::planning::normalizer::build_ledgers;

    fn run(rates: &[RateEntry], calendar: &[CapacityEntry], demand: &[DemandEntry]) -> EngineOutput {
        let ledgers = build_ledgers(rates, calendar, demand).ledgers;
        let config = PlannerConfig::default();
        AllocationEngine::new(&ledgers, &config).run()
    }

    fn quantity(output: &EngineOutput, product: &str, line: &str, month: &str) -> f64 {
        output
            .allocations
            .iter()
            .find(|r| r.product == product && r.line == line && r.month == month)
            .map_or(0.0, |r| r.quantity)
    }

    #[test]
    fn fastest_line_is_used_first() {
        let output = run(
            &[RateEntry::new("A", "L1", 10.0), RateEntry::new("A", "L2", 5.0)],
            &[CapacityEntry::new("L1", "Jan", 4.0), CapacityEntry::new("L2", "Jan", 10.0)],
            &[DemandEntry::new("A", "Jan", 100.0)],
        );

        assert_eq!(quantity(&output, "A", "L1", "Jan"), 40.0);
        assert_eq!(quantity(&output, "A", "L2", "Jan"), 50.0);
        assert_eq!(output.trace.len(), 2);
        assert_eq!(output.trace[0].line, "L1");
        assert_eq!(output.trace[0].limited_by, StepLimit::Capacity);
        assert_eq!(output.trace[1].limited_by, StepLimit::Capacity);
    }

    #[test]
    fn larger_demand_is_served_before_smaller() {
        let output = run(
            &[RateEntry::new("A", "L1", 1.0), RateEntry::new("B", "L1", 1.0)],
            &[CapacityEntry::new("L1", "Jan", 60.0)],
            &[DemandEntry::new("A", "Jan", 40.0), DemandEntry::new("B", "Jan", 50.0)],
        );

        assert_eq!(quantity(&output, "B", "L1", "Jan"), 50.0);
        assert_eq!(quantity(&output, "A", "L1", "Jan"), 10.0);
        assert_eq!(output.trace[0].product, "B");
        assert_eq!(output.trace[0].limited_by, StepLimit::Demand);
        assert_eq!(output.trace[1].limited_by, StepLimit::Capacity);
    }

    #[test]
    fn equal_demand_ties_go_to_smaller_product_id() {
        let output = run(
            &[RateEntry::new("B", "L1", 2.0), RateEntry::new("A", "L1", 2.0)],
            &[CapacityEntry::new("L1", "Jan", 10.0)],
            &[DemandEntry::new("B", "Jan", 30.0), DemandEntry::new("A", "Jan", 30.0)],
        );

        assert_eq!(quantity(&output, "A", "L1", "Jan"), 20.0);
        assert_eq!(quantity(&output, "B", "L1", "Jan"), 0.0);
        assert_eq!(output.allocations.len(), 1);
    }

    #[test]
    fn equal_rate_ties_go_to_smaller_line_id() {
        let output = run(
            &[RateEntry::new("A", "L2", 3.0), RateEntry::new("A", "L1", 3.0)],
            &[CapacityEntry::new("L2", "Jan", 10.0), CapacityEntry::new("L1", "Jan", 10.0)],
            &[DemandEntry::new("A", "Jan", 15.0)],
        );

        assert_eq!(quantity(&output, "A", "L1", "Jan"), 15.0);
        assert_eq!(quantity(&output, "A", "L2", "Jan"), 0.0);
    }

    #[test]
    fn months_do_not_share_capacity() {
        let output = run(
            &[RateEntry::new("A", "L1", 1.0)],
            &[CapacityEntry::new("L1", "2025-01", 100.0), CapacityEntry::new("L1", "2025-02", 5.0)],
            &[DemandEntry::new("A", "2025-01", 10.0), DemandEntry::new("A", "2025-02", 10.0)],
        );

        assert_eq!(quantity(&output, "A", "L1", "2025-01"), 10.0);
        assert_eq!(quantity(&output, "A", "L1", "2025-02"), 5.0);
        assert_eq!(output.allocations[0].month, "2025-01");
    }

    #[test]
    fn zero_capacity_and_zero_demand_allocate_nothing() {
        let output = run(
            &[RateEntry::new("A", "L1", 1.0), RateEntry::new("B", "L2", 1.0)],
            &[CapacityEntry::new("L1", "Jan", 0.0), CapacityEntry::new("L2", "Jan", 10.0)],
            &[DemandEntry::new("A", "Jan", 10.0), DemandEntry::new("B", "Jan", 0.0)],
        );

        assert!(output.allocations.is_empty());
        assert!(output.trace.is_empty());
    }

    #[test]
    fn product_without_rate_is_left_unfilled() {
        let output = run(
            &[RateEntry::new("A", "L1", 1.0)],
            &[CapacityEntry::new("L1", "Jan", 10.0)],
            &[DemandEntry::new("A", "Jan", 4.0), DemandEntry::new("Z", "Jan", 100.0)],
        );

        assert_eq!(quantity(&output, "A", "L1", "Jan"), 4.0);
        assert!(output.allocations.iter().all(|r| r.product != "Z"));
    }

    #[test]
    fn leftover_time_flows_to_later_products() {
        let output = run(
            &[
                RateEntry::new("A", "L1", 4.0),
                RateEntry::new("B", "L1", 2.0),
                RateEntry::new("B", "L2", 1.0),
            ],
            &[CapacityEntry::new("L1", "Jan", 10.0), CapacityEntry::new("L2", "Jan", 3.0)],
            &[DemandEntry::new("A", "Jan", 20.0), DemandEntry::new("B", "Jan", 12.0)],
        );

        // A: 20 units on L1 uses 5 of 10 hours. B: 10 units from the other 5 hours, then 2 on L2.
        assert_eq!(quantity(&output, "A", "L1", "Jan"), 20.0);
        assert_eq!(quantity(&output, "B", "L1", "Jan"), 10.0);
        assert_eq!(quantity(&output, "B", "L2", "Jan"), 2.0);
    }
}
