pub mod config;
pub mod engine;
pub mod metrics;
pub mod normalizer;
pub mod summary;

use crate::error::PlannerError;
use crate::io::tables::InputTables;
use crate::model::{CapacityEntry, DemandEntry, PlanOutcome, RateEntry};
use config::PlannerConfig;
use engine::AllocationEngine;
use normalizer::{build_ledgers, parse_tables, InputWarning};
use tracing::{info, instrument, warn};

/// Allocates capacity for one planning run.
///
/// Inputs are normalized first (see [`normalizer`]), every month is allocated
/// independently, and the result is checked against the capacity, demand and
/// feasibility invariants before utilization and fill rates are derived. The
/// only error is a broken invariant.
#[instrument(skip_all, fields(rates = rates.len(), calendar = calendar.len(), demand = demand.len()))]
pub fn allocate(
    rates: &[RateEntry],
    calendar: &[CapacityEntry],
    demand: &[DemandEntry],
    config: &PlannerConfig,
) -> Result<PlanOutcome, PlannerError> {
    let normalized = build_ledgers(rates, calendar, demand);
    log_warnings(&normalized.warnings);
    let ledgers = normalized.ledgers;

    let output = AllocationEngine::new(&ledgers, config).run();
    metrics::verify(&output.allocations, &ledgers, config)?;
    let derived = metrics::build_metrics(&output.allocations, &ledgers);
    let metadata = ledgers.metadata();

    info!(
        products = metadata.products.len(),
        lines = metadata.lines.len(),
        months = metadata.months.len(),
        allocations = output.allocations.len(),
        "allocation complete"
    );

    Ok(PlanOutcome {
        allocations: output.allocations,
        utilization: derived.utilization,
        fill_rates: derived.fill_rates,
        metadata,
        warnings: normalized.warnings,
        trace: output.trace,
    })
}

/// Parses the raw tables and runs [`allocate`]. Row-level repairs from parsing
/// come first in the outcome's warnings.
pub fn plan_from_tables(
    tables: &InputTables,
    config: &PlannerConfig,
) -> Result<PlanOutcome, PlannerError> {
    let parsed = parse_tables(tables);
    log_warnings(&parsed.warnings);

    let mut outcome = allocate(&parsed.rates, &parsed.calendar, &parsed.demand, config)?;
    let mut warnings = parsed.warnings;
    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn log_warnings(warnings: &[InputWarning]) {
    for warning in warnings {
        warn!(%warning, "input repaired");
    }
}
