// src/io/reporting.rs

use crate::error::PlannerError;
use crate::model::{AllocationRecord, FillRecord, PlanOutcome, UtilizationRecord};
use crate::planning::engine::AllocationStep;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// A row type with a fixed CSV header, written even when there are no rows.
pub trait CsvRecord: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvRecord for AllocationRecord {
    const HEADERS: &'static [&'static str] = &["product", "line", "month", "quantity"];
}

impl CsvRecord for UtilizationRecord {
    const HEADERS: &'static [&'static str] =
        &["line", "month", "consumed_time", "available_time", "utilization"];
}

impl CsvRecord for FillRecord {
    const HEADERS: &'static [&'static str] = &["product", "month", "allocated", "demand", "fill_rate"];
}

impl CsvRecord for AllocationStep {
    const HEADERS: &'static [&'static str] =
        &["month", "step", "product", "line", "quantity", "time_used", "limited_by"];
}

/// Writes records to a CSV file with a header derived from the record fields.
/// Undefined metrics (`None`) become empty cells. An empty slice still
/// produces the header line.
pub fn write_table<T: CsvRecord>(file_path: impl AsRef<Path>, data: &[T]) -> Result<(), PlannerError> {
    let path = file_path.as_ref();
    let write_err = |source: csv::Error| PlannerError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut wtr = csv::Writer::from_path(path).map_err(write_err)?;
    if data.is_empty() {
        wtr.write_record(T::HEADERS).map_err(write_err)?;
    }
    for record in data {
        wtr.serialize(record).map_err(write_err)?;
    }
    wtr.flush()?;

    info!(rows = data.len(), path = %path.display(), "table exported");
    Ok(())
}

/// Writes the allocation, utilization, fill rate and step trace tables into `dir`,
/// creating it if needed. Returns the written paths.
pub fn write_outcome(dir: impl AsRef<Path>, outcome: &PlanOutcome) -> Result<Vec<PathBuf>, PlannerError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let allocations = dir.join("allocations.csv");
    let utilization = dir.join("utilization.csv");
    let fill_rates = dir.join("fill_rates.csv");
    let trace = dir.join("allocation_steps.csv");

    write_table(&allocations, &outcome.allocations)?;
    write_table(&utilization, &outcome.utilization)?;
    write_table(&fill_rates, &outcome.fill_rates)?;
    write_table(&trace, &outcome.trace)?;

    Ok(vec![allocations, utilization, fill_rates, trace])
}
