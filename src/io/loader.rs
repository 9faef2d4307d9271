// src/io/loader.rs

use crate::error::PlannerError;
use crate::io::baseline::BaselineDataset;
use crate::io::tables::{InputTables, Table, TableKind};
use crate::planning::normalizer::missing_column;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Where each input table should come from. `None` means baseline.
#[derive(Debug, Clone, Default)]
pub struct InputSources {
    pub rates: Option<PathBuf>,
    pub calendar: Option<PathBuf>,
    pub demand: Option<PathBuf>,
    /// Ignore the paths and use the baseline for everything.
    pub always_baseline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableOrigin {
    File(PathBuf),
    Baseline { version: &'static str },
}

/// A supplied file that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub table: TableKind,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub tables: InputTables,
    pub origins: Vec<(TableKind, TableOrigin)>,
    pub fallbacks: Vec<Fallback>,
}

/// Reads input tables from files, substituting the baseline table for any
/// file that is missing, unreadable, or lacks a required column.
pub struct InputLoader {
    baseline: BaselineDataset,
}

impl InputLoader {
    pub fn new(baseline: BaselineDataset) -> Self {
        Self { baseline }
    }

    pub fn load(&self, sources: &InputSources) -> Result<LoadedInputs, PlannerError> {
        let mut origins = Vec::with_capacity(3);
        let mut fallbacks = Vec::new();

        let mut read = |kind: TableKind, path: &Option<PathBuf>| -> Result<Table, PlannerError> {
            let path = path.as_deref().filter(|_| !sources.always_baseline);
            let (table, origin) = self.read_or_default(kind, path, &mut fallbacks)?;
            origins.push((kind, origin));
            Ok(table)
        };

        let tables = InputTables {
            rates: read(TableKind::Rates, &sources.rates)?,
            calendar: read(TableKind::Calendar, &sources.calendar)?,
            demand: read(TableKind::Demand, &sources.demand)?,
        };

        Ok(LoadedInputs {
            tables,
            origins,
            fallbacks,
        })
    }

    fn read_or_default(
        &self,
        kind: TableKind,
        path: Option<&Path>,
        fallbacks: &mut Vec<Fallback>,
    ) -> Result<(Table, TableOrigin), PlannerError> {
        if let Some(path) = path {
            let checked = Table::from_path(kind, path)
                .map_err(|err| err.to_string())
                .and_then(|table| match missing_column(&table, kind) {
                    Some(column) => Err(format!("missing required column '{column}'")),
                    None => Ok(table),
                });

            match checked {
                Ok(table) => {
                    info!(table = %kind, path = %path.display(), rows = table.rows.len(), "input loaded");
                    return Ok((table, TableOrigin::File(path.to_path_buf())));
                }
                Err(reason) => {
                    error!(table = %kind, path = %path.display(), %reason, "could not use input, falling back to baseline");
                    fallbacks.push(Fallback {
                        table: kind,
                        path: path.to_path_buf(),
                        reason,
                    });
                }
            }
        }

        let table = self.baseline.table(kind)?;
        Ok((
            table,
            TableOrigin::Baseline {
                version: self.baseline.version,
            },
        ))
    }
}

impl Default for InputLoader {
    fn default() -> Self {
        Self::new(BaselineDataset::current())
    }
}
