// src/io/baseline.rs

//! The default dataset used whenever no usable input file is supplied.

use crate::error::PlannerError;
use crate::io::tables::{InputTables, Table, TableKind};

pub const BASELINE_VERSION: &str = "v1";

/// A known-good input set compiled into the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineDataset {
    pub version: &'static str,
    rates: &'static str,
    calendar: &'static str,
    demand: &'static str,
}

impl BaselineDataset {
    pub const fn v1() -> Self {
        Self {
            version: "v1",
            rates: include_str!("../../data/baseline/v1/rates.csv"),
            calendar: include_str!("../../data/baseline/v1/calendar.csv"),
            demand: include_str!("../../data/baseline/v1/demand.csv"),
        }
    }

    /// The dataset matching [`BASELINE_VERSION`].
    pub const fn current() -> Self {
        Self::v1()
    }

    pub fn table(&self, kind: TableKind) -> Result<Table, PlannerError> {
        let text = match kind {
            TableKind::Rates => self.rates,
            TableKind::Calendar => self.calendar,
            TableKind::Demand => self.demand,
        };
        Table::from_reader(kind, text.as_bytes())
    }

    pub fn tables(&self) -> Result<InputTables, PlannerError> {
        Ok(InputTables {
            rates: self.table(TableKind::Rates)?,
            calendar: self.table(TableKind::Calendar)?,
            demand: self.table(TableKind::Demand)?,
        })
    }
}

impl Default for BaselineDataset {
    fn default() -> Self {
        Self::current()
    }
}
