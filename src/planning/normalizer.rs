// src/planning/normalizer.rs

//! Input normalization.
//!
//! Turns the three raw tables into typed entries, then into keyed ledgers.
//! Nothing here fails: malformed rows are dropped, negative values clamped to
//! zero and duplicate keys resolved last-wins, each repair leaving an
//! [`InputWarning`] behind.

use crate::io::tables::{InputTables, Table, TableKind};
use crate::model::{
    CapacityEntry, DemandEntry, LineId, MonthId, ProductId, RateEntry, RunMetadata,
};
use std::collections::BTreeMap;
use std::fmt;

/// A repair applied to the planner input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputWarning {
    MissingColumn {
        table: TableKind,
        column: &'static str,
    },
    /// `row` counts data rows from 1; `None` for entries supplied directly.
    MissingField {
        table: TableKind,
        row: Option<usize>,
        column: &'static str,
    },
    InvalidNumber {
        table: TableKind,
        row: usize,
        column: &'static str,
        value: String,
    },
    NonFinite {
        table: TableKind,
        key: String,
    },
    NegativeClamped {
        table: TableKind,
        key: String,
        value: f64,
    },
    /// A rate too small to divide by reliably; the pair is treated as infeasible.
    SubnormalRate {
        key: String,
        value: f64,
    },
    DuplicateKey {
        table: TableKind,
        key: String,
    },
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::MissingColumn { table, column } => {
                write!(f, "{table}: column '{column}' not found, table ignored")
            }
            InputWarning::MissingField {
                table,
                row: Some(row),
                column,
            } => write!(f, "{table}: row {row} has no '{column}', row dropped"),
            InputWarning::MissingField {
                table,
                row: None,
                column,
            } => write!(f, "{table}: entry with empty '{column}' dropped"),
            InputWarning::InvalidNumber {
                table,
                row,
                column,
                value,
            } => write!(
                f,
                "{table}: row {row} has non-numeric '{column}' value '{value}', row dropped"
            ),
            InputWarning::NonFinite { table, key } => {
                write!(f, "{table}: {key} has a non-finite value, entry dropped")
            }
            InputWarning::NegativeClamped { table, key, value } => {
                write!(f, "{table}: {key} value {value} is negative, clamped to 0")
            }
            InputWarning::SubnormalRate { key, value } => {
                write!(f, "rates: {key} rate {value:e} is below the smallest normal float, pair disabled")
            }
            InputWarning::DuplicateKey { table, key } => {
                write!(f, "{table}: duplicate key {key}, later value kept")
            }
        }
    }
}

struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
}

const PRODUCT: Column = Column {
    name: "product",
    aliases: &["product", "sku"],
};
const LINE: Column = Column {
    name: "line",
    aliases: &["line", "resource"],
};
const MONTH: Column = Column {
    name: "month",
    aliases: &["month", "period"],
};
const RATE: Column = Column {
    name: "rate",
    aliases: &["rate"],
};
const AVAILABLE_TIME: Column = Column {
    name: "availableTime",
    aliases: &["availableTime", "hours", "availableHours"],
};
const QUANTITY: Column = Column {
    name: "quantity",
    aliases: &["quantity", "demand", "mt"],
};

fn columns_for(kind: TableKind) -> [&'static Column; 3] {
    match kind {
        TableKind::Rates => [&PRODUCT, &LINE, &RATE],
        TableKind::Calendar => [&LINE, &MONTH, &AVAILABLE_TIME],
        TableKind::Demand => [&PRODUCT, &MONTH, &QUANTITY],
    }
}

/// First required column `table` lacks, if any.
pub fn missing_column(table: &Table, kind: TableKind) -> Option<&'static str> {
    columns_for(kind)
        .into_iter()
        .find(|column| table.column(column.aliases).is_none())
        .map(|column| column.name)
}

/// Typed entries pulled out of the raw tables.
#[derive(Debug, Clone, Default)]
pub struct ParsedInputs {
    pub rates: Vec<RateEntry>,
    pub calendar: Vec<CapacityEntry>,
    pub demand: Vec<DemandEntry>,
    pub warnings: Vec<InputWarning>,
}

/// Reads rates, calendar and demand entries out of their tables, dropping
/// rows that lack a required field or carry an unparseable number.
pub fn parse_tables(tables: &InputTables) -> ParsedInputs {
    let mut warnings = Vec::new();

    let rates = extract_rows(&tables.rates, TableKind::Rates, &mut warnings)
        .into_iter()
        .map(|(product, line, rate)| RateEntry { product, line, rate })
        .collect();

    let calendar = extract_rows(&tables.calendar, TableKind::Calendar, &mut warnings)
        .into_iter()
        .map(|(line, month, available_time)| CapacityEntry {
            line,
            month,
            available_time,
        })
        .collect();

    let demand = extract_rows(&tables.demand, TableKind::Demand, &mut warnings)
        .into_iter()
        .map(|(product, month, quantity)| DemandEntry {
            product,
            month,
            quantity,
        })
        .collect();

    ParsedInputs {
        rates,
        calendar,
        demand,
        warnings,
    }
}

fn extract_rows(
    table: &Table,
    kind: TableKind,
    warnings: &mut Vec<InputWarning>,
) -> Vec<(String, String, f64)> {
    let columns = columns_for(kind);
    let mut indices = [0usize; 3];
    let mut complete = true;
    for (slot, column) in indices.iter_mut().zip(columns) {
        match table.column(column.aliases) {
            Some(index) => *slot = index,
            None => {
                warnings.push(InputWarning::MissingColumn {
                    table: kind,
                    column: column.name,
                });
                complete = false;
            }
        }
    }
    if !complete {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(table.rows.len());
    'rows: for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let mut cells = [""; 3];
        for ((cell, &index), column) in cells.iter_mut().zip(&indices).zip(columns) {
            match Table::cell(row, index) {
                Some(value) => *cell = value,
                None => {
                    warnings.push(InputWarning::MissingField {
                        table: kind,
                        row: Some(row_no),
                        column: column.name,
                    });
                    continue 'rows;
                }
            }
        }

        let [first, second, raw_value] = cells;
        match raw_value.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                out.push((first.to_string(), second.to_string(), value));
            }
            _ => warnings.push(InputWarning::InvalidNumber {
                table: kind,
                row: row_no,
                column: columns[2].name,
                value: raw_value.to_string(),
            }),
        }
    }
    out
}

/// The keyed bookkeeping the engine and metrics builder work from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledgers {
    pub rates: BTreeMap<(ProductId, LineId), f64>,
    pub capacity: BTreeMap<(LineId, MonthId), f64>,
    pub demand: BTreeMap<(ProductId, MonthId), f64>,
}

impl Ledgers {
    /// Distinct products, lines and months across all three ledgers.
    pub fn metadata(&self) -> RunMetadata {
        let mut meta = RunMetadata::default();
        for (product, line) in self.rates.keys() {
            meta.products.insert(product.clone());
            meta.lines.insert(line.clone());
        }
        for (line, month) in self.capacity.keys() {
            meta.lines.insert(line.clone());
            meta.months.insert(month.clone());
        }
        for (product, month) in self.demand.keys() {
            meta.products.insert(product.clone());
            meta.months.insert(month.clone());
        }
        meta
    }
}

/// Ledgers plus every repair made while building them.
#[derive(Debug, Clone, Default)]
pub struct NormalizedInput {
    pub ledgers: Ledgers,
    pub warnings: Vec<InputWarning>,
}

/// Keys the entries into ledgers. Identifiers are trimmed. Negative values
/// and subnormal rates become zero, non-finite values and empty identifiers
/// are dropped, and for a repeated key the later entry overwrites the earlier one.
pub fn build_ledgers(
    rates: &[RateEntry],
    calendar: &[CapacityEntry],
    demand: &[DemandEntry],
) -> NormalizedInput {
    let mut out = NormalizedInput::default();

    for entry in rates {
        post(
            &mut out.ledgers.rates,
            TableKind::Rates,
            (&entry.product, &PRODUCT),
            (&entry.line, &LINE),
            entry.rate,
            &mut out.warnings,
        );
    }
    for entry in calendar {
        post(
            &mut out.ledgers.capacity,
            TableKind::Calendar,
            (&entry.line, &LINE),
            (&entry.month, &MONTH),
            entry.available_time,
            &mut out.warnings,
        );
    }
    for entry in demand {
        post(
            &mut out.ledgers.demand,
            TableKind::Demand,
            (&entry.product, &PRODUCT),
            (&entry.month, &MONTH),
            entry.quantity,
            &mut out.warnings,
        );
    }

    out
}

fn post(
    ledger: &mut BTreeMap<(String, String), f64>,
    table: TableKind,
    first: (&str, &Column),
    second: (&str, &Column),
    value: f64,
    warnings: &mut Vec<InputWarning>,
) {
    let (first_column, second_column) = (first.1, second.1);
    let (first, second) = (first.0.trim(), second.0.trim());
    for (id, column) in [(first, first_column), (second, second_column)] {
        if id.is_empty() {
            warnings.push(InputWarning::MissingField {
                table,
                row: None,
                column: column.name,
            });
            return;
        }
    }

    let key = format!("{first}/{second}");
    if !value.is_finite() {
        warnings.push(InputWarning::NonFinite { table, key });
        return;
    }

    let value = if value < 0.0 {
        warnings.push(InputWarning::NegativeClamped {
            table,
            key: key.clone(),
            value,
        });
        0.0
    } else if table == TableKind::Rates && value > 0.0 && value < f64::MIN_POSITIVE {
        warnings.push(InputWarning::SubnormalRate {
            key: key.clone(),
            value,
        });
        0.0
    } else {
        value
    };

    if ledger
        .insert((first.to_string(), second.to_string()), value)
        .is_some()
    {
        warnings.push(InputWarning::DuplicateKey { table, key });
    }
}
