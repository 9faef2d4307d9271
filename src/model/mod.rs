pub mod entries;
pub mod records;

pub use entries::{CapacityEntry, DemandEntry, LineId, MonthId, ProductId, RateEntry};
pub use records::{AllocationRecord, FillRecord, PlanOutcome, RunMetadata, UtilizationRecord};
