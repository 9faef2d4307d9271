//! Production capacity planning.
//!
//! Allocates monthly line capacity across competing product demand with a
//! deterministic greedy policy, then derives line utilization and product
//! fill rates from the allocation.
//!
//! ```no_run
//! use capacity_planner::io::baseline::BaselineDataset;
//! use capacity_planner::planning::{plan_from_tables, config::PlannerConfig};
//!
//! let inputs = BaselineDataset::current().tables()?;
//! let outcome = plan_from_tables(&inputs, &PlannerConfig::default())?;
//! println!("{} allocation rows", outcome.allocations.len());
//! # Ok::<(), capacity_planner::error::PlannerError>(())
//! ```

pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod planning;
