pub mod baseline;
pub mod loader;
pub mod reporting;
pub mod tables;
