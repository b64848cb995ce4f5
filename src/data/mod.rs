//! Data module - CSV ingestion, merge and filtering

mod loader;
mod merger;
mod processor;

pub use loader::DataLoader;
pub use merger::{DatasetYear, Merger, UnifiedTable, YEAR_COLUMN};
pub use processor::DataProcessor;
