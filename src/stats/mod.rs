//! Stats module - counting and dashboard view building

mod analysis;
mod calculator;

pub use analysis::{ComparisonOutcome, GeneralAnalysis, MunicipalityComparison, COMPARISON_SIZE};
pub use calculator::{
    CategoryCount, HourHistogram, HourSummary, StatsCalculator, StatsError, YearCounts,
    HOURS_PER_DAY,
};
