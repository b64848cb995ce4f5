//! Statistics Calculator Module
//! Counting primitives: hour-of-day histogram, category frequencies and
//! year-over-year percentage change.

use crate::data::{DataProcessor, DatasetYear, YEAR_COLUMN};
use chrono::{NaiveTime, Timelike};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};
use std::collections::HashMap;
use thiserror::Error;

/// Format of the generation time column.
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub const HOURS_PER_DAY: usize = 24;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Row {row}: invalid time {value:?} (expected HH:MM:SS)")]
    InvalidTime { row: usize, value: String },
    #[error("Row {row}: missing time")]
    MissingTime { row: usize },
}

/// Record counts per hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourHistogram {
    pub counts: [usize; HOURS_PER_DAY],
}

impl HourHistogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Busiest hour; the earliest one wins ties.
    pub fn peak_hour(&self) -> Option<u32> {
        let max = self.max_count();
        if max == 0 {
            return None;
        }
        self.counts
            .iter()
            .position(|&c| c == max)
            .map(|h| h as u32)
    }
}

/// Descriptive statistics of the generation hour.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HourSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Frequency of one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Row counts for the two election years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct YearCounts {
    pub count_2020: usize,
    pub count_2024: usize,
}

impl YearCounts {
    pub fn get(&self, year: DatasetYear) -> usize {
        match year {
            DatasetYear::Y2020 => self.count_2020,
            DatasetYear::Y2024 => self.count_2024,
        }
    }
}

/// Stateless counting functions over DataFrames.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Hour component of an `HH:MM:SS` string.
    pub fn parse_hour(value: &str) -> Option<u32> {
        NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
            .ok()
            .map(|t| t.hour())
    }

    /// Histogram of the hour component of `time_col`.
    ///
    /// A single missing or malformed time fails the whole histogram.
    pub fn hour_histogram(df: &DataFrame, time_col: &str) -> Result<HourHistogram, StatsError> {
        let times = df.column(time_col)?.cast(&DataType::String)?;
        let times: Vec<Option<&str>> = times.str()?.into_iter().collect();

        let hours = times
            .par_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or(StatsError::MissingTime { row })?;
                Self::parse_hour(value).ok_or_else(|| StatsError::InvalidTime {
                    row,
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<u32>, StatsError>>()?;

        let mut counts = [0usize; HOURS_PER_DAY];
        for hour in hours {
            counts[hour as usize] += 1;
        }
        Ok(HourHistogram { counts })
    }

    /// Mean, median and sample standard deviation of the hours in a histogram.
    pub fn hour_summary(histogram: &HourHistogram) -> HourSummary {
        let hours: Vec<f64> = histogram
            .counts
            .iter()
            .enumerate()
            .flat_map(|(hour, &count)| std::iter::repeat(hour as f64).take(count))
            .collect();

        if hours.is_empty() {
            return HourSummary {
                mean: f64::NAN,
                median: f64::NAN,
                std: f64::NAN,
            };
        }

        let mean = hours.iter().mean();
        let std = if hours.len() > 1 {
            hours.iter().std_dev()
        } else {
            0.0
        };
        let median = Data::new(hours).median();

        HourSummary { mean, median, std }
    }

    /// Frequency of each non-null value of `column`, in order of first
    /// appearance.
    pub fn category_counts(df: &DataFrame, column: &str) -> Result<Vec<CategoryCount>, StatsError> {
        let values = df.column(column)?.cast(&DataType::String)?;
        let values = values.str()?;

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<CategoryCount> = Vec::new();

        for value in values.into_iter().flatten() {
            match index.get(value) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(value, counts.len());
                    counts.push(CategoryCount {
                        value: value.to_string(),
                        count: 1,
                    });
                }
            }
        }

        Ok(counts)
    }

    /// Rows per election year.
    pub fn year_counts(df: &DataFrame) -> Result<YearCounts, StatsError> {
        let years = df.column(YEAR_COLUMN)?.i32()?;
        let mut counts = YearCounts::default();
        for year in years.into_iter().flatten() {
            match DatasetYear::from_value(year) {
                Some(DatasetYear::Y2020) => counts.count_2020 += 1,
                Some(DatasetYear::Y2024) => counts.count_2024 += 1,
                None => {}
            }
        }
        Ok(counts)
    }

    /// Rows per election year for one municipality.
    pub fn municipality_year_counts(
        df: &DataFrame,
        municipality_col: &str,
        municipality: &str,
    ) -> Result<YearCounts, StatsError> {
        let rows = DataProcessor::filter_by_value(df, municipality_col, municipality)?;
        Self::year_counts(&rows)
    }

    /// Percentage change from 2020 to 2024.
    ///
    /// Defined as 0 when there were no 2020 records.
    pub fn percentage_change(count_2020: usize, count_2024: usize) -> f64 {
        if count_2020 == 0 {
            return 0.0;
        }
        (count_2024 as f64 - count_2020 as f64) / count_2020 as f64 * 100.0
    }

    /// Variation label shown next to the pie charts.
    pub fn format_variation(change_pct: f64) -> String {
        if change_pct == 0.0 {
            "0.00%".to_string()
        } else {
            format!("{:+.2}%", change_pct)
        }
    }
}
