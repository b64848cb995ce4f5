//! Data Processor Module
//! Filtering and distinct-value helpers over the unified table.

use crate::data::YEAR_COLUMN;
use polars::prelude::*;
use std::collections::HashSet;

/// Handles slicing of the unified table.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows whose year column equals `year`.
    pub fn filter_by_year(df: &DataFrame, year: i32) -> PolarsResult<DataFrame> {
        df.clone()
            .lazy()
            .filter(col(YEAR_COLUMN).eq(lit(year)))
            .collect()
    }

    /// Rows whose text column equals `value`.
    pub fn filter_by_value(df: &DataFrame, column: &str, value: &str) -> PolarsResult<DataFrame> {
        df.clone()
            .lazy()
            .filter(col(column).eq(lit(value)))
            .collect()
    }

    /// Distinct years, in order of first appearance.
    pub fn distinct_years(df: &DataFrame) -> PolarsResult<Vec<i32>> {
        let years = df.column(YEAR_COLUMN)?.i32()?;
        let mut seen = HashSet::new();
        Ok(years
            .into_iter()
            .flatten()
            .filter(|y| seen.insert(*y))
            .collect())
    }

    /// Distinct non-null values of a text column, in order of first appearance.
    pub fn distinct_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
        let values = df.column(column)?.str()?;
        let mut seen = HashSet::new();
        Ok(values
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect())
    }

    /// First `rows` rows, like `head()`.
    pub fn preview(df: &DataFrame, rows: usize) -> DataFrame {
        df.head(Some(rows))
    }

    /// Column names and stringified cells, ready for a table widget.
    pub fn to_string_rows(df: &DataFrame) -> (Vec<String>, Vec<Vec<String>>) {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = (0..df.height())
            .map(|i| {
                df.get_columns()
                    .iter()
                    .map(|col| match col.get(i) {
                        Ok(AnyValue::Null) | Err(_) => String::new(),
                        Ok(val) => val.to_string().trim_matches('"').to_string(),
                    })
                    .collect()
            })
            .collect();

        (columns, rows)
    }
}
