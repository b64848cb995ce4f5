//! Data Merger Module
//! Stamps each yearly dataset with its year and builds the unified table.

use crate::data::DataProcessor;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Column added to every row during the merge.
pub const YEAR_COLUMN: &str = "Ano";

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Failed to merge datasets: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Election year a dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DatasetYear {
    Y2020,
    Y2024,
}

impl DatasetYear {
    /// Upload and concatenation order.
    pub const ALL: [DatasetYear; 2] = [DatasetYear::Y2024, DatasetYear::Y2020];

    pub fn value(self) -> i32 {
        match self {
            DatasetYear::Y2020 => 2020,
            DatasetYear::Y2024 => 2024,
        }
    }

    pub fn from_value(year: i32) -> Option<Self> {
        match year {
            2020 => Some(DatasetYear::Y2020),
            2024 => Some(DatasetYear::Y2024),
            _ => None,
        }
    }
}

impl std::fmt::Display for DatasetYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Both yearly datasets concatenated, 2024 rows first.
#[derive(Debug, Clone)]
pub struct UnifiedTable {
    df: DataFrame,
}

impl UnifiedTable {
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Distinct years in table order.
    pub fn years(&self) -> Result<Vec<i32>, PolarsError> {
        DataProcessor::distinct_years(&self.df)
    }

    /// Distinct values of the municipality column in table order.
    pub fn municipalities(&self, column: &str) -> Result<Vec<String>, PolarsError> {
        DataProcessor::distinct_values(&self.df, column)
    }
}

/// Builds the unified table from the two uploads.
pub struct Merger;

impl Merger {
    /// Add (or overwrite) the year column.
    pub fn tag_with_year(df: DataFrame, year: DatasetYear) -> Result<DataFrame, MergeError> {
        let tagged = df
            .lazy()
            .with_column(
                lit(year.value())
                    .cast(DataType::Int32)
                    .alias(YEAR_COLUMN),
            )
            .collect()?;
        Ok(tagged)
    }

    /// Stamp and concatenate. Columns present in only one year are kept,
    /// filled with nulls for the other.
    pub fn merge(df_2024: DataFrame, df_2020: DataFrame) -> Result<UnifiedTable, MergeError> {
        let frames = [
            Self::tag_with_year(df_2024, DatasetYear::Y2024)?.lazy(),
            Self::tag_with_year(df_2020, DatasetYear::Y2020)?.lazy(),
        ];

        let args = UnionArgs {
            rechunk: true,
            ..Default::default()
        };
        let df = concat_lf_diagonal(frames, args)?.collect()?;

        tracing::info!("merged table: {} rows, {} columns", df.height(), df.width());
        Ok(UnifiedTable { df })
    }

    /// Merge only when both uploads are present.
    pub fn merge_uploads(
        df_2024: Option<DataFrame>,
        df_2020: Option<DataFrame>,
    ) -> Result<Option<UnifiedTable>, MergeError> {
        match (df_2024, df_2020) {
            (Some(df_2024), Some(df_2020)) => Self::merge(df_2024, df_2020).map(Some),
            _ => Ok(None),
        }
    }
}
