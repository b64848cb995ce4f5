//! Dashboard views as pure functions of the unified table and the current
//! selections.

use crate::config::ColumnNames;
use crate::data::{DataProcessor, UnifiedTable};
use crate::stats::{
    CategoryCount, HourHistogram, HourSummary, StatsCalculator, StatsError, YearCounts,
};
use polars::prelude::*;
use serde::Serialize;

/// Number of municipalities the comparison view needs.
pub const COMPARISON_SIZE: usize = 2;

/// "Análise Geral" page for one year.
#[derive(Debug, Clone)]
pub struct GeneralAnalysis {
    pub year: i32,
    pub record_count: usize,
    pub preview: DataFrame,
    pub hours: HourHistogram,
    pub hour_summary: HourSummary,
    pub states: Vec<CategoryCount>,
}

impl GeneralAnalysis {
    pub fn build(
        table: &UnifiedTable,
        year: i32,
        columns: &ColumnNames,
        preview_rows: usize,
    ) -> Result<Self, StatsError> {
        let filtered = DataProcessor::filter_by_year(table.dataframe(), year)?;

        let (hours, states) = rayon::join(
            || StatsCalculator::hour_histogram(&filtered, &columns.generation_time),
            || StatsCalculator::category_counts(&filtered, &columns.state),
        );
        let hours = hours?;
        let states = states?;

        tracing::debug!(
            "general analysis for {}: {} rows, {} states",
            year,
            filtered.height(),
            states.len()
        );

        Ok(Self {
            year,
            record_count: filtered.height(),
            preview: DataProcessor::preview(&filtered, preview_rows),
            hour_summary: StatsCalculator::hour_summary(&hours),
            hours,
            states,
        })
    }
}

/// Year-over-year comparison for one municipality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityComparison {
    pub name: String,
    pub counts: YearCounts,
    pub change_pct: f64,
}

impl MunicipalityComparison {
    pub fn new(name: &str, counts: YearCounts) -> Self {
        Self {
            name: name.to_string(),
            change_pct: StatsCalculator::percentage_change(counts.count_2020, counts.count_2024),
            counts,
        }
    }

    pub fn variation_label(&self) -> String {
        StatsCalculator::format_variation(self.change_pct)
    }

    /// Pie chart title.
    pub fn title(&self) -> String {
        format!(
            "Transferências - {} (Variação: {})",
            self.name,
            self.variation_label()
        )
    }
}

/// Result of the "Análise por UF e Município" page.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    /// Selection is not exactly two distinct municipalities.
    NeedsExactlyTwo { selected: usize },
    Ready([MunicipalityComparison; COMPARISON_SIZE]),
}

impl ComparisonOutcome {
    pub fn build(
        table: &UnifiedTable,
        municipality_col: &str,
        selection: &[String],
    ) -> Result<Self, StatsError> {
        let [first, second] = selection else {
            return Ok(Self::NeedsExactlyTwo {
                selected: selection.len(),
            });
        };
        if first == second {
            return Ok(Self::NeedsExactlyTwo { selected: 1 });
        }

        let df = table.dataframe();
        let compare = |name: &str| -> Result<MunicipalityComparison, StatsError> {
            let counts = StatsCalculator::municipality_year_counts(df, municipality_col, name)?;
            Ok(MunicipalityComparison::new(name, counts))
        };

        Ok(Self::Ready([compare(first)?, compare(second)?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Merger;

    fn rows(municipality: &str, n: usize) -> Vec<&str> {
        vec![municipality; n]
    }

    /// Alpha: 10 records in 2020, 15 in 2024. Beta: 0 in 2020, 5 in 2024.
    fn table() -> UnifiedTable {
        let mut names_2024 = rows("Alpha", 15);
        names_2024.extend(rows("Beta", 5));
        let n_2024 = names_2024.len();
        let df_2024 = df!(
            "SG_UF_ORIGEM" => (0..n_2024).map(|i| if i % 2 == 0 { "SP" } else { "RJ" }).collect::<Vec<_>>(),
            "NM_MUNICIPIO_ORIGEM" => names_2024,
            "HH_GERACAO" => (0..n_2024).map(|i| format!("{:02}:30:00", i % 24)).collect::<Vec<_>>(),
        )
        .unwrap();

        let mut names_2020 = rows("Alpha", 10);
        names_2020.extend(rows("Gamma", 3));
        let n_2020 = names_2020.len();
        let df_2020 = df!(
            "SG_UF_ORIGEM" => vec!["MG"; n_2020],
            "NM_MUNICIPIO_ORIGEM" => names_2020,
            "HH_GERACAO" => vec!["07:00:00"; n_2020],
        )
        .unwrap();

        Merger::merge(df_2024, df_2020).unwrap()
    }

    fn selection(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn general_view_counts_only_the_selected_year() {
        let table = table();
        let columns = ColumnNames::default();

        let view_2020 = GeneralAnalysis::build(&table, 2020, &columns, 5).unwrap();
        assert_eq!(view_2020.record_count, 13);
        assert_eq!(view_2020.preview.height(), 5);
        assert_eq!(view_2020.hours.counts[7], 13);
        assert_eq!(view_2020.states.len(), 1);
        assert_eq!(view_2020.states[0].count, 13);

        let view_2024 = GeneralAnalysis::build(&table, 2024, &columns, 5).unwrap();
        assert_eq!(view_2024.record_count, 20);
        assert_eq!(view_2024.hours.total(), 20);
        assert_eq!(view_2024.states[0].value, "SP");
    }

    #[test]
    fn general_view_fails_on_unparseable_time() {
        let df_2024 = df!(
            "SG_UF_ORIGEM" => ["SP"],
            "NM_MUNICIPIO_ORIGEM" => ["Alpha"],
            "HH_GERACAO" => ["25:61:00"],
        )
        .unwrap();
        let df_2020 = df_2024.clone();
        let table = Merger::merge(df_2024, df_2020).unwrap();

        let result = GeneralAnalysis::build(&table, 2024, &ColumnNames::default(), 5);
        assert!(matches!(result, Err(StatsError::InvalidTime { .. })));
    }

    #[test]
    fn comparison_reports_percentage_change() {
        let outcome =
            ComparisonOutcome::build(&table(), "NM_MUNICIPIO_ORIGEM", &selection(&["Alpha", "Beta"]))
                .unwrap();

        let ComparisonOutcome::Ready([alpha, beta]) = outcome else {
            panic!("expected a ready comparison");
        };
        assert_eq!(alpha.counts.count_2020, 10);
        assert_eq!(alpha.counts.count_2024, 15);
        assert_eq!(alpha.variation_label(), "+50.00%");
        assert_eq!(
            alpha.title(),
            "Transferências - Alpha (Variação: +50.00%)"
        );

        // No 2020 baseline is reported as no change.
        assert_eq!(beta.counts.count_2020, 0);
        assert_eq!(beta.counts.count_2024, 5);
        assert_eq!(beta.change_pct, 0.0);
        assert_eq!(beta.variation_label(), "0.00%");
    }

    #[test]
    fn comparison_needs_exactly_two_distinct_municipalities() {
        let table = table();
        for names in [
            &[][..],
            &["Alpha"][..],
            &["Alpha", "Beta", "Gamma"][..],
        ] {
            let outcome =
                ComparisonOutcome::build(&table, "NM_MUNICIPIO_ORIGEM", &selection(names)).unwrap();
            assert_eq!(
                outcome,
                ComparisonOutcome::NeedsExactlyTwo {
                    selected: names.len()
                }
            );
        }

        let outcome =
            ComparisonOutcome::build(&table, "NM_MUNICIPIO_ORIGEM", &selection(&["Alpha", "Alpha"]))
                .unwrap();
        assert!(matches!(outcome, ComparisonOutcome::NeedsExactlyTwo { .. }));
    }
}
