//! Report Export Module
//! Writes the active view's charts as PNG files plus a JSON summary.

use crate::charts::StaticChartRenderer;
use crate::stats::{
    CategoryCount, ComparisonOutcome, GeneralAnalysis, HourHistogram, HourSummary,
    MunicipalityComparison,
};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary file written next to the charts.
pub const SUMMARY_FILE_NAME: &str = "resumo.json";

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 800;
const PIE_SIZE: u32 = 900;

#[derive(Serialize)]
struct GeneralSummary<'a> {
    year: i32,
    record_count: usize,
    hours: &'a HourHistogram,
    hour_summary: &'a HourSummary,
    states: &'a [CategoryCount],
}

#[derive(Serialize)]
struct ComparisonSummary<'a> {
    municipalities: &'a [MunicipalityComparison],
}

/// Writes rendered charts into a directory.
pub struct ReportExporter;

impl ReportExporter {
    /// Export the general analysis of one year. Returns the written files.
    pub fn export_general(dir: &Path, view: &GeneralAnalysis) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut written = Vec::new();

        let png = StaticChartRenderer::render_hour_histogram(
            &view.hours,
            view.year,
            CHART_WIDTH,
            CHART_HEIGHT,
        )?;
        written.push(Self::write(dir, &format!("hora_geracao_{}.png", view.year), &png)?);

        let png = StaticChartRenderer::render_category_counts(
            &view.states,
            view.year,
            CHART_WIDTH,
            CHART_HEIGHT,
        )?;
        written.push(Self::write(dir, &format!("uf_origem_{}.png", view.year), &png)?);

        let summary = GeneralSummary {
            year: view.year,
            record_count: view.record_count,
            hours: &view.hours,
            hour_summary: &view.hour_summary,
            states: &view.states,
        };
        written.push(Self::write_summary(dir, &summary)?);

        tracing::info!("exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Export the municipality comparison. Nothing is written unless the
    /// comparison is ready.
    pub fn export_comparison(dir: &Path, outcome: &ComparisonOutcome) -> Result<Vec<PathBuf>> {
        let ComparisonOutcome::Ready(comparisons) = outcome else {
            bail!("select exactly 2 municipalities before exporting");
        };

        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut written = Vec::new();

        for (i, comparison) in comparisons.iter().enumerate() {
            let png = StaticChartRenderer::render_pie(comparison, PIE_SIZE, PIE_SIZE)?;
            let name = format!("municipio_{}_{}.png", i + 1, Self::file_stem(&comparison.name));
            written.push(Self::write(dir, &name, &png)?);
        }

        let summary = ComparisonSummary {
            municipalities: comparisons,
        };
        written.push(Self::write_summary(dir, &summary)?);

        tracing::info!("exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Lowercase ASCII-ish file stem for a municipality name.
    pub fn file_stem(name: &str) -> String {
        let stem: String = name
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_lowercase().next().unwrap_or(c)
                } else {
                    '_'
                }
            })
            .collect();
        if stem.is_empty() {
            "sem_nome".to_string()
        } else {
            stem
        }
    }

    fn write_summary<T: Serialize>(dir: &Path, summary: &T) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(summary)?;
        Self::write(dir, SUMMARY_FILE_NAME, &json)
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RenderError;
    use crate::config::ColumnNames;
    use crate::data::Merger;
    use crate::stats::YearCounts;
    use polars::prelude::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    /// Hosts without a system font cannot draw chart text.
    fn exported(result: anyhow::Result<Vec<PathBuf>>) -> Option<Vec<PathBuf>> {
        match result {
            Ok(written) => Some(written),
            Err(e) if matches!(e.downcast_ref::<RenderError>(), Some(RenderError::Drawing(_))) => {
                eprintln!("skipping, drawing unavailable: {:#}", e);
                None
            }
            Err(e) => panic!("export failed: {:#}", e),
        }
    }

    fn assert_png(path: &Path) {
        let bytes = fs::read(path).unwrap();
        assert_eq!(bytes[..8], PNG_MAGIC, "{}", path.display());
    }

    #[test]
    fn exports_ready_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ComparisonOutcome::Ready([
            MunicipalityComparison::new(
                "Alpha",
                YearCounts {
                    count_2020: 10,
                    count_2024: 15,
                },
            ),
            MunicipalityComparison::new(
                "São Paulo",
                YearCounts {
                    count_2020: 0,
                    count_2024: 5,
                },
            ),
        ]);

        let Some(written) = exported(ReportExporter::export_comparison(dir.path(), &outcome)) else {
            return;
        };

        assert_eq!(written.len(), 3);
        assert_png(&dir.path().join("municipio_1_alpha.png"));
        assert_png(&dir.path().join("municipio_2_são_paulo.png"));
        assert!(dir.path().join(SUMMARY_FILE_NAME).is_file());
    }

    #[test]
    fn exports_general_analysis() {
        let df_2024 = df!(
            "SG_UF_ORIGEM" => ["SP", "RJ", "SP"],
            "NM_MUNICIPIO_ORIGEM" => ["Alpha", "Beta", "Alpha"],
            "HH_GERACAO" => ["08:10:00", "08:45:00", "17:00:00"],
        )
        .unwrap();
        let df_2020 = df!(
            "SG_UF_ORIGEM" => ["MG"],
            "NM_MUNICIPIO_ORIGEM" => ["Gamma"],
            "HH_GERACAO" => ["07:00:00"],
        )
        .unwrap();
        let table = Merger::merge(df_2024, df_2020).unwrap();
        let view = GeneralAnalysis::build(&table, 2024, &ColumnNames::default(), 5).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let Some(written) = exported(ReportExporter::export_general(dir.path(), &view)) else {
            return;
        };

        assert_eq!(written.len(), 3);
        assert_png(&dir.path().join("hora_geracao_2024.png"));
        assert_png(&dir.path().join("uf_origem_2024.png"));
        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join(SUMMARY_FILE_NAME)).unwrap()).unwrap();
        assert_eq!(json["record_count"], 3);
    }

    #[test]
    fn file_stem_replaces_separators() {
        assert_eq!(ReportExporter::file_stem("São Paulo"), "são_paulo");
        assert_eq!(ReportExporter::file_stem("Santa Bárbara d'Oeste"), "santa_bárbara_d_oeste");
        assert_eq!(ReportExporter::file_stem("  "), "sem_nome");
    }

    #[test]
    fn incomplete_comparison_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let outcome = ComparisonOutcome::NeedsExactlyTwo { selected: 1 };

        assert!(ReportExporter::export_comparison(&target, &outcome).is_err());
        assert!(!target.exists());
    }

    #[test]
    fn writes_pretty_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let comparisons = [MunicipalityComparison::new(
            "Alpha",
            YearCounts {
                count_2020: 10,
                count_2024: 15,
            },
        )];
        let path = ReportExporter::write_summary(
            dir.path(),
            &ComparisonSummary {
                municipalities: &comparisons,
            },
        )
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(json["municipalities"][0]["name"], "Alpha");
        assert_eq!(json["municipalities"][0]["counts"]["count_2024"], 15);
        assert_eq!(json["municipalities"][0]["change_pct"], 50.0);
    }
}
