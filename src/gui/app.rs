//! Transfer Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::DashboardConfig;
use crate::data::{DataLoader, DatasetYear, Merger, UnifiedTable};
use crate::export::ReportExporter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, Page, ViewSettings, ViewState};
use crate::stats::{ComparisonOutcome, GeneralAnalysis};
use egui::SidePanel;
use polars::prelude::*;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        year: DatasetYear,
        name: String,
        df: DataFrame,
    },
    Error {
        year: DatasetYear,
        error: String,
    },
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    dataset_2024: Option<DataFrame>,
    dataset_2020: Option<DataFrame>,
    table: Option<UnifiedTable>,

    // Selections the current view was built from
    built_for: Option<ViewSettings>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        Self::with_config(config)
    }

    fn with_config(config: DashboardConfig) -> Self {
        Self {
            config,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            dataset_2024: None,
            dataset_2020: None,
            table: None,
            built_for: None,
            load_rx: None,
            is_loading: false,
        }
    }

    fn dataset_mut(&mut self, year: DatasetYear) -> &mut Option<DataFrame> {
        match year {
            DatasetYear::Y2024 => &mut self.dataset_2024,
            DatasetYear::Y2020 => &mut self.dataset_2020,
        }
    }

    /// Handle file selection for one year - parsed in the background
    fn handle_upload(&mut self, year: DatasetYear) {
        if !self.ready_for_upload() {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        tracing::info!("loading {} dataset from {}", year, path.display());
        self.control_panel
            .set_status(&format!("Carregando dataset de {}...", year));
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let format = self.config.csv.clone();

        thread::spawn(move || {
            let result = DataLoader::read_upload(&path).and_then(|upload| {
                DataLoader::load_upload(Some(&upload), &format).map(|df| (upload.name, df))
            });

            let message = match result {
                Ok((name, Some(df))) => LoadResult::Complete { year, name, df },
                Ok((_, None)) => LoadResult::Error {
                    year,
                    error: "empty upload".to_string(),
                },
                Err(e) => LoadResult::Error {
                    year,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(message);
        });
    }

    /// One upload parses at a time
    fn ready_for_upload(&mut self) -> bool {
        if self.is_loading {
            self.control_panel.set_status("Aguarde o carregamento atual");
            return false;
        }
        true
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { year, name, df }) => {
                self.control_panel.set_status(&format!(
                    "{}: {} linhas, {} colunas",
                    name,
                    df.height(),
                    df.width()
                ));
                self.control_panel.set_file_name(year, Some(name));
                *self.dataset_mut(year) = Some(df);
                self.is_loading = false;
                self.rebuild_table();
            }
            Ok(LoadResult::Error { year, error }) => {
                tracing::error!("failed to load {} dataset: {}", year, error);
                self.control_panel.set_status(&format!("Erro: {}", error));
                self.control_panel.set_file_name(year, None);
                *self.dataset_mut(year) = None;
                self.is_loading = false;
                self.rebuild_table();
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.set_status("Erro: carregamento interrompido");
                self.is_loading = false;
            }
        }
    }

    /// Merge the uploads again and refresh selectable facets
    fn rebuild_table(&mut self) {
        let merged = Merger::merge_uploads(self.dataset_2024.clone(), self.dataset_2020.clone());

        self.table = match merged {
            Ok(Some(table)) => {
                self.control_panel
                    .set_status(&format!("Tabela unificada: {} registros", table.height()));
                Some(table)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!("{}", e);
                self.control_panel.set_status(&format!("Erro: {}", e));
                None
            }
        };

        let facets = match &self.table {
            Some(table) => table.years().and_then(|years| {
                table
                    .municipalities(&self.config.columns.municipality)
                    .map(|municipalities| (years, municipalities))
            }),
            None => Ok((Vec::new(), Vec::new())),
        };
        match facets {
            Ok((years, municipalities)) => self.control_panel.update_facets(years, municipalities),
            Err(e) => {
                self.control_panel.update_facets(Vec::new(), Vec::new());
                self.control_panel.set_status(&format!("Erro: {}", e));
            }
        }

        self.built_for = None;
        self.refresh_view();
    }

    /// Rebuild the active page if its selections changed
    fn refresh_view(&mut self) {
        let settings = self.control_panel.settings.clone();
        if self.built_for.as_ref() == Some(&settings) {
            return;
        }

        let view = match &self.table {
            None => ViewState::MissingUploads,
            Some(table) => Self::build_view(&self.config, table, &settings),
        };
        if let ViewState::Failed(message) = &view {
            tracing::warn!("view failed: {}", message);
        }

        self.chart_viewer.set_view(view);
        self.control_panel.export_enabled = self.chart_viewer.has_charts();
        self.built_for = Some(settings);
    }

    /// Pure view construction from the table and selections
    fn build_view(
        config: &DashboardConfig,
        table: &UnifiedTable,
        settings: &ViewSettings,
    ) -> ViewState {
        match settings.page {
            Page::General => {
                let Some(year) = settings.year else {
                    return ViewState::Failed("Nenhum ano disponível".to_string());
                };
                match GeneralAnalysis::build(table, year, &config.columns, config.preview_rows) {
                    Ok(view) => ViewState::General(view),
                    Err(e) => ViewState::Failed(e.to_string()),
                }
            }
            Page::Municipality => {
                match ComparisonOutcome::build(
                    table,
                    &config.columns.municipality,
                    &settings.municipalities,
                ) {
                    Ok(outcome) => ViewState::Comparison(outcome),
                    Err(e) => ViewState::Failed(e.to_string()),
                }
            }
        }
    }

    /// Handle chart export - render charts to PNG into a chosen folder
    fn handle_export(&mut self) {
        if !self.chart_viewer.has_charts() {
            self.control_panel.set_status("Nada para exportar");
            return;
        }

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match self.export_to(&dir) {
            Ok(count) => {
                self.control_panel
                    .set_status(&format!("Exportado: {} arquivos", count));
                if let Err(e) = open::that(&dir) {
                    tracing::warn!("could not open {}: {}", dir.display(), e);
                }
            }
            Err(e) => {
                tracing::error!("export failed: {:#}", e);
                self.control_panel.set_status(&format!("Erro: {:#}", e));
            }
        }
    }

    fn export_to(&self, dir: &Path) -> anyhow::Result<usize> {
        let written = match &self.chart_viewer.view {
            ViewState::General(view) => ReportExporter::export_general(dir, view)?,
            ViewState::Comparison(outcome) => ReportExporter::export_comparison(dir, outcome)?,
            _ => Vec::new(),
        };
        Ok(written.len())
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::Upload(year) => self.handle_upload(year),
                        ControlPanelAction::SelectionChanged => self.refresh_view(),
                        ControlPanelAction::Export => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataProcessor;

    fn table() -> UnifiedTable {
        let df_2024 = df!(
            "SG_UF_ORIGEM" => ["SP", "RJ"],
            "NM_MUNICIPIO_ORIGEM" => ["Alpha", "Beta"],
            "HH_GERACAO" => ["08:00:00", "09:00:00"],
        )
        .unwrap();
        let df_2020 = df!(
            "SG_UF_ORIGEM" => ["SP"],
            "NM_MUNICIPIO_ORIGEM" => ["Alpha"],
            "HH_GERACAO" => ["10:00:00"],
        )
        .unwrap();
        Merger::merge(df_2024, df_2020).unwrap()
    }

    #[test]
    fn general_page_builds_for_selected_year() {
        let settings = ViewSettings {
            page: Page::General,
            year: Some(2020),
            municipalities: Vec::new(),
        };
        let view = DashboardApp::build_view(&DashboardConfig::default(), &table(), &settings);

        let ViewState::General(view) = view else {
            panic!("expected general view");
        };
        assert_eq!(view.record_count, 1);
    }

    #[test]
    fn municipality_page_warns_until_two_are_selected() {
        let mut settings = ViewSettings {
            page: Page::Municipality,
            year: Some(2024),
            municipalities: vec!["Alpha".to_string()],
        };
        let config = DashboardConfig::default();

        let view = DashboardApp::build_view(&config, &table(), &settings);
        assert!(matches!(
            view,
            ViewState::Comparison(ComparisonOutcome::NeedsExactlyTwo { selected: 1 })
        ));

        settings.municipalities.push("Beta".to_string());
        let view = DashboardApp::build_view(&config, &table(), &settings);
        assert!(matches!(
            view,
            ViewState::Comparison(ComparisonOutcome::Ready(_))
        ));
    }

    #[test]
    fn losing_an_upload_clears_facets() {
        let mut app = DashboardApp::with_config(DashboardConfig::default());
        let table = table();
        app.dataset_2024 = Some(DataProcessor::filter_by_year(table.dataframe(), 2024).unwrap());
        app.dataset_2020 = Some(DataProcessor::filter_by_year(table.dataframe(), 2020).unwrap());
        app.rebuild_table();
        assert_eq!(app.control_panel.status, "Tabela unificada: 3 registros");
        assert_eq!(app.control_panel.years, vec![2024, 2020]);
        assert!(!app.control_panel.municipalities.is_empty());

        // A failed re-upload clears its slot
        app.dataset_2020 = None;
        app.rebuild_table();

        assert!(app.table.is_none());
        assert!(app.control_panel.years.is_empty());
        assert!(app.control_panel.municipalities.is_empty());
        assert_eq!(app.control_panel.settings.year, None);
        assert!(matches!(app.chart_viewer.view, ViewState::MissingUploads));
    }

    #[test]
    fn upload_while_loading_reports_status() {
        let mut app = DashboardApp::with_config(DashboardConfig::default());
        assert!(app.ready_for_upload());

        app.is_loading = true;
        assert!(!app.ready_for_upload());
        assert_eq!(app.control_panel.status, "Aguarde o carregamento atual");
    }

    #[test]
    fn missing_time_column_fails_the_view() {
        let config = DashboardConfig {
            columns: crate::config::ColumnNames {
                generation_time: "HR_INEXISTENTE".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let settings = ViewSettings {
            page: Page::General,
            year: Some(2024),
            municipalities: Vec::new(),
        };

        let view = DashboardApp::build_view(&config, &table(), &settings);
        assert!(matches!(view, ViewState::Failed(_)));
    }
}
