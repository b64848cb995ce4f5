//! Chart Viewer Widget
//! Central scrollable panel showing the active page.

use crate::charts::ChartPlotter;
use crate::data::DataProcessor;
use crate::stats::{ComparisonOutcome, GeneralAnalysis, MunicipalityComparison, COMPARISON_SIZE};
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;
const METRIC_WIDTH: f32 = 160.0;

pub const MISSING_UPLOADS_WARNING: &str =
    "Por favor, carregue os dois arquivos de dataset (2020 e 2024) para continuar.";
pub const SELECTION_WARNING: &str =
    "Selecione exatamente 2 municípios para visualizar a análise.";

/// What the central panel currently shows.
#[derive(Debug, Clone)]
pub enum ViewState {
    /// Both uploads have not been merged yet
    MissingUploads,
    General(GeneralAnalysis),
    Comparison(ComparisonOutcome),
    /// Building the view failed; the message is shown instead
    Failed(String),
}

/// Central panel with the page content.
pub struct ChartViewer {
    pub view: ViewState,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            view: ViewState::MissingUploads,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }

    /// Whether the current view has charts worth exporting
    pub fn has_charts(&self) -> bool {
        matches!(
            self.view,
            ViewState::General(_) | ViewState::Comparison(ComparisonOutcome::Ready(_))
        )
    }

    /// Draw the active page
    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("📊 Análise de Transferências Temporárias - Eleições 2020 e 2024")
                .size(24.0)
                .strong()
                .color(Color32::from_rgb(44, 62, 80)),
        );
        ui.add_space(SECTION_SPACING);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match &self.view {
                ViewState::MissingUploads => Self::draw_warning(ui, MISSING_UPLOADS_WARNING),
                ViewState::Failed(message) => Self::draw_error(ui, message),
                ViewState::General(view) => Self::draw_general(ui, view),
                ViewState::Comparison(outcome) => Self::draw_comparison(ui, outcome),
            });
    }

    fn draw_general(ui: &mut egui::Ui, view: &GeneralAnalysis) {
        ui.label(RichText::new("🔍 Análise Geral das Transferências").size(18.0).strong());
        ui.add_space(10.0);

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                Self::draw_metric(ui, "Total de Registros", view.record_count.to_string());
                Self::draw_metric(ui, "Hora média", Self::format_hour(view.hour_summary.mean));
                Self::draw_metric(
                    ui,
                    "Hora mediana",
                    Self::format_hour(view.hour_summary.median),
                );
                Self::draw_metric(
                    ui,
                    "Pico",
                    view.hours
                        .peak_hour()
                        .map(|h| format!("{:02}h", h))
                        .unwrap_or_else(|| "-".to_string()),
                );
            });
            ui.add_space(SECTION_SPACING);
            Self::draw_preview(ui, view);
        });

        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new("📅 Distribuição da Hora de Geração").size(16.0).strong());
        ui.label(format!("Distribuição da Hora de Geração - Ano {}", view.year));
        ChartPlotter::draw_hour_histogram(ui, &view.hours, view.year);

        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new("🌎 Distribuição por UF de Origem").size(16.0).strong());
        ui.label(format!("Distribuição por UF - Ano {}", view.year));
        ChartPlotter::draw_category_counts(ui, &view.states, &view.year.to_string());
    }

    fn draw_preview(ui: &mut egui::Ui, view: &GeneralAnalysis) {
        let (columns, rows) = DataProcessor::to_string_rows(&view.preview);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::horizontal()
                    .id_salt("preview_scroll")
                    .show(ui, |ui| {
                        egui::Grid::new("preview_table")
                            .striped(true)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                for name in &columns {
                                    ui.label(RichText::new(name).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in &rows {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }

    fn draw_comparison(ui: &mut egui::Ui, outcome: &ComparisonOutcome) {
        ui.label(RichText::new("🗺️ Análise por UF e Município").size(18.0).strong());
        ui.add_space(10.0);

        match outcome {
            ComparisonOutcome::NeedsExactlyTwo { .. } => {
                Self::draw_warning(ui, SELECTION_WARNING);
            }
            ComparisonOutcome::Ready(comparisons) => {
                ChartPlotter::draw_year_legend(ui);
                ui.add_space(10.0);
                ui.columns(COMPARISON_SIZE, |cols| {
                    for (col, comparison) in cols.iter_mut().zip(comparisons.iter()) {
                        Self::draw_municipality(col, comparison);
                    }
                });
            }
        }
    }

    fn draw_municipality(ui: &mut egui::Ui, comparison: &MunicipalityComparison) {
        ui.label(
            RichText::new(format!("Distribuição de Transferências - {}", comparison.name))
                .size(15.0)
                .strong(),
        );
        ui.label(comparison.title());
        ChartPlotter::draw_pie(ui, comparison);
        ui.label(format!(
            "2020: {}   2024: {}",
            comparison.counts.count_2020, comparison.counts.count_2024
        ));
    }

    fn draw_metric(ui: &mut egui::Ui, label: &str, value: String) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(METRIC_WIDTH);
                ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(22.0).strong());
            });
        ui.add_space(6.0);
    }

    fn draw_warning(ui: &mut egui::Ui, message: &str) {
        Self::draw_banner(ui, message, Color32::from_rgb(255, 193, 7), "⚠");
    }

    fn draw_error(ui: &mut egui::Ui, message: &str) {
        Self::draw_banner(ui, message, Color32::from_rgb(220, 53, 69), "✖");
    }

    fn draw_banner(ui: &mut egui::Ui, message: &str, color: Color32, icon: &str) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, color))
            .fill(color.gamma_multiply(0.15))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("{} {}", icon, message))
                        .size(15.0)
                        .color(color),
                );
            });
    }

    /// `9.5` -> `09:30`
    fn format_hour(hour: f64) -> String {
        if !hour.is_finite() {
            return "-".to_string();
        }
        let minutes = (hour * 60.0).round() as u32;
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fractional_hours() {
        assert_eq!(ChartViewer::format_hour(9.5), "09:30");
        assert_eq!(ChartViewer::format_hour(0.0), "00:00");
        assert_eq!(ChartViewer::format_hour(f64::NAN), "-");
    }

    #[test]
    fn only_chart_views_are_exportable() {
        let mut viewer = ChartViewer::new();
        assert!(!viewer.has_charts());

        viewer.set_view(ViewState::Comparison(ComparisonOutcome::NeedsExactlyTwo {
            selected: 0,
        }));
        assert!(!viewer.has_charts());

        viewer.set_view(ViewState::Failed("bad time".to_string()));
        assert!(!viewer.has_charts());
    }
}
