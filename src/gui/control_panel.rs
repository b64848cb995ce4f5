//! Control Panel Widget
//! Left side panel with uploads, navigation and view filters.

use crate::data::DatasetYear;
use crate::stats::COMPARISON_SIZE;
use egui::{Color32, ComboBox, RichText, ScrollArea};

/// Dashboard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    General,
    Municipality,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::General, Page::Municipality];

    pub fn label(self) -> &'static str {
        match self {
            Page::General => "Análise Geral",
            Page::Municipality => "Análise por UF e Município",
        }
    }
}

/// Current widget selections; every view is a function of these.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewSettings {
    pub page: Page,
    pub year: Option<i32>,
    pub municipalities: Vec<String>,
}

/// Left side control panel with uploads and filters.
pub struct ControlPanel {
    pub settings: ViewSettings,
    pub file_2024: Option<String>,
    pub file_2020: Option<String>,
    pub years: Vec<i32>,
    pub municipalities: Vec<String>,
    pub municipality_filter: String,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: ViewSettings::default(),
            file_2024: None,
            file_2020: None,
            years: Vec::new(),
            municipalities: Vec::new(),
            municipality_filter: String::new(),
            status: "Pronto".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the file name shown for an upload slot
    pub fn set_file_name(&mut self, year: DatasetYear, name: Option<String>) {
        match year {
            DatasetYear::Y2024 => self.file_2024 = name,
            DatasetYear::Y2020 => self.file_2020 = name,
        }
    }

    fn file_name(&self, year: DatasetYear) -> Option<&str> {
        match year {
            DatasetYear::Y2024 => self.file_2024.as_deref(),
            DatasetYear::Y2020 => self.file_2020.as_deref(),
        }
    }

    /// Update the selectable facets after the unified table changes.
    ///
    /// Keeps the current year if still present, otherwise picks the first;
    /// drops selected municipalities that no longer exist.
    pub fn update_facets(&mut self, years: Vec<i32>, municipalities: Vec<String>) {
        if !self
            .settings
            .year
            .is_some_and(|y| years.contains(&y))
        {
            self.settings.year = years.first().copied();
        }
        self.settings
            .municipalities
            .retain(|m| municipalities.contains(m));

        self.years = years;
        self.municipalities = municipalities;
    }

    /// Toggle a municipality, refusing to go beyond the selection cap.
    pub fn toggle_municipality(&mut self, name: &str) -> bool {
        let selected = &mut self.settings.municipalities;
        if let Some(pos) = selected.iter().position(|m| m == name) {
            selected.remove(pos);
            true
        } else if selected.len() < COMPARISON_SIZE {
            selected.push(name.to_string());
            true
        } else {
            false
        }
    }

    /// Municipalities matching the text filter, case-insensitive.
    pub fn filtered_municipalities(&self) -> Vec<&String> {
        let needle = self.municipality_filter.trim().to_lowercase();
        self.municipalities
            .iter()
            .filter(|m| needle.is_empty() || m.to_lowercase().contains(&needle))
            .collect()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Transferências Temporárias")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Eleições 2020 e 2024")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Upload Section =====
        ui.label(RichText::new("📂 Carregar Arquivos").size(14.0).strong());
        ui.add_space(5.0);

        for year in DatasetYear::ALL {
            let file_name = self.file_name(year).map(str::to_string);
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(format!("Dataset de {}", year)).size(12.0));
                    ui.horizontal(|ui| {
                        let (text, color) = match &file_name {
                            Some(name) => (name.clone(), Color32::WHITE),
                            None => ("Nenhum arquivo".to_string(), Color32::GRAY),
                        };
                        ui.label(RichText::new(text).size(12.0).color(color));

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("📂 Procurar").clicked() {
                                action = ControlPanelAction::Upload(year);
                            }
                        });
                    });
                });
            ui.add_space(5.0);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Navigation Section =====
        ui.label(RichText::new("🧭 Navegação").size(14.0).strong());
        ui.add_space(5.0);

        for page in Page::ALL {
            if ui
                .selectable_label(self.settings.page == page, page.label())
                .clicked()
                && self.settings.page != page
            {
                self.settings.page = page;
                action = ControlPanelAction::SelectionChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filtros").size(14.0).strong());
        ui.add_space(8.0);

        match self.settings.page {
            Page::General => {
                ui.horizontal(|ui| {
                    ui.add_sized([110.0, 20.0], egui::Label::new("Selecione o ano:"));
                    let selected = self
                        .settings
                        .year
                        .map(|y| y.to_string())
                        .unwrap_or_default();
                    ComboBox::from_id_salt("year")
                        .width(120.0)
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            for &year in &self.years {
                                if ui
                                    .selectable_label(self.settings.year == Some(year), year.to_string())
                                    .clicked()
                                    && self.settings.year != Some(year)
                                {
                                    self.settings.year = Some(year);
                                    action = ControlPanelAction::SelectionChanged;
                                }
                            }
                        });
                });
            }
            Page::Municipality => {
                ui.label(format!(
                    "Selecione até {} municípios ({}/{})",
                    COMPARISON_SIZE,
                    self.settings.municipalities.len(),
                    COMPARISON_SIZE
                ));
                ui.add(
                    egui::TextEdit::singleline(&mut self.municipality_filter)
                        .hint_text("Filtrar municípios..."),
                );
                ui.add_space(5.0);

                let full = self.settings.municipalities.len() >= COMPARISON_SIZE;
                let mut toggled: Option<String> = None;

                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(5.0)
                    .show(ui, |ui| {
                        ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                            for name in self.filtered_municipalities() {
                                let mut checked = self.settings.municipalities.contains(name);
                                ui.add_enabled_ui(checked || !full, |ui| {
                                    if ui.checkbox(&mut checked, name.as_str()).changed() {
                                        toggled = Some(name.clone());
                                    }
                                });
                            }
                        });
                    });

                if let Some(name) = toggled {
                    if self.toggle_municipality(&name) {
                        action = ControlPanelAction::SelectionChanged;
                    }
                }

                ui.add_space(5.0);
                if ui.small_button("Limpar seleção").clicked()
                    && !self.settings.municipalities.is_empty()
                {
                    self.settings.municipalities.clear();
                    action = ControlPanelAction::SelectionChanged;
                }
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("💾 Exportar gráficos").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Erro") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exportado") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Upload(DatasetYear),
    SelectionChanged,
    Export,
}
