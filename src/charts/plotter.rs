//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot and the egui painter.

use crate::data::DatasetYear;
use crate::stats::{CategoryCount, HourHistogram, MunicipalityComparison};
use egui::{Align2, Color32, FontId, Pos2, RichText};
use egui_plot::{Bar, BarChart, Plot};

/// Bar color for histogram and count plot
pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

/// Pie slice colors, 2020 then 2024
pub const YEAR_COLORS: [Color32; 2] = [
    Color32::from_rgb(52, 152, 219), // #3498db
    Color32::from_rgb(231, 76, 60),  // #e74c3c
];

/// First slice starts here, degrees counter-clockwise from 3 o'clock.
pub const PIE_START_ANGLE: f64 = 140.0;

const PLOT_HEIGHT: f32 = 280.0;
const PIE_SIZE: f32 = 300.0;

/// Geometry of one pie slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub start_deg: f64,
    pub sweep_deg: f64,
    pub fraction: f64,
}

/// Creates the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Slice color for an election year.
    pub fn year_color(year: DatasetYear) -> Color32 {
        match year {
            DatasetYear::Y2020 => YEAR_COLORS[0],
            DatasetYear::Y2024 => YEAR_COLORS[1],
        }
    }

    /// Split a full turn proportionally to `values`, going counter-clockwise
    /// from `start_deg`. Empty when the values sum to zero.
    pub fn pie_slices(values: &[f64], start_deg: f64) -> Vec<PieSlice> {
        let total: f64 = values.iter().sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut angle = start_deg;
        values
            .iter()
            .map(|&v| {
                let fraction = v / total;
                let slice = PieSlice {
                    start_deg: angle,
                    sweep_deg: fraction * 360.0,
                    fraction,
                };
                angle += slice.sweep_deg;
                slice
            })
            .collect()
    }

    /// Slice annotation, one decimal like `%1.1f%%`.
    pub fn slice_label(fraction: f64) -> String {
        format!("{:.1}%", fraction * 100.0)
    }

    /// Histogram of generation hour, one bar per hour.
    pub fn draw_hour_histogram(ui: &mut egui::Ui, hours: &HourHistogram, year: i32) {
        let bars: Vec<Bar> = hours
            .counts
            .iter()
            .enumerate()
            .map(|(hour, &count)| {
                Bar::new(hour as f64, count as f64)
                    .width(0.9)
                    .name(format!("{:02}h", hour))
            })
            .collect();

        Plot::new(format!("hour_histogram_{}", year))
            .height(PLOT_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Hora do Dia")
            .y_axis_label("Frequência")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Registros"));
            });
    }

    /// Count plot of a categorical column, one bar per value.
    pub fn draw_category_counts(ui: &mut egui::Ui, counts: &[CategoryCount], id: &str) {
        let labels: Vec<String> = counts.iter().map(|c| c.value.clone()).collect();
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::new(i as f64, c.count as f64).width(0.8).name(&c.value))
            .collect();

        Plot::new(format!("category_counts_{}", id))
            .height(PLOT_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("UF de Origem")
            .y_axis_label("Frequência")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Registros"));
            });
    }

    /// Two-slice pie of 2020 vs 2024 counts for one municipality.
    pub fn draw_pie(ui: &mut egui::Ui, comparison: &MunicipalityComparison) {
        let size = egui::vec2(ui.available_width().min(PIE_SIZE * 1.4), PIE_SIZE);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();

        let center = rect.center();
        let radius = rect.width().min(rect.height()) * 0.38;

        let years = [DatasetYear::Y2020, DatasetYear::Y2024];
        let values = years.map(|y| comparison.counts.get(y) as f64);
        let slices = Self::pie_slices(&values, PIE_START_ANGLE);

        if slices.is_empty() {
            painter.text(
                center,
                Align2::CENTER_CENTER,
                "Sem registros",
                FontId::proportional(14.0),
                Color32::GRAY,
            );
            return;
        }

        for (slice, year) in slices.iter().zip(years) {
            if slice.sweep_deg <= 0.0 {
                continue;
            }
            let color = Self::year_color(year);

            // Triangle fan around the center
            let steps = ((slice.sweep_deg / 2.0).ceil() as u32).max(1);
            let mut mesh = egui::Mesh::default();
            mesh.colored_vertex(center, color);
            for s in 0..=steps {
                let deg = slice.start_deg + slice.sweep_deg * s as f64 / steps as f64;
                mesh.colored_vertex(Self::polar(center, radius, deg), color);
            }
            for s in 1..=steps {
                mesh.add_triangle(0, s, s + 1);
            }
            painter.add(egui::Shape::mesh(mesh));

            let mid = slice.start_deg + slice.sweep_deg / 2.0;
            painter.text(
                Self::polar(center, radius * 0.6, mid),
                Align2::CENTER_CENTER,
                Self::slice_label(slice.fraction),
                FontId::proportional(13.0),
                Color32::WHITE,
            );
            painter.text(
                Self::polar(center, radius * 1.15, mid),
                Align2::CENTER_CENTER,
                year.to_string(),
                FontId::proportional(14.0),
                text_color,
            );
        }
    }

    /// Legend row with one colored square per year.
    pub fn draw_year_legend(ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for year in [DatasetYear::Y2020, DatasetYear::Y2024] {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 3.0, Self::year_color(year));
                ui.label(RichText::new(year.to_string()).size(13.0));
                ui.add_space(12.0);
            }
        });
    }

    /// Screen position at `deg` (counter-clockwise, y grows downward).
    fn polar(center: Pos2, radius: f32, deg: f64) -> Pos2 {
        let rad = deg.to_radians();
        Pos2::new(
            center.x + radius * rad.cos() as f32,
            center.y - radius * rad.sin() as f32,
        )
    }
}
