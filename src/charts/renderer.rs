//! Static Chart Renderer
//! Renders the dashboard charts to PNG bytes with plotters, for export.
//!
//! Charts:
//! 1. Hour-of-day histogram for a year
//! 2. Count plot of origin state for a year
//! 3. Two-slice pie (2020 vs 2024) for a municipality, titled with its variation

use crate::charts::{ChartPlotter, PIE_START_ANGLE};
use crate::data::DatasetYear;
use crate::stats::{CategoryCount, HourHistogram, MunicipalityComparison, HOURS_PER_DAY};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use thiserror::Error;

const BAR: RGBColor = RGBColor(52, 152, 219);
const SLICE_2020: RGBColor = RGBColor(52, 152, 219);
const SLICE_2024: RGBColor = RGBColor(231, 76, 60);

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid image size {0}x{1}")]
    InvalidSize(u32, u32),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Histogram of generation hour.
    pub fn render_hour_histogram(
        hours: &HourHistogram,
        year: i32,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        Self::render_png(width, height, |root| {
            let y_max = Self::headroom(hours.max_count());

            let mut chart = ChartBuilder::on(root)
                .caption(
                    format!("Distribuição da Hora de Geração - Ano {}", year),
                    (FONT, 22),
                )
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(55)
                .build_cartesian_2d((0u32..HOURS_PER_DAY as u32).into_segmented(), 0usize..y_max)
                .map_err(draw_err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("Hora do Dia")
                .y_desc("Frequência")
                .draw()
                .map_err(draw_err)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(BAR.filled())
                        .margin(2)
                        .data(
                            hours
                                .counts
                                .iter()
                                .enumerate()
                                .map(|(hour, &count)| (hour as u32, count)),
                        ),
                )
                .map_err(draw_err)?;
            Ok(())
        })
    }

    /// Count plot of origin state.
    pub fn render_category_counts(
        counts: &[CategoryCount],
        year: i32,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        Self::render_png(width, height, |root| {
            let labels: Vec<&str> = counts.iter().map(|c| c.value.as_str()).collect();
            let n = labels.len().max(1) as u32;
            let y_max = Self::headroom(counts.iter().map(|c| c.count).max().unwrap_or(0));

            let label_for = |v: &SegmentValue<u32>| match v {
                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                    labels.get(*i as usize).map(|s| s.to_string()).unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            };

            let mut chart = ChartBuilder::on(root)
                .caption(format!("Distribuição por UF - Ano {}", year), (FONT, 22))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(55)
                .build_cartesian_2d((0u32..n).into_segmented(), 0usize..y_max)
                .map_err(draw_err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(labels.len().max(1))
                .x_label_formatter(&label_for)
                .x_desc("UF de Origem")
                .y_desc("Frequência")
                .draw()
                .map_err(draw_err)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(BAR.filled())
                        .margin(4)
                        .data(counts.iter().enumerate().map(|(i, c)| (i as u32, c.count))),
                )
                .map_err(draw_err)?;
            Ok(())
        })
    }

    /// Pie of 2020 vs 2024 records for one municipality.
    pub fn render_pie(
        comparison: &MunicipalityComparison,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        Self::render_png(width, height, |root| {
            let titled = root
                .titled(&comparison.title(), (FONT, 22))
                .map_err(draw_err)?;
            let (w, h) = titled.dim_in_pixel();
            let center = (w as i32 / 2, h as i32 / 2);
            let radius = f64::from(w.min(h)) * 0.38;

            let sizes = Self::pie_order().map(|y| comparison.counts.get(y) as f64);
            if ChartPlotter::pie_slices(&sizes, PIE_START_ANGLE).is_empty() {
                let style = TextStyle::from((FONT, 18).into_font())
                    .pos(Pos::new(HPos::Center, VPos::Center));
                titled
                    .draw_text("Sem registros", &style, center)
                    .map_err(draw_err)?;
                return Ok(());
            }

            let colors = Self::pie_order().map(Self::slice_color);
            let labels = Self::pie_order().map(|y| y.to_string());
            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            // plotters sweeps clockwise on screen: 2024 first, so 2020 ends
            // back at the start and reads counter-clockwise from it
            pie.start_angle(-(PIE_START_ANGLE + 360.0));
            pie.label_style((FONT, 18).into_font().color(&BLACK));
            pie.percentages((FONT, 16).into_font().color(&WHITE));
            titled.draw(&pie).map_err(draw_err)?;
            Ok(())
        })
    }

    /// Slice order for plotters' clockwise sweep, mirroring the on-screen pie.
    fn pie_order() -> [DatasetYear; 2] {
        [DatasetYear::Y2024, DatasetYear::Y2020]
    }

    fn slice_color(year: DatasetYear) -> RGBColor {
        match year {
            DatasetYear::Y2020 => SLICE_2020,
            DatasetYear::Y2024 => SLICE_2024,
        }
    }

    /// Y axis upper bound with ~10% room above the tallest bar.
    fn headroom(max: usize) -> usize {
        max + max / 10 + 1
    }

    /// Draw into an RGB buffer and encode it as PNG.
    fn render_png<F>(width: u32, height: u32, draw: F) -> Result<Vec<u8>, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> Result<(), RenderError>,
    {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize(width, height));
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            draw(&root)?;
            root.present().map_err(draw_err)?;
        }

        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or(RenderError::InvalidSize(width, height))?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::YearCounts;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    /// Text needs a system font; without one plotters fails the draw and
    /// the pixel checks are skipped.
    fn rendered(result: Result<Vec<u8>, RenderError>) -> Option<Vec<u8>> {
        match result {
            Ok(png) => Some(png),
            Err(RenderError::Drawing(msg)) => {
                eprintln!("skipping, drawing unavailable: {}", msg);
                None
            }
            Err(e) => panic!("render failed: {}", e),
        }
    }

    fn decoded(png: &[u8]) -> image::RgbImage {
        image::load_from_memory_with_format(png, ImageFormat::Png)
            .unwrap()
            .to_rgb8()
    }

    #[test]
    fn renders_hour_histogram_png() {
        let mut counts = [0; HOURS_PER_DAY];
        counts[8] = 12;
        counts[17] = 4;
        let Some(png) = rendered(StaticChartRenderer::render_hour_histogram(
            &HourHistogram { counts },
            2024,
            640,
            400,
        )) else {
            return;
        };

        assert_eq!(png[..8], PNG_MAGIC);
        assert_eq!(decoded(&png).dimensions(), (640, 400));
    }

    #[test]
    fn renders_empty_category_counts() {
        let Some(png) = rendered(StaticChartRenderer::render_category_counts(&[], 2020, 320, 240))
        else {
            return;
        };
        assert_eq!(decoded(&png).dimensions(), (320, 240));
    }

    #[test]
    fn renders_pie_without_baseline() {
        let comparison = MunicipalityComparison::new(
            "Beta",
            YearCounts {
                count_2020: 0,
                count_2024: 5,
            },
        );
        let Some(png) = rendered(StaticChartRenderer::render_pie(&comparison, 400, 400)) else {
            return;
        };
        assert_eq!(png[..8], PNG_MAGIC);
    }

    #[test]
    fn pie_slices_sweep_2024_before_2020() {
        assert_eq!(
            StaticChartRenderer::pie_order(),
            [DatasetYear::Y2024, DatasetYear::Y2020]
        );
        let RGBColor(r, g, b) = StaticChartRenderer::slice_color(DatasetYear::Y2020);
        assert_eq!((r, g, b), (52, 152, 219));
        let RGBColor(r, g, b) = StaticChartRenderer::slice_color(DatasetYear::Y2024);
        assert_eq!((r, g, b), (231, 76, 60));
    }

    #[test]
    fn pie_2020_slice_runs_counter_clockwise_from_start() {
        // 2020 holds a quarter: 140° to 230°, so the left edge is blue and
        // the top is red
        let comparison = MunicipalityComparison::new(
            "Alpha",
            YearCounts {
                count_2020: 1,
                count_2024: 3,
            },
        );
        let Some(png) = rendered(StaticChartRenderer::render_pie(&comparison, 400, 400)) else {
            return;
        };
        let img = decoded(&png);

        // Well inside the radius, away from the slice labels
        let left = img.get_pixel(90, 215);
        assert!(left[2] > 150 && left[0] < 100, "left pixel {:?}", left);
        let top = img.get_pixel(200, 115);
        assert!(top[0] > 150 && top[2] < 100, "top pixel {:?}", top);
    }

    #[test]
    fn rejects_zero_sized_images() {
        let hours = HourHistogram {
            counts: [0; HOURS_PER_DAY],
        };
        let err = StaticChartRenderer::render_hour_histogram(&hours, 2020, 0, 100).unwrap_err();
        assert!(matches!(err, RenderError::InvalidSize(0, 100)));
    }
}
