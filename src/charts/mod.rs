//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, PIE_START_ANGLE};
pub use renderer::{RenderError, StaticChartRenderer};
