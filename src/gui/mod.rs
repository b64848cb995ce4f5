//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::DashboardApp;
pub use chart_viewer::{ChartViewer, ViewState};
pub use control_panel::{ControlPanel, ControlPanelAction, Page, ViewSettings};
