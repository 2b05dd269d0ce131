//! Charts module - series shaping and chart rendering

mod plotter;
mod renderer;
mod series;

pub use plotter::{to_color32, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};
pub use series::{palette_color, shape, ChartSeries, EntitySeries, PALETTE};
