//! Chart Plotter Module
//! Draws the interactive evolution chart using egui_plot.

use crate::charts::ChartSeries;
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

pub fn to_color32(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Plot x coordinate for a date (days since the common era).
fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Creates the evolution line chart.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one line with markers per entity.
    pub fn draw_line_chart(ui: &mut egui::Ui, chart: &ChartSeries, height: f32) {
        ui.label(RichText::new("Gráfico evolutivo").size(16.0).strong());

        Plot::new("evolution_chart")
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Fecha")
            .y_axis_label(chart.label)
            .allow_scroll(false)
            .x_axis_formatter(|mark, _range| {
                x_to_date(mark.value)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(|name, point| {
                let date = x_to_date(point.x)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    format!("{date}\n{:.2}", point.y)
                } else {
                    format!("{name}\n{date}\n{:.2}", point.y)
                }
            })
            .show(ui, |plot_ui| {
                for entity in &chart.series {
                    let color = to_color32(entity.color);
                    let points: Vec<[f64; 2]> = entity
                        .points
                        .iter()
                        .map(|&(date, value)| [date_to_x(date), value])
                        .collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(&entity.entity_name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(3.5)
                            .color(color)
                            .name(&entity.entity_name),
                    );
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_axis_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(x_to_date(date_to_x(date) + 0.4), Some(date));
    }

    #[test]
    fn palette_entries_convert_to_egui_colors() {
        assert_eq!(to_color32([99, 110, 250]), Color32::from_rgb(99, 110, 250));
    }
}
