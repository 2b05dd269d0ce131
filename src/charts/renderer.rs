//! Static Chart Renderer
//! Writes the evolution chart to a PNG file with plotters.
//!
//! Layout:
//! 1. Title "Gráfico evolutivo"
//! 2. Date x-axis, value-kind label on the y-axis
//! 3. One coloured line with markers per entity, legend in the upper right

use crate::charts::ChartSeries;
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render")]
    NothingToRender,
    #[error("Drawing failed: {0}")]
    Draw(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart into `path` as a `width` x `height` PNG.
    pub fn render_png(
        chart: &ChartSeries,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let (dates, values) = Self::axis_ranges(chart).ok_or(RenderError::NothingToRender)?;

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        Self::draw(&root, chart, dates, values)?;
        root.present()?;

        tracing::info!(path = %path.display(), width, height, "chart exported");
        Ok(())
    }

    fn draw(
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        chart: &ChartSeries,
        dates: (NaiveDate, NaiveDate),
        values: (f64, f64),
    ) -> Result<(), RenderError> {
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(root)
            .caption("Gráfico evolutivo", ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(dates.0..dates.1, values.0..values.1)?;

        ctx.configure_mesh()
            .x_desc("Fecha")
            .y_desc(chart.label)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
            .draw()?;

        for entity in &chart.series {
            let [r, g, b] = entity.color;
            let color = RGBColor(r, g, b);

            ctx.draw_series(LineSeries::new(
                entity.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(entity.entity_name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            ctx.draw_series(
                entity
                    .points
                    .iter()
                    .map(|&(date, value)| Circle::new((date, value), 3, color.filled())),
            )?;
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }

    /// Padded date and value extents; `None` when nothing is plotted.
    fn axis_ranges(chart: &ChartSeries) -> Option<((NaiveDate, NaiveDate), (f64, f64))> {
        let (first, last) = chart.date_bounds()?;
        let (lo, hi) = chart.value_bounds()?;

        let dates = if first == last {
            (first - Duration::days(15), last + Duration::days(15))
        } else {
            (first, last)
        };

        let pad = if hi > lo { (hi - lo) * 0.1 } else { lo.abs().max(1.0) * 0.1 };
        Some((dates, (lo - pad, hi + pad)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartSeries, EntitySeries, PALETTE};
    use crate::data::ValueType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn chart(points: Vec<(NaiveDate, f64)>) -> ChartSeries {
        ChartSeries {
            value_type: ValueType::Rate,
            label: ValueType::Rate.axis_label(),
            series: vec![EntitySeries {
                entity_name: "B.Uno".into(),
                color: PALETTE[0],
                points,
            }],
        }
    }

    #[test]
    fn empty_chart_is_not_rendered() {
        let empty = chart(Vec::new());
        let path = std::env::temp_dir().join("never_written.png");
        assert!(matches!(
            StaticChartRenderer::render_png(&empty, &path, 400, 300),
            Err(RenderError::NothingToRender)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn single_point_gets_padded_axes() {
        let single = chart(vec![(date(2024, 1, 1), 10.0)]);
        let (dates, values) = StaticChartRenderer::axis_ranges(&single).unwrap();
        assert_eq!(dates, (date(2023, 12, 17), date(2024, 1, 16)));
        assert_eq!(values, (9.0, 11.0));
    }

    #[test]
    fn value_axis_pads_ten_percent_of_span() {
        let two = chart(vec![(date(2024, 1, 1), 10.0), (date(2024, 2, 1), 20.0)]);
        let (dates, values) = StaticChartRenderer::axis_ranges(&two).unwrap();
        assert_eq!(dates, (date(2024, 1, 1), date(2024, 2, 1)));
        assert_eq!(values, (9.0, 21.0));
    }
}
