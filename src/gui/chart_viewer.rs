//! Chart Viewer Widget
//! Central area: evolution chart or ranking table for the latest query.

use crate::charts::ChartPlotter;
use crate::query::{ChartOutcome, QueryError, RankingOutcome};
use crate::ranking::RANKING_HEADERS;
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 520.0;

/// Latest query results, replaced on every selection change.
#[derive(Default)]
pub struct ChartViewer {
    pub chart: Option<Result<ChartOutcome, QueryError>>,
    pub ranking: Option<RankingOutcome>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_chart(&self, ui: &mut egui::Ui) {
        match &self.chart {
            None => placeholder(ui, "Selecciona el tipo de valor."),
            Some(Err(err)) => {
                ui.label(
                    RichText::new(err.to_string())
                        .size(14.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            }
            Some(Ok(ChartOutcome::EmptySelection(reason))) => placeholder(ui, reason.prompt()),
            Some(Ok(ChartOutcome::Series(chart))) => {
                ChartPlotter::draw_line_chart(ui, chart, CHART_HEIGHT);
            }
        }
    }

    pub fn show_ranking(&self, ui: &mut egui::Ui) {
        let rows = match &self.ranking {
            None => return placeholder(ui, "Selecciona un producto."),
            Some(outcome @ RankingOutcome::NoData { .. }) => {
                return placeholder(ui, &outcome.message().unwrap_or_default());
            }
            Some(RankingOutcome::Rows(rows)) => rows,
        };

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    egui::Grid::new("ranking_table")
                        .striped(true)
                        .min_col_width(80.0)
                        .spacing([16.0, 4.0])
                        .show(ui, |ui| {
                            for header in RANKING_HEADERS {
                                ui.label(RichText::new(header).strong().size(13.0));
                            }
                            ui.end_row();

                            for row in rows {
                                let formatted = row.formatted();
                                for (i, cell) in formatted.cells().iter().enumerate() {
                                    // Numeric columns read better right-aligned.
                                    if i == 1 {
                                        ui.label(RichText::new(*cell).size(12.0));
                                    } else {
                                        ui.with_layout(
                                            egui::Layout::right_to_left(egui::Align::Center),
                                            |ui| ui.label(RichText::new(*cell).size(12.0)),
                                        );
                                    }
                                }
                                ui.end_row();
                            }
                        });
                });
            });
    }
}

fn placeholder(ui: &mut egui::Ui, text: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(RichText::new(text).size(16.0).color(Color32::GRAY));
    });
}
