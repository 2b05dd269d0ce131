//! Dashboard Main Application
//! Page selector, right-hand control panel and central chart/table area.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::CanonicalTable;
use crate::gui::control_panel::Page;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::query::{chart_view, ranking_view, ChartOutcome};
use egui::{RichText, SidePanel};
use std::sync::Arc;

pub const APP_TITLE: &str = "Originación Sistema Financiero Ecuatoriano";

/// Main application window over the shared, read-only table.
pub struct DashboardApp {
    table: Arc<CanonicalTable>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    export_size: [u32; 2],
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        table: Arc<CanonicalTable>,
        config: &DashboardConfig,
    ) -> Self {
        let control_panel = ControlPanel::new(&table);
        let mut app = Self {
            table,
            control_panel,
            chart_viewer: ChartViewer::new(),
            export_size: config.export_size,
        };
        app.refresh();
        app
    }

    /// Re-run the query of the active page.
    fn refresh(&mut self) {
        match self.control_panel.page {
            Page::Evolution => {
                self.chart_viewer.chart = self
                    .control_panel
                    .chart_query()
                    .map(|query| chart_view(&self.table, &query));
            }
            Page::Ranking => {
                self.chart_viewer.ranking = self
                    .control_panel
                    .ranking_query()
                    .map(|query| ranking_view(&self.table, &query));
            }
        }
    }

    /// Handle PNG export of the current chart.
    fn handle_export_png(&mut self) {
        let Some(Ok(ChartOutcome::Series(chart))) = &self.chart_viewer.chart else {
            self.control_panel.set_status("No chart to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("grafico_evolutivo.png")
            .save_file()
        else {
            return;
        };

        let [width, height] = self.export_size;
        match StaticChartRenderer::render_png(chart, &path, width, height) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
                if let Err(e) = open::that(&path) {
                    tracing::warn!(error = %e, "could not open exported chart");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "chart export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(APP_TITLE).size(16.0).strong());
            });
        });

        // Right panel - selectors
        SidePanel::right("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui, &self.table) {
                        ControlPanelAction::SelectionChanged => self.refresh(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(RichText::new(self.control_panel.page.title()).size(16.0));
            ui.add_space(8.0);
            match self.control_panel.page {
                Page::Evolution => self.chart_viewer.show_chart(ui),
                Page::Ranking => self.chart_viewer.show_ranking(ui),
            }
        });
    }
}
