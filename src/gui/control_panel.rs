//! Control Panel Widget
//! Right side panel with the selectors of the active page.

use crate::data::{CanonicalTable, DateRange, EntityCategory, SortColumn, ValueType};
use crate::query::{ChartQuery, RankingQuery};
use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};

/// Dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Evolution,
    Ranking,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Evolution => "Gráfico Evolutivo",
            Page::Ranking => "Ranking",
        }
    }
}

/// Selector state of the evolution page.
#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub categories: Vec<EntityCategory>,
    /// Kept in click order.
    pub entities: Vec<String>,
    pub products: Vec<String>,
    pub value_type: Option<ValueType>,
}

/// Selector state of the ranking page.
#[derive(Debug, Clone)]
pub struct RankingSettings {
    pub date: NaiveDate,
    pub product: Option<String>,
    pub categories: Vec<EntityCategory>,
    pub sort_column: SortColumn,
}

/// Choices offered by the selectors, computed once from the table.
struct Choices {
    dates: Vec<NaiveDate>,
    products: Vec<String>,
    value_types: Vec<ValueType>,
}

/// Right side control panel.
pub struct ControlPanel {
    pub page: Page,
    pub chart: ChartSettings,
    pub ranking: RankingSettings,
    choices: Choices,
    pub status: String,
}

impl ControlPanel {
    /// Defaults mirror the source dashboard: full date range, every category,
    /// the first product and value type, ranking on the latest date.
    pub fn new(table: &CanonicalTable) -> Self {
        let fallback = NaiveDate::default();
        let min = table.min_date().unwrap_or(fallback);
        let max = table.max_date().unwrap_or(fallback);
        let products = table.products();
        let value_types = table.value_types();

        Self {
            page: Page::default(),
            chart: ChartSettings {
                start: min,
                end: max,
                categories: EntityCategory::ALL.to_vec(),
                entities: Vec::new(),
                products: Vec::new(),
                value_type: value_types.first().cloned(),
            },
            ranking: RankingSettings {
                date: max,
                product: products.first().cloned(),
                categories: EntityCategory::ALL.to_vec(),
                sort_column: SortColumn::default(),
            },
            choices: Choices {
                dates: table.dates(),
                products,
                value_types,
            },
            status: "Ready".to_string(),
        }
    }

    pub fn chart_query(&self) -> Option<ChartQuery> {
        Some(ChartQuery {
            date_range: DateRange::new(self.chart.start, self.chart.end),
            categories: self.chart.categories.clone(),
            entities: self.chart.entities.clone(),
            products: self.chart.products.clone(),
            value_type: self.chart.value_type.clone()?,
        })
    }

    pub fn ranking_query(&self) -> Option<RankingQuery> {
        Some(RankingQuery {
            date: self.ranking.date,
            product: self.ranking.product.clone()?,
            categories: self.ranking.categories.clone(),
            sort_column: self.ranking.sort_column,
        })
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the panel for the active page.
    pub fn show(&mut self, ui: &mut egui::Ui, table: &CanonicalTable) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.add_space(5.0);
        ui.label(RichText::new("Página").size(14.0).strong());
        ComboBox::from_id_salt("page")
            .selected_text(self.page.title())
            .show_ui(ui, |ui| {
                for page in [Page::Evolution, Page::Ranking] {
                    if ui.selectable_value(&mut self.page, page, page.title()).changed() {
                        action = ControlPanelAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        let changed = match self.page {
            Page::Evolution => self.show_chart_selectors(ui, table),
            Page::Ranking => self.show_ranking_selectors(ui),
        };
        if changed {
            action = ControlPanelAction::SelectionChanged;
        }

        if self.page == Page::Evolution {
            ui.add_space(15.0);
            ui.separator();
            ui.vertical_centered(|ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        }

        ui.add_space(10.0);
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn show_chart_selectors(&mut self, ui: &mut egui::Ui, table: &CanonicalTable) -> bool {
        let mut changed = false;

        ui.label("Selecciona el rango de fechas:");
        changed |= date_combo(ui, "chart_start", "Desde:", &mut self.chart.start, &self.choices.dates);
        changed |= date_combo(ui, "chart_end", "Hasta:", &mut self.chart.end, &self.choices.dates);

        ui.add_space(8.0);
        ui.label("Selecciona uno o más tipos de entidad:");
        if category_checkboxes(ui, &mut self.chart.categories) {
            // Entities outside the chosen categories can no longer be selected.
            let allowed = table.entities_in(&self.chart.categories);
            self.chart.entities.retain(|e| allowed.contains(e));
            changed = true;
        }

        ui.add_space(8.0);
        ui.label("Selecciona una o más entidades:");
        let entities = table.entities_in(&self.chart.categories);
        changed |= ordered_multiselect(ui, "chart_entities", &entities, &mut self.chart.entities);

        ui.add_space(8.0);
        ui.label("Selecciona uno o más productos:");
        changed |= ordered_multiselect(
            ui,
            "chart_products",
            &self.choices.products,
            &mut self.chart.products,
        );

        ui.add_space(8.0);
        ui.label("Selecciona el tipo de valor:");
        let selected = self
            .chart
            .value_type
            .as_ref()
            .map(|v| v.display_name().to_string())
            .unwrap_or_default();
        ComboBox::from_id_salt("chart_value_type")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for value_type in &self.choices.value_types {
                    let is_selected = self.chart.value_type.as_ref() == Some(value_type);
                    if ui
                        .selectable_label(is_selected, value_type.display_name())
                        .clicked()
                    {
                        self.chart.value_type = Some(value_type.clone());
                        changed = true;
                    }
                }
            });

        changed
    }

    fn show_ranking_selectors(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.label("Selecciona una fecha:");
        changed |= date_combo(ui, "ranking_date", "Fecha:", &mut self.ranking.date, &self.choices.dates);

        ui.add_space(8.0);
        ui.label("Selecciona un producto:");
        ComboBox::from_id_salt("ranking_product")
            .selected_text(self.ranking.product.clone().unwrap_or_default())
            .show_ui(ui, |ui| {
                for product in &self.choices.products {
                    let is_selected = self.ranking.product.as_ref() == Some(product);
                    if ui.selectable_label(is_selected, product.as_str()).clicked() {
                        self.ranking.product = Some(product.clone());
                        changed = true;
                    }
                }
            });

        ui.add_space(8.0);
        ui.label("Selecciona uno o más tipos de entidad:");
        changed |= category_checkboxes(ui, &mut self.ranking.categories);

        ui.add_space(8.0);
        ui.label("Selecciona la columna para ordenar el ranking:");
        ComboBox::from_id_salt("ranking_sort")
            .selected_text(self.ranking.sort_column.display_name())
            .show_ui(ui, |ui| {
                for column in SortColumn::ALL {
                    if ui
                        .selectable_value(&mut self.ranking.sort_column, column, column.display_name())
                        .changed()
                    {
                        changed = true;
                    }
                }
            });

        changed
    }
}

fn date_combo(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    value: &mut NaiveDate,
    dates: &[NaiveDate],
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.add_sized([60.0, 20.0], egui::Label::new(label));
        ComboBox::from_id_salt(id)
            .width(140.0)
            .selected_text(value.format("%Y-%m-%d").to_string())
            .show_ui(ui, |ui| {
                for date in dates {
                    if ui
                        .selectable_value(value, *date, date.format("%Y-%m-%d").to_string())
                        .changed()
                    {
                        changed = true;
                    }
                }
            });
    });
    changed
}

fn category_checkboxes(ui: &mut egui::Ui, selected: &mut Vec<EntityCategory>) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        for category in EntityCategory::ALL {
            let mut checked = selected.contains(&category);
            if ui.checkbox(&mut checked, category.display_name()).changed() {
                if checked {
                    selected.push(category);
                } else {
                    selected.retain(|c| *c != category);
                }
                changed = true;
            }
        }
    });
    changed
}

/// Checkbox list that records selection in click order.
fn ordered_multiselect(
    ui: &mut egui::Ui,
    id: &str,
    options: &[String],
    selected: &mut Vec<String>,
) -> bool {
    let mut changed = false;
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(5.0)
        .show(ui, |ui| {
            ScrollArea::vertical()
                .id_salt(id)
                .max_height(140.0)
                .show(ui, |ui| {
                    for option in options {
                        let mut checked = selected.contains(option);
                        if ui.checkbox(&mut checked, option.as_str()).changed() {
                            if checked {
                                selected.push(option.clone());
                            } else {
                                selected.retain(|s| s != option);
                            }
                            changed = true;
                        }
                    }
                });
        });
    ui.horizontal(|ui| {
        if ui.small_button("Clear").clicked() && !selected.is_empty() {
            selected.clear();
            changed = true;
        }
    });
    changed
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    ExportPng,
}
