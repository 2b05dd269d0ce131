//! Series Shaper Module
//! Turns filtered observations into per-entity, date-ordered chart series.

use crate::data::{Observation, ValueType};
use chrono::NaiveDate;

/// Qualitative palette: Set3, then Plotly, then Pastel.
pub const PALETTE: [[u8; 3]; 33] = [
    [141, 211, 199],
    [255, 255, 179],
    [190, 186, 218],
    [251, 128, 114],
    [128, 177, 211],
    [253, 180, 98],
    [179, 222, 105],
    [252, 205, 229],
    [217, 217, 217],
    [188, 128, 189],
    [204, 235, 197],
    [255, 237, 111],
    [99, 110, 250],
    [239, 85, 59],
    [0, 204, 150],
    [171, 99, 250],
    [255, 161, 90],
    [25, 211, 243],
    [255, 102, 146],
    [182, 232, 128],
    [255, 151, 255],
    [254, 203, 82],
    [102, 197, 204],
    [246, 207, 113],
    [248, 156, 116],
    [220, 176, 242],
    [135, 197, 95],
    [158, 185, 243],
    [254, 136, 177],
    [201, 219, 116],
    [139, 224, 164],
    [180, 151, 231],
    [179, 179, 179],
];

/// Palette colour for the `index`-th selected entity.
pub fn palette_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// One entity's line.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub entity_name: String,
    pub color: [u8; 3],
    /// Ascending by date.
    pub points: Vec<(NaiveDate, f64)>,
}

/// Chart-ready data handed to the plotting layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub value_type: ValueType,
    pub label: &'static str,
    /// In caller selection order.
    pub series: Vec<EntitySeries>,
}

impl ChartSeries {
    pub fn get(&self, entity_name: &str) -> Option<&EntitySeries> {
        self.series.iter().find(|s| s.entity_name == entity_name)
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// (min, max) over every plotted value.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, v)| v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.series.iter().flat_map(|s| s.points.iter().map(|&(d, _)| d));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

/// Shape filtered rows into one date-sorted series per entity.
///
/// Colours follow `selected_entities` order, so the same entities picked in
/// another order get other colours. Entities with rows but absent from the
/// selection are appended after it in first-seen order.
pub fn shape(
    rows: &[&Observation],
    value_type: &ValueType,
    selected_entities: &[String],
) -> ChartSeries {
    let mut plotted: Vec<(NaiveDate, &str, f64)> = rows
        .iter()
        .filter_map(|row| {
            row.value
                .filter(|v| !v.is_nan())
                .map(|v| (row.date_field, row.entity_name.as_str(), value_type.transform(v)))
        })
        .collect();
    plotted.sort_by_key(|&(date, _, _)| date);

    let mut order: Vec<&str> = selected_entities.iter().map(String::as_str).collect();
    for &(_, entity, _) in &plotted {
        if !order.contains(&entity) {
            order.push(entity);
        }
    }

    let series = order
        .iter()
        .enumerate()
        .filter_map(|(i, &entity)| {
            let points: Vec<(NaiveDate, f64)> = plotted
                .iter()
                .filter(|&&(_, name, _)| name == entity)
                .map(|&(date, _, value)| (date, value))
                .collect();
            if points.is_empty() {
                return None;
            }
            Some(EntitySeries {
                entity_name: entity.to_string(),
                color: palette_color(i),
                points,
            })
        })
        .collect();

    ChartSeries {
        value_type: value_type.clone(),
        label: value_type.axis_label(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn amount_is_scaled_to_millions_once() {
        let rows = vec![Observation::new(
            "B.Pichincha",
            "Consumo",
            ValueType::Amount,
            date(2024, 1, 1),
            Some(2_345_678.0),
        )];
        let refs: Vec<&Observation> = rows.iter().collect();
        let chart = shape(&refs, &ValueType::Amount, &names(&["B.Pichincha"]));
        assert_eq!(chart.label, "Monto (en millones)");
        assert_eq!(chart.series[0].points, vec![(date(2024, 1, 1), 2.35)]);
    }

    #[test]
    fn drops_missing_values_and_sorts_by_date() {
        let rows = vec![
            Observation::new("C.Jep", "Consumo", ValueType::Rate, date(2024, 3, 1), Some(16.456)),
            Observation::new("C.Jep", "Consumo", ValueType::Rate, date(2024, 2, 1), None),
            Observation::new("C.Jep", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(15.0)),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let chart = shape(&refs, &ValueType::Rate, &names(&["C.Jep"]));
        assert_eq!(chart.label, "Tasa (%)");
        assert_eq!(
            chart.series[0].points,
            vec![(date(2024, 1, 1), 15.0), (date(2024, 3, 1), 16.46)]
        );
    }

    #[test]
    fn operations_round_to_whole_units_and_other_kinds_pass_through() {
        let rows = vec![
            Observation::new("B.Uno", "Consumo", ValueType::Operations, date(2024, 1, 1), Some(41.7)),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let chart = shape(&refs, &ValueType::Operations, &names(&["B.Uno"]));
        assert_eq!(chart.label, "Operaciones (unidades)");
        assert_eq!(chart.series[0].points[0].1, 42.0);

        let other = ValueType::Other("plazo".into());
        let rows = vec![Observation::new("B.Uno", "Consumo", other.clone(), date(2024, 1, 1), Some(3.14159))];
        let refs: Vec<&Observation> = rows.iter().collect();
        let chart = shape(&refs, &other, &names(&["B.Uno"]));
        assert_eq!(chart.label, "Valor");
        assert_eq!(chart.series[0].points[0].1, 3.14159);
    }

    #[test]
    fn colours_follow_selection_order() {
        let rows = vec![
            Observation::new("B.Uno", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(1.0)),
            Observation::new("C.Dos", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(2.0)),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();

        let first = shape(&refs, &ValueType::Rate, &names(&["B.Uno", "C.Dos"]));
        assert_eq!(first.get("B.Uno").unwrap().color, PALETTE[0]);
        assert_eq!(first.get("C.Dos").unwrap().color, PALETTE[1]);

        let swapped = shape(&refs, &ValueType::Rate, &names(&["C.Dos", "B.Uno"]));
        assert_eq!(swapped.series[0].entity_name, "C.Dos");
        assert_eq!(swapped.get("C.Dos").unwrap().color, PALETTE[0]);
        assert_eq!(swapped.get("B.Uno").unwrap().color, PALETTE[1]);
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(PALETTE.len()), PALETTE[0]);
        assert_eq!(palette_color(PALETTE.len() + 4), PALETTE[4]);
    }

    #[test]
    fn selected_entity_without_rows_has_no_series() {
        let rows = vec![
            Observation::new("B.Uno", "Consumo", ValueType::Rate, date(2024, 1, 1), Some(1.0)),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let chart = shape(&refs, &ValueType::Rate, &names(&["C.Dos", "B.Uno"]));
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].color, PALETTE[1]);
        assert_eq!(chart.point_count(), 1);
        assert_eq!(chart.value_bounds(), Some((1.0, 1.0)));
    }

    proptest! {
        #[test]
        fn each_series_is_non_decreasing_by_date(
            raw in prop::collection::vec((0usize..3, 0i64..365, prop::option::of(-1e3f64..1e3)), 0..80)
        ) {
            let entities = ["B.Uno", "C.Dos", "Tres"];
            let rows: Vec<Observation> = raw
                .iter()
                .map(|&(e, offset, value)| {
                    Observation::new(
                        entities[e],
                        "Consumo",
                        ValueType::Rate,
                        date(2024, 1, 1) + chrono::Duration::days(offset),
                        value,
                    )
                })
                .collect();
            let refs: Vec<&Observation> = rows.iter().collect();
            let chart = shape(&refs, &ValueType::Rate, &names(&entities));

            for series in &chart.series {
                prop_assert!(series.points.windows(2).all(|w| w[0].0 <= w[1].0));
            }
            let plottable = rows.iter().filter(|r| r.value.is_some()).count();
            prop_assert_eq!(chart.point_count(), plottable);
        }
    }
}
