//! Display formatting for the ranking table.

use crate::ranking::RankingRow;

/// Two-decimal fixed point.
pub fn format_fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Integer with comma thousands separators, e.g. `1,234,567`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Column headers of the ranking table.
pub const RANKING_HEADERS: [&str; 5] = ["Ranking", "Entidad", "Tasa", "Monto", "Operaciones"];

/// Display cells for one ranking row, in `RANKING_HEADERS` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRow {
    pub rank: String,
    pub entity_name: String,
    pub rate: String,
    pub amount: String,
    pub operations: String,
}

impl FormattedRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.rank,
            &self.entity_name,
            &self.rate,
            &self.amount,
            &self.operations,
        ]
    }
}

impl RankingRow {
    pub fn formatted(&self) -> FormattedRow {
        FormattedRow {
            rank: self.rank.to_string(),
            entity_name: self.entity_name.clone(),
            rate: format_fixed2(self.rate),
            amount: format_fixed2(self.amount),
            operations: format_thousands(self.operations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-45_000), "-45,000");
    }

    #[test]
    fn formats_a_ranking_row() {
        let row = RankingRow {
            rank: 2,
            entity_name: "B.Pichincha".into(),
            rate: 3.2,
            amount: 10.5,
            operations: 12_500,
        };
        assert_eq!(
            row.formatted().cells(),
            ["2", "B.Pichincha", "3.20", "10.50", "12,500"]
        );
    }
}
