//! Ranking module - point-in-time entity ranking

mod builder;
mod format;

pub use builder::{rank, RankingRow};
pub use format::{format_fixed2, format_thousands, FormattedRow, RANKING_HEADERS};
