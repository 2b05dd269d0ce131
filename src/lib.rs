//! Origination Dashboard - financial-sector evolution chart and ranking
//!
//! Loads the rate, amount and operations sources once, then serves the
//! evolution chart and ranking views from the shared in-memory table.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod query;
pub mod ranking;
