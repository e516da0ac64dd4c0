//! Renderers for the nutrient table.
//!
//! - [`terminal`] — summary box plus colored tables; respects `--verbose` / `--quiet`.
//! - [`csv`] — header row in output column order followed by one line per food.
//! - JSON output is the serialized [`JsonReport`].

pub mod csv;
pub mod terminal;

use serde::Serialize;

use crate::models::{ItemFailure, NutrientRecord};

/// Shape of `--report json` output.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Whether per-kcal normalization was applied.
    pub normalized: bool,
    pub rows: &'a [NutrientRecord],
    pub failures: &'a [ItemFailure],
}
