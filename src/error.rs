use thiserror::Error;

use crate::models::FoodId;

/// Per-item failure of the resolve/extract pipeline.
///
/// Each variant is scoped to a single food name or identifier; the batch
/// carries on with the remaining items.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The search response for a query was malformed or unsuccessful.
    #[error("search for '{query}' returned an unusable response: {reason}")]
    Resolution { query: String, reason: String },

    /// No candidate in the search response had the fields needed for scoring.
    #[error("no usable candidate matched '{query}'")]
    NoMatch { query: String },

    /// The detail response for an identifier was malformed or unsuccessful.
    #[error("food {id} returned an unusable record: {reason}")]
    Fetch { id: FoodId, reason: String },

    /// The request never produced a response body.
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for PipelineError {
    /// Drops the request URL: it carries the `api_key` query parameter.
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Transport(e.without_url())
    }
}

/// A field absent from one search candidate or nutrient entry.
///
/// Never fatal: the entry is skipped and contributes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingField {
    #[error("description")]
    Description,
    #[error("brandOwner")]
    BrandOwner,
    #[error("fdcId")]
    FdcId,
    #[error("nutrient.id")]
    NutrientId,
    #[error("amount")]
    Amount,
}
