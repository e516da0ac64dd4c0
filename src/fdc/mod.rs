//! Access to the FoodData Central (FDC) REST API.
//!
//! [`FoodDataSource`] is the seam the resolver and extractor talk to. It hands
//! back the raw JSON body of each endpoint so that field-level validation stays
//! with the component that understands the payload. [`client::FdcClient`] is
//! the HTTP implementation.

pub mod client;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PipelineError;
use crate::models::FoodId;

#[async_trait]
pub trait FoodDataSource: Sync {
    /// Run a free-text search and return the response body.
    ///
    /// Fails with [`PipelineError::Resolution`] when the service answers with a
    /// non-success status or a body that is not JSON.
    async fn search(&self, query: &str, branded: bool) -> Result<Value, PipelineError>;

    /// Fetch the full record for one identifier and return the response body.
    ///
    /// Fails with [`PipelineError::Fetch`] when the service answers with a
    /// non-success status or a body that is not JSON.
    async fn food(&self, id: FoodId) -> Result<Value, PipelineError>;
}
