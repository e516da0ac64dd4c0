use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::FoodDataSource;
use crate::config::ApiConfig;
use crate::error::PipelineError;
use crate::models::FoodId;

/// HTTP client for the `foods/search` and `food/{fdcId}` endpoints.
pub struct FdcClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_size: u32,
    restrict_data_type: bool,
}

impl FdcClient {
    pub fn new(api: &ApiConfig, restrict_data_type: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("fdc-nutrients/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api.api_key().to_string(),
            page_size: api.page_size,
            restrict_data_type,
        })
    }

    fn search_body(&self, query: &str, branded: bool) -> Value {
        let mut body = json!({
            "query": query,
            "pageSize": self.page_size,
        });
        if branded && self.restrict_data_type {
            body["dataType"] = json!(["Branded"]);
        }
        body
    }
}

#[async_trait]
impl FoodDataSource for FdcClient {
    async fn search(&self, query: &str, branded: bool) -> Result<Value, PipelineError> {
        let url = format!("{}/foods/search", self.base_url);
        tracing::debug!(%url, query, "searching");

        let response = self
            .client
            .post(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .header("Accept", "application/json")
            .json(&self.search_body(query, branded))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Resolution {
                query: query.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| PipelineError::Resolution {
            query: query.to_string(),
            reason: format!("invalid JSON: {}", e),
        })
    }

    async fn food(&self, id: FoodId) -> Result<Value, PipelineError> {
        let url = format!("{}/food/{}", self.base_url, id);
        tracing::debug!(%url, "fetching");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                id,
                reason: format!("HTTP {}", status),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| PipelineError::Fetch {
            id,
            reason: format!("invalid JSON: {}", e),
        })
    }
}
