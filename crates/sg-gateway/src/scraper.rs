//! Outbound client for the scraping service (opaque HTTP collaborator).

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sg_core::{AppError, PlanTier, SearchPattern};

/// Payload forwarded to the scraping service, pattern attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeJob {
    pub user_id: String,
    pub plan: PlanTier,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    pub pattern: SearchPattern,
}

/// Response body from the scraping service. Product documents are passed
/// through opaquely; their schema belongs to the store, not this core.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeResult {
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
}

#[async_trait]
pub trait ScraperClient: Send + Sync {
    async fn scrape(&self, job: &ScrapeJob) -> Result<ScrapeResult>;
}

/// HTTP client posting jobs to `{base_url}/scrape`.
#[derive(Debug)]
pub struct HttpScraperClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpScraperClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ScraperClient for HttpScraperClient {
    async fn scrape(&self, job: &ScrapeJob) -> Result<ScrapeResult> {
        let url = format!("{}/scrape", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(job)
            .send()
            .await
            .map_err(|e| AppError::ScraperUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ScraperStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let result = response.json::<ScrapeResult>().await?;
        Ok(result)
    }
}
