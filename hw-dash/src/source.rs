//! KPI API client
//!
//! The coordinator talks to the API through the `KpiSource` trait so the
//! transport can be swapped (tests script responses in memory). The HTTP
//! implementation returns raw JSON; shape checks happen in the view models,
//! where a malformed payload degrades to an empty panel.

use crate::error::FetchError;
use async_trait::async_trait;
use hw_common::config::ApiConfig;
use hw_common::{Resource, Year};
use serde_json::Value;

const USER_AGENT: &str = concat!("happyworld-dash/", env!("CARGO_PKG_VERSION"));

/// Something that can fetch a KPI resource
#[async_trait]
pub trait KpiSource: Send + Sync {
    /// Fetch one resource; `year` is `Some` for year-scoped resources
    async fn fetch(&self, resource: Resource, year: Option<Year>) -> Result<Value, FetchError>;
}

/// KPI API client over HTTP
pub struct HttpKpiSource {
    http_client: reqwest::Client,
    config: ApiConfig,
}

impl HttpKpiSource {
    /// Create new client for the configured API root
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Full URL (without query) for a resource
    pub fn url_for(&self, resource: Resource) -> String {
        self.config.endpoint(resource.path())
    }
}

#[async_trait]
impl KpiSource for HttpKpiSource {
    async fn fetch(&self, resource: Resource, year: Option<Year>) -> Result<Value, FetchError> {
        let url = self.url_for(resource);

        tracing::debug!(resource = %resource, year = ?year.map(Year::get), url = %url, "Querying KPI API");

        let mut request = self.http_client.get(&url);
        if let Some(year) = year {
            request = request.query(&[("year", year.get())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.config.timeout())
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), error_text));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        tracing::debug!(resource = %resource, "KPI API request successful");

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpKpiSource::new(ApiConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_urls_follow_base() {
        let client = HttpKpiSource::new(ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();

        assert_eq!(
            client.url_for(Resource::HappinessByRegion),
            "http://localhost:8000/api/kpis/happiness-by-region"
        );
        assert_eq!(
            client.url_for(Resource::GlobalEvolution),
            "http://localhost:8000/api/kpis/global-evolution"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let client = HttpKpiSource::new(ApiConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        let result = client.fetch(Resource::SummaryKpis, Some(Year::default())).await;

        assert!(matches!(
            result,
            Err(FetchError::Network(_)) | Err(FetchError::Timeout(_))
        ));
    }
}
