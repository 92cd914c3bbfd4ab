use crate::config::Config;
use crate::errors::AppError;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Apify Zillow scraper actor.
///
/// One call per search: the actor is run synchronously and its dataset items
/// come back as the response body. No retry policy lives here; a failed call
/// surfaces immediately to the orchestrator.
#[derive(Clone)]
pub struct ApifyZillowClient {
    client: reqwest::Client,
    base_url: String,
    actor_id: String,
    token: Option<String>,
    max_results: u32,
}

impl ApifyZillowClient {
    /// Creates a new `ApifyZillowClient` from configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        // Scraper runs take a while; the timeout bounds the whole actor run.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| {
                AppError::ProviderError(format!("Failed to create Apify client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.apify_base_url.clone(),
            actor_id: config.actor_id.clone(),
            token: config.apify_token.clone(),
            max_results: config.max_results,
        })
    }

    /// Runs the scraper actor against the given search URL and returns the
    /// raw records it produced.
    ///
    /// A missing API token fails with `ProviderUnavailable` before any
    /// network traffic; transport and remote failures map to
    /// `ProviderError`.
    pub async fn fetch_listings(&self, search_url: &str) -> Result<Vec<Value>, AppError> {
        let token = self.token.as_deref().ok_or(AppError::ProviderUnavailable)?;

        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/v2/acts/{}/run-sync-get-dataset-items",
                self.base_url, self.actor_id
            ),
            &[("token", token)],
        )
        .map_err(|e| AppError::ProviderError(format!("Failed to build actor URL: {}", e)))?;

        // MAP_MARKERS is the fastest extraction mode and carries everything
        // the normalizer needs.
        let body = json!({
            "searchUrls": [{ "url": search_url }],
            "extractionMethod": "MAP_MARKERS",
            "maxItems": self.max_results,
        });

        tracing::info!("Running Zillow scraper actor {}", self.actor_id);
        // Redact token from logs to prevent credential exposure
        tracing::debug!(
            "Actor endpoint: {}/v2/acts/{}/run-sync-get-dataset-items?token=[REDACTED]",
            self.base_url,
            self.actor_id
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ProviderError(format!("Apify request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Apify returned error {}: {}", status, error_text);
            return Err(AppError::ProviderError(format!(
                "Apify returned status {}: {}",
                status, error_text
            )));
        }

        let items: Value = response.json().await.map_err(|e| {
            AppError::ProviderError(format!("Failed to parse Apify response: {}", e))
        })?;

        let records = match items {
            Value::Array(records) => records,
            other => {
                tracing::warn!("Unexpected Apify response shape: {:?}", other);
                return Err(AppError::ProviderError(
                    "Apify response was not a dataset array".to_string(),
                ));
            }
        };

        tracing::info!("Scraper returned {} raw records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(token: Option<&str>) -> Config {
        Config {
            port: 3000,
            apify_token: token.map(|t| t.to_string()),
            apify_base_url: "https://api.apify.com".to_string(),
            actor_id: "maxcopell~zillow-scraper".to_string(),
            max_results: 500,
            results_file: "results.json".to_string(),
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = ApifyZillowClient::new(&test_config(Some("token")));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn missing_token_is_provider_unavailable() {
        let client = ApifyZillowClient::new(&test_config(None)).unwrap();
        let result = client.fetch_listings("https://www.zillow.com/homes/").await;
        assert!(matches!(result, Err(AppError::ProviderUnavailable)));
    }
}
