use serde::Deserialize;

/// Default Apify actor used to scrape Zillow search results.
pub const DEFAULT_ACTOR_ID: &str = "maxcopell~zillow-scraper";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Apify API token. Optional at startup: a missing token only fails
    /// the searches that would need it, not the whole process.
    pub apify_token: Option<String>,
    pub apify_base_url: String,
    pub actor_id: String,
    /// Upper bound on raw records requested from the scraper per search.
    pub max_results: u32,
    /// Local path where the most recent result set is dumped for debugging.
    pub results_file: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            apify_token: std::env::var("APIFY_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            apify_base_url: std::env::var("APIFY_BASE_URL")
                .unwrap_or_else(|_| "https://api.apify.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            actor_id: std::env::var("ZILLOW_ACTOR_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ACTOR_ID.to_string()),
            max_results: std::env::var("MAX_RESULTS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_RESULTS must be a positive number"))?,
            results_file: std::env::var("RESULTS_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "results.json".to_string()),
        };

        if !config.apify_base_url.starts_with("http://")
            && !config.apify_base_url.starts_with("https://")
        {
            anyhow::bail!("APIFY_BASE_URL must start with http:// or https://");
        }
        if config.max_results == 0 {
            anyhow::bail!("MAX_RESULTS must be greater than zero");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Apify base URL: {}", config.apify_base_url);
        tracing::debug!("Zillow actor: {}", config.actor_id);
        tracing::debug!("Server port: {}", config.port);
        if config.apify_token.is_none() {
            tracing::warn!("APIFY_TOKEN not set; searches will fail until it is provided");
        }

        Ok(config)
    }
}
