use crate::config::Config;
use crate::errors::AppError;
use crate::filters::SearchFilters;
use crate::listing::Listing;
use crate::provider::ApifyZillowClient;
use crate::search;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the external scraping provider.
    pub provider: ApifyZillowClient,
}

/// Response payload for search requests.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub listings: Vec<Listing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "property-search-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/search
///
/// Runs a property search with the given filters and returns the
/// normalized, deduplicated listings. An empty result set is a normal,
/// successful response.
pub async fn search_properties(
    State(state): State<Arc<AppState>>,
    Json(filters): Json<SearchFilters>,
) -> Result<Json<SearchResponse>, AppError> {
    tracing::info!("POST /search - listing_type: {:?}", filters.listing_type);

    let outcome = search::run_search(&state, &filters).await?;

    Ok(Json(SearchResponse {
        success: true,
        count: outcome.count,
        message: Some(format!("Found {} properties", outcome.count)),
        listings: outcome.listings,
    }))
}

/// GET /api/v1/search/examples
///
/// Canned example filter configurations for client developers.
pub async fn search_examples() -> Json<serde_json::Value> {
    Json(json!({
        "austin_rentals": {
            "listing_type": "rental",
            "latitude": 30.2672,
            "longitude": -97.7431,
            "radius_miles": 15.0,
            "min_rent_price": 1000,
            "max_rent_price": 4000,
            "min_beds": 1
        },
        "downtown_condos": {
            "listing_type": "sale",
            "latitude": 30.2672,
            "longitude": -97.7431,
            "radius_miles": 5.0,
            "min_sale_price": 300000,
            "max_sale_price": 800000,
            "home_types": ["CONDO"]
        },
        "family_homes": {
            "listing_type": "both",
            "latitude": 30.2672,
            "longitude": -97.7431,
            "radius_miles": 20.0,
            "min_beds": 3,
            "min_baths": 2.0,
            "home_types": ["SINGLE_FAMILY"]
        }
    }))
}
