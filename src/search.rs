//! Search orchestration: Validator -> Query Builder -> Provider Client ->
//! Normalizer, run sequentially within one request.
//!
//! One invocation shares no mutable state with any other; the dedup set
//! lives inside the normalizer call. Validator and provider failures
//! propagate unchanged, anything unexpected is wrapped as `InternalError`
//! at this boundary.

use crate::errors::{AppError, ResultExt};
use crate::filters::SearchFilters;
use crate::handlers::AppState;
use crate::listing::Listing;
use crate::{normalizer, query};

/// Result of one search invocation: listings in first-seen post-dedup
/// order, plus their count.
#[derive(Debug)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    pub count: usize,
}

/// Runs the full search pipeline for one set of filters.
pub async fn run_search(
    state: &AppState,
    filters: &SearchFilters,
) -> Result<SearchOutcome, AppError> {
    tracing::info!("Starting property search: {:?}", filters);

    // Step 1: validate caller input; never reaches the provider on failure.
    filters.validate()?;

    // Step 2: build the provider query.
    let search_url = query::build_search_url(filters)?;
    tracing::debug!("Provider search URL: {}", search_url);

    // Step 3: fetch raw records.
    let raw_records = state
        .provider
        .fetch_listings(&search_url)
        .await
        .context("running provider search")?;

    // Step 4: normalize + dedup.
    let listings = normalizer::normalize_records(&raw_records);
    tracing::info!(
        "Search produced {} listings from {} raw records",
        listings.len(),
        raw_records.len()
    );

    // Debug artifact, best effort only.
    write_results_snapshot(&state.config.results_file, &listings).await;

    Ok(SearchOutcome {
        count: listings.len(),
        listings,
    })
}

/// Writes the most recent result set as a flat JSON array to a local path.
///
/// Incidental debugging aid, not a contract: failures are logged and
/// swallowed.
async fn write_results_snapshot(path: &str, listings: &[Listing]) {
    let body = match serde_json::to_vec_pretty(listings) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to serialize results snapshot: {}", e);
            return;
        }
    };

    if let Err(e) = tokio::fs::write(path, body).await {
        tracing::warn!("Failed to write results snapshot to {}: {}", path, e);
    }
}
