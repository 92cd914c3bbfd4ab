use crate::errors::AppError;
use crate::filters::{ListingCategory, SearchFilters};
use serde_json::{json, Map, Value};
use url::Url;

/// Base of the provider's search page; the encoded query state is appended
/// as the `searchQueryState` parameter.
pub const SEARCH_BASE_URL: &str = "https://www.zillow.com/homes/";

const MILES_PER_DEGREE_LAT: f64 = 69.0;

/// Builds the provider search URL from validated filters.
///
/// Pure and deterministic: the same filters always produce the same URL.
/// The bounding region uses a flat-earth approximation (one degree of
/// latitude is ~69 miles, longitude shrinks by cos(latitude)), which
/// under-corrects near the poles. At latitude ±90 the longitude span is
/// undefined; that case is surfaced as a validation error rather than an
/// unbounded box.
pub fn build_search_url(filters: &SearchFilters) -> Result<String, AppError> {
    let mut state = Map::new();
    state.insert("isMapVisible".to_string(), json!(true));
    if let Some(bounds) = map_bounds(filters)? {
        state.insert("mapBounds".to_string(), bounds);
    }
    state.insert("filterState".to_string(), filter_state(filters));
    state.insert("isListVisible".to_string(), json!(true));

    let encoded = Value::Object(state).to_string();

    let mut url = Url::parse(SEARCH_BASE_URL)
        .map_err(|e| AppError::InternalError(format!("bad search base URL: {}", e)))?;
    url.query_pairs_mut().append_pair("searchQueryState", &encoded);

    Ok(url.to_string())
}

/// Derives the map bounding box from center + radius, or `None` when no
/// center coordinate was supplied.
fn map_bounds(filters: &SearchFilters) -> Result<Option<Value>, AppError> {
    let (lat, lng) = match (filters.latitude, filters.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Ok(None),
    };

    if lat.abs() >= 90.0 {
        return Err(AppError::Validation {
            field: "latitude",
            reason: "search bounding box is undefined at the poles".to_string(),
        });
    }

    let lat_offset = filters.radius_miles / MILES_PER_DEGREE_LAT;
    let lng_offset = filters.radius_miles / (MILES_PER_DEGREE_LAT * lat.to_radians().cos());
    if !lat_offset.is_finite() || !lng_offset.is_finite() {
        return Err(AppError::Validation {
            field: "latitude",
            reason: "longitude span diverges at this latitude".to_string(),
        });
    }

    Ok(Some(json!({
        "west": lng - lng_offset,
        "east": lng + lng_offset,
        "south": lat - lat_offset,
        "north": lat + lat_offset,
    })))
}

/// Maps the filter set into the provider's `filterState` object, omitting
/// absent bounds entirely.
fn filter_state(filters: &SearchFilters) -> Value {
    let mut fs = Map::new();
    // Newest listings first
    fs.insert("sort".to_string(), json!({ "value": "days" }));

    if matches!(
        filters.listing_type,
        ListingCategory::Sale | ListingCategory::Both
    ) {
        if let Some(range) = min_max(filters.min_sale_price, filters.max_sale_price) {
            fs.insert("price".to_string(), range);
        }
    }
    if matches!(
        filters.listing_type,
        ListingCategory::Rental | ListingCategory::Both
    ) {
        if let Some(range) = min_max(filters.min_rent_price, filters.max_rent_price) {
            fs.insert("monthlyPayment".to_string(), range);
        }
    }

    if let Some(range) = min_max(filters.min_beds, filters.max_beds) {
        fs.insert("beds".to_string(), range);
    }
    if let Some(range) = min_max_f64(filters.min_baths, filters.max_baths) {
        fs.insert("baths".to_string(), range);
    }

    if let Some(ref home_types) = filters.home_types {
        if !home_types.is_empty() {
            let mut types = Map::new();
            for ht in home_types {
                types.insert(ht.clone(), json!({ "value": true }));
            }
            fs.insert("homeType".to_string(), Value::Object(types));
        }
    }

    match filters.listing_type {
        ListingCategory::Sale => {
            fs.insert("isForSaleByAgent".to_string(), json!({ "value": true }));
            fs.insert("isForSaleByOwner".to_string(), json!({ "value": true }));
        }
        ListingCategory::Rental => {
            fs.insert("isForRent".to_string(), json!({ "value": true }));
        }
        ListingCategory::Both => {}
    }

    Value::Object(fs)
}

fn min_max(min: Option<i64>, max: Option<i64>) -> Option<Value> {
    let mut range = Map::new();
    if let Some(min) = min {
        range.insert("min".to_string(), json!(min));
    }
    if let Some(max) = max {
        range.insert("max".to_string(), json!(max));
    }
    if range.is_empty() {
        None
    } else {
        Some(Value::Object(range))
    }
}

fn min_max_f64(min: Option<f64>, max: Option<f64>) -> Option<Value> {
    let mut range = Map::new();
    if let Some(min) = min {
        range.insert("min".to_string(), json!(min));
    }
    if let Some(max) = max {
        range.insert("max".to_string(), json!(max));
    }
    if range.is_empty() {
        None
    } else {
        Some(Value::Object(range))
    }
}
