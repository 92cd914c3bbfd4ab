use crate::errors::AppError;
use serde::{Deserialize, Serialize};

/// Largest accepted search radius, in miles.
pub const MAX_RADIUS_MILES: f64 = 100.0;

/// Which market segment a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Sale,
    Rental,
    Both,
}

impl Default for ListingCategory {
    fn default() -> Self {
        ListingCategory::Both
    }
}

/// Caller-supplied search parameters, Zillow-like filters.
///
/// Deserialized straight from the request body; `validate` must pass before
/// the filters reach the query builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub listing_type: ListingCategory,

    /// Center coordinate for the search, optional.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_radius")]
    pub radius_miles: f64,

    // Price filters (separate ranges for sale vs rental)
    pub min_sale_price: Option<i64>,
    pub max_sale_price: Option<i64>,
    pub min_rent_price: Option<i64>,
    pub max_rent_price: Option<i64>,

    // Property details
    pub min_beds: Option<i64>,
    pub max_beds: Option<i64>,
    pub min_baths: Option<f64>,
    pub max_baths: Option<f64>,

    /// Property types to include (CONDO, SINGLE_FAMILY, etc.).
    pub home_types: Option<Vec<String>>,
}

fn default_radius() -> f64 {
    10.0
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            listing_type: ListingCategory::Both,
            latitude: None,
            longitude: None,
            radius_miles: default_radius(),
            min_sale_price: None,
            max_sale_price: None,
            min_rent_price: None,
            max_rent_price: None,
            min_beds: None,
            max_beds: None,
            min_baths: None,
            max_baths: None,
            home_types: None,
        }
    }
}

impl SearchFilters {
    /// Validates the filter set, naming the offending field on failure.
    ///
    /// Pure: no side effects, each check independent. A `min_*` bound larger
    /// than its `max_*` counterpart is accepted; the provider simply returns
    /// an empty result set for such a range.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.radius_miles <= 0.0 || !self.radius_miles.is_finite() {
            return Err(AppError::Validation {
                field: "radius_miles",
                reason: format!("must be greater than zero, got {}", self.radius_miles),
            });
        }
        if self.radius_miles > MAX_RADIUS_MILES {
            return Err(AppError::Validation {
                field: "radius_miles",
                reason: format!("must be at most {} miles", MAX_RADIUS_MILES),
            });
        }

        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) || !lat.is_finite() {
                return Err(AppError::Validation {
                    field: "latitude",
                    reason: format!("must be within [-90, 90], got {}", lat),
                });
            }
        }
        if let Some(lng) = self.longitude {
            if !(-180.0..=180.0).contains(&lng) || !lng.is_finite() {
                return Err(AppError::Validation {
                    field: "longitude",
                    reason: format!("must be within [-180, 180], got {}", lng),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_are_valid() {
        assert!(SearchFilters::default().validate().is_ok());
    }

    #[test]
    fn zero_radius_names_the_field() {
        let filters = SearchFilters {
            radius_miles: 0.0,
            ..Default::default()
        };
        match filters.validate() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "radius_miles"),
            other => panic!("expected radius validation error, got {:?}", other),
        }
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        let filters = SearchFilters {
            latitude: Some(91.0),
            longitude: Some(0.0),
            ..Default::default()
        };
        match filters.validate() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "latitude"),
            other => panic!("expected latitude validation error, got {:?}", other),
        }
    }

    #[test]
    fn inverted_price_bounds_accepted() {
        // min > max narrows the result set to empty downstream, by contract
        // it is not rejected here.
        let filters = SearchFilters {
            min_sale_price: Some(900_000),
            max_sale_price: Some(100_000),
            ..Default::default()
        };
        assert!(filters.validate().is_ok());
    }
}
