use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a canonical listing.
///
/// Mutually exclusive with the opposite price field being populated: a
/// `Sale` listing carries `sale_price`, a `Rental` listing `rental_price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Sale,
    Rental,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Sale => "sale",
            ListingKind::Rental => "rental",
        }
    }
}

/// Canonical, validated property listing.
///
/// Constructed once per accepted raw record via [`ListingDraft::build`],
/// never mutated afterwards, and discarded at the end of the request.
/// Absent fields stay absent through a serialize/deserialize round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Opaque provider id, stringified (buildingId for aggregate records).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zpid: Option<String>,

    /// Whether this is a building-level (aggregate) record.
    #[serde(default)]
    pub building: bool,

    pub listing_type: ListingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_status: Option<String>,

    // Pricing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_price: Option<i64>,
    /// Provider's estimated purchase value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zestimate: Option<i64>,
    /// Provider's estimated monthly rent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_zestimate: Option<i64>,

    // Property details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beds: Option<i64>,
    /// Bathrooms, fractional to allow half-baths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baths: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub living_area: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,

    // Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    // Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_on_market: Option<i64>,

    /// When this listing was processed. Set at construction.
    pub processed_at: DateTime<Utc>,
}

impl Listing {
    /// The active price for this listing, per its classification.
    pub fn price(&self) -> Option<i64> {
        self.sale_price.or(self.rental_price)
    }
}

/// Assembled-but-unvalidated listing fields.
///
/// The normalizer fills a draft from a raw record and calls [`build`]
/// (`ListingDraft::build`), which enforces the semantic constraints of the
/// canonical model before a `Listing` exists at all.
#[derive(Debug, Default)]
pub struct ListingDraft {
    pub zpid: Option<String>,
    pub building: bool,
    pub listing_type: Option<ListingKind>,
    pub home_type: Option<String>,
    pub home_status: Option<String>,
    pub sale_price: Option<i64>,
    pub rental_price: Option<i64>,
    pub zestimate: Option<i64>,
    pub rent_zestimate: Option<i64>,
    pub address: Option<String>,
    pub beds: Option<i64>,
    pub baths: Option<f64>,
    pub living_area: Option<i64>,
    pub lot_size: Option<String>,
    pub year_built: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source_url: Option<String>,
    pub broker_name: Option<String>,
    pub days_on_market: Option<i64>,
}

impl ListingDraft {
    /// Validates the draft and produces the canonical listing.
    ///
    /// Checks: classification present; exactly one price populated and on
    /// the side matching the classification; coordinates, when present,
    /// within valid degree ranges.
    pub fn build(self) -> Result<Listing, String> {
        let listing_type = self
            .listing_type
            .ok_or_else(|| "classification missing".to_string())?;

        match (listing_type, self.sale_price, self.rental_price) {
            (ListingKind::Sale, Some(_), None) => {}
            (ListingKind::Rental, None, Some(_)) => {}
            (_, None, None) => return Err("no price populated".to_string()),
            _ => {
                return Err(format!(
                    "price fields inconsistent with {} classification",
                    listing_type.as_str()
                ))
            }
        }

        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {} out of range", lat));
            }
        }
        if let Some(lng) = self.longitude {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(format!("longitude {} out of range", lng));
            }
        }

        Ok(Listing {
            zpid: self.zpid,
            building: self.building,
            listing_type,
            home_type: self.home_type,
            home_status: self.home_status,
            sale_price: self.sale_price,
            rental_price: self.rental_price,
            zestimate: self.zestimate,
            rent_zestimate: self.rent_zestimate,
            address: self.address,
            beds: self.beds,
            baths: self.baths,
            living_area: self.living_area,
            lot_size: self.lot_size,
            year_built: self.year_built,
            latitude: self.latitude,
            longitude: self.longitude,
            source_url: self.source_url,
            broker_name: self.broker_name,
            days_on_market: self.days_on_market,
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_draft_builds() {
        let draft = ListingDraft {
            listing_type: Some(ListingKind::Sale),
            sale_price: Some(450_000),
            address: Some("1 Main St".to_string()),
            ..Default::default()
        };
        let listing = draft.build().unwrap();
        assert_eq!(listing.sale_price, Some(450_000));
        assert_eq!(listing.rental_price, None);
        assert_eq!(listing.price(), Some(450_000));
    }

    #[test]
    fn draft_without_price_rejected() {
        let draft = ListingDraft {
            listing_type: Some(ListingKind::Sale),
            address: Some("1 Main St".to_string()),
            ..Default::default()
        };
        assert!(draft.build().is_err());
    }

    #[test]
    fn mismatched_price_side_rejected() {
        let draft = ListingDraft {
            listing_type: Some(ListingKind::Rental),
            sale_price: Some(450_000),
            ..Default::default()
        };
        assert!(draft.build().is_err());
    }

    #[test]
    fn out_of_range_coordinate_rejected() {
        let draft = ListingDraft {
            listing_type: Some(ListingKind::Sale),
            sale_price: Some(1),
            latitude: Some(123.0),
            ..Default::default()
        };
        assert!(draft.build().is_err());
    }
}
