//! Normalization and deduplication of raw scraper records.
//!
//! Raw records arrive as loosely-shaped JSON: missing fields, string-encoded
//! numbers, and two distinct shapes (individual properties vs whole
//! buildings). Each record is classified once, read through a typed partial
//! view, and either converted into a canonical [`Listing`] or rejected with
//! an explicit reason. Rejections never abort the batch.

use crate::listing::{Listing, ListingDraft, ListingKind};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Canonical origin used to absolutize provider-relative URLs.
pub const PROVIDER_ORIGIN: &str = "https://www.zillow.com";

/// Why a raw record did not become a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Record was empty or not a JSON object.
    NotAnObject,
    /// Record carried none of address, price, identifier, or coordinates.
    NoSignal,
    /// Aggregate record without a usable address.
    MissingAddress,
    /// No price could be extracted.
    MissingPrice,
    /// Assembled fields failed canonical-model validation.
    InvalidDraft(String),
    /// Same (address, price, classification) already emitted in this batch.
    Duplicate,
}

impl RejectReason {
    fn label(&self) -> &'static str {
        match self {
            RejectReason::NotAnObject => "not_an_object",
            RejectReason::NoSignal => "no_signal",
            RejectReason::MissingAddress => "missing_address",
            RejectReason::MissingPrice => "missing_price",
            RejectReason::InvalidDraft(_) => "invalid_draft",
            RejectReason::Duplicate => "duplicate",
        }
    }
}

/// Outcome of normalizing a single raw record.
#[derive(Debug)]
pub enum RecordOutcome {
    Accepted(Box<Listing>),
    Rejected(RejectReason),
}

/// Normalizes a batch of raw records into deduplicated canonical listings.
///
/// Records are processed in input order; the first occurrence of a dedup key
/// wins. Rejections are counted per reason and logged, never escalated — an
/// empty output is a valid, successful outcome.
pub fn normalize_records(raw_records: &[Value]) -> Vec<Listing> {
    let mut listings: Vec<Listing> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut rejections: BTreeMap<&'static str, usize> = BTreeMap::new();

    for record in raw_records {
        let outcome = match normalize_record(record) {
            RecordOutcome::Accepted(listing) => {
                let key = dedup_key(&listing);
                if seen.contains(&key) {
                    RecordOutcome::Rejected(RejectReason::Duplicate)
                } else {
                    seen.insert(key);
                    RecordOutcome::Accepted(listing)
                }
            }
            rejected => rejected,
        };

        match outcome {
            RecordOutcome::Accepted(listing) => listings.push(*listing),
            RecordOutcome::Rejected(reason) => {
                tracing::debug!("Dropping raw record: {:?}", reason);
                *rejections.entry(reason.label()).or_insert(0) += 1;
            }
        }
    }

    if !rejections.is_empty() {
        tracing::info!(
            "Normalization dropped {} of {} records: {:?}",
            rejections.values().sum::<usize>(),
            raw_records.len(),
            rejections
        );
    }
    if listings.is_empty() {
        // Soft condition: zero listings is a normal empty result.
        tracing::info!("No listings survived normalization");
    }

    listings
}

/// Normalizes one raw record, without the batch-level dedup check.
pub fn normalize_record(record: &Value) -> RecordOutcome {
    let shape = match RecordShape::classify(record) {
        Ok(shape) => shape,
        Err(reason) => return RecordOutcome::Rejected(reason),
    };

    let draft = match shape {
        RecordShape::Aggregate(view) => view.draft(),
        RecordShape::Individual(view) => view.draft(),
    };

    match draft {
        Ok(draft) => match draft.build() {
            Ok(listing) => RecordOutcome::Accepted(Box::new(listing)),
            Err(reason) => RecordOutcome::Rejected(RejectReason::InvalidDraft(reason)),
        },
        Err(reason) => RecordOutcome::Rejected(reason),
    }
}

/// Composite key suppressing repeat listings within one batch.
pub fn dedup_key(listing: &Listing) -> String {
    format!(
        "{}_{}_{}",
        listing.address.as_deref().unwrap_or(""),
        listing
            .price()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "none".to_string()),
        listing.listing_type.as_str()
    )
}

/// The two raw-record shapes the provider produces, as typed partial views.
///
/// Classification happens once; each view then sources its own raw keys.
enum RecordShape<'a> {
    /// Building-level record representing multiple units; carries
    /// representative minimum values.
    Aggregate(AggregateRecord<'a>),
    /// Ordinary per-property record.
    Individual(IndividualRecord<'a>),
}

impl<'a> RecordShape<'a> {
    /// Shape gate + variant selection.
    ///
    /// Rejects records that are not objects or carry none of the signals
    /// {address, price-like field, identifier, coordinates}.
    fn classify(record: &'a Value) -> Result<Self, RejectReason> {
        let obj = match record.as_object() {
            Some(obj) if !obj.is_empty() => obj,
            _ => return Err(RejectReason::NotAnObject),
        };

        let has_address = is_present(obj.get("address"));
        let has_price = is_present(obj.get("price")) || is_present(obj.get("unformattedPrice"));
        let has_id = is_present(obj.get("zpid")) || is_present(obj.get("buildingId"));
        let has_coordinates = is_present(obj.get("latLong"))
            || (is_present(obj.get("latitude")) && is_present(obj.get("longitude")));

        if !(has_address || has_price || has_id || has_coordinates) {
            return Err(RejectReason::NoSignal);
        }

        let is_aggregate =
            truthy(obj.get("isBuilding")) || is_present(obj.get("buildingId"));
        if is_aggregate {
            Ok(RecordShape::Aggregate(AggregateRecord { raw: record }))
        } else {
            Ok(RecordShape::Individual(IndividualRecord { raw: record }))
        }
    }
}

/// Partial view over an aggregate/building record.
struct AggregateRecord<'a> {
    raw: &'a Value,
}

impl AggregateRecord<'_> {
    /// Aggregates require both an address and a price; they use the
    /// building's representative minimum values and never populate
    /// year-built, estimates, or days-on-market.
    fn draft(&self) -> Result<ListingDraft, RejectReason> {
        let address =
            extract_address(self.raw.get("address")).ok_or(RejectReason::MissingAddress)?;
        let price = extract_price(self.raw.get("price")).ok_or(RejectReason::MissingPrice)?;
        let (latitude, longitude) = extract_coordinates(self.raw)
            .map(|(lat, lng)| (Some(lat), Some(lng)))
            .unwrap_or((None, None));

        let kind = classify_kind(self.raw);

        Ok(ListingDraft {
            zpid: stringify_id(self.raw.get("buildingId")),
            building: true,
            listing_type: Some(kind),
            home_status: string_field(self.raw.get("statusType")),
            address: Some(address),
            sale_price: (kind == ListingKind::Sale).then_some(price),
            rental_price: (kind == ListingKind::Rental).then_some(price),
            latitude,
            longitude,
            beds: extract_int(self.raw.get("minBeds")),
            baths: extract_decimal(self.raw.get("minBaths")),
            living_area: extract_int(self.raw.get("minArea")),
            source_url: extract_url(self.raw.get("detailUrl")),
            ..Default::default()
        })
    }
}

/// Partial view over an individual-property record.
struct IndividualRecord<'a> {
    raw: &'a Value,
}

impl IndividualRecord<'_> {
    fn draft(&self) -> Result<ListingDraft, RejectReason> {
        let (latitude, longitude) = extract_coordinates(self.raw)
            .map(|(lat, lng)| (Some(lat), Some(lng)))
            .unwrap_or((None, None));
        // The address key is preferred; otherwise structured parts at the
        // top level of the record are concatenated.
        let address =
            extract_address(self.raw.get("address")).or_else(|| extract_address(Some(self.raw)));
        let price = extract_price(self.raw.get("price"))
            .or_else(|| extract_price(self.raw.get("unformattedPrice")))
            .ok_or(RejectReason::MissingPrice)?;

        let kind = classify_kind(self.raw);

        // hdpData.homeInfo is a backup source only.
        let home_info = self.raw.get("hdpData").and_then(|v| v.get("homeInfo"));

        Ok(ListingDraft {
            zpid: stringify_id(self.raw.get("zpid")),
            building: false,
            listing_type: Some(kind),
            home_type: string_field(self.raw.get("homeType")),
            home_status: string_field(self.raw.get("statusType")),
            sale_price: (kind == ListingKind::Sale).then_some(price),
            rental_price: (kind == ListingKind::Rental).then_some(price),
            zestimate: extract_int(home_info.and_then(|h| h.get("zestimate"))),
            rent_zestimate: extract_int(home_info.and_then(|h| h.get("rentZestimate"))),
            address,
            beds: extract_int(self.raw.get("beds")),
            baths: extract_decimal(self.raw.get("baths")),
            living_area: extract_int(self.raw.get("area")),
            lot_size: home_info
                .and_then(|h| h.get("lotAreaValue"))
                .and_then(lot_size_text),
            year_built: extract_int(home_info.and_then(|h| h.get("yearBuilt"))),
            latitude,
            longitude,
            source_url: extract_url(self.raw.get("detailUrl")),
            broker_name: string_field(self.raw.get("brokerName")),
            days_on_market: extract_int(self.raw.get("timeOnZillow")),
        })
    }
}

/// Sale-vs-rental classification. Rental wins if any rental signal is
/// present; otherwise the record is a sale.
fn classify_kind(raw: &Value) -> ListingKind {
    let status_says_rent = ["statusText", "statusType", "homeStatus"]
        .iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_str))
        .any(|text| text.to_uppercase().contains("RENT"));

    let flag_says_rent = truthy(raw.get("isRental"));

    let url_says_rent = raw
        .get("detailUrl")
        .and_then(Value::as_str)
        .map(|url| url.contains("/apartments/"))
        .unwrap_or(false);

    if status_says_rent || flag_says_rent || url_says_rent {
        ListingKind::Rental
    } else {
        ListingKind::Sale
    }
}

// ============ Shared primitive extractors ============
//
// Each extractor is total: any unparseable input yields None, never a panic.

fn price_from_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)from\s*\$?([0-9][0-9,]*)").unwrap())
}

fn number_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap())
}

/// Extracts an integer price from a number or formatted string.
///
/// Strings may carry currency formatting (`"$450,000"`) or a leading range
/// marker (`"From $388,000"`), in which case only the numeric token after
/// the marker is taken.
pub fn extract_price(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    if let Some(n) = value.as_f64() {
        return Some(n as i64);
    }

    let text = value.as_str()?;
    let digits: String = if text.to_lowercase().contains("from") {
        match price_from_regex().captures(text) {
            Some(caps) => caps[1].chars().filter(|c| c.is_ascii_digit()).collect(),
            None => text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect(),
        }
    } else {
        text.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect()
    };

    digits.parse::<f64>().ok().map(|n| n as i64)
}

/// Extracts a coordinate pair, preferring a combined `latLong` sub-object
/// over separate top-level fields.
pub fn extract_coordinates(raw: &Value) -> Option<(f64, f64)> {
    if let Some(lat_long) = raw.get("latLong") {
        let lat = lat_long.get("latitude").and_then(Value::as_f64);
        let lng = lat_long.get("longitude").and_then(Value::as_f64);
        if let (Some(lat), Some(lng)) = (lat, lng) {
            return Some((lat, lng));
        }
    }

    let lat = raw.get("latitude").and_then(Value::as_f64);
    let lng = raw.get("longitude").and_then(Value::as_f64);
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    }
}

/// Extracts a free-text address.
///
/// Strings pass through trimmed; structured objects are concatenated from
/// their present sub-fields in a fixed order.
pub fn extract_address(value: Option<&Value>) -> Option<String> {
    const PARTS: [&str; 6] = ["streetAddress", "address", "line1", "city", "state", "zip"];

    match value? {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Object(obj) => {
            let parts: Vec<String> = PARTS
                .iter()
                .filter_map(|key| obj.get(*key))
                .filter_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

/// Extracts a whole-unit numeric value (beds, area, year, days).
pub fn extract_int(value: Option<&Value>) -> Option<i64> {
    extract_number(value).map(|n| n as i64)
}

/// Extracts a numeric value retaining fractional precision (baths).
pub fn extract_decimal(value: Option<&Value>) -> Option<f64> {
    extract_number(value)
}

fn extract_number(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    if let Some(n) = value.as_f64() {
        return Some(n);
    }

    // Strings like "2 bedrooms" or "1.5": first decimal token wins.
    let text = value.as_str()?;
    number_token_regex()
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Extracts a canonical source URL, prefixing provider-relative paths with
/// the provider origin.
pub fn extract_url(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let absolute = if text.starts_with("http://") || text.starts_with("https://") {
        text.to_string()
    } else if text.starts_with('/') {
        format!("{}{}", PROVIDER_ORIGIN, text)
    } else {
        format!("https://{}", text)
    };

    url::Url::parse(&absolute).ok().map(|_| absolute)
}

/// Lot size is kept as free text whatever the raw type.
fn lot_size_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Provider ids arrive as strings or numbers; both stringify.
fn stringify_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whether a field carries a usable value (present, non-null, non-empty).
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}
