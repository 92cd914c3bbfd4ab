//! Property Search API Library
//!
//! This library provides the core functionality for the Property Search API:
//! filter validation, provider query construction, the Apify-backed scraping
//! client, and the normalization/deduplication pipeline that turns raw
//! scraper records into canonical listings.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `filters`: Search filter model and validation.
//! - `query`: Provider query (search URL) builder.
//! - `provider`: Apify Zillow scraper client.
//! - `listing`: Canonical listing model.
//! - `normalizer`: Raw-record normalization and deduplication.
//! - `search`: Search orchestration.
//! - `handlers`: HTTP request handlers.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod listing;
pub mod normalizer;
pub mod provider;
pub mod query;
pub mod search;
