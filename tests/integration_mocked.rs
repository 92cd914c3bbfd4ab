/// Integration tests with a mocked scraping provider
/// Tests the complete search workflow without hitting the real Apify API
use property_search_api::config::Config;
use property_search_api::errors::AppError;
use property_search_api::filters::{ListingCategory, SearchFilters};
use property_search_api::handlers::AppState;
use property_search_api::listing::ListingKind;
use property_search_api::provider::ApifyZillowClient;
use property_search_api::search::run_search;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACTOR_PATH: &str = "/v2/acts/maxcopell~zillow-scraper/run-sync-get-dataset-items";

/// Helper function to create test config
fn create_test_config(apify_base_url: String, token: Option<&str>) -> Config {
    Config {
        port: 8080,
        apify_token: token.map(|t| t.to_string()),
        apify_base_url,
        actor_id: "maxcopell~zillow-scraper".to_string(),
        max_results: 500,
        results_file: std::env::temp_dir()
            .join("property-search-test-results.json")
            .to_string_lossy()
            .into_owned(),
    }
}

fn create_state(config: Config) -> AppState {
    let provider = ApifyZillowClient::new(&config).expect("provider client");
    AppState { config, provider }
}

fn austin_filters() -> SearchFilters {
    SearchFilters {
        listing_type: ListingCategory::Both,
        latitude: Some(30.2672),
        longitude: Some(-97.7431),
        radius_miles: 10.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_search_returns_normalized_listings() {
    let mock_server = MockServer::start().await;

    let mock_response = json!([
        {
            "address": "1 Main St",
            "price": "$450,000",
            "zpid": "123",
            "homeStatus": "FOR_SALE"
        },
        {
            "address": "2 Side St",
            "price": "$2,100/mo",
            "zpid": "456",
            "statusText": "Apartment for rent"
        }
    ]);

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .and(query_param("token", "test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));
    let outcome = run_search(&state, &austin_filters()).await.unwrap();

    assert_eq!(outcome.count, 2);
    assert_eq!(outcome.listings[0].listing_type, ListingKind::Sale);
    assert_eq!(outcome.listings[0].sale_price, Some(450000));
    assert_eq!(outcome.listings[0].rental_price, None);
    assert_eq!(outcome.listings[1].listing_type, ListingKind::Rental);
    assert_eq!(outcome.listings[1].rental_price, Some(2100));
}

#[tokio::test]
async fn test_duplicate_raw_records_collapse() {
    let mock_server = MockServer::start().await;

    let record = json!({
        "address": "1 Main St",
        "price": "$450,000",
        "zpid": "123"
    });

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record, record])))
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));
    let outcome = run_search(&state, &austin_filters()).await.unwrap();

    assert_eq!(outcome.count, 1);
}

#[tokio::test]
async fn test_from_price_range_marker_extracted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "buildingId": "b-1",
                "address": "900 Congress Ave",
                "price": "From $388,000",
                "statusType": "FOR_SALE"
            }
        ])))
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));
    let outcome = run_search(&state, &austin_filters()).await.unwrap();

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.listings[0].sale_price, Some(388000));
    assert!(outcome.listings[0].building);
}

#[tokio::test]
async fn test_empty_provider_result_is_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));
    let outcome = run_search(&state, &austin_filters()).await.unwrap();

    assert_eq!(outcome.count, 0);
    assert!(outcome.listings.is_empty());
}

#[tokio::test]
async fn test_zero_radius_is_validation_error_before_provider() {
    let mock_server = MockServer::start().await;

    // The provider must never be called for invalid filters
    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));
    let filters = SearchFilters {
        radius_miles: 0.0,
        ..austin_filters()
    };

    match run_search(&state, &filters).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "radius_miles"),
        other => panic!("expected radius validation error, got {:?}", other.map(|o| o.count)),
    }
}

#[tokio::test]
async fn test_missing_token_is_provider_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), None));

    match run_search(&state, &austin_filters()).await {
        Err(AppError::WithContext { source, .. }) => {
            assert!(matches!(*source, AppError::ProviderUnavailable));
        }
        Err(AppError::ProviderUnavailable) => {}
        other => panic!("expected ProviderUnavailable, got {:?}", other.map(|o| o.count)),
    }
}

#[tokio::test]
async fn test_provider_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));

    match run_search(&state, &austin_filters()).await {
        Err(AppError::WithContext { source, .. }) => {
            assert!(matches!(*source, AppError::ProviderError(_)));
        }
        Err(AppError::ProviderError(_)) => {}
        other => panic!("expected ProviderError, got {:?}", other.map(|o| o.count)),
    }
}

#[tokio::test]
async fn test_malformed_records_are_dropped_not_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            null,
            {},
            { "country": "US" },
            { "address": "1 Main St", "price": "$450,000" }
        ])))
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));
    let outcome = run_search(&state, &austin_filters()).await.unwrap();

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.listings[0].address.as_deref(), Some("1 Main St"));
}

#[tokio::test]
async fn test_non_array_provider_body_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "unexpected shape" })),
        )
        .mount(&mock_server)
        .await;

    let state = create_state(create_test_config(mock_server.uri(), Some("test_token")));

    match run_search(&state, &austin_filters()).await {
        Err(AppError::WithContext { source, .. }) => {
            assert!(matches!(*source, AppError::ProviderError(_)));
        }
        Err(AppError::ProviderError(_)) => {}
        other => panic!("expected ProviderError, got {:?}", other.map(|o| o.count)),
    }
}

#[tokio::test]
async fn test_concurrent_searches_share_no_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ACTOR_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "address": "1 Main St", "price": "$450,000", "zpid": "123" }
        ])))
        .expect(5)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), Some("test_token"));

    let mut handles = vec![];
    for _ in 0..5 {
        let state = create_state(config.clone());
        handles.push(tokio::spawn(async move {
            run_search(&state, &austin_filters()).await
        }));
    }

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        // Dedup is request-local: every search sees its own listing
        assert_eq!(outcome.count, 1);
    }
}
