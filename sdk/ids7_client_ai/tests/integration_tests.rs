//! Integration tests for ids7_client_ai.
//!
//! These tests require a live IDS7 server.
//! Run with: `cargo test --features integration-tests`
//!
//! Required environment variables:
//! - `IDS7_URL`: Base URL of the AI API
//! - `IDS7_TOKEN`: Callback token
//! - `IDS7_APP_ID`: Registered application id
//! - `IDS7_SLIDE_ID`: A slide the application may read

#![cfg(feature = "integration-tests")]

use ids7_client_ai::models::{AnalysisResult, ImageInfoOptions};
use ids7_client_ai::Ids7AIClient;

fn get_client() -> Ids7AIClient {
    Ids7AIClient::builder()
        .build()
        .expect("Failed to build client from IDS7_* environment variables")
}

fn get_slide_id() -> String {
    std::env::var("IDS7_SLIDE_ID").expect("IDS7_SLIDE_ID not set")
}

#[test]
fn test_version_negotiation() {
    let client = get_client();

    assert!(!client.api_version().is_empty());
    assert!(!client.software_version().is_empty());
}

#[test]
fn test_image_info() {
    let client = get_client();
    let slide_id = get_slide_id();

    let info = client
        .get_image_info(&slide_id, &ImageInfoOptions::default())
        .expect("get image info");
    assert_eq!(info.id, slide_id);
    assert!(info.get("patient").is_none());

    let extended = client
        .get_image_info(&slide_id, &ImageInfoOptions::new().extended(true))
        .expect("get extended image info");
    assert_eq!(extended.id, slide_id);
}

#[test]
fn test_results_lifecycle() {
    let client = get_client();
    let slide_id = get_slide_id();

    let result = AnalysisResult::new()
        .with_field("slideId", slide_id)
        .with_field("displayResult", "integration test");

    let created = client.create_results(&result).expect("create results");
    assert!(!created.id.is_empty());

    let fetched = client.get_results(&created.id).expect("get results");
    assert_eq!(fetched.id, created.id);

    let edited = fetched
        .into_result()
        .with_field("displayResult", "integration test (updated)");
    let updated = client
        .update_results(&created.id, &edited)
        .expect("update results");
    assert_eq!(updated.id, created.id);
}
