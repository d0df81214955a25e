//! End-to-end tests for health, public config, backgrounds and metrics

mod common;

use common::{TestClient, TestServer, BACKGROUND_IMAGES};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_reports_totals() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.health().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["total_slides"], 3);
    assert_eq!(body["total_videos"], 4);
    assert_eq!(body["total_plays"], 0);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_public_config_never_exposes_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.config().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "polling": {
                "slideshow_state": 2000,
                "admin_state": 2000,
                "admin_submissions": 5000
            },
            "video": { "api_timeout": 10000 },
            "slideshow": { "default_duration": 30000, "transition_duration": 1200 }
        })
    );
}

#[tokio::test]
async fn test_backgrounds_lists_images_only() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.backgrounds().await.json().await.unwrap();
    let expected: Vec<String> = BACKGROUND_IMAGES
        .iter()
        .map(|name| format!("/backgrounds/{}", name))
        .collect();
    assert_eq!(body["images"], json!(expected));

    let response = client
        .get_raw(&format!("/backgrounds/{}", BACKGROUND_IMAGES[0]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_images_are_served_statically() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.get_raw("/images/memories.png").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        client.get_raw("/images/missing.png").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.health().await;

    let response = client.metrics().await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(text.contains("party_http_requests_total"));
    assert!(text.contains("party_inventory_items"));
}
