//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per party-server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new guest client, with no admin session
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as admin through the session cookie
    ///
    /// # Panics
    ///
    /// Panics if login fails (indicates test infrastructure problem).
    pub async fn admin(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(ADMIN_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Admin authentication failed: {:?}",
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_empty(&self, path: &str) -> Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Admin Authentication
    // ========================================================================

    /// POST /api/admin/login
    pub async fn login(&self, password: &str) -> Response {
        self.client
            .post(self.url("/api/admin/login"))
            .json(&json!({ "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// POST /api/admin/logout
    pub async fn logout(&self) -> Response {
        self.post_empty("/api/admin/logout").await
    }

    /// GET /api/admin/verify
    pub async fn verify(&self) -> Response {
        self.client
            .get(self.url("/api/admin/verify"))
            .send()
            .await
            .expect("Verify request failed")
    }

    /// GET /api/admin/verify with a bearer token instead of the cookie
    pub async fn verify_with_bearer(&self, token: &str) -> Response {
        self.client
            .get(self.url("/api/admin/verify"))
            .bearer_auth(token)
            .send()
            .await
            .expect("Verify request failed")
    }

    // ========================================================================
    // Health, Config, Backgrounds, Metrics
    // ========================================================================

    /// GET /api/health
    pub async fn health(&self) -> Response {
        self.client
            .get(self.url("/api/health"))
            .send()
            .await
            .expect("Health request failed")
    }

    /// GET /api/config
    pub async fn config(&self) -> Response {
        self.client
            .get(self.url("/api/config"))
            .send()
            .await
            .expect("Config request failed")
    }

    /// GET /api/backgrounds
    pub async fn backgrounds(&self) -> Response {
        self.client
            .get(self.url("/api/backgrounds"))
            .send()
            .await
            .expect("Backgrounds request failed")
    }

    /// GET /metrics
    pub async fn metrics(&self) -> Response {
        self.client
            .get(self.url("/metrics"))
            .send()
            .await
            .expect("Metrics request failed")
    }

    /// GET any path, for static files
    pub async fn get_raw(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST with a raw body and content type, for malformed request tests
    pub async fn post_raw(&self, path: &str, content_type: &str, body: &str) -> Response {
        self.client
            .post(self.url(path))
            .header("Content-Type", content_type)
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Video Rotation
    // ========================================================================

    /// GET /api/video/{slide_id}
    pub async fn get_video(&self, slide_id: &str) -> Response {
        self.client
            .get(self.url(&format!("/api/video/{}", slide_id)))
            .send()
            .await
            .expect("Get video request failed")
    }

    /// POST /api/video/{slide_id}/played
    pub async fn report_played(&self, slide_id: &str, video_path: &str) -> Response {
        self.report_played_body(slide_id, json!({ "video_path": video_path }))
            .await
    }

    /// POST /api/video/{slide_id}/played with an arbitrary body
    pub async fn report_played_body(&self, slide_id: &str, body: Value) -> Response {
        self.client
            .post(self.url(&format!("/api/video/{}/played", slide_id)))
            .json(&body)
            .send()
            .await
            .expect("Report played request failed")
    }

    /// GET /api/inventory
    pub async fn inventory(&self) -> Response {
        self.client
            .get(self.url("/api/inventory"))
            .send()
            .await
            .expect("Inventory request failed")
    }

    /// POST /api/inventory/reload
    pub async fn reload_inventory(&self) -> Response {
        self.post_empty("/api/inventory/reload").await
    }

    // ========================================================================
    // Submissions
    // ========================================================================

    /// POST /api/submissions
    pub async fn submit(&self, guest_name: Option<&str>, memory: &str, resolution: &str) -> Response {
        self.client
            .post(self.url("/api/submissions"))
            .json(&json!({
                "guest_name": guest_name,
                "memory": memory,
                "resolution": resolution,
            }))
            .send()
            .await
            .expect("Submit request failed")
    }

    /// POST /api/submissions and returns the new id
    pub async fn submit_ok(&self, guest_name: Option<&str>, memory: &str, resolution: &str) -> i64 {
        let response = self.submit(guest_name, memory, resolution).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Invalid submission response");
        body["id"].as_i64().expect("Missing submission id")
    }

    /// GET /api/submissions, optionally filtered by status
    pub async fn list_submissions(&self, status: Option<&str>) -> Response {
        let mut request = self.client.get(self.url("/api/submissions"));
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        request.send().await.expect("List submissions request failed")
    }

    /// GET /api/submissions/approved
    pub async fn approved_submissions(&self) -> Response {
        self.client
            .get(self.url("/api/submissions/approved"))
            .send()
            .await
            .expect("Approved submissions request failed")
    }

    /// PUT /api/submissions/{id}/approve
    pub async fn approve(&self, id: i64) -> Response {
        self.client
            .put(self.url(&format!("/api/submissions/{}/approve", id)))
            .send()
            .await
            .expect("Approve request failed")
    }

    /// PUT /api/submissions/{id}/reject
    pub async fn reject(&self, id: i64) -> Response {
        self.client
            .put(self.url(&format!("/api/submissions/{}/reject", id)))
            .send()
            .await
            .expect("Reject request failed")
    }

    /// DELETE /api/submissions/{id}
    pub async fn delete_submission(&self, id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/api/submissions/{}", id)))
            .send()
            .await
            .expect("Delete submission request failed")
    }

    // ========================================================================
    // Slideshow
    // ========================================================================

    /// GET /api/slideshow/state
    pub async fn slideshow_state(&self) -> Response {
        self.client
            .get(self.url("/api/slideshow/state"))
            .send()
            .await
            .expect("Slideshow state request failed")
    }

    /// POST /api/slideshow/control
    pub async fn control(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/slideshow/control"))
            .json(&body)
            .send()
            .await
            .expect("Control request failed")
    }

    /// POST /api/slideshow/sync
    pub async fn sync(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/slideshow/sync"))
            .json(&body)
            .send()
            .await
            .expect("Sync request failed")
    }

    /// POST /api/slideshow/video-switched
    pub async fn video_switched(&self) -> Response {
        self.post_empty("/api/slideshow/video-switched").await
    }

    /// POST /api/slideshow/hide/{id}
    pub async fn hide(&self, slide_id: &str) -> Response {
        self.post_empty(&format!("/api/slideshow/hide/{}", slide_id))
            .await
    }

    /// POST /api/slideshow/unhide/{id}
    pub async fn unhide(&self, slide_id: &str) -> Response {
        self.post_empty(&format!("/api/slideshow/unhide/{}", slide_id))
            .await
    }

    /// POST /api/slideshow/mute
    pub async fn mute(&self) -> Response {
        self.post_empty("/api/slideshow/mute").await
    }

    /// POST /api/slideshow/unmute
    pub async fn unmute(&self) -> Response {
        self.post_empty("/api/slideshow/unmute").await
    }

    /// GET /api/injected-slides
    pub async fn injected_slides(&self, since: Option<i64>) -> Response {
        let mut request = self.client.get(self.url("/api/injected-slides"));
        if let Some(since) = since {
            request = request.query(&[("since", since)]);
        }
        request.send().await.expect("Injected slides request failed")
    }

    /// GET /api/slideshow/slides
    pub async fn playlist(&self) -> Response {
        self.client
            .get(self.url("/api/slideshow/slides"))
            .send()
            .await
            .expect("Playlist request failed")
    }
}
