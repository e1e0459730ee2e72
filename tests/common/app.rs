//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use photo_relay::models::AppConfig;
use photo_relay::server::{build_router, create_app_state};
use photo_relay::services::{Relay, Stats};

/// Test application with router and direct access to the relay.
///
/// Everything lives in a private temp directory: `in/` is the watch folder,
/// and `state.json` holds the persisted state.
pub struct TestApp {
    router: axum::Router,
    pub relay: Arc<Relay>,
    pub dir: TempDir,
}

impl TestApp {
    /// Create a test app with zero delays and no periodic tasks
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test app, adjusting the fast test configuration first
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir(dir.path().join("in")).expect("Failed to create watch folder");
        let config = Self::fast_config(&dir, adjust);
        Self::from_parts(dir, config).await
    }

    /// Re-open an existing directory, as a restarted process would
    pub async fn restart(self) -> Self {
        self.relay.shutdown().await;
        let config = self.relay.config().clone();
        let Self { dir, .. } = self;
        Self::from_parts(dir, config).await
    }

    fn fast_config(dir: &TempDir, adjust: impl FnOnce(&mut AppConfig)) -> AppConfig {
        let mut config = AppConfig {
            watch_folder: Some(dir.path().join("in")),
            state_file: dir.path().join("state.json"),
            ..Default::default()
        };
        config.delivery.retry_delay_ms = 0;
        config.delivery.cooldown_ms = 0;
        config.delivery.timeout_secs = 5;
        config.discovery.quiescence_ms = 0;
        config.discovery.rescan_secs = 0;
        config.persistence.snapshot_secs = 0;
        adjust(&mut config);
        config
    }

    async fn from_parts(dir: TempDir, config: AppConfig) -> Self {
        let state = create_app_state(config)
            .await
            .expect("Failed to create app state");
        let relay = state.relay.clone();
        relay.spawn_background().await;
        let router = build_router(state);
        Self { router, relay, dir }
    }

    /// The watched folder
    pub fn watch_folder(&self) -> PathBuf {
        self.dir.path().join("in")
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with a JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Make a POST request without a body
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Request::post(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Request::delete(path).body(Body::empty()).unwrap())
            .await
    }

    /// Start monitoring the watch folder against `api_url`
    pub async fn start_monitoring(&self, api_url: &str) -> TestResponse {
        let body = serde_json::json!({
            "watchFolder": self.watch_folder(),
            "apiUrl": api_url,
            "apiToken": "test-token",
        });
        self.post_json("/api/monitoring/start", &body.to_string())
            .await
    }

    /// Poll stats until `done` holds, failing after a few seconds
    pub async fn wait_for(&self, done: impl Fn(&Stats) -> bool) -> Stats {
        for _ in 0..100 {
            let stats = self.relay.stats().await;
            if done(&stats) && !self.relay.worker().is_draining() {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Timed out, last stats: {:?}", self.relay.stats().await);
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
