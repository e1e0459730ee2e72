//! Mock upload endpoint.

use wiremock::{
    matchers::{method, path},
    Match, Mock, MockServer, Request, ResponseTemplate,
};

pub const UPLOAD_PATH: &str = "/api/photos/upload";

/// Matches multipart bodies carrying a part with the given file name.
///
/// Photo bytes are binary, so the body is read lossily.
pub struct FileNamed(pub String);

impl Match for FileNamed {
    fn matches(&self, request: &Request) -> bool {
        String::from_utf8_lossy(&request.body).contains(&format!("filename=\"{}\"", self.0))
    }
}

/// Wrapper around wiremock MockServer with upload-specific helpers
pub struct MockUploadServer {
    pub server: MockServer,
}

impl MockUploadServer {
    /// Start a new mock upload endpoint
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Full upload URL
    pub fn url(&self) -> String {
        format!("{}{}", self.server.uri(), UPLOAD_PATH)
    }

    /// Accept every upload and assign `session`
    pub async fn accept_all(&self, session: &str) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Photo uploaded",
                "data": {"session_code": session}
            })))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    /// Answer uploads of `file_name` with `status` and a JSON body.
    ///
    /// Takes precedence over [`accept_all`](Self::accept_all).
    pub async fn respond_for_file(
        &self,
        file_name: &str,
        status: u16,
        body: serde_json::Value,
        expected_calls: u64,
    ) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(FileNamed(file_name.to_string()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .with_priority(1)
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Every request received so far
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests whose multipart body names `file_name`
    pub async fn requests_for(&self, file_name: &str) -> Vec<Request> {
        let matcher = FileNamed(file_name.to_string());
        self.requests()
            .await
            .into_iter()
            .filter(|r| matcher.matches(r))
            .collect()
    }
}
