//! Multipart delivery of one photo to the remote endpoint.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Where photos are sent
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub url: String,
    pub token: Option<String>,
}

/// One prepared photo ready to send
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub session: Option<String>,
}

/// What the endpoint acknowledged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReceipt {
    pub session_code: Option<String>,
}

/// Classified transfer failure
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("No response from server - check API URL and network: {0}")]
    Network(String),

    #[error("Upload timed out")]
    Timeout,

    #[error("Authentication failed - check bearer token")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Could not prepare photo: {0}")]
    Prepare(String),
}

impl TransferError {
    /// Validation failures are final for the current pass; everything else
    /// is retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransferError::Validation(_))
    }
}

/// Sends a prepared photo somewhere
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        destination: &Destination,
        upload: Upload,
    ) -> Result<UploadReceipt, TransferError>;
}

/// The fields of an endpoint reply that drive classification.
///
/// Read field by field from a JSON value so that one oddly typed field
/// does not hide the others.
#[derive(Debug, Default)]
struct ResponseBody {
    success: Option<bool>,
    message: Option<String>,
    session_code: Option<String>,
    errors: Option<Value>,
}

impl ResponseBody {
    fn from_value(value: &Value) -> Self {
        Self {
            success: value.get("success").and_then(Value::as_bool),
            message: value.get("message").filter(|v| !v.is_null()).map(value_text),
            session_code: value
                .get("data")
                .and_then(|d| d.get("session_code"))
                .filter(|v| !v.is_null())
                .map(value_text),
            errors: value.get("errors").filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Non-JSON bodies carry no fields
    fn parse(text: &str) -> Self {
        serde_json::from_str::<Value>(text)
            .map(|v| Self::from_value(&v))
            .unwrap_or_default()
    }
}

/// Flatten `{"field": ["msg", ...]}` or `{"field": "msg"}` into one line
fn join_field_errors(errors: &Value) -> Option<String> {
    let map = errors.as_object()?;
    let messages: Vec<String> = map
        .values()
        .flat_map(|v| match v {
            Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>(),
            other => vec![value_text(other)],
        })
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map a status and parsed body to a delivery result
fn classify(status: StatusCode, body: ResponseBody) -> Result<UploadReceipt, TransferError> {
    if status.is_success() {
        if body.success == Some(false) {
            return Err(TransferError::Rejected {
                status: status.as_u16(),
                message: body.message.unwrap_or_else(|| "Upload failed".to_string()),
            });
        }
        return Ok(UploadReceipt {
            session_code: body.session_code,
        });
    }

    let message = body.message.clone();
    match status {
        StatusCode::UNAUTHORIZED => Err(TransferError::Unauthorized),
        StatusCode::UNPROCESSABLE_ENTITY => Err(TransferError::Validation(
            body.errors
                .as_ref()
                .and_then(join_field_errors)
                .or(message)
                .unwrap_or_else(|| "request rejected".to_string()),
        )),
        s if s.is_server_error() => Err(TransferError::Server {
            status: s.as_u16(),
            message: message.unwrap_or_else(|| s.to_string()),
        }),
        s => Err(TransferError::Rejected {
            status: s.as_u16(),
            message: message.unwrap_or_else(|| s.to_string()),
        }),
    }
}

/// reqwest-backed uploader
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new(timeout: Duration) -> Result<Self, TransferError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransferError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        destination: &Destination,
        upload: Upload,
    ) -> Result<UploadReceipt, TransferError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime)
            .map_err(|e| TransferError::Prepare(e.to_string()))?;
        let mut form = Form::new().part("photo", part);
        if let Some(session) = upload.session {
            form = form.text("session_code", session);
        }

        let mut request = self.client.post(&destination.url).multipart(form);
        if let Some(token) = destination.token.as_deref().filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransferError::Timeout
            } else {
                TransferError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransferError::Timeout
            } else {
                TransferError::Network(e.to_string())
            }
        })?;
        let body = ResponseBody::parse(&text);

        tracing::debug!(
            file = %upload.file_name,
            status = status.as_u16(),
            "Upload response"
        );

        classify(status, body)
    }
}
