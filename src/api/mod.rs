pub mod lark;
pub mod market;

use thiserror::Error;

use crate::utils::extract_clean_error;

/// Error type shared by the HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Request exceeded its timeout
    #[error("Timeout: {0}")]
    Timeout(String),
    /// Non-2xx HTTP status
    #[error("HTTP Error ({status}): {body}")]
    HttpError { status: u16, body: String },
    /// 2xx response whose envelope carries `code != 0`
    #[error("Platform Error (code {code}): {msg}")]
    PlatformError { code: i64, msg: String },
    /// Body could not be decoded into the expected shape
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Classify a transport failure; a timeout is kept distinguishable in logs
    /// but is handled like any other transport failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else {
            ApiError::RequestError(format!("Request failed: {}", err))
        }
    }
}

/// Turn a non-success response into an `ApiError`, keeping status and a
/// readable excerpt of the body.
pub(crate) async fn handle_error_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body_text = response.text().await.unwrap_or_default();
    ApiError::HttpError {
        status,
        body: extract_clean_error(&body_text),
    }
}
