use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::models::{
    BearerToken, ChatList, ChatSummary, Envelope, ImageUpload, MessageContent, SendMessageRequest,
    SentMessage, TokenRequest, TokenResponse,
};
use crate::api::{handle_error_response, ApiError};

/// Operations the delivery flow needs from the chat platform.
///
/// Each call is exactly one HTTP round trip and never retries.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn tenant_access_token(&self, app_id: &str, app_secret: &str) -> Result<BearerToken, ApiError>;

    async fn list_chats(&self, token: &BearerToken) -> Result<Vec<ChatSummary>, ApiError>;

    /// Upload a PNG for message use, returning its `image_key`
    async fn upload_image(&self, token: &BearerToken, png: Vec<u8>, file_name: &str) -> Result<String, ApiError>;

    async fn send_message(
        &self,
        token: &BearerToken,
        chat_id: &str,
        content: &MessageContent,
    ) -> Result<(), ApiError>;
}

/// Lark open-api client for bot messaging
pub struct LarkClient {
    http_client: HttpClient,
    base_url: String,
    timeout: Duration,
    upload_timeout: Duration,
}

impl LarkClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://open.larksuite.com/open-apis";

    /// Create a client against `base_url` (no trailing slash)
    pub fn new(base_url: String, timeout: Duration, upload_timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            upload_timeout,
        }
    }

    /// Authorization header for bot calls
    fn create_headers(token: &BearerToken) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&token.header_value())
            .map_err(|e| ApiError::RequestError(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    /// Read a response: non-2xx becomes `HttpError`, otherwise the envelope is
    /// decoded and `code != 0` becomes `PlatformError`.
    async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>, ApiError> {
        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }
        let body = response.text().await.map_err(ApiError::from_transport)?;
        decode_envelope(&body)
    }
}

/// Decode a `{code, msg, data}` body
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))?;
    if envelope.code != 0 {
        return Err(ApiError::PlatformError {
            code: envelope.code,
            msg: envelope.msg,
        });
    }
    Ok(envelope.data)
}

/// Decode the token endpoint body, whose fields are not wrapped in `data`
pub fn decode_token(body: &str) -> Result<BearerToken, ApiError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::DeserializationError(format!("Failed to parse token response: {}", e)))?;
    if parsed.code != 0 {
        return Err(ApiError::PlatformError {
            code: parsed.code,
            msg: parsed.msg,
        });
    }
    if let Some(expire) = parsed.expire {
        debug!("Tenant token valid for {}s", expire);
    }
    parsed
        .tenant_access_token
        .filter(|t| !t.is_empty())
        .map(BearerToken::new)
        .ok_or_else(|| ApiError::DeserializationError("tenant_access_token missing".to_string()))
}

#[async_trait]
impl ChatApi for LarkClient {
    /// POST /auth/v3/tenant_access_token/internal
    async fn tenant_access_token(&self, app_id: &str, app_secret: &str) -> Result<BearerToken, ApiError> {
        let url = format!("{}/auth/v3/tenant_access_token/internal", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .json(&TokenRequest { app_id, app_secret })
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }
        let body = response.text().await.map_err(ApiError::from_transport)?;
        decode_token(&body)
    }

    /// GET /im/v1/chats, first page only
    async fn list_chats(&self, token: &BearerToken) -> Result<Vec<ChatSummary>, ApiError> {
        let url = format!("{}/im/v1/chats?page_size=100", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .headers(Self::create_headers(token)?)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let chats = Self::read_envelope::<ChatList>(response).await?.unwrap_or_default();
        if chats.has_more {
            debug!("Bot is in more chats than the first page lists");
        }
        Ok(chats.items)
    }

    /// POST /im/v1/images (multipart, `image_type=message`)
    async fn upload_image(&self, token: &BearerToken, png: Vec<u8>, file_name: &str) -> Result<String, ApiError> {
        let url = format!("{}/im/v1/images", self.base_url);
        let part = Part::bytes(png)
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .map_err(|e| ApiError::RequestError(format!("Failed to build upload: {}", e)))?;
        let form = Form::new().text("image_type", "message").part("image", part);

        let response = self
            .http_client
            .post(&url)
            .headers(Self::create_headers(token)?)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        Self::read_envelope::<ImageUpload>(response)
            .await?
            .map(|upload| upload.image_key)
            .ok_or_else(|| ApiError::DeserializationError("image_key missing".to_string()))
    }

    /// POST /im/v1/messages?receive_id_type=chat_id
    async fn send_message(
        &self,
        token: &BearerToken,
        chat_id: &str,
        content: &MessageContent,
    ) -> Result<(), ApiError> {
        let url = format!("{}/im/v1/messages?receive_id_type=chat_id", self.base_url);
        let body = SendMessageRequest {
            receive_id: chat_id.to_string(),
            msg_type: content.msg_type(),
            content: content.to_content_string(),
            uuid: Uuid::new_v4().to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .headers(Self::create_headers(token)?)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let sent = Self::read_envelope::<SentMessage>(response).await?;
        if let Some(message_id) = sent.and_then(|m| m.message_id) {
            debug!("Message {} sent to {}", message_id, chat_id);
        }
        Ok(())
    }
}
