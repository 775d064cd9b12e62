//! Delivery state machine on top of [`ChatApi`].
//!
//! `Unauthenticated -> Authenticated -> ChatResolved -> AssetUploaded -> Delivered`
//! is carried by the types: only an [`AuthenticatedSession`] can resolve a
//! chat or upload, and delivering needs both a [`ChatTarget`] and an
//! [`AssetHandle`].

use tracing::{debug, info, warn};

use crate::api::lark::{BearerToken, ChatApi, MessageContent};
use crate::config::{LarkCredentials, MessageStyle};
use crate::utils::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub chat_id: String,
    pub name: Option<String>,
}

/// Opaque key of an uploaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle(pub String);

pub struct AuthenticatedSession<'a> {
    api: &'a dyn ChatApi,
    token: BearerToken,
}

/// Exchange the app credentials for a fresh tenant token.
///
/// Missing credentials fail without a network call.
pub async fn authenticate<'a>(
    api: &'a dyn ChatApi,
    credentials: Option<&LarkCredentials>,
) -> Result<AuthenticatedSession<'a>, PipelineError> {
    let credentials = credentials
        .ok_or_else(|| PipelineError::Auth("LARK_APP_ID / LARK_APP_SECRET not configured".to_string()))?;

    let token = api
        .tenant_access_token(&credentials.app_id, &credentials.app_secret)
        .await
        .map_err(|e| PipelineError::Auth(e.to_string()))?;

    Ok(AuthenticatedSession { api, token })
}

impl<'a> AuthenticatedSession<'a> {
    /// Use the configured chat, or the first chat the bot is a member of
    pub async fn resolve_chat(&self, configured: Option<&str>) -> Result<ChatTarget, PipelineError> {
        if let Some(chat_id) = configured {
            debug!("Using configured chat {}", chat_id);
            return Ok(ChatTarget {
                chat_id: chat_id.to_string(),
                name: None,
            });
        }

        let chats = self
            .api
            .list_chats(&self.token)
            .await
            .map_err(PipelineError::ChatLookup)?;

        info!("📋 Found {} chat(s)", chats.len());
        for chat in &chats {
            info!("   - {}: {}", chat.name.as_deref().unwrap_or("Unknown"), chat.chat_id);
        }

        let first = chats.into_iter().next().ok_or_else(|| {
            warn!("⚠️ No chats found. Add the bot to a group or set LARK_CHAT_ID.");
            PipelineError::NoChatFound
        })?;

        Ok(ChatTarget {
            chat_id: first.chat_id,
            name: first.name,
        })
    }

    pub async fn upload(&self, png: Vec<u8>, file_name: &str) -> Result<AssetHandle, PipelineError> {
        self.api
            .upload_image(&self.token, png, file_name)
            .await
            .map(AssetHandle)
            .map_err(PipelineError::Upload)
    }

    /// Post one message carrying exactly one image reference
    pub async fn deliver(
        &self,
        target: &ChatTarget,
        asset: &AssetHandle,
        style: MessageStyle,
        title: &str,
    ) -> Result<(), PipelineError> {
        let content = match style {
            MessageStyle::Image => MessageContent::Image {
                image_key: asset.0.clone(),
            },
            MessageStyle::Post => MessageContent::Post {
                title: title.to_string(),
                image_key: asset.0.clone(),
            },
        };

        self.api
            .send_message(&self.token, &target.chat_id, &content)
            .await
            .map_err(PipelineError::Delivery)
    }

    /// Plain text heading posted ahead of the images
    pub async fn announce(&self, target: &ChatTarget, text: &str) -> Result<(), PipelineError> {
        let content = MessageContent::Text {
            text: text.to_string(),
        };
        self.api
            .send_message(&self.token, &target.chat_id, &content)
            .await
            .map_err(PipelineError::Delivery)
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeChatApi;
    use super::*;
    use crate::api::ApiError;

    fn credentials() -> LarkCredentials {
        LarkCredentials {
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_network() {
        let api = FakeChatApi::default();
        let result = authenticate(&api, None).await;
        assert!(matches!(result, Err(PipelineError::Auth(_))));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_platform_error_is_auth_error() {
        let api = FakeChatApi {
            token_error: Some(ApiError::PlatformError {
                code: 10014,
                msg: "app secret invalid".to_string(),
            }),
            ..FakeChatApi::default()
        };
        let creds = credentials();
        let err = authenticate(&api, Some(&creds)).await.err().unwrap();
        assert!(matches!(err, PipelineError::Auth(ref msg) if msg.contains("10014")));
    }

    #[tokio::test]
    async fn test_resolve_chat_prefers_configured_target() {
        let api = FakeChatApi::with_chats(&["Markets"]);
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();

        let target = session.resolve_chat(Some("oc_fixed")).await.unwrap();
        assert_eq!(target.chat_id, "oc_fixed");
        assert_eq!(api.calls(), vec!["token"]);
    }

    #[tokio::test]
    async fn test_resolve_chat_picks_first_listed() {
        let api = FakeChatApi::with_chats(&["Markets", "Ops"]);
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();

        let target = session.resolve_chat(None).await.unwrap();
        assert_eq!(target.chat_id, "oc_1");
        assert_eq!(target.name.as_deref(), Some("Markets"));
    }

    #[tokio::test]
    async fn test_resolve_chat_without_chats() {
        let api = FakeChatApi::default();
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();
        assert!(matches!(session.resolve_chat(None).await, Err(PipelineError::NoChatFound)));
    }

    #[tokio::test]
    async fn test_upload_then_deliver_post() {
        let api = FakeChatApi::with_chats(&["Markets"]);
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();
        let target = session.resolve_chat(None).await.unwrap();

        let asset = session.upload(vec![1, 2, 3], "indices_DE.png").await.unwrap();
        assert_eq!(asset, AssetHandle("img_indices_DE.png_3".to_string()));

        session
            .deliver(&target, &asset, MessageStyle::Post, "📊 Indizes - 18.10.2026")
            .await
            .unwrap();

        let sent = api.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            (
                "oc_1".to_string(),
                MessageContent::Post {
                    title: "📊 Indizes - 18.10.2026".to_string(),
                    image_key: "img_indices_DE.png_3".to_string(),
                }
            )
        );
    }

    #[tokio::test]
    async fn test_upload_failure_is_not_retried() {
        let api = FakeChatApi {
            failing_uploads: vec![1],
            ..FakeChatApi::with_chats(&["Markets"])
        };
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();

        let err = session.upload(vec![0], "a.png").await.unwrap_err();
        assert!(matches!(err, PipelineError::Upload(ApiError::HttpError { status: 400, .. })));
        assert_eq!(api.calls(), vec!["token", "upload"]);
    }

    #[tokio::test]
    async fn test_chat_listing_failure_is_chat_lookup_error() {
        let api = FakeChatApi {
            chats_error: Some(ApiError::Timeout("im/v1/chats".to_string())),
            ..FakeChatApi::with_chats(&["Markets"])
        };
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();

        let err = session.resolve_chat(None).await.unwrap_err();
        assert!(matches!(err, PipelineError::ChatLookup(ApiError::Timeout(_))));
        assert_eq!(err.step(), "resolve chat");
        assert_eq!(api.calls(), vec!["token", "list_chats"]);
    }

    #[tokio::test]
    async fn test_send_failure_is_delivery_error() {
        let api = FakeChatApi {
            failing_sends: vec![1],
            ..FakeChatApi::with_chats(&["Markets"])
        };
        let creds = credentials();
        let session = authenticate(&api, Some(&creds)).await.unwrap();
        let target = session.resolve_chat(None).await.unwrap();
        let asset = session.upload(vec![1], "indices_EN.png").await.unwrap();

        let err = session
            .deliver(&target, &asset, MessageStyle::Image, "📊 Indices - 10/18/2026")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Delivery(ApiError::PlatformError { code: 230002, .. })
        ));
        assert_eq!(err.step(), "deliver");
        assert!(api.sent.lock().unwrap().is_empty());
    }
}
