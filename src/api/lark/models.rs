use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// `{code, msg, data}` wrapper used by every Lark open-api response
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// Request body for the tenant access token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// The token endpoint returns its payload at the top level, not under `data`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub tenant_access_token: Option<String>,
    /// Lifetime in seconds; informational only, tokens are never cached
    pub expire: Option<i64>,
}

/// Short-lived bearer credential. Debug output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatList {
    #[serde(default)]
    pub items: Vec<ChatSummary>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatSummary {
    pub chat_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub image_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentMessage {
    pub message_id: Option<String>,
}

/// Body of `POST /im/v1/messages`; `content` is itself a JSON string
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub receive_id: String,
    pub msg_type: &'static str,
    pub content: String,
    /// Idempotency key, lets the platform drop accidental duplicates
    pub uuid: String,
}

/// What a single chat message carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Image { image_key: String },
    Post { title: String, image_key: String },
    Text { text: String },
}

impl MessageContent {
    pub fn msg_type(&self) -> &'static str {
        match self {
            MessageContent::Image { .. } => "image",
            MessageContent::Post { .. } => "post",
            MessageContent::Text { .. } => "text",
        }
    }

    /// Serialized `content` field for the send request
    pub fn to_content_string(&self) -> String {
        let value = match self {
            MessageContent::Image { image_key } => json!({ "image_key": image_key }),
            MessageContent::Post { title, image_key } => json!({
                "en_us": {
                    "title": title,
                    "content": [[{ "tag": "img", "image_key": image_key }]],
                }
            }),
            MessageContent::Text { text } => json!({ "text": text }),
        };
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_image_content() {
        let content = MessageContent::Image { image_key: "img_v2_1".to_string() };
        assert_eq!(content.msg_type(), "image");
        assert_eq!(content.to_content_string(), r#"{"image_key":"img_v2_1"}"#);
    }

    #[test]
    fn test_post_content_embeds_exactly_one_image() {
        let content = MessageContent::Post {
            title: "📊 Indizes - 18.10.2026".to_string(),
            image_key: "img_v2_2".to_string(),
        };
        assert_eq!(content.msg_type(), "post");

        let value: Value = serde_json::from_str(&content.to_content_string()).unwrap();
        assert_eq!(value["en_us"]["title"], "📊 Indizes - 18.10.2026");
        let blocks = value["en_us"]["content"].as_array().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0][0]["tag"], "img");
        assert_eq!(blocks[0][0]["image_key"], "img_v2_2");
    }

    #[test]
    fn test_bearer_token_is_redacted() {
        let token = BearerToken::new("t-secret".to_string());
        assert_eq!(format!("{:?}", token), "BearerToken(***)");
        assert_eq!(token.header_value(), "Bearer t-secret");
    }

    #[test]
    fn test_chat_list_tolerates_missing_items() {
        let envelope: Envelope<ChatList> = serde_json::from_str(r#"{"code":0,"data":{}}"#).unwrap();
        assert!(envelope.data.unwrap().items.is_empty());
    }
}
