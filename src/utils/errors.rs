use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::services::raster_service::RenderError;

const MAX_BODY_EXCERPT: usize = 300;

/// Failures of a pipeline step.
///
/// `Fetch` aborts the run. The delivery variants only cost that locale its
/// delivery; `Render` and `Io` cost it the image as well.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetching market data failed: {0}")]
    Fetch(#[source] ApiError),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("no chat found for the bot")]
    NoChatFound,
    #[error("listing chats failed: {0}")]
    ChatLookup(#[source] ApiError),
    #[error("image upload failed: {0}")]
    Upload(#[source] ApiError),
    #[error("message delivery failed: {0}")]
    Delivery(#[source] ApiError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("writing {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Short name of the failing step, for logs and the run summary
    pub fn step(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Auth(_) => "authenticate",
            PipelineError::NoChatFound | PipelineError::ChatLookup(_) => "resolve chat",
            PipelineError::Upload(_) => "upload",
            PipelineError::Delivery(_) => "deliver",
            PipelineError::Render(_) => "render",
            PipelineError::Io { .. } => "write image",
        }
    }
}

/// Reduce an upstream error body to something readable in a log line.
///
/// JSON bodies of the form `{"code": 99991663, "msg": "token invalid"}` become
/// `99991663: token invalid`; anything else is whitespace-collapsed and cut
/// to a bounded length.
pub fn extract_clean_error(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .get("msg")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str());
        if let Some(message) = message {
            return match value.get("code").and_then(|c| c.as_i64()) {
                Some(code) => format!("{}: {}", code, message),
                None => message.to_string(),
            };
        }
    }

    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_BODY_EXCERPT {
        let cut: String = collapsed.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}…", cut)
    } else {
        collapsed
    }
}
