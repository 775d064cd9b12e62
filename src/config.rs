//! Runtime configuration, read once at startup from the environment
//! (after loading an optional `.env`).

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::lark::LarkClient;

pub const DEFAULT_INDICES_API_URL: &str = "https://my-finance-api123-88898ea8eb5b.herokuapp.com/indices";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_RENDER_SCALE: f64 = 3.0;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// Bare image message
    Image,
    /// Titled rich message embedding the image
    Post,
}

#[derive(Clone, PartialEq, Eq)]
pub struct LarkCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl std::fmt::Debug for LarkCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LarkCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LarkConfig {
    pub base_url: String,
    pub credentials: Option<LarkCredentials>,
    pub chat_id: Option<String>,
    pub message_style: MessageStyle,
    pub announce: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub indices_api_url: String,
    pub lark: LarkConfig,
    pub output_dir: PathBuf,
    pub render_scale: f64,
    pub chrome_path: Option<PathBuf>,
    /// Run Chromium with its sandbox; some containers need it off
    pub chrome_sandbox: bool,
    /// Replaces "now" as the report instant
    pub report_timestamp: Option<DateTime<Utc>>,
    pub http_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let credentials = match (get("LARK_APP_ID"), get("LARK_APP_SECRET")) {
            (Some(app_id), Some(app_secret)) => Some(LarkCredentials { app_id, app_secret }),
            _ => None,
        };

        let message_style = match get("LARK_MESSAGE_STYLE") {
            None => MessageStyle::Image,
            Some(value) => match value.to_lowercase().as_str() {
                "image" => MessageStyle::Image,
                "post" => MessageStyle::Post,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "LARK_MESSAGE_STYLE",
                        value,
                        reason: "expected 'image' or 'post'".to_string(),
                    })
                }
            },
        };

        let announce = match get("LARK_ANNOUNCE") {
            None => false,
            Some(value) => parse_bool("LARK_ANNOUNCE", value)?,
        };

        let chrome_sandbox = match get("CHROME_SANDBOX") {
            None => true,
            Some(value) => parse_bool("CHROME_SANDBOX", value)?,
        };

        let render_scale = match get("RENDER_SCALE") {
            None => DEFAULT_RENDER_SCALE,
            Some(value) => match value.parse::<f64>() {
                Ok(scale) if scale.is_finite() && scale > 0.0 => scale,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "RENDER_SCALE",
                        value,
                        reason: "expected a positive number".to_string(),
                    })
                }
            },
        };

        let report_timestamp = match get("REPORT_TIMESTAMP") {
            None => None,
            Some(value) => match DateTime::parse_from_rfc3339(&value) {
                Ok(instant) => Some(instant.with_timezone(&Utc)),
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: "REPORT_TIMESTAMP",
                        value,
                        reason: e.to_string(),
                    })
                }
            },
        };

        let http_timeout = parse_secs("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), DEFAULT_HTTP_TIMEOUT_SECS)?;
        let upload_timeout = parse_secs(
            "UPLOAD_TIMEOUT_SECS",
            get("UPLOAD_TIMEOUT_SECS"),
            DEFAULT_UPLOAD_TIMEOUT_SECS,
        )?;

        Ok(Config {
            indices_api_url: get("INDICES_API_URL").unwrap_or_else(|| DEFAULT_INDICES_API_URL.to_string()),
            lark: LarkConfig {
                base_url: get("LARK_BASE_URL").unwrap_or_else(|| LarkClient::DEFAULT_BASE_URL.to_string()),
                credentials,
                chat_id: get("LARK_CHAT_ID"),
                message_style,
                announce,
            },
            output_dir: PathBuf::from(get("OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())),
            render_scale,
            chrome_path: get("CHROME_PATH").map(PathBuf::from),
            chrome_sandbox,
            report_timestamp,
            http_timeout,
            upload_timeout,
        })
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_secs(key: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_secs(default)),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid {
                key,
                value,
                reason: "expected a positive number of seconds".to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.indices_api_url, DEFAULT_INDICES_API_URL);
        assert_eq!(config.lark.base_url, "https://open.larksuite.com/open-apis");
        assert!(config.lark.credentials.is_none());
        assert!(config.lark.chat_id.is_none());
        assert_eq!(config.lark.message_style, MessageStyle::Image);
        assert!(!config.lark.announce);
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.render_scale, 3.0);
        assert!(config.chrome_sandbox);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.upload_timeout, Duration::from_secs(30));
        assert!(config.report_timestamp.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LARK_APP_ID", "cli_1"),
            ("LARK_APP_SECRET", "s3cret"),
            ("LARK_CHAT_ID", "oc_42"),
            ("LARK_MESSAGE_STYLE", "Post"),
            ("LARK_ANNOUNCE", "yes"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("RENDER_SCALE", "2"),
            ("REPORT_TIMESTAMP", "2026-10-18T06:00:00+08:00"),
        ])
        .unwrap();

        let creds = config.lark.credentials.unwrap();
        assert_eq!(creds.app_id, "cli_1");
        assert_eq!(config.lark.chat_id.as_deref(), Some("oc_42"));
        assert_eq!(config.lark.message_style, MessageStyle::Post);
        assert!(config.lark.announce);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.render_scale, 2.0);
        assert_eq!(
            config.report_timestamp,
            Some(Utc.with_ymd_and_hms(2026, 10, 17, 22, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_chrome_sandbox_opt_out() {
        let config = config_from(&[("CHROME_SANDBOX", "false")]).unwrap();
        assert!(!config.chrome_sandbox);

        assert!(matches!(
            config_from(&[("CHROME_SANDBOX", "maybe")]),
            Err(ConfigError::Invalid { key: "CHROME_SANDBOX", .. })
        ));
    }

    #[test]
    fn test_half_configured_credentials_are_unset() {
        let config = config_from(&[("LARK_APP_ID", "cli_1"), ("LARK_APP_SECRET", "  ")]).unwrap();
        assert!(config.lark.credentials.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("LARK_MESSAGE_STYLE", "card")]),
            Err(ConfigError::Invalid { key: "LARK_MESSAGE_STYLE", .. })
        ));
        assert!(config_from(&[("RENDER_SCALE", "-1")]).is_err());
        assert!(config_from(&[("REPORT_TIMESTAMP", "yesterday")]).is_err());
        assert!(config_from(&[("HTTP_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_secret_is_not_debug_printed() {
        let creds = LarkCredentials {
            app_id: "cli_1".to_string(),
            app_secret: "s3cret".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("s3cret"));
    }
}
