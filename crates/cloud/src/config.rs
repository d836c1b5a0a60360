//! Service configuration loaded from environment variables.

use std::time::Duration;

use crate::error::CloudError;

/// Default timeout for AI and text-extraction requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Default chat model.
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// S3-compatible object storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint, e.g. a MinIO URL. `None` uses AWS.
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Static credentials. When absent the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Load from `S3_BUCKET` (required), `S3_REGION` (default `us-east-1`),
    /// `S3_ENDPOINT`, `S3_FORCE_PATH_STYLE`, `S3_ACCESS_KEY_ID` and
    /// `S3_SECRET_ACCESS_KEY`.
    pub fn from_env() -> Result<Self, CloudError> {
        Ok(Self {
            bucket: required("S3_BUCKET")?,
            region: optional("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
            endpoint: optional("S3_ENDPOINT"),
            force_path_style: flag("S3_FORCE_PATH_STYLE")?,
            access_key_id: optional("S3_ACCESS_KEY_ID"),
            secret_access_key: optional("S3_SECRET_ACCESS_KEY"),
        })
    }
}

/// OpenAI-compatible chat-completions settings.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl AiConfig {
    /// Load from `AI_API_URL`, `AI_API_KEY` (required), `AI_MODEL` and
    /// `AI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, CloudError> {
        Ok(Self {
            api_url: optional("AI_API_URL").unwrap_or_else(|| "https://api.openai.com/v1".into()),
            api_key: required("AI_API_KEY")?,
            model: optional("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.into()),
            timeout: secs("AI_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT),
        })
    }
}

/// Text-extraction service settings.
#[derive(Debug, Clone)]
pub struct TextExtractionConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl TextExtractionConfig {
    /// Load from `TEXT_EXTRACTION_URL` (required), `TEXT_EXTRACTION_API_KEY`
    /// and `TEXT_EXTRACTION_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, CloudError> {
        Ok(Self {
            url: required("TEXT_EXTRACTION_URL")?,
            api_key: optional("TEXT_EXTRACTION_API_KEY"),
            timeout: secs("TEXT_EXTRACTION_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT),
        })
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String, CloudError> {
    optional(name).ok_or_else(|| CloudError::Config(format!("{name} must be set")))
}

fn flag(name: &str) -> Result<bool, CloudError> {
    match optional(name).as_deref() {
        None => Ok(false),
        Some(v) => parse_flag(v).ok_or_else(|| CloudError::Config(format!("{name} must be true or false"))),
    }
}

fn secs(name: &str) -> Result<Option<Duration>, CloudError> {
    optional(name)
        .map(|v| {
            v.parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| CloudError::Config(format!("{name} must be a positive number of seconds")))
        })
        .transpose()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
