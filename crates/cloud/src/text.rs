//! Client for the external PDF text-extraction service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sonora_core::storage::CONTENT_TYPE_PDF;

use crate::config::TextExtractionConfig;
use crate::error::CloudError;
use crate::llm::ensure_success;

/// Turns a document into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, CloudError>;
}

/// Response body of the extraction service. Either a single `text` field
/// or one entry per page.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageText>,
}

#[derive(Debug, Deserialize)]
pub struct PageText {
    #[serde(default)]
    pub text: String,
}

impl ExtractionResponse {
    /// The document text, preferring `text` over the page list.
    pub fn into_text(self) -> String {
        match self.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => self
                .pages
                .into_iter()
                .map(|p| p.text)
                .filter(|t| !t.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

/// [`TextExtractor`] that posts the file as multipart form data.
pub struct HttpTextExtractor {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTextExtractor {
    pub fn new(config: &TextExtractionConfig) -> Result<Self, CloudError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract_text(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, CloudError> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(CONTENT_TYPE_PDF)?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = ensure_success(request.send().await?).await?;
        let body: ExtractionResponse = response.json().await?;
        let text = body.into_text();
        tracing::debug!(file_name, size, chars = text.chars().count(), "Text extracted");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> String {
        serde_json::from_str::<ExtractionResponse>(json).unwrap().into_text()
    }

    #[test]
    fn single_text_field() {
        assert_eq!(parse(r#"{"text": "CONTRATO DE DISTRIBUCIÓN"}"#), "CONTRATO DE DISTRIBUCIÓN");
    }

    #[test]
    fn pages_are_joined() {
        let text = parse(r#"{"pages": [{"text": "Page one"}, {"text": "  "}, {"text": "Page two"}]}"#);
        assert_eq!(text, "Page one\n\nPage two");
    }

    #[test]
    fn blank_text_falls_back_to_pages() {
        assert_eq!(parse(r#"{"text": "", "pages": [{"text": "Only page"}]}"#), "Only page");
    }

    #[test]
    fn empty_body_is_empty_text() {
        assert_eq!(parse("{}"), "");
    }
}
