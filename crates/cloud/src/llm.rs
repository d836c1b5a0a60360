//! Client for OpenAI-compatible chat-completions APIs.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::AiConfig;
use crate::error::CloudError;

const SYSTEM_PROMPT: &str = "You extract structured data from music industry contracts. \
                             Answer with JSON only.";

/// Generates a JSON document that follows a schema.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the raw model output, which should be a
    /// JSON object matching `schema`.
    async fn generate_json(&self, prompt: &str, schema_name: &str, schema: &Value) -> Result<String, CloudError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// [`TextGenerator`] backed by `POST {api_url}/chat/completions`.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(config: &AiConfig) -> Result<Self, CloudError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate_json(&self, prompt: &str, schema_name: &str, schema: &Value) -> Result<String, CloudError> {
        let body = request_body(&self.model, prompt, schema_name, schema);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: Value = response.json().await?;
        let content = response_content(body)?;
        tracing::debug!(model = %self.model, chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

/// Request body for a deterministic, schema-constrained completion.
pub fn request_body(model: &str, prompt: &str, schema_name: &str, schema: &Value) -> Value {
    json!({
        "model": model,
        "temperature": 0,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": prompt },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "strict": true,
                "schema": schema,
            },
        },
    })
}

/// `choices[0].message.content` of a completion response.
pub fn response_content(body: Value) -> Result<String, CloudError> {
    let parsed: ChatResponse =
        serde_json::from_value(body).map_err(|e| CloudError::InvalidResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CloudError::InvalidResponse("Response has no choices".into()))?;
    if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
        return Err(CloudError::InvalidResponse(format!("Model refused: {refusal}")));
    }
    choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| CloudError::InvalidResponse("Response message has no content".into()))
}

/// Pass 2xx responses through, turn anything else into [`CloudError::Api`].
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CloudError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(CloudError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
