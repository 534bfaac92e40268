//! OpenAI-compatible HTTP provider (blocking).

use std::time::Duration;

use serde_json::{json, Value};

use aegis_core::config::InferenceConfig;
use aegis_core::errors::{AegisResult, InferenceError};
use aegis_core::traits::ICompletionProvider;

/// Remote completion + embedding provider speaking the OpenAI wire format.
pub struct OpenAiProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    completion_model: String,
    embedding_model: String,
}

impl OpenAiProvider {
    pub fn new(config: &InferenceConfig, api_key: String) -> AegisResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| InferenceError::RequestFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            completion_model: config.completion_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn post(&self, path: &str, body: Value) -> AegisResult<Value> {
        let response = self
            .client
            .post(format!("{}{path}", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| InferenceError::RequestFailed {
                reason: e.to_string(),
            })?
            .error_for_status()
            .map_err(|e| InferenceError::RequestFailed {
                reason: e.to_string(),
            })?;
        response.json().map_err(|e| {
            InferenceError::MalformedResponse {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl ICompletionProvider for OpenAiProvider {
    fn embed(&self, text: &str) -> AegisResult<Vec<f32>> {
        let body = json!({ "model": self.embedding_model, "input": text });
        let value = self.post("/embeddings", body)?;
        let floats = value["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| InferenceError::MalformedResponse {
                reason: "missing data[0].embedding".to_string(),
            })?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        Ok(floats)
    }

    fn complete(&self, prompt: &str) -> AegisResult<String> {
        let body = json!({
            "model": self.completion_model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.2,
        });
        let value = self.post("/chat/completions", body)?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| InferenceError::MalformedResponse {
                reason: "missing choices[0].message.content".to_string(),
            })?;
        Ok(content.to_string())
    }

    fn name(&self) -> &str {
        "openai-http"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}
