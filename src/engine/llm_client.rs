use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineSettings;
use crate::error::EngineError;

/// A text-completion backend. Implementations block until the model answers.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, EngineError>;

    fn model_name(&self) -> &str;
}

impl<T: LanguageModel + ?Sized> LanguageModel for &T {
    fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        (**self).complete(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        (**self).complete(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for Arc<T> {
    fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        (**self).complete(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: String,
}

/// OpenAI-compatible `/v1/chat/completions` client (LM Studio, vLLM, Ollama, ...).
pub struct ChatCompletionClient {
    client: Client,
    settings: EngineSettings,
}

impl ChatCompletionClient {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    pub fn test_connection(&self) -> Result<String, EngineError> {
        let mut req = self.client.get(self.endpoint("models"));
        if let Some(key) = &self.settings.api_key {
            req = req.bearer_auth(key);
        }
        let resp: serde_json::Value = check_status(req.send()?)?.json()?;
        let count = resp["data"].as_array().map(|a| a.len()).unwrap_or(0);
        info!(models = count, base_url = %self.settings.base_url, "backend reachable");
        Ok(format!("Connected ({} models available)", count))
    }
}

impl LanguageModel for ChatCompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        let body = ChatCompletionRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
        };

        debug!(model = %self.settings.model, prompt_len = prompt.len(), "sending completion request");

        let mut req = self.client.post(self.endpoint("chat/completions")).json(&body);
        if let Some(key) = &self.settings.api_key {
            req = req.bearer_auth(key);
        }

        let resp: ChatCompletionResponse = check_status(req.send()?)?.json()?;
        first_choice(resp)
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, EngineError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(status_error(status.as_u16(), resp.text()))
}

fn status_error<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> EngineError {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            debug!(status, error = %e, "failed to read error body");
            format!("<unreadable body: {}>", e)
        }
    };
    EngineError::Status { status, body }
}

fn first_choice(resp: ChatCompletionResponse) -> Result<String, EngineError> {
    resp.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(EngineError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_like_openai() {
        let req = ChatCompletionRequest {
            model: "local-model",
            temperature: 0.5,
            max_tokens: None,
            messages: vec![ChatMessage {
                role: "system",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "local-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn first_choice_is_returned() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Analysis:\nok"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(resp).unwrap(), "Analysis:\nok");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice(resp), Err(EngineError::EmptyResponse)));
    }

    #[test]
    fn unreadable_error_body_keeps_the_reason() {
        let err = status_error(502, Err::<String, _>("connection reset"));
        match err {
            EngineError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<unreadable body: connection reset>");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = status_error(429, Ok::<_, String>("slow down".into()));
        assert_eq!(err.to_string(), "backend returned 429: slow down");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = ChatCompletionClient::new(EngineSettings {
            base_url: "http://localhost:1234/".into(),
            ..EngineSettings::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint("chat/completions"),
            "http://localhost:1234/v1/chat/completions"
        );
        assert_eq!(client.model_name(), "local-model");
    }
}
