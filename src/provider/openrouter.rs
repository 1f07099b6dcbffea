use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::errors::RelayError;

use super::{Generation, Provider};

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 4096;

pub const TRUNCATION_NOTICE: &str = "\n\n[Note: Response was truncated due to length limit. Consider breaking down the request into smaller parts.]";

/// OpenRouter chat-completion client. One user message per call, fixed
/// sampling, no timeout, no retries.
pub struct OpenRouter {
    client: Client,
    api_key: String,
    api_base: String,
    referer: String,
    title: String,
}

impl OpenRouter {
    pub fn new(api_key: String, api_base: String, referer: String, title: String) -> Self {
        Self { client: Client::new(), api_key, api_base, referer, title }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

#[async_trait]
impl Provider for OpenRouter {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, RelayError> {
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        info!(model, "sending request to OpenRouter");
        let started = Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Provider(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RelayError::Provider(e.to_string()))?;
        let elapsed = started.elapsed();

        if !status.is_success() {
            return Err(RelayError::Provider(error_message(status, &text)));
        }
        parse_completion(&text, elapsed)
    }
}

/// The provider's own error message when the body carries one, else the
/// status line.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message);
    match detail {
        Some(msg) => format!("OpenRouter API error: {msg}"),
        None => format!("OpenRouter API error: {status}"),
    }
}

fn parse_completion(body: &str, elapsed: Duration) -> Result<Generation, RelayError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| RelayError::Provider(format!("failed to parse OpenRouter response: {e}")))?;

    let choice = parsed.choices.into_iter().next();
    let mut output = choice
        .as_ref()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_else(|| "[No output returned]".to_string());
    let truncated = choice
        .and_then(|c| c.finish_reason)
        .is_some_and(|r| r == "length");

    if truncated {
        warn!("response was truncated at the token ceiling");
        output.push_str(TRUNCATION_NOTICE);
    }
    Ok(Generation { output, truncated, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_and_finish_reason() {
        let body = r#"{"choices":[{"message":{"content":"```python\nx=1\n```"},"finish_reason":"stop"}]}"#;
        let g = parse_completion(body, Duration::from_millis(5)).unwrap();
        assert_eq!(g.output, "```python\nx=1\n```");
        assert!(!g.truncated);
    }

    #[test]
    fn length_stop_appends_the_truncation_notice() {
        let body = r#"{"choices":[{"message":{"content":"partial"},"finish_reason":"length"}]}"#;
        let g = parse_completion(body, Duration::from_millis(5)).unwrap();
        assert!(g.truncated);
        assert!(g.output.starts_with("partial"));
        assert!(g.output.ends_with(TRUNCATION_NOTICE));
    }

    #[test]
    fn empty_choices_yield_the_placeholder() {
        let g = parse_completion(r#"{"choices":[]}"#, Duration::ZERO).unwrap();
        assert_eq!(g.output, "[No output returned]");
    }

    #[test]
    fn malformed_body_is_a_provider_error() {
        let err = parse_completion("not json", Duration::ZERO).unwrap_err();
        assert!(matches!(err, RelayError::Provider(_)));
    }

    #[test]
    fn error_message_prefers_the_provider_detail() {
        let body = r#"{"error":{"message":"model not found"}}"#;
        let msg = error_message(reqwest::StatusCode::NOT_FOUND, body);
        assert_eq!(msg, "OpenRouter API error: model not found");

        let msg = error_message(reqwest::StatusCode::BAD_GATEWAY, "html error page");
        assert!(msg.contains("502"));
    }
}
