//! OpenAI chat-completions provider.

use super::{CompletionError, Provider};
use crate::session::Turn;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const OPENAI_API_BASE: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    /// `Turn` already serializes as `{role, content}`, matching the wire shape
    messages: &'a [Turn],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat-completions API client.
pub struct OpenAiProvider {
    api_key: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn extract_reply(response: ChatResponse) -> Result<String, CompletionError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                CompletionError::MalformedResponse("response carried no assistant text".to_string())
            })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        messages: &[Turn],
        model: &str,
        temperature: f64,
    ) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(format!("{OPENAI_API_BASE}/v1/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Auth(format!("{status}: {error_text}")));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Network(format!("{status}: {error_text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let reply = Self::extract_reply(parsed)?;
        tracing::debug!(
            model,
            turns = messages.len(),
            reply_len = reply.len(),
            "completion succeeded"
        );
        Ok(reply)
    }
}
