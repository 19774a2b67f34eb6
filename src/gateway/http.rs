use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::sse::sse_to_text_stream;
use super::{CompletionGateway, CompletionRequest, FragmentStream};
use crate::error::{Result, TranslateError};

// Borrow the prompt strings for serialization instead of cloning them
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Gateway for OpenAI-compatible `chat/completions` endpoints such as Volcengine Ark.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(TranslateError::Authentication(
                "no API key configured; set DOUBAO_API_KEY".to_string(),
            ));
        };

        let url = self.completions_url();
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: Cow::Borrowed(&request.prompt.system),
                },
                Message {
                    role: "user",
                    content: Cow::Borrowed(&request.prompt.user),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        };

        tracing::debug!(%url, model = %request.model, stream, "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(classify_status(status, message))
    }
}

fn classify_status(status: StatusCode, message: String) -> TranslateError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TranslateError::Authentication(format!("{status}: {message}"))
        }
        StatusCode::TOO_MANY_REQUESTS => TranslateError::RateLimit(message),
        s if s.is_server_error() => TranslateError::Transport(format!("{status}: {message}")),
        s => TranslateError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl CompletionGateway for HttpGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self.send(request, false).await?;

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(format!("undecodable body: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(TranslateError::InvalidResponse(
                "completion contained no text".to_string(),
            ));
        }

        Ok(content)
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        let response = self.send(request, true).await?;
        Ok(Box::pin(sse_to_text_stream(response.bytes_stream())))
    }
}
