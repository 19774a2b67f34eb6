//! The single boundary between the engine and the remote completion API.
//!
//! Everything above this module speaks in prompts and text; everything below
//! it speaks HTTP. Implementations normalize transport failures into
//! [`TranslateError`](crate::error::TranslateError) kinds so callers can
//! decide what to retry.

mod http;
mod sse;

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;
use std::time::Duration;

use crate::error::Result;

pub use http::HttpGateway;
pub use sse::sse_to_text_stream;

/// A lazy, single-pass sequence of completion fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// System instruction plus the user payload sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// One completion call as the gateway sees it.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: Prompt,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Issues a blocking completion and returns the full text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Issues a streaming completion.
    ///
    /// Draining the returned stream yields the same text `complete` would
    /// have returned for the same request.
    async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream>;
}
