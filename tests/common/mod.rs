//! Shared test doubles for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use doubao_translate::gateway::{
    CompletionGateway, CompletionRequest, FragmentStream, Prompt,
};
use doubao_translate::{Result, TranslateError};
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DETECTION_MARKER: &str = "language identification engine";

/// Scripted gateway recording every request it sees.
///
/// Translation calls consume scripted outcomes first and then reply with
/// `T(<user text>)`. Detection calls always reply with the configured
/// detection answer.
pub struct StubGateway {
    calls: AtomicUsize,
    detection_calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
    script: Mutex<VecDeque<Result<String>>>,
    detection_reply: Mutex<String>,
    latency: Option<Duration>,
    fragment_delay: Option<Duration>,
}

impl StubGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None, None))
    }

    /// A gateway whose every call sleeps for `latency` first.
    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self::build(Some(latency), None))
    }

    /// A gateway whose streamed fragments arrive `delay` apart.
    pub fn with_fragment_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(None, Some(delay)))
    }

    fn build(latency: Option<Duration>, fragment_delay: Option<Duration>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            detection_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            detection_reply: Mutex::new("en|0.99".to_string()),
            latency,
            fragment_delay,
        }
    }

    /// Queues outcomes returned, in order, by the next translation calls.
    pub fn script<I>(&self, outcomes: I)
    where
        I: IntoIterator<Item = Result<String>>,
    {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn set_detection_reply(&self, reply: &str) {
        *self.detection_reply.lock().unwrap() = reply.to_string();
    }

    /// Number of translation (non-detection) calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn detection_calls(&self) -> usize {
        self.detection_calls.load(Ordering::SeqCst)
    }

    /// Translation requests in the order they were dispatched.
    pub fn translation_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !is_detection(&r.prompt))
            .cloned()
            .collect()
    }

    pub fn last_prompt(&self) -> Prompt {
        self.translation_requests()
            .pop()
            .map(|r| r.prompt)
            .expect("no translation request was dispatched")
    }

    async fn reply(&self, request: &CompletionRequest) -> Result<String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.requests.lock().unwrap().push(request.clone());

        if is_detection(&request.prompt) {
            self.detection_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.detection_reply.lock().unwrap().clone());
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(format!("T({})", request.prompt.user)))
    }
}

fn is_detection(prompt: &Prompt) -> bool {
    prompt.system.contains(DETECTION_MARKER)
}

#[async_trait]
impl CompletionGateway for StubGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.reply(request).await
    }

    /// Streams the reply one whitespace-separated word at a time.
    async fn complete_stream(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        let text = self.reply(request).await?;
        let fragments: Vec<Result<String>> = text
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();
        let fragments = futures_util::stream::iter(fragments);
        match self.fragment_delay {
            Some(delay) => Ok(fragments
                .then(move |fragment| async move {
                    tokio::time::sleep(delay).await;
                    fragment
                })
                .boxed()),
            None => Ok(fragments.boxed()),
        }
    }
}

pub fn transport(message: &str) -> TranslateError {
    TranslateError::Transport(message.to_string())
}
