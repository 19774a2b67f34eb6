//! A synchronous facade over [`crate::Translator`].
//!
//! Each blocking translator owns a multi-threaded Tokio runtime and drives the
//! async client on it. The pool is sized once, at construction, to the larger
//! of `max_workers` and the available parallelism. Batch concurrency is
//! bounded by the current `max_workers` rather than by the thread count, so
//! raising it later through [`Translator::set_performance_config`] takes
//! effect on the next batch. Do not use it from inside an async context; call
//! the async [`crate::Translator`] there.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::config::{ConfigOverrides, ConfigProfile, PerformanceOverrides};
use crate::detect::DetectionResult;
use crate::error::{Result, TranslateError};
use crate::gateway::CompletionGateway;
use crate::stream::TranslationStream;
use crate::style::StyleDescriptor;
use crate::translation::{self, TranslationRequest, TranslationResult};

fn pool_size(max_workers: usize) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, usize::from);
    max_workers.max(cores)
}

pub struct Translator {
    inner: translation::Translator,
    runtime: Runtime,
}

impl Translator {
    pub fn new(overrides: ConfigOverrides, gateway: Arc<dyn CompletionGateway>) -> Result<Self> {
        Self::wrap(translation::Translator::new(overrides, gateway)?)
    }

    pub fn with_api_key(overrides: ConfigOverrides, api_key: Option<String>) -> Result<Self> {
        Self::wrap(translation::Translator::with_api_key(overrides, api_key)?)
    }

    /// Wraps an existing async translator; the two share cache and configuration.
    pub fn wrap(inner: translation::Translator) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(pool_size(inner.config().max_workers))
            .thread_name("doubao-worker")
            .enable_all()
            .build()
            .map_err(|e| TranslateError::config(format!("failed to start runtime: {e}")))?;

        Ok(Self { inner, runtime })
    }

    /// The underlying async translator.
    pub const fn as_async(&self) -> &translation::Translator {
        &self.inner
    }

    pub fn config(&self) -> Arc<ConfigProfile> {
        self.inner.config()
    }

    pub fn set_performance_config(
        &self,
        update: PerformanceOverrides,
    ) -> Result<Arc<ConfigProfile>> {
        self.inner.set_performance_config(update)
    }

    pub fn translate(&self, text: &str, dest: &str) -> Result<TranslationResult> {
        self.runtime.block_on(self.inner.translate(text, dest))
    }

    pub fn translate_request(&self, request: TranslationRequest) -> Result<TranslationResult> {
        self.runtime.block_on(self.inner.translate_request(request))
    }

    /// Starts a streaming translation whose fragments are pulled by iteration.
    pub fn translate_stream(&self, request: TranslationRequest) -> Result<BlockingStream<'_>> {
        let stream = self
            .runtime
            .block_on(self.inner.translate_stream(request))?;
        Ok(BlockingStream {
            stream,
            runtime: &self.runtime,
        })
    }

    pub fn translate_batch<I, S>(
        &self,
        texts: I,
        dest: &str,
        src: &str,
    ) -> Vec<Result<TranslationResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime
            .block_on(self.inner.translate_batch(texts, dest, src))
    }

    pub fn translate_batch_async<I, S>(
        &self,
        texts: I,
        dest: &str,
        src: &str,
    ) -> Vec<Result<TranslationResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime
            .block_on(self.inner.translate_batch_async(texts, dest, src))
    }

    pub fn detect(&self, text: &str) -> Result<DetectionResult> {
        self.runtime.block_on(self.inner.detect(text))
    }

    pub fn detect_enhanced(&self, text: &str) -> Result<DetectionResult> {
        self.runtime.block_on(self.inner.detect_enhanced(text))
    }

    pub fn translate_with_context(
        &self,
        text: &str,
        context: &str,
        dest: &str,
    ) -> Result<TranslationResult> {
        self.runtime
            .block_on(self.inner.translate_with_context(text, context, dest))
    }

    pub fn translate_document_with_context<S: AsRef<str>>(
        &self,
        paragraphs: &[S],
        dest: &str,
        window: usize,
    ) -> Vec<Result<TranslationResult>> {
        self.runtime.block_on(
            self.inner
                .translate_document_with_context(paragraphs, dest, window),
        )
    }

    pub fn translate_with_style(
        &self,
        text: &str,
        style: StyleDescriptor,
        dest: &str,
    ) -> Result<TranslationResult> {
        self.runtime
            .block_on(self.inner.translate_with_style(text, style, dest))
    }

    pub fn apply_glossary(&self, text: &str, src: &str, dest: &str) -> Result<TranslationResult> {
        self.runtime
            .block_on(self.inner.apply_glossary(text, src, dest))
    }

    pub fn test_connection(&self) -> Result<()> {
        self.runtime.block_on(self.inner.test_connection())
    }

    pub fn cache_len(&self) -> usize {
        self.inner.cache_len()
    }

    pub fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    pub fn close(&self) {
        self.inner.close();
    }
}

/// Iterator over the fragments of a streaming translation.
pub struct BlockingStream<'a> {
    stream: TranslationStream,
    runtime: &'a Runtime,
}

impl BlockingStream<'_> {
    pub fn assembled(&self) -> &str {
        self.stream.assembled()
    }

    /// Drains the remaining fragments and returns the complete translation.
    pub fn into_result(self) -> Result<TranslationResult> {
        self.runtime.block_on(self.stream.into_result())
    }

    pub fn close(&mut self) {
        self.stream.close();
    }
}

impl Iterator for BlockingStream<'_> {
    type Item = Result<TranslationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}
