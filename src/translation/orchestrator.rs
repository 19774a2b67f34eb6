use futures_util::StreamExt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

use super::language::AUTO;
use super::prompt::{PromptSections, build_translation_prompt};
use super::request::{TranslationRequest, TranslationResult};
use crate::batch;
use crate::cache::ResponseCache;
use crate::config::{ConfigOverrides, ConfigProfile, PerformanceOverrides};
use crate::context::build_windows;
use crate::detect::{
    DetectionResult, detection_prompt, enhanced_detection_prompt, parse_detection,
    parse_enhanced_detection,
};
use crate::error::{Result, TranslateError};
use crate::gateway::{CompletionGateway, CompletionRequest, FragmentStream, HttpGateway, Prompt};
use crate::glossary::GlossaryMatcher;
use crate::retry::RetryPolicy;
use crate::stream::TranslationStream;
use crate::style::StyleDescriptor;

const DETECT_MAX_TOKENS: u32 = 32;
const PING_MAX_TOKENS: u32 = 8;

/// The overrides a profile was resolved from, kept so later partial updates
/// can be merged onto them.
struct ProfileState {
    overrides: ConfigOverrides,
    profile: Arc<ConfigProfile>,
}

struct Inner {
    state: RwLock<ProfileState>,
    gateway: Arc<dyn CompletionGateway>,
    cache: ResponseCache,
    glossary: Option<GlossaryMatcher>,
    retry: RetryPolicy,
    shutdown: CancellationToken,
}

/// Translation client composing caching, retries, glossary, context and
/// style handling on top of a [`CompletionGateway`].
///
/// Cloning is cheap; clones share the cache and configuration.
#[derive(Clone)]
pub struct Translator {
    inner: Arc<Inner>,
}

impl Translator {
    /// Creates a translator on top of an existing gateway.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] if the overrides do not resolve to
    /// a valid profile, or [`TranslateError::Parse`] if the configured
    /// glossary cannot be loaded.
    pub fn new(overrides: ConfigOverrides, gateway: Arc<dyn CompletionGateway>) -> Result<Self> {
        let profile = ConfigProfile::resolve(&overrides)?;
        let glossary = profile
            .glossary_path
            .as_deref()
            .map(GlossaryMatcher::load)
            .transpose()?;

        tracing::debug!(
            mode = %profile.performance_mode,
            model = %profile.model_name,
            glossary_terms = glossary.as_ref().map_or(0, GlossaryMatcher::len),
            "translator initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                state: RwLock::new(ProfileState {
                    overrides,
                    profile: Arc::new(profile),
                }),
                gateway,
                cache: ResponseCache::new(),
                glossary,
                retry: RetryPolicy::default(),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Creates a translator talking HTTP to the profile's `base_url`.
    pub fn with_api_key(overrides: ConfigOverrides, api_key: Option<String>) -> Result<Self> {
        let base_url = ConfigProfile::resolve(&overrides)?.base_url;
        Self::new(overrides, Arc::new(HttpGateway::new(base_url, api_key)))
    }

    /// Returns the current resolved profile.
    pub fn config(&self) -> Arc<ConfigProfile> {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.profile)
    }

    /// Merges `update` onto the current overrides and re-resolves the profile.
    ///
    /// Fields not set in `update` keep their previous values. On error the
    /// current profile is left unchanged.
    pub fn set_performance_config(&self, update: PerformanceOverrides) -> Result<Arc<ConfigProfile>> {
        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let overrides = ConfigOverrides {
            performance: state.overrides.performance.merged_with(&update),
            ..state.overrides.clone()
        };
        let profile = Arc::new(ConfigProfile::resolve(&overrides)?);

        tracing::debug!(
            mode = %profile.performance_mode,
            max_tokens = profile.max_tokens,
            max_workers = profile.max_workers,
            "performance config updated"
        );

        state.overrides = overrides;
        state.profile = Arc::clone(&profile);
        Ok(profile)
    }

    /// Translates `text` into `dest`, detecting the source language.
    pub async fn translate(&self, text: &str, dest: &str) -> Result<TranslationResult> {
        self.translate_request(TranslationRequest::new(text, dest)).await
    }

    /// Translates a fully specified request.
    ///
    /// A request with `stream` set is dispatched over the streaming
    /// transport and returned once assembled.
    pub async fn translate_request(&self, request: TranslationRequest) -> Result<TranslationResult> {
        self.guarded(self.run_request(request)).await
    }

    /// Starts a streaming translation and returns its fragments as they arrive.
    ///
    /// Streams are never served from or written to the cache.
    pub async fn translate_stream(&self, request: TranslationRequest) -> Result<TranslationStream> {
        self.guarded(self.open_translation_stream(request)).await
    }

    /// Translates texts with at most `max_workers` requests in flight.
    ///
    /// The output has one slot per input, in input order.
    pub async fn translate_batch<I, S>(
        &self,
        texts: I,
        dest: &str,
        src: &str,
    ) -> Vec<Result<TranslationResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requests = batch_requests(texts, dest, src);
        self.translate_requests(requests, &CancellationToken::new()).await
    }

    /// Like [`translate_batch`](Self::translate_batch), but each item runs
    /// as its own task.
    pub async fn translate_batch_async<I, S>(
        &self,
        texts: I,
        dest: &str,
        src: &str,
    ) -> Vec<Result<TranslationResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requests = batch_requests(texts, dest, src);
        self.spawn_requests(requests, CancellationToken::new()).await
    }

    /// Runs requests on the current task; items still pending when `cancel`
    /// fires resolve to [`TranslateError::Cancelled`].
    pub async fn translate_requests(
        &self,
        requests: Vec<TranslationRequest>,
        cancel: &CancellationToken,
    ) -> Vec<Result<TranslationResult>> {
        let total = requests.len();
        let workers = self.config().max_workers;
        tracing::debug!(total, workers, "starting batch");

        let results = batch::run_buffered(requests, workers, cancel, |request| {
            self.translate_request(request)
        })
        .await;

        log_batch_summary(&results);
        results
    }

    /// Runs each request as a spawned task, bounded by `max_workers`.
    pub async fn spawn_requests(
        &self,
        requests: Vec<TranslationRequest>,
        cancel: CancellationToken,
    ) -> Vec<Result<TranslationResult>> {
        let total = requests.len();
        let workers = self.config().max_workers;
        tracing::debug!(total, workers, "starting async batch");

        let results = batch::run_spawned(requests, workers, cancel, |request| {
            let translator = self.clone();
            async move { translator.translate_request(request).await }
        })
        .await;

        log_batch_summary(&results);
        results
    }

    /// Identifies the dominant language of `text`.
    pub async fn detect(&self, text: &str) -> Result<DetectionResult> {
        self.guarded(self.run_detection(text, false)).await
    }

    /// Identifies every language present in `text`, with per-segment tags.
    pub async fn detect_enhanced(&self, text: &str) -> Result<DetectionResult> {
        self.guarded(self.run_detection(text, true)).await
    }

    pub async fn translate_with_context(
        &self,
        text: &str,
        context: &str,
        dest: &str,
    ) -> Result<TranslationResult> {
        self.translate_request(TranslationRequest::new(text, dest).with_context(context))
            .await
    }

    /// Translates each paragraph with its `window` neighbours on either side
    /// as context.
    pub async fn translate_document_with_context<S: AsRef<str>>(
        &self,
        paragraphs: &[S],
        dest: &str,
        window: usize,
    ) -> Vec<Result<TranslationResult>> {
        let requests: Vec<TranslationRequest> = build_windows(paragraphs, window)
            .into_iter()
            .map(|w| {
                let mut request = TranslationRequest::new(w.text, dest);
                request.context = w.context;
                request
            })
            .collect();

        let results = self
            .translate_requests(requests, &CancellationToken::new())
            .await;
        tracing::info!(
            paragraphs = results.len(),
            window,
            failed = results.iter().filter(|r| r.is_err()).count(),
            "document translated"
        );
        results
    }

    pub async fn translate_with_style(
        &self,
        text: &str,
        style: StyleDescriptor,
        dest: &str,
    ) -> Result<TranslationResult> {
        self.translate_request(TranslationRequest::new(text, dest).with_style(style))
            .await
    }

    /// Translates with the loaded glossary enforced.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] if no glossary was configured.
    pub async fn apply_glossary(
        &self,
        text: &str,
        src: &str,
        dest: &str,
    ) -> Result<TranslationResult> {
        if self.inner.glossary.is_none() {
            return Err(TranslateError::config(
                "No glossary loaded; set glossary_path to use apply_glossary",
            ));
        }
        self.translate_request(TranslationRequest::new(text, dest).from_lang(src))
            .await
    }

    /// Issues a minimal completion to check connectivity and credentials.
    pub async fn test_connection(&self) -> Result<()> {
        let profile = self.config();
        let request = CompletionRequest {
            prompt: Prompt::new("Reply with the single word: ok", "ping"),
            model: profile.model_name.clone(),
            max_tokens: PING_MAX_TOKENS,
            temperature: 0.0,
            timeout: profile.timeout(),
        };

        let reply = self.guarded(self.complete(&profile, request)).await?;
        tracing::debug!(reply = %reply.trim(), "connection test succeeded");
        Ok(())
    }

    pub fn cache_len(&self) -> usize {
        self.inner.cache.len()
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Cancels in-flight work and releases cached results.
    ///
    /// Every later operation on this translator, or any clone of it, fails
    /// with [`TranslateError::Cancelled`].
    pub fn close(&self) {
        self.inner.shutdown.cancel();
        self.inner.cache.clear();
        tracing::debug!("translator closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    async fn guarded<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            () = self.inner.shutdown.cancelled() => Err(TranslateError::Cancelled),
            result = work => result,
        }
    }

    async fn run_request(&self, request: TranslationRequest) -> Result<TranslationResult> {
        let profile = self.config();
        request.validate(profile.max_text_chars)?;
        let style = request
            .style
            .as_ref()
            .map(StyleDescriptor::resolve)
            .transpose()?;

        if !profile.caching_enabled() {
            return self.dispatch(&profile, &request, style.as_deref()).await;
        }

        let fingerprint = request.fingerprint(style.as_deref(), &profile.model_name);
        self.inner
            .cache
            .get_or_fetch(&fingerprint, profile.cache_ttl(), || {
                self.dispatch(&profile, &request, style.as_deref())
            })
            .await
    }

    async fn dispatch(
        &self,
        profile: &ConfigProfile,
        request: &TranslationRequest,
        style: Option<&str>,
    ) -> Result<TranslationResult> {
        let source_lang = self.resolve_source(profile, request).await?;

        if source_lang == request.dest_lang {
            tracing::debug!(lang = %source_lang, "source matches destination, passing through");
            return Ok(TranslationResult {
                text: request.text.clone(),
                source_lang,
                dest_lang: request.dest_lang.clone(),
                original: request.text.clone(),
            });
        }

        let completion = self.completion_request(profile, request, &source_lang, style);

        let text = if request.stream {
            let fragments = self.complete_stream(profile, completion).await?;
            TranslationStream::new(fragments, &source_lang, &request.dest_lang, &request.text)
                .into_result()
                .await?
                .text
        } else {
            self.complete(profile, completion).await?
        };

        tracing::debug!(
            source = %source_lang,
            dest = %request.dest_lang,
            chars = text.chars().count(),
            "translation completed"
        );

        Ok(TranslationResult {
            text,
            source_lang,
            dest_lang: request.dest_lang.clone(),
            original: request.text.clone(),
        })
    }

    async fn open_translation_stream(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationStream> {
        let profile = self.config();
        request.validate(profile.max_text_chars)?;
        let style = request
            .style
            .as_ref()
            .map(StyleDescriptor::resolve)
            .transpose()?;

        let source_lang = self.resolve_source(&profile, &request).await?;
        if source_lang == request.dest_lang {
            return Ok(TranslationStream::ready(
                request.text.clone(),
                source_lang,
                request.dest_lang,
                request.text,
            ));
        }

        let completion =
            self.completion_request(&profile, &request, &source_lang, style.as_deref());
        let fragments = self.complete_stream(&profile, completion).await?;

        Ok(TranslationStream::new(
            self.until_shutdown(fragments),
            source_lang,
            request.dest_lang,
            request.text,
        ))
    }

    /// Ends `fragments` with `Cancelled` as soon as the translator is closed.
    fn until_shutdown(&self, mut fragments: FragmentStream) -> FragmentStream {
        let shutdown = self.inner.shutdown.clone();
        Box::pin(async_stream::stream! {
            loop {
                let next = tokio::select! {
                    biased;
                    () = shutdown.cancelled() => Some(Err(TranslateError::Cancelled)),
                    next = fragments.next() => next,
                };
                let Some(item) = next else { break };
                let failed = item.is_err();
                yield item;
                if failed {
                    break;
                }
            }
        })
    }

    async fn resolve_source(
        &self,
        profile: &ConfigProfile,
        request: &TranslationRequest,
    ) -> Result<String> {
        if request.source_lang != AUTO {
            return Ok(request.source_lang.clone());
        }
        let detected = self.detect_with(profile, &request.text, false).await?;
        Ok(detected.lang)
    }

    fn completion_request(
        &self,
        profile: &ConfigProfile,
        request: &TranslationRequest,
        source_lang: &str,
        style: Option<&str>,
    ) -> CompletionRequest {
        let glossary = self
            .inner
            .glossary
            .as_ref()
            .and_then(|g| g.apply(&request.text, source_lang, &request.dest_lang));

        let prompt = build_translation_prompt(
            &request.text,
            source_lang,
            &request.dest_lang,
            PromptSections {
                glossary: glossary.as_deref(),
                context: request.context.as_deref(),
                style,
            },
        );

        CompletionRequest {
            prompt,
            model: profile.model_name.clone(),
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
            timeout: profile.timeout(),
        }
    }

    async fn run_detection(&self, text: &str, enhanced: bool) -> Result<DetectionResult> {
        let profile = self.config();
        if text.trim().is_empty() {
            return Err(TranslateError::validation("text must not be empty"));
        }
        if text.chars().count() > profile.max_text_chars {
            return Err(TranslateError::validation(format!(
                "text exceeds the limit of {} characters",
                profile.max_text_chars
            )));
        }
        self.detect_with(&profile, text, enhanced).await
    }

    async fn detect_with(
        &self,
        profile: &ConfigProfile,
        text: &str,
        enhanced: bool,
    ) -> Result<DetectionResult> {
        let (prompt, max_tokens) = if enhanced {
            (enhanced_detection_prompt(text), profile.max_tokens)
        } else {
            (detection_prompt(text), DETECT_MAX_TOKENS)
        };

        let request = CompletionRequest {
            prompt,
            model: profile.model_name.clone(),
            max_tokens,
            temperature: 0.0,
            timeout: profile.timeout(),
        };

        let raw = self.complete(profile, request).await?;
        let detected = if enhanced {
            parse_enhanced_detection(&raw)?
        } else {
            parse_detection(&raw)?
        };

        tracing::debug!(
            lang = %detected.lang,
            confidence = detected.confidence,
            enhanced,
            "language detected"
        );
        Ok(detected)
    }

    async fn complete(&self, profile: &ConfigProfile, request: CompletionRequest) -> Result<String> {
        let gateway = Arc::clone(&self.inner.gateway);
        self.inner
            .retry
            .execute(profile.timeout(), move |remaining| {
                let gateway = Arc::clone(&gateway);
                let mut attempt = request.clone();
                attempt.timeout = remaining;
                async move { gateway.complete(&attempt).await }
            })
            .await
    }

    /// Opens a streaming completion; only establishing the stream is retried.
    async fn complete_stream(
        &self,
        profile: &ConfigProfile,
        request: CompletionRequest,
    ) -> Result<FragmentStream> {
        let gateway = Arc::clone(&self.inner.gateway);
        self.inner
            .retry
            .execute(profile.timeout(), move |remaining| {
                let gateway = Arc::clone(&gateway);
                let mut attempt = request.clone();
                attempt.timeout = remaining;
                async move { gateway.complete_stream(&attempt).await }
            })
            .await
    }
}

fn batch_requests<I, S>(texts: I, dest: &str, src: &str) -> Vec<TranslationRequest>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .map(|text| TranslationRequest::new(text, dest).from_lang(src))
        .collect()
}

fn log_batch_summary(results: &[Result<TranslationResult>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        total = results.len(),
        succeeded = results.len() - failed,
        failed,
        "batch finished"
    );
}
