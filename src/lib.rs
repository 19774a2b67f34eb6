//! # doubao-translate - Cached, Concurrent LLM Translation
//!
//! `doubao-translate` turns translation requests into calls to an
//! OpenAI-compatible chat completion endpoint such as Volcengine Ark
//! (Doubao). Around that single remote call it adds caching, bounded
//! retries, order-preserving batches, streaming, language detection, and
//! glossary, context and style steering.
//!
//! ## Features
//!
//! - **Caching**: identical requests within the TTL are answered locally,
//!   and concurrent identical requests share one remote call
//! - **Batches**: bounded fan-out whose results keep input order
//! - **Streaming**: fragments as they arrive, plus the assembled result
//! - **Terminology**: glossary files pin the translation of key terms
//! - **Context and style**: neighbouring paragraphs and style presets or
//!   custom style requirements steer the output
//!
//! ## Quick Start
//!
//! ```no_run
//! use doubao_translate::{ConfigOverrides, Translator};
//!
//! # async fn demo() -> doubao_translate::Result<()> {
//! let translator = Translator::with_api_key(
//!     ConfigOverrides::default(),
//!     std::env::var("DOUBAO_API_KEY").ok(),
//! )?;
//!
//! let result = translator.translate("你好世界", "en").await?;
//! println!("{result} (from {})", result.source_lang);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The `doubao` binary reads `~/.config/doubao/config.toml`:
//!
//! ```toml
//! [translator]
//! performance_mode = "balanced"
//! max_workers = 5
//! cache_ttl_seconds = 3600
//! glossary_path = "/path/to/glossary.json"
//! api_key_env = "DOUBAO_API_KEY"
//! ```

/// Order-preserving concurrent fan-out for batches.
pub mod batch;

/// Synchronous wrapper that drives the client on its own runtime.
pub mod blocking;

/// In-memory response cache with TTL expiry.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Resolved configuration profile and the file/environment loader.
pub mod config;

/// Context windows built from neighbouring paragraphs.
pub mod context;

/// Language detection prompts and response parsing.
pub mod detect;

/// Error taxonomy.
pub mod error;

/// Boundary to the remote completion API.
pub mod gateway;

/// Fixed-terminology glossary matching.
pub mod glossary;

/// Input reading from arguments, files and stdin.
pub mod input;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Retry with exponential backoff.
pub mod retry;

/// Streaming translation results.
pub mod stream;

/// Translation style presets and custom styles.
pub mod style;

/// Requests, results, prompts and the translator itself.
pub mod translation;

/// Terminal UI components (spinner, colors).
pub mod ui;

pub use config::{ConfigOverrides, ConfigProfile, PerformanceMode, PerformanceOverrides};
pub use detect::DetectionResult;
pub use error::{ErrorKind, Result, TranslateError};
pub use stream::TranslationStream;
pub use style::StyleDescriptor;
pub use translation::{TranslationRequest, TranslationResult, Translator};
