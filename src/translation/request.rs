use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

use super::language::{AUTO, validate_language, validate_source_language};
use super::prompt::SYSTEM_PROMPT_TEMPLATE;
use crate::error::{Result, TranslateError};
use crate::style::StyleDescriptor;

/// One translation as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    /// A supported code, or [`AUTO`] to detect it.
    pub source_lang: String,
    pub dest_lang: String,
    pub style: Option<StyleDescriptor>,
    pub context: Option<String>,
    pub stream: bool,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, dest_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: AUTO.to_string(),
            dest_lang: dest_lang.into(),
            style: None,
            context: None,
            stream: false,
        }
    }

    #[must_use]
    pub fn from_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: StyleDescriptor) -> Self {
        self.style = Some(style);
        self
    }

    /// Attaches disambiguating context; blank context is treated as none.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.trim().is_empty()).then_some(context);
        self
    }

    #[must_use]
    pub const fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Checks text and language codes before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Validation`] for blank or over-long text or
    /// an unrecognized language code.
    pub fn validate(&self, max_text_chars: usize) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(TranslateError::validation("text must not be empty"));
        }

        let chars = self.text.chars().count();
        if chars > max_text_chars {
            return Err(TranslateError::validation(format!(
                "text is {chars} characters long; the limit is {max_text_chars}"
            )));
        }

        validate_language(&self.dest_lang)?;
        validate_source_language(&self.source_lang)
    }

    /// Compute the cache fingerprint for this request.
    ///
    /// `style_instruction` is the resolved style text, so two descriptors
    /// that resolve identically share cache entries.
    pub fn fingerprint(&self, style_instruction: Option<&str>, model: &str) -> String {
        let cache_input = serde_json::json!({
            "text": self.text,
            "source_lang": self.source_lang,
            "dest_lang": self.dest_lang,
            "style": style_instruction,
            "context": self.context,
            "stream": self.stream,
            "model": model,
            "prompt_hash": Self::prompt_hash(),
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compute hash of the system prompt template
    pub fn prompt_hash() -> String {
        let mut hasher = Sha256::new();
        hasher.update(SYSTEM_PROMPT_TEMPLATE.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A completed translation. `Display` yields the translated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub text: String,
    /// The resolved source language, never `auto`.
    pub source_lang: String,
    pub dest_lang: String,
    pub original: String,
}

impl fmt::Display for TranslationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
