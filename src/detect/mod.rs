//! Language detection through constrained completions.
//!
//! Plain detection asks the model for `<code>|<confidence>`. Enhanced
//! detection asks for a JSON classification of mixed-language text. Both
//! parsers are tolerant of the formatting noise models tend to add.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, TranslateError};
use crate::gateway::Prompt;
use crate::translation::normalize_language;

const DETECT_SYSTEM_PROMPT: &str = "You are a language identification engine. \
     Identify the dominant language of the user's text. \
     Reply with a single line of the form <code>|<confidence>, where <code> is an \
     ISO 639-1 language code (use zh for Simplified Chinese and zh-TW for Traditional \
     Chinese) and <confidence> is a number between 0 and 1. Reply with nothing else.";

const DETECT_ENHANCED_SYSTEM_PROMPT: &str = "You are a language identification engine. \
     Analyse the user's text, which may mix several languages. \
     Reply with only a JSON object of the form \
     {\"language\": \"<dominant ISO 639-1 code>\", \"confidence\": <0..1>, \
     \"mixed_languages\": [\"<code>\", ...], \
     \"segments\": [{\"text\": \"<segment>\", \"language\": \"<code>\"}, ...]}. \
     Use zh for Simplified Chinese and zh-TW for Traditional Chinese.";

/// One contiguous run of text in a single language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSegment {
    pub text: String,
    pub lang: String,
}

/// Composition of mixed-language text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnhancedDetection {
    pub mixed_languages: BTreeSet<String>,
    pub segments: Vec<LanguageSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub lang: String,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    pub enhanced: Option<EnhancedDetection>,
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detected(lang={}, confidence={:.2})",
            self.lang, self.confidence
        )
    }
}

pub fn detection_prompt(text: &str) -> Prompt {
    Prompt::new(DETECT_SYSTEM_PROMPT, text)
}

pub fn enhanced_detection_prompt(text: &str) -> Prompt {
    Prompt::new(DETECT_ENHANCED_SYSTEM_PROMPT, text)
}

fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn recognized(raw: &str) -> Result<String> {
    normalize_language(raw)
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Detection(format!("unrecognized language code '{raw}'")))
}

/// Parses `<code>|<confidence>` or a bare code (confidence 1.0).
///
/// # Errors
///
/// Returns [`TranslateError::Detection`] if no supported language code can
/// be extracted.
pub fn parse_detection(raw: &str) -> Result<DetectionResult> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| TranslateError::Detection("empty detection response".to_string()))?;

    let (code, confidence) = match line.split_once('|') {
        Some((code, confidence)) => {
            let confidence = confidence
                .trim()
                .trim_end_matches(|c: char| !c.is_ascii_digit())
                .parse::<f32>()
                .map_err(|_| {
                    TranslateError::Detection(format!("unparseable confidence in '{line}'"))
                })?;
            (code, confidence)
        }
        None => (line, 1.0),
    };

    Ok(DetectionResult {
        lang: recognized(code)?,
        confidence: clamp_confidence(confidence),
        enhanced: None,
    })
}

#[derive(Debug, Deserialize)]
struct RawEnhanced {
    language: String,
    #[serde(default = "full_confidence")]
    confidence: f32,
    #[serde(default)]
    mixed_languages: Vec<String>,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    text: String,
    language: String,
}

const fn full_confidence() -> f32 {
    1.0
}

/// Strips a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

/// Parses the JSON classification returned for enhanced detection.
///
/// Segments and mixed languages with unrecognized codes are dropped; the
/// dominant language must be recognized.
///
/// # Errors
///
/// Returns [`TranslateError::Detection`] if the output is not the expected
/// JSON object or its dominant language is unrecognized.
pub fn parse_enhanced_detection(raw: &str) -> Result<DetectionResult> {
    let parsed: RawEnhanced = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| TranslateError::Detection(format!("unparseable enhanced detection: {e}")))?;

    let lang = recognized(&parsed.language)?;

    let segments: Vec<LanguageSegment> = parsed
        .segments
        .into_iter()
        .filter_map(|s| {
            normalize_language(&s.language).map(|code| LanguageSegment {
                text: s.text,
                lang: code.to_string(),
            })
        })
        .collect();

    let mut mixed_languages: BTreeSet<String> = parsed
        .mixed_languages
        .iter()
        .filter_map(|code| normalize_language(code))
        .map(str::to_string)
        .collect();
    mixed_languages.extend(segments.iter().map(|s| s.lang.clone()));
    mixed_languages.insert(lang.clone());

    Ok(DetectionResult {
        lang,
        confidence: clamp_confidence(parsed.confidence),
        enhanced: Some(EnhancedDetection {
            mixed_languages,
            segments,
        }),
    })
}
