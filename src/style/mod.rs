//! Translation style management.
//!
//! A style is either one of the fixed presets or a free-form list of
//! `(dimension, value)` requirements. Both resolve to instruction text that
//! is appended to the translation prompt.

use crate::error::{Result, TranslateError};

/// A preset translation style (hardcoded, not modifiable by users).
#[derive(Debug, Clone)]
pub struct PresetStyle {
    /// The style key (e.g., "casual", "formal").
    pub key: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Prompt text appended to the system prompt.
    pub prompt: &'static str,
}

/// All available preset styles.
pub const PRESETS: &[PresetStyle] = &[
    PresetStyle {
        key: "formal",
        description: "Formal, business-appropriate",
        prompt: "Use a formal, polite, business-appropriate tone with precise wording.",
    },
    PresetStyle {
        key: "casual",
        description: "Casual, conversational tone",
        prompt: "Use a casual, friendly, conversational tone.",
    },
    PresetStyle {
        key: "technical",
        description: "Technical, terminology-accurate",
        prompt: "Use accurate technical terminology and a concise, objective register \
                 suitable for documentation.",
    },
    PresetStyle {
        key: "creative",
        description: "Creative, expressive",
        prompt: "Translate expressively, favouring vivid and idiomatic phrasing over \
                 literal accuracy while keeping the meaning.",
    },
];

/// How a translation should be styled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleDescriptor {
    /// One of [`PRESETS`], by key.
    Preset(String),
    /// Ordered `(dimension, value)` requirements, e.g. `("tone", "humorous")`.
    Custom(Vec<(String, String)>),
}

impl StyleDescriptor {
    pub fn preset(key: impl Into<String>) -> Self {
        Self::Preset(key.into())
    }

    pub fn custom<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Custom(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Resolves the descriptor to the instruction text sent to the model.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] for an unknown preset or an empty
    /// custom mapping.
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::Preset(key) => get_preset(key)
                .map(|preset| preset.prompt.to_string())
                .ok_or_else(|| {
                    TranslateError::config(format!(
                        "Style '{key}' not found. Available styles: {}",
                        preset_keys().join(", ")
                    ))
                }),
            Self::Custom(pairs) if pairs.is_empty() => Err(TranslateError::config(
                "Custom style must specify at least one dimension",
            )),
            Self::Custom(pairs) => Ok(pairs
                .iter()
                .map(|(dimension, value)| format!("{dimension}: {value}"))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

impl From<&str> for StyleDescriptor {
    fn from(key: &str) -> Self {
        Self::preset(key)
    }
}

/// Looks up a preset style by key.
pub fn get_preset(key: &str) -> Option<&'static PresetStyle> {
    PRESETS.iter().find(|p| p.key == key)
}

/// Returns true if the key is a preset style.
pub fn is_preset(key: &str) -> bool {
    get_preset(key).is_some()
}

pub fn preset_keys() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.key).collect()
}

/// Parses `dimension=value` pairs as given on the command line.
///
/// # Errors
///
/// Returns [`TranslateError::Config`] if an entry has no `=` or an empty side.
pub fn parse_custom_pairs<S: AsRef<str>>(entries: &[S]) -> Result<StyleDescriptor> {
    let pairs = entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            match entry.split_once('=') {
                Some((dimension, value))
                    if !dimension.trim().is_empty() && !value.trim().is_empty() =>
                {
                    Ok((dimension.trim().to_string(), value.trim().to_string()))
                }
                _ => Err(TranslateError::config(format!(
                    "Invalid style requirement '{entry}': expected dimension=value"
                ))),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StyleDescriptor::Custom(pairs))
}
