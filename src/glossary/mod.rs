//! Fixed-terminology glossary.
//!
//! The glossary file is a JSON object mapping each term to its per-language
//! translations:
//!
//! ```json
//! { "AI": { "en": "Artificial Intelligence", "zh": "人工智能" } }
//! ```
//!
//! Matching only decides which mappings to hand to the model; the model
//! performs the substitution itself.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, TranslateError};
use crate::translation::AUTO;

/// Language code to fixed translation, for one term.
pub type GlossaryEntry = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossaryMatcher {
    entries: BTreeMap<String, GlossaryEntry>,
}

impl GlossaryMatcher {
    /// Loads a glossary from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Parse`] if the file is missing, is not
    /// valid JSON, or does not have the `{term: {lang: translation}}` shape.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            TranslateError::Parse(format!(
                "Failed to read glossary file {}: {e}",
                path.display()
            ))
        })?;

        let matcher = Self::from_json_str(&contents).map_err(|e| match e {
            TranslateError::Parse(msg) => {
                TranslateError::Parse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;

        tracing::debug!(path = %path.display(), terms = matcher.len(), "loaded glossary");
        Ok(matcher)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| TranslateError::Parse(format!("malformed glossary JSON: {e}")))?;

        let Value::Object(terms) = value else {
            return Err(TranslateError::Parse(
                "glossary must be a JSON object of terms".to_string(),
            ));
        };

        let mut entries = BTreeMap::new();
        for (term, translations) in terms {
            let Value::Object(translations) = translations else {
                return Err(TranslateError::Parse(format!(
                    "glossary term '{term}' must map to an object of translations"
                )));
            };

            let mut entry = GlossaryEntry::new();
            for (lang, translation) in translations {
                let Value::String(translation) = translation else {
                    return Err(TranslateError::Parse(format!(
                        "glossary translation for '{term}' in '{lang}' must be a string"
                    )));
                };
                entry.insert(lang, translation);
            }
            entries.insert(term, entry);
        }

        Ok(Self { entries })
    }

    pub fn from_entries(entries: BTreeMap<String, GlossaryEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `(term, dest translation)` for every term found in `text`.
    ///
    /// A term matches if it occurs verbatim, or if its `src` rendering does
    /// when `src` is a concrete language. Terms lacking a `dest` translation
    /// are skipped.
    pub fn matches<'a>(&'a self, text: &str, src: &str, dest: &str) -> Vec<(&'a str, &'a str)> {
        self.entries
            .iter()
            .filter_map(|(term, entry)| {
                let target = entry.get(dest)?;
                let source_rendering = (src != AUTO)
                    .then(|| entry.get(src))
                    .flatten()
                    .filter(|s| !s.is_empty());

                let found = (!term.is_empty() && text.contains(term.as_str()))
                    || source_rendering.is_some_and(|s| text.contains(s.as_str()));

                found.then_some((term.as_str(), target.as_str()))
            })
            .collect()
    }

    /// Builds the instruction block for the terms found in `text`, or `None`
    /// if nothing matched.
    pub fn apply(&self, text: &str, src: &str, dest: &str) -> Option<String> {
        let matched = self.matches(text, src, dest);
        if matched.is_empty() {
            return None;
        }

        let mut block =
            String::from("Use exactly these fixed translations for the following terms:");
        for (term, target) in matched {
            block.push_str(&format!("\n\"{term}\" → \"{target}\""));
        }
        Some(block)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "AI": {"en": "Artificial Intelligence", "zh": "人工智能", "ja": "人工知能"},
        "ML": {"en": "Machine Learning", "zh": "机器学习"},
        "NLP": {"zh": "自然语言处理"}
    }"#;

    fn sample() -> GlossaryMatcher {
        GlossaryMatcher::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_apply_emits_mapping_line() {
        let block = sample().apply("AI is everywhere", "auto", "en").unwrap();
        assert!(block.contains("\"AI\" → \"Artificial Intelligence\""));
        assert!(!block.contains("ML"));
    }

    #[test]
    fn test_apply_no_match_returns_none() {
        assert!(sample().apply("nothing relevant", "auto", "en").is_none());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(sample().apply("ai is lowercase", "auto", "en").is_none());
    }

    #[test]
    fn test_terms_without_dest_translation_are_skipped() {
        let glossary = sample();
        let matched = glossary.matches("AI and NLP", "auto", "en");
        assert_eq!(matched, vec![("AI", "Artificial Intelligence")]);
    }

    #[test]
    fn test_overlapping_terms_all_kept() {
        let matcher = GlossaryMatcher::from_json_str(
            r#"{"Deep": {"zh": "深"}, "Deep Learning": {"zh": "深度学习"}}"#,
        )
        .unwrap();

        let matched = matcher.matches("Deep Learning rocks", "en", "zh");
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_matches_source_language_rendering() {
        let glossary = sample();
        let matched = glossary.matches("人工智能和机器学习", "zh", "en");
        assert_eq!(
            matched,
            vec![
                ("AI", "Artificial Intelligence"),
                ("ML", "Machine Learning")
            ]
        );

        // Without a concrete source language only the term itself is matched
        assert!(sample().matches("人工智能", "auto", "en").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let matcher = GlossaryMatcher::load(file.path()).unwrap();
        assert_eq!(matcher.len(), 3);
    }

    #[test]
    fn test_load_missing_file_is_parse_error() {
        let err = GlossaryMatcher::load(Path::new("/nonexistent/glossary.json")).unwrap_err();
        assert!(matches!(err, TranslateError::Parse(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            GlossaryMatcher::from_json_str("{not json"),
            Err(TranslateError::Parse(_))
        ));
    }

    #[test]
    fn test_non_object_shapes_are_rejected() {
        assert!(GlossaryMatcher::from_json_str(r#"["AI"]"#).is_err());
        assert!(GlossaryMatcher::from_json_str(r#"{"AI": "Artificial"}"#).is_err());
        assert!(GlossaryMatcher::from_json_str(r#"{"AI": {"en": 1}}"#).is_err());
    }
}
