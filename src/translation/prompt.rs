use super::language::{AUTO, language_name};
use crate::gateway::Prompt;

pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a professional translator. \
     Translate the following text from {source_language} to {target_language}. \
     Output only the translated text without any explanations. \
     Preserve the original formatting including blank lines and whitespace.";

/// Optional instruction blocks layered onto the base translation prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptSections<'a> {
    pub glossary: Option<&'a str>,
    pub context: Option<&'a str>,
    pub style: Option<&'a str>,
}

fn display_name(code: &str) -> String {
    if code == AUTO {
        return "the detected source language".to_string();
    }
    language_name(code).map_or_else(|| code.to_string(), |name| format!("{name} ({code})"))
}

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_system_prompt(source_lang: &str, target_lang: &str) -> String {
    // The braces are placeholders for string replacement, not format arguments
    SYSTEM_PROMPT_TEMPLATE
        .replace("{source_language}", &display_name(source_lang))
        .replace("{target_language}", &display_name(target_lang))
}

/// Builds the full prompt for one translation call.
pub fn build_translation_prompt(
    text: &str,
    source_lang: &str,
    target_lang: &str,
    sections: PromptSections<'_>,
) -> Prompt {
    let mut system = build_system_prompt(source_lang, target_lang);

    if let Some(glossary) = sections.glossary {
        system.push_str("\n\n");
        system.push_str(glossary);
    }
    if let Some(context) = sections.context {
        system.push_str(
            "\n\nSurrounding context, for disambiguation only. Do not translate it:\n",
        );
        system.push_str(context);
    }
    if let Some(style) = sections.style {
        system.push_str("\n\nStyle requirements:\n");
        system.push_str(style);
    }

    Prompt::new(system, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt() {
        let prompt = build_system_prompt("zh", "ja");
        assert!(prompt.contains("Japanese (ja)"));
        assert!(prompt.contains("Chinese (Simplified) (zh)"));
        assert!(prompt.contains("Translate the following text"));
    }

    #[test]
    fn test_system_prompt_template_has_placeholders() {
        assert!(SYSTEM_PROMPT_TEMPLATE.contains("{source_language}"));
        assert!(SYSTEM_PROMPT_TEMPLATE.contains("{target_language}"));
    }

    #[test]
    fn test_plain_prompt_has_no_sections() {
        let prompt = build_translation_prompt("Hello", "en", "fr", PromptSections::default());

        assert_eq!(prompt.user, "Hello");
        assert!(!prompt.system.contains("Style requirements"));
        assert!(!prompt.system.contains("Surrounding context"));
    }

    #[test]
    fn test_sections_are_appended() {
        let prompt = build_translation_prompt(
            "苹果发布了新产品。",
            "zh",
            "en",
            PromptSections {
                glossary: Some("\"AI\" → \"Artificial Intelligence\""),
                context: Some("这篇文章讨论了苹果公司的发展历程。"),
                style: Some("tone: formal"),
            },
        );

        assert!(prompt.system.contains("\"AI\" → \"Artificial Intelligence\""));
        assert!(prompt.system.contains("苹果公司的发展历程"));
        assert!(prompt.system.ends_with("Style requirements:\ntone: formal"));
        assert_eq!(prompt.user, "苹果发布了新产品。");
    }
}
