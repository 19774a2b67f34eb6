mod language;
mod orchestrator;
mod prompt;
mod request;

pub use language::{
    AUTO, SUPPORTED_LANGUAGES, language_name, normalize_language, validate_language,
    validate_source_language,
};
pub use orchestrator::Translator;
pub use prompt::{
    PromptSections, SYSTEM_PROMPT_TEMPLATE, build_system_prompt, build_translation_prompt,
};
pub use request::{TranslationRequest, TranslationResult};
