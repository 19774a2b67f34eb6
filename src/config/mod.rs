//! Configuration: the resolved [`ConfigProfile`] and the file/environment loader.

mod manager;
mod profile;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_API_KEY_ENV, ResolvedConfig, TranslatorSection,
    env_overrides, layer, resolve_config,
};
pub use profile::{
    ConfigOverrides, ConfigProfile, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECONDS,
    DEFAULT_MAX_TEXT_CHARS, DEFAULT_MAX_WORKERS, DEFAULT_MODEL, PerformanceMode,
    PerformanceOverrides, PresetLimits,
};
