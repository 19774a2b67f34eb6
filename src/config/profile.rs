use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, TranslateError};

pub const DEFAULT_MODEL: &str = "doubao-1-5-pro-32k-250115";
pub const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
pub const DEFAULT_MAX_WORKERS: usize = 5;
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 4096;

/// Named preset bundling token-limit, temperature and timeout defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    Fast,
    #[default]
    Balanced,
    Accurate,
}

/// The values a [`PerformanceMode`] contributes before explicit overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetLimits {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl PerformanceMode {
    pub const ALL: [Self; 3] = [Self::Fast, Self::Balanced, Self::Accurate];

    pub const fn limits(self) -> PresetLimits {
        match self {
            Self::Fast => PresetLimits {
                max_tokens: 512,
                temperature: 0.3,
                timeout_seconds: 15,
            },
            Self::Balanced => PresetLimits {
                max_tokens: 1024,
                temperature: 0.3,
                timeout_seconds: 30,
            },
            Self::Accurate => PresetLimits {
                max_tokens: 2048,
                temperature: 0.1,
                timeout_seconds: 60,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Accurate => "accurate",
        }
    }
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceMode {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                TranslateError::config(format!(
                    "Unknown performance mode '{s}'. Available modes: fast, balanced, accurate"
                ))
            })
    }
}

/// Fields that may be changed after construction via `set_performance_config`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceOverrides {
    pub performance_mode: Option<PerformanceMode>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    pub max_workers: Option<usize>,
    pub cache_ttl_seconds: Option<u64>,
    pub max_text_chars: Option<usize>,
}

impl PerformanceOverrides {
    /// Layers `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        Self {
            performance_mode: other.performance_mode.or(self.performance_mode),
            max_tokens: other.max_tokens.or(self.max_tokens),
            temperature: other.temperature.or(self.temperature),
            timeout_seconds: other.timeout_seconds.or(self.timeout_seconds),
            max_workers: other.max_workers.or(self.max_workers),
            cache_ttl_seconds: other.cache_ttl_seconds.or(self.cache_ttl_seconds),
            max_text_chars: other.max_text_chars.or(self.max_text_chars),
        }
    }
}

/// Everything a caller may specify when constructing a translator.
///
/// Unset fields fall back to the performance-mode preset or the crate defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub performance: PerformanceOverrides,
    pub glossary_path: Option<PathBuf>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl ConfigOverrides {
    pub fn with_mode(mode: PerformanceMode) -> Self {
        Self {
            performance: PerformanceOverrides {
                performance_mode: Some(mode),
                ..PerformanceOverrides::default()
            },
            ..Self::default()
        }
    }
}

/// Fully resolved, immutable configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigProfile {
    pub performance_mode: PerformanceMode,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub max_workers: usize,
    pub cache_ttl_seconds: u64,
    pub max_text_chars: usize,
    pub glossary_path: Option<PathBuf>,
    pub model_name: String,
    pub base_url: String,
}

impl ConfigProfile {
    /// Resolves overrides against the selected preset and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Config`] if any resolved value is out of range.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let perf = &overrides.performance;
        let performance_mode = perf.performance_mode.unwrap_or_default();
        let preset = performance_mode.limits();

        let profile = Self {
            performance_mode,
            max_tokens: perf.max_tokens.unwrap_or(preset.max_tokens),
            temperature: perf.temperature.unwrap_or(preset.temperature),
            timeout_seconds: perf.timeout_seconds.unwrap_or(preset.timeout_seconds),
            max_workers: perf.max_workers.unwrap_or(DEFAULT_MAX_WORKERS),
            cache_ttl_seconds: perf.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECONDS),
            max_text_chars: perf.max_text_chars.unwrap_or(DEFAULT_MAX_TEXT_CHARS),
            glossary_path: overrides.glossary_path.clone(),
            model_name: overrides
                .model_name
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: overrides
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(TranslateError::config("max_tokens must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TranslateError::config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(TranslateError::config(
                "timeout_seconds must be greater than 0",
            ));
        }
        if self.max_workers == 0 {
            return Err(TranslateError::config("max_workers must be at least 1"));
        }
        if self.max_text_chars == 0 {
            return Err(TranslateError::config("max_text_chars must be at least 1"));
        }
        if self.model_name.trim().is_empty() {
            return Err(TranslateError::config("model_name must not be empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(TranslateError::config("base_url must not be empty"));
        }
        Ok(())
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub const fn caching_enabled(&self) -> bool {
        self.cache_ttl_seconds > 0
    }
}

impl Default for ConfigProfile {
    fn default() -> Self {
        let preset = PerformanceMode::default().limits();
        Self {
            performance_mode: PerformanceMode::default(),
            max_tokens: preset.max_tokens,
            temperature: preset.temperature,
            timeout_seconds: preset.timeout_seconds,
            max_workers: DEFAULT_MAX_WORKERS,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            glossary_path: None,
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_matches_resolved_empty_overrides() {
        let resolved = ConfigProfile::resolve(&ConfigOverrides::default()).unwrap();
        assert_eq!(resolved, ConfigProfile::default());
    }

    #[test]
    fn test_fast_preset_values() {
        let profile = ConfigProfile::resolve(&ConfigOverrides::with_mode(PerformanceMode::Fast))
            .unwrap();
        let preset = PerformanceMode::Fast.limits();

        assert_eq!(profile.performance_mode, PerformanceMode::Fast);
        assert_eq!(profile.max_tokens, preset.max_tokens);
        assert!((profile.temperature - preset.temperature).abs() < f32::EPSILON);
        assert_eq!(profile.timeout_seconds, preset.timeout_seconds);
    }

    #[test]
    fn test_explicit_override_beats_preset() {
        let mut overrides = ConfigOverrides::with_mode(PerformanceMode::Accurate);
        overrides.performance.max_tokens = Some(200);

        let profile = ConfigProfile::resolve(&overrides).unwrap();

        assert_eq!(profile.max_tokens, 200);
        assert_eq!(profile.timeout_seconds, 60);
    }

    #[test]
    fn test_merge_keeps_earlier_fields() {
        let base = PerformanceOverrides {
            performance_mode: Some(PerformanceMode::Fast),
            max_workers: Some(4),
            ..PerformanceOverrides::default()
        };
        let update = PerformanceOverrides {
            max_tokens: Some(300),
            ..PerformanceOverrides::default()
        };

        let merged = base.merged_with(&update);

        assert_eq!(merged.performance_mode, Some(PerformanceMode::Fast));
        assert_eq!(merged.max_workers, Some(4));
        assert_eq!(merged.max_tokens, Some(300));
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let mut overrides = ConfigOverrides::default();
        overrides.performance.temperature = Some(2.5);

        let err = ConfigProfile::resolve(&overrides).unwrap_err();
        assert!(matches!(err, TranslateError::Config(_)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut overrides = ConfigOverrides::default();
        overrides.performance.max_workers = Some(0);

        assert!(ConfigProfile::resolve(&overrides).is_err());
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let mut overrides = ConfigOverrides::default();
        overrides.performance.cache_ttl_seconds = Some(0);

        let profile = ConfigProfile::resolve(&overrides).unwrap();
        assert!(!profile.caching_enabled());
    }

    #[test]
    fn test_performance_mode_from_str() {
        assert_eq!("fast".parse::<PerformanceMode>().unwrap(), PerformanceMode::Fast);
        assert_eq!(
            " Accurate ".parse::<PerformanceMode>().unwrap(),
            PerformanceMode::Accurate
        );
        assert!("turbo".parse::<PerformanceMode>().is_err());
    }
}
