use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::profile::{ConfigOverrides, ConfigProfile, PerformanceMode, PerformanceOverrides};
use crate::paths;

/// Environment variable consulted for the API key when `api_key_env` is unset.
pub const DEFAULT_API_KEY_ENV: &str = "DOUBAO_API_KEY";

const ENV_MODEL: &str = "DOUBAO_MODEL";
const ENV_PERFORMANCE_MODE: &str = "DOUBAO_PERFORMANCE_MODE";
const ENV_BASE_URL: &str = "DOUBAO_BASE_URL";

/// Settings in the `[translator]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslatorSection {
    pub performance_mode: Option<PerformanceMode>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    pub max_workers: Option<usize>,
    pub cache_ttl_seconds: Option<u64>,
    pub max_text_chars: Option<usize>,
    pub glossary_path: Option<PathBuf>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    /// API key stored directly in config (not recommended).
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,
}

impl TranslatorSection {
    /// Gets the API key, preferring the environment variable over the config file.
    pub fn get_api_key(&self) -> Option<String> {
        let env_var = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            performance: PerformanceOverrides {
                performance_mode: self.performance_mode,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                timeout_seconds: self.timeout_seconds,
                max_workers: self.max_workers,
                cache_ttl_seconds: self.cache_ttl_seconds,
                max_text_chars: self.max_text_chars,
            },
            glossary_path: self.glossary_path.clone(),
            model_name: self.model_name.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/doubao/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub translator: TranslatorSection,
}

/// Configuration after merging CLI options, environment and the config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub profile: ConfigProfile,
    /// The construction overrides the profile was resolved from.
    pub overrides: ConfigOverrides,
    pub api_key: Option<String>,
}

/// Reads the `DOUBAO_*` environment variables into overrides.
///
/// # Errors
///
/// Returns an error if `DOUBAO_PERFORMANCE_MODE` names an unknown mode.
pub fn env_overrides() -> Result<ConfigOverrides> {
    let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    let performance_mode = non_empty(ENV_PERFORMANCE_MODE)
        .map(|mode| mode.parse::<PerformanceMode>())
        .transpose()
        .with_context(|| format!("Invalid {ENV_PERFORMANCE_MODE}"))?;

    Ok(ConfigOverrides {
        performance: PerformanceOverrides {
            performance_mode,
            ..PerformanceOverrides::default()
        },
        model_name: non_empty(ENV_MODEL),
        base_url: non_empty(ENV_BASE_URL),
        ..ConfigOverrides::default()
    })
}

/// Layers `top` over `base`; any field set in `top` wins.
pub fn layer(base: &ConfigOverrides, top: &ConfigOverrides) -> ConfigOverrides {
    ConfigOverrides {
        performance: base.performance.merged_with(&top.performance),
        glossary_path: top.glossary_path.clone().or_else(|| base.glossary_path.clone()),
        model_name: top.model_name.clone().or_else(|| base.model_name.clone()),
        base_url: top.base_url.clone().or_else(|| base.base_url.clone()),
    }
}

/// Resolves configuration by merging CLI options, environment and config file.
///
/// Priority (highest first): CLI, environment, config file, preset defaults.
///
/// # Errors
///
/// Returns an error if the merged values do not form a valid profile.
pub fn resolve_config(
    cli: &ConfigOverrides,
    env: &ConfigOverrides,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let file = config_file.translator.to_overrides();
    let overrides = layer(&layer(&file, env), cli);

    let profile = ConfigProfile::resolve(&overrides).context("Invalid translator configuration")?;

    if let Some(path) = &profile.glossary_path
        && !path.exists()
    {
        bail!(
            "Glossary file not found: {}\n\n\
             Fix glossary_path in ~/.config/doubao/config.toml or pass --glossary",
            path.display()
        );
    }

    Ok(ResolvedConfig {
        profile,
        overrides,
        api_key: config_file.translator.get_api_key(),
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/doubao/config.toml`
    /// or `~/.config/doubao/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        Ok(())
    }

    /// Loads the config file, treating a missing file as empty.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> ConfigManager {
        ConfigManager {
            config_path: temp_dir.path().join("config.toml"),
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let config = ConfigFile {
            translator: TranslatorSection {
                performance_mode: Some(PerformanceMode::Fast),
                max_workers: Some(8),
                model_name: Some("doubao-lite".to_string()),
                ..TranslatorSection::default()
            },
        };

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.translator.performance_mode, Some(PerformanceMode::Fast));
        assert_eq!(loaded.translator.max_workers, Some(8));
        assert_eq!(loaded.translator.model_name, Some("doubao-lite".to_string()));
    }

    #[test]
    fn test_parse_toml_section() {
        let config: ConfigFile = toml::from_str(
            r#"
            [translator]
            performance_mode = "accurate"
            temperature = 0.2
            cache_ttl_seconds = 0
            "#,
        )
        .unwrap();

        assert_eq!(
            config.translator.performance_mode,
            Some(PerformanceMode::Accurate)
        );
        assert_eq!(config.translator.cache_ttl_seconds, Some(0));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        assert!(manager.load().is_err());
        assert!(manager.load_or_default().is_ok());
    }

    #[test]
    fn test_load_or_default_reports_broken_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        fs::write(manager.config_path(), "[translator\nmax_tokens = ").unwrap();

        assert!(manager.load_or_default().is_err());
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_env() {
        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::set_var("DOUBAO_TEST_API_KEY", "test-key-value");
        }

        let section = TranslatorSection {
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("DOUBAO_TEST_API_KEY".to_string()),
            ..TranslatorSection::default()
        };

        assert_eq!(section.get_api_key(), Some("test-key-value".to_string()));

        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::remove_var("DOUBAO_TEST_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_get_api_key_fallback() {
        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::remove_var("DOUBAO_TEST_MISSING_KEY");
        }

        let section = TranslatorSection {
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("DOUBAO_TEST_MISSING_KEY".to_string()),
            ..TranslatorSection::default()
        };

        assert_eq!(section.get_api_key(), Some("fallback-key".to_string()));
    }

    #[test]
    #[serial]
    fn test_env_overrides_reads_doubao_vars() {
        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::set_var(ENV_MODEL, "doubao-env-model");
            std::env::set_var(ENV_PERFORMANCE_MODE, "fast");
            std::env::remove_var(ENV_BASE_URL);
        }

        let env = env_overrides().unwrap();

        assert_eq!(env.model_name, Some("doubao-env-model".to_string()));
        assert_eq!(env.performance.performance_mode, Some(PerformanceMode::Fast));
        assert!(env.base_url.is_none());

        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::remove_var(ENV_MODEL);
            std::env::remove_var(ENV_PERFORMANCE_MODE);
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides_rejects_unknown_mode() {
        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::set_var(ENV_PERFORMANCE_MODE, "warp");
        }

        assert!(env_overrides().is_err());

        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::remove_var(ENV_PERFORMANCE_MODE);
        }
    }

    #[test]
    fn test_resolve_config_falls_back_to_file() {
        let config = ConfigFile {
            translator: TranslatorSection {
                performance_mode: Some(PerformanceMode::Accurate),
                max_workers: Some(2),
                ..TranslatorSection::default()
            },
        };

        let resolved =
            resolve_config(&ConfigOverrides::default(), &ConfigOverrides::default(), &config)
                .unwrap();

        assert_eq!(resolved.profile.performance_mode, PerformanceMode::Accurate);
        assert_eq!(resolved.profile.max_workers, 2);
        assert_eq!(resolved.profile.timeout_seconds, 60);
    }

    #[test]
    fn test_resolve_config_missing_glossary_file() {
        let cli = ConfigOverrides {
            glossary_path: Some(PathBuf::from("/nonexistent/glossary.json")),
            ..ConfigOverrides::default()
        };

        let result = resolve_config(&cli, &ConfigOverrides::default(), &ConfigFile::default());

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Glossary file not found"));
    }

    #[test]
    fn test_resolve_config_invalid_values() {
        let config = ConfigFile {
            translator: TranslatorSection {
                temperature: Some(5.0),
                ..TranslatorSection::default()
            },
        };

        let result =
            resolve_config(&ConfigOverrides::default(), &ConfigOverrides::default(), &config);

        assert!(result.is_err());
    }
}
