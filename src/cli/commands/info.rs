//! Listing commands that never touch the network.

use anyhow::{Result, bail};

use crate::cli::{SettingsArgs, resolve_settings};
use crate::config::{
    ConfigFile, ConfigManager, ConfigProfile, DEFAULT_API_KEY_ENV, TranslatorSection,
};
use crate::style::PRESETS;
use crate::translation::SUPPORTED_LANGUAGES;
use crate::ui::Theme;

pub fn print_languages() {
    println!("{}", Theme::heading("Supported language codes"));
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {} {}", Theme::lang(code), Theme::muted(name));
    }
}

pub fn print_styles() {
    println!("{}", Theme::heading("Preset styles"));
    for preset in PRESETS {
        println!(
            "  {}  {}",
            Theme::value(format!("{:10}", preset.key)),
            Theme::muted(preset.description)
        );
    }
    println!();
    println!(
        "{}",
        Theme::muted("Custom styles: --style-rule tone=humorous --style-rule audience=children")
    );
}

/// Prints the resolved configuration, optionally writing it to a new config file.
pub fn run_config(settings: &SettingsArgs, init: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    let resolved = resolve_settings(settings)?;

    if init {
        if manager.config_path().exists() {
            bail!(
                "Config file already exists: {}",
                manager.config_path().display()
            );
        }
        manager.save(&starter_config(&resolved.profile))?;
        println!(
            "{} Configuration saved to {}",
            Theme::ok("✓"),
            Theme::muted(manager.config_path().display())
        );
        println!();
    }

    print_profile(&resolved.profile);
    println!(
        "  {} {}",
        Theme::key("api_key"),
        if resolved.api_key.is_some() {
            Theme::ok("set")
        } else {
            Theme::caution(format!("not set (export {DEFAULT_API_KEY_ENV})"))
        }
    );
    println!(
        "  {} {}",
        Theme::key("config_file"),
        Theme::muted(manager.config_path().display())
    );

    Ok(())
}

fn print_profile(profile: &ConfigProfile) {
    println!("{}", Theme::heading("Configuration"));

    let rows = [
        ("performance_mode", profile.performance_mode.to_string()),
        ("model_name", profile.model_name.clone()),
        ("base_url", profile.base_url.clone()),
        ("max_tokens", profile.max_tokens.to_string()),
        ("temperature", profile.temperature.to_string()),
        ("timeout_seconds", profile.timeout_seconds.to_string()),
        ("max_workers", profile.max_workers.to_string()),
        ("cache_ttl_seconds", profile.cache_ttl_seconds.to_string()),
        ("max_text_chars", profile.max_text_chars.to_string()),
        (
            "glossary_path",
            profile
                .glossary_path
                .as_ref()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
        ),
    ];

    for (label, value) in rows {
        println!("  {} {}", Theme::key(label), Theme::value(value));
    }
}

/// Settings worth persisting; preset-derived limits stay implicit.
fn starter_config(profile: &ConfigProfile) -> ConfigFile {
    ConfigFile {
        translator: TranslatorSection {
            performance_mode: Some(profile.performance_mode),
            max_workers: Some(profile.max_workers),
            cache_ttl_seconds: Some(profile.cache_ttl_seconds),
            glossary_path: profile.glossary_path.clone(),
            model_name: Some(profile.model_name.clone()),
            base_url: Some(profile.base_url.clone()),
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            ..TranslatorSection::default()
        },
    }
}
