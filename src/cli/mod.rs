//! Command-line interface definitions and handlers.

/// CLI argument parsing with clap.
pub mod args;

/// Subcommand implementations.
pub mod commands;

pub use args::{Args, Command, SettingsArgs};

use anyhow::Result;

use crate::config::{ConfigManager, ResolvedConfig, env_overrides, resolve_config};
use crate::error::{ErrorKind, TranslateError};
use crate::translation::Translator;

/// Resolves configuration from the CLI settings, environment and config file.
pub fn resolve_settings(settings: &SettingsArgs) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file = manager.load_or_default()?;
    resolve_config(&settings.to_overrides(), &env_overrides()?, &file)
}

/// Builds an HTTP-backed translator from the resolved configuration.
pub fn build_translator(settings: &SettingsArgs) -> Result<Translator> {
    let resolved = resolve_settings(settings)?;
    Ok(Translator::with_api_key(resolved.overrides, resolved.api_key)?)
}

/// Maps an error to a sysexits-style process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> exitcode::ExitCode {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<TranslateError>())
        .map(TranslateError::kind);

    match kind {
        Some(ErrorKind::Validation) => exitcode::USAGE,
        Some(ErrorKind::Config) => exitcode::CONFIG,
        Some(ErrorKind::Authentication) => exitcode::NOPERM,
        Some(ErrorKind::Transport | ErrorKind::RateLimit) => exitcode::UNAVAILABLE,
        Some(ErrorKind::InvalidResponse | ErrorKind::Api) => exitcode::PROTOCOL,
        Some(ErrorKind::Parse | ErrorKind::Detection) => exitcode::DATAERR,
        Some(ErrorKind::Cancelled) => exitcode::TEMPFAIL,
        None => exitcode::SOFTWARE,
    }
}
