//! Subcommand implementations.

/// Line-per-text batch translation.
pub mod batch;

/// Language detection command handler.
pub mod detect;

/// Listing commands: languages, styles and configuration.
pub mod info;

/// Translation command handler.
pub mod translate;
