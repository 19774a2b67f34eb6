use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConfigOverrides, PerformanceMode, PerformanceOverrides};

#[derive(Parser, Debug)]
#[command(name = "doubao")]
#[command(about = "Cached, concurrent translation over Doubao-compatible LLM endpoints")]
#[command(version)]
pub struct Args {
    /// Text to translate (reads --file or stdin if not provided)
    pub text: Option<String>,

    /// File to translate
    #[arg(short = 'f', long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Target language code (e.g., en, ja, zh-TW)
    #[arg(short = 't', long = "to", default_value = "en", global = true)]
    pub to: String,

    /// Source language code, or "auto" to detect it
    #[arg(long = "from", default_value = "auto", global = true)]
    pub from: String,

    /// Preset style (formal, casual, technical, creative)
    #[arg(short = 's', long, conflicts_with = "style_rule")]
    pub style: Option<String>,

    /// Custom style rule as DIMENSION=VALUE (repeatable)
    #[arg(long = "style-rule", value_name = "DIM=VALUE")]
    pub style_rule: Vec<String>,

    /// Print the translation as it arrives
    #[arg(long)]
    pub stream: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options that feed the translator's configuration.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Performance mode (fast, balanced, accurate)
    #[arg(short = 'm', long, global = true)]
    pub mode: Option<PerformanceMode>,

    /// Model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Maximum concurrent requests
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Glossary JSON file
    #[arg(long, global = true)]
    pub glossary: Option<PathBuf>,

    /// Disable the response cache
    #[arg(short = 'n', long, global = true)]
    pub no_cache: bool,
}

impl SettingsArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            performance: PerformanceOverrides {
                performance_mode: self.mode,
                max_workers: self.workers,
                cache_ttl_seconds: self.no_cache.then_some(0),
                ..PerformanceOverrides::default()
            },
            glossary_path: self.glossary.clone(),
            model_name: self.model.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect the language of a text
    Detect {
        /// Text to inspect (reads --file or stdin if not provided)
        text: Option<String>,

        /// File to inspect
        #[arg(short = 'f', long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Report every language found in mixed-language text
        #[arg(short = 'e', long)]
        enhanced: bool,
    },
    /// Translate every non-blank line of a file concurrently
    Batch {
        /// File with one text per line (reads stdin if not provided)
        file: Option<PathBuf>,
    },
    /// Translate a document paragraph by paragraph with surrounding context
    Document {
        /// Document file (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Neighbouring paragraphs on each side passed as context
        #[arg(short = 'w', long, default_value_t = 1)]
        window: usize,
    },
    /// List supported language codes
    Languages,
    /// List preset translation styles
    Styles,
    /// Show the resolved configuration
    Config {
        /// Write a config file with the current settings if none exists
        #[arg(long)]
        init: bool,
    },
    /// Check that the endpoint accepts the configured credentials
    Ping,
}
