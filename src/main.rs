use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use doubao_translate::cli::commands::{batch, detect, info, translate};
use doubao_translate::cli::{Args, Command, build_translator, exit_code_for};
use doubao_translate::input::InputSource;
use doubao_translate::translation::{Translator, validate_language, validate_source_language};
use doubao_translate::ui::Theme;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args).await {
        eprintln!("{} {err:#}", Theme::failure("Error:"));
        std::process::exit(exit_code_for(&err));
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "doubao_translate=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Languages) => {
            info::print_languages();
            return Ok(());
        }
        Some(Command::Styles) => {
            info::print_styles();
            return Ok(());
        }
        Some(Command::Config { init }) => return info::run_config(&args.settings, init),
        _ => {}
    }

    validate_language(&args.to)?;
    validate_source_language(&args.from)?;

    let translator = build_translator(&args.settings)?;
    close_on_interrupt(&translator);

    match args.command {
        Some(Command::Detect {
            text,
            file,
            enhanced,
        }) => {
            let source = InputSource::from_args(text, file);
            detect::run_detect(&translator, &source, enhanced).await
        }
        Some(Command::Batch { file }) => {
            let source = InputSource::from_args(None, file);
            batch::run_batch(&translator, &source, &args.to, &args.from).await
        }
        Some(Command::Document { file, window }) => {
            let source = InputSource::from_args(None, file);
            batch::run_document(&translator, &source, &args.to, window).await
        }
        Some(Command::Ping) => {
            translator.test_connection().await?;
            println!(
                "{} {}",
                Theme::ok("✓"),
                Theme::muted(&translator.config().base_url)
            );
            Ok(())
        }
        Some(Command::Languages | Command::Styles | Command::Config { .. }) => Ok(()),
        None => {
            let options = translate::TranslateOptions {
                source: InputSource::from_args(args.text, args.file),
                to: args.to,
                from: args.from,
                style: args.style,
                style_rules: args.style_rule,
                stream: args.stream,
            };
            translate::run_translate(&translator, options).await
        }
    }
}

/// Cancels in-flight work on Ctrl-C so pending calls settle as cancelled.
fn close_on_interrupt(translator: &Translator) {
    let translator = translator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            translator.close();
        }
    });
}
