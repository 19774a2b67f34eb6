use anyhow::{Result, bail};

use crate::context::split_paragraphs;
use crate::input::{InputReader, InputSource};
use crate::translation::{TranslationResult, Translator};
use crate::ui::{Spinner, Theme};

/// Translates each non-blank line and prints the results in input order.
pub async fn run_batch(
    translator: &Translator,
    source: &InputSource,
    to: &str,
    from: &str,
) -> Result<()> {
    let lines = InputReader::read_lines(source)?;
    if lines.is_empty() {
        bail!("Input is empty");
    }

    let spinner = Spinner::new(&format!("Translating {} lines...", lines.len()));
    let results = translator.translate_batch_async(lines, to, from).await;
    spinner.stop();

    report(&results, "\n")
}

/// Translates a document paragraph by paragraph, passing neighbours as context.
pub async fn run_document(
    translator: &Translator,
    source: &InputSource,
    to: &str,
    window: usize,
) -> Result<()> {
    let paragraphs = split_paragraphs(&InputReader::read(source)?);
    if paragraphs.is_empty() {
        bail!("Input is empty");
    }

    let spinner = Spinner::new(&format!("Translating {} paragraphs...", paragraphs.len()));
    let results = translator
        .translate_document_with_context(&paragraphs, to, window)
        .await;
    spinner.stop();

    report(&results, "\n\n")
}

fn report(results: &[crate::Result<TranslationResult>], separator: &str) -> Result<()> {
    let mut first_error = None;
    let mut failed = 0;
    let mut rendered = Vec::with_capacity(results.len());

    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(translation) => rendered.push(translation.text.clone()),
            Err(e) => {
                failed += 1;
                first_error.get_or_insert_with(|| e.clone());
                eprintln!("{} item {}: {e}", Theme::failure("Failed"), index + 1);
                rendered.push(String::new());
            }
        }
    }

    println!("{}", rendered.join(separator));

    match first_error {
        Some(e) => Err(anyhow::Error::new(e)
            .context(format!("{failed} of {} items failed to translate", results.len()))),
        None => Ok(()),
    }
}
