use anyhow::{Result, bail};

use crate::detect::DetectionResult;
use crate::input::{InputReader, InputSource};
use crate::translation::{Translator, language_name};
use crate::ui::{Spinner, Theme};

pub async fn run_detect(
    translator: &Translator,
    source: &InputSource,
    enhanced: bool,
) -> Result<()> {
    let text = InputReader::read(source)?;
    if text.trim().is_empty() {
        bail!("Input is empty");
    }

    let spinner = Spinner::new("Detecting...");
    let result = if enhanced {
        translator.detect_enhanced(&text).await
    } else {
        translator.detect(&text).await
    };
    spinner.stop();

    print_detection(&result?);
    Ok(())
}

fn print_detection(result: &DetectionResult) {
    println!(
        "{}  {}  {}",
        Theme::lang(&result.lang),
        Theme::muted(language_name(&result.lang).unwrap_or("Unknown")),
        Theme::confidence(result.confidence)
    );

    let Some(enhanced) = &result.enhanced else {
        return;
    };

    if enhanced.mixed_languages.len() > 1 {
        let langs: Vec<&str> = enhanced.mixed_languages.iter().map(String::as_str).collect();
        println!("{} {}", Theme::muted("Mixed:"), langs.join(", "));
    }

    for segment in &enhanced.segments {
        println!("  {}  {}", Theme::lang(&segment.lang), segment.text);
    }
}
