use anyhow::{Result, bail};
use futures_util::StreamExt;
use std::io::{self, Write};

use crate::input::{InputReader, InputSource};
use crate::style::{StyleDescriptor, parse_custom_pairs};
use crate::translation::{TranslationRequest, Translator};
use crate::ui::Spinner;

pub struct TranslateOptions {
    pub source: InputSource,
    pub to: String,
    pub from: String,
    pub style: Option<String>,
    pub style_rules: Vec<String>,
    pub stream: bool,
}

impl TranslateOptions {
    fn style(&self) -> Result<Option<StyleDescriptor>> {
        if !self.style_rules.is_empty() {
            return Ok(Some(parse_custom_pairs(&self.style_rules)?));
        }
        Ok(self.style.as_deref().map(StyleDescriptor::preset))
    }
}

pub async fn run_translate(translator: &Translator, options: TranslateOptions) -> Result<()> {
    let source_text = InputReader::read(&options.source)?;

    if source_text.trim().is_empty() {
        bail!("Input is empty");
    }

    let mut request = TranslationRequest::new(source_text, options.to.as_str())
        .from_lang(options.from.as_str());
    if let Some(style) = options.style()? {
        request = request.with_style(style);
    }

    if options.stream {
        return stream_translation(translator, request).await;
    }

    let spinner = Spinner::new("Translating...");
    let result = translator.translate_request(request).await;
    spinner.stop();

    println!("{}", result?.text);
    Ok(())
}

async fn stream_translation(translator: &Translator, request: TranslationRequest) -> Result<()> {
    let spinner = Spinner::new("Translating...");
    let mut stream = translator.translate_stream(request.streaming(true)).await?;
    let mut first_chunk = true;

    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;

        if first_chunk {
            spinner.stop();
            first_chunk = false;
        }

        print!("{}", fragment.text);
        io::stdout().flush()?;
    }

    if first_chunk {
        spinner.stop();
    }

    if !stream.assembled().is_empty() {
        println!();
    }

    Ok(())
}
