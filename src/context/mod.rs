//! Neighbouring-paragraph context for document translation.

/// One paragraph together with the paragraphs around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub index: usize,
    pub text: String,
    /// Neighbours joined by newlines, or `None` when there are none.
    pub context: Option<String>,
}

/// Builds one window per paragraph.
///
/// The context of paragraph `i` is paragraphs `i - window_size ..= i + window_size`
/// without `i` itself, clipped at the document boundaries and kept in order.
pub fn build_windows<S: AsRef<str>>(paragraphs: &[S], window_size: usize) -> Vec<ContextWindow> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| {
            let start = index.saturating_sub(window_size);
            let end = index.saturating_add(window_size).min(paragraphs.len() - 1);

            let neighbours: Vec<&str> = (start..=end)
                .filter(|&i| i != index)
                .map(|i| paragraphs[i].as_ref())
                .collect();

            ContextWindow {
                index,
                text: paragraph.as_ref().to_string(),
                context: (!neighbours.is_empty()).then(|| neighbours.join("\n")),
            }
        })
        .collect()
}

/// Splits a document into paragraphs separated by blank lines.
pub fn split_paragraphs(document: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}
