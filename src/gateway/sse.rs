//! Server-Sent Events (SSE) parser for OpenAI-compatible streaming responses.

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

use crate::error::{Result, TranslateError};

/// One `data:` payload of a streaming chat completion.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Content(String),
    Error(String),
    Done,
    Skip,
}

/// Converts a raw SSE byte stream into a stream of text fragments.
///
/// A transport failure or an in-band error event ends the stream with a
/// single `Err` item; nothing is yielded after it.
pub fn sse_to_text_stream<E>(
    byte_stream: impl Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send
where
    E: Into<TranslateError> + Send + 'static,
{
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        // Bytes are buffered so a multi-byte character split across chunks decodes intact.
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    let err: TranslateError = e.into();
                    yield Err(TranslateError::Transport(format!("stream interrupted: {err}")));
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&line);

                match parse_sse_line(line.trim()) {
                    SseLine::Content(content) => yield Ok(content),
                    SseLine::Error(message) => {
                        yield Err(TranslateError::InvalidResponse(message));
                        return;
                    }
                    SseLine::Done => return,
                    SseLine::Skip => {}
                }
            }
        }
    }
}

/// Classifies a single trimmed SSE line.
///
/// Comments, blank lines, non-data fields, empty deltas and undecodable
/// payloads are skipped.
fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim_start();

    if payload == "[DONE]" {
        return SseLine::Done;
    }

    let Ok(event) = serde_json::from_str::<StreamEvent>(payload) else {
        return SseLine::Skip;
    };

    if let Some(error) = event.error {
        return SseLine::Error(error.message);
    }

    let content: String = event
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if content.is_empty() {
        SseLine::Skip
    } else {
        SseLine::Content(content)
    }
}
