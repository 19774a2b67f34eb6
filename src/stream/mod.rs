//! Incremental delivery of a streaming translation.

use futures_util::stream::{FusedStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use crate::error::{Result, TranslateError};
use crate::gateway::FragmentStream;
use crate::translation::TranslationResult;

/// A single-pass stream of translation fragments.
///
/// Each item carries one fragment as its `text`. The concatenation seen so
/// far is available through [`assembled`](Self::assembled). After the last
/// fragment or the first error the stream yields `None`. Dropping it
/// releases the underlying connection.
pub struct TranslationStream {
    fragments: Option<FragmentStream>,
    assembled: String,
    source_lang: String,
    dest_lang: String,
    original: String,
}

impl TranslationStream {
    pub fn new(
        fragments: FragmentStream,
        source_lang: impl Into<String>,
        dest_lang: impl Into<String>,
        original: impl Into<String>,
    ) -> Self {
        Self {
            fragments: Some(fragments),
            assembled: String::new(),
            source_lang: source_lang.into(),
            dest_lang: dest_lang.into(),
            original: original.into(),
        }
    }

    /// A stream that yields `text` as its only fragment.
    pub fn ready(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        dest_lang: impl Into<String>,
        original: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self::new(
            futures_util::stream::once(async move { Ok(text) }).boxed(),
            source_lang,
            dest_lang,
            original,
        )
    }

    pub fn assembled(&self) -> &str {
        &self.assembled
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    /// Releases the connection without consuming the remaining fragments.
    pub fn close(&mut self) {
        self.fragments = None;
    }

    /// Drains the remaining fragments and returns the complete translation.
    ///
    /// # Errors
    ///
    /// Returns the stream's error if it terminated abnormally, or
    /// [`TranslateError::InvalidResponse`] if it produced no text.
    pub async fn into_result(mut self) -> Result<TranslationResult> {
        while let Some(item) = self.next().await {
            item?;
        }

        if self.assembled.trim().is_empty() {
            return Err(TranslateError::InvalidResponse(
                "stream ended without any text".to_string(),
            ));
        }

        Ok(TranslationResult {
            text: self.assembled,
            source_lang: self.source_lang,
            dest_lang: self.dest_lang,
            original: self.original,
        })
    }

    fn fragment_result(&self, text: String) -> TranslationResult {
        TranslationResult {
            text,
            source_lang: self.source_lang.clone(),
            dest_lang: self.dest_lang.clone(),
            original: self.original.clone(),
        }
    }
}

impl Stream for TranslationStream {
    type Item = Result<TranslationResult>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(fragments) = this.fragments.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(fragments.as_mut().poll_next(cx)) {
            Some(Ok(fragment)) => {
                this.assembled.push_str(&fragment);
                Poll::Ready(Some(Ok(this.fragment_result(fragment))))
            }
            Some(Err(e)) => {
                this.fragments = None;
                Poll::Ready(Some(Err(e)))
            }
            None => {
                this.fragments = None;
                Poll::Ready(None)
            }
        }
    }
}

impl FusedStream for TranslationStream {
    fn is_terminated(&self) -> bool {
        self.fragments.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fragments(items: Vec<Result<String>>) -> FragmentStream {
        futures_util::stream::iter(items).boxed()
    }

    fn create_test_stream(items: Vec<Result<String>>) -> TranslationStream {
        TranslationStream::new(fragments(items), "en", "fr", "Hello world")
    }

    #[tokio::test]
    async fn test_yields_fragments_and_assembles() {
        let mut stream = create_test_stream(vec![Ok("Bonjour".into()), Ok(" le monde".into())]);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.text, "Bonjour");
        assert_eq!(first.source_lang, "en");
        assert_eq!(stream.assembled(), "Bonjour");

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.text, " le monde");
        assert_eq!(stream.assembled(), "Bonjour le monde");

        assert!(stream.next().await.is_none());
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    async fn test_into_result_concatenates() {
        let stream = create_test_stream(vec![Ok("Bon".into()), Ok("jour".into())]);
        let result = stream.into_result().await.unwrap();

        assert_eq!(result.text, "Bonjour");
        assert_eq!(result.original, "Hello world");
    }

    #[tokio::test]
    async fn test_error_terminates_stream() {
        let mut stream = create_test_stream(vec![
            Ok("Bon".into()),
            Err(TranslateError::Transport("reset".into())),
            Ok("never".into()),
        ]);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await,
            Some(Err(TranslateError::Transport(_)))
        ));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.assembled(), "Bon");
    }

    #[tokio::test]
    async fn test_into_result_propagates_error() {
        let stream = create_test_stream(vec![Err(TranslateError::Transport("reset".into()))]);
        assert!(stream.into_result().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_stream_is_invalid_response() {
        let stream = create_test_stream(vec![]);
        assert!(matches!(
            stream.into_result().await,
            Err(TranslateError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_close_stops_iteration() {
        let mut stream = create_test_stream(vec![Ok("a".into()), Ok("b".into())]);
        stream.close();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_ready_stream() {
        let stream = TranslationStream::ready("same", "en", "en", "same");
        assert_eq!(stream.into_result().await.unwrap().text, "same");
    }
}
