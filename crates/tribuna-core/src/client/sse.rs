//! Decoder for the backend's `data: <json>` line stream.
//!
//! The streaming endpoint frames events as newline-terminated `data:` lines
//! rather than full Server-Sent Events (no blank-line separators are
//! guaranteed), so events are dispatched per line. Bytes arrive in arbitrary
//! chunks; an internal buffer carries partial lines, and because splitting
//! happens on the ASCII newline byte, multi-byte UTF-8 sequences split
//! across chunk reads reassemble before decoding.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use crate::client::{ClientError, ClientErrorKind};
use crate::client::types::StreamEvent;

/// Streaming decoder over a chunked byte stream.
///
/// Yields one [`StreamEvent`] per well-formed `data:` line. Lines that are
/// blank, carry no `data:` prefix, or fail to parse as event JSON are
/// skipped with a warning; only transport failures end the stream with an
/// error.
pub struct EventLineDecoder<S> {
    inner: S,
    buffer: Vec<u8>,
    pending: VecDeque<StreamEvent>,
    exhausted: bool,
}

impl<S> EventLineDecoder<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.decode_line(&line[..newline]);
        }
    }

    /// Flushes whatever remains in the buffer as a final unterminated line.
    fn finish(&mut self) {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line);
        }
        self.exhausted = true;
    }

    fn decode_line(&mut self, raw: &[u8]) {
        let Ok(line) = std::str::from_utf8(raw) else {
            tracing::warn!("skipping non-UTF-8 stream line");
            return;
        };
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return;
        }
        let Some(data) = line.strip_prefix("data:") else {
            tracing::debug!(line, "skipping non-data stream line");
            return;
        };

        match serde_json::from_str::<StreamEvent>(data.trim_start()) {
            Ok(event) => self.pending.push_back(event),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed stream event");
            }
        }
    }
}

impl<S, E> Stream for EventLineDecoder<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = Result<StreamEvent, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if self.exhausted {
                return Poll::Ready(None);
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => self.push_chunk(&chunk),
                Poll::Ready(Some(Err(err))) => {
                    self.exhausted = true;
                    return Poll::Ready(Some(Err(ClientError::new(
                        ClientErrorKind::Connect,
                        format!("stream read failed: {err}"),
                    ))));
                }
                Poll::Ready(None) => self.finish(),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures_util::StreamExt;

    use super::*;

    /// Builds a byte stream delivering `chunks` one poll at a time.
    fn mock_byte_stream(
        chunks: Vec<&[u8]>,
    ) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Unpin {
        futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect_events(chunks: Vec<&[u8]>) -> Vec<StreamEvent> {
        EventLineDecoder::new(mock_byte_stream(chunks))
            .map(|event| event.unwrap())
            .collect()
            .await
    }

    fn token(content: &str) -> StreamEvent {
        StreamEvent::Token {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_decodes_whole_lines() {
        let events = collect_events(vec![
            b"data: {\"type\":\"token\",\"content\":\"Hola\"}\n",
            b"data: {\"type\":\"done\",\"thread_id\":\"t1\"}\n",
        ])
        .await;
        assert_eq!(
            events,
            vec![
                token("Hola"),
                StreamEvent::Done {
                    thread_id: Some("t1".to_string())
                }
            ]
        );
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let events = collect_events(vec![
            b"data: {\"type\":\"tok",
            b"en\",\"content\":\"El programa\"}\ndata: {\"type\":\"done\"}\n",
        ])
        .await;
        assert_eq!(
            events,
            vec![token("El programa"), StreamEvent::Done { thread_id: None }]
        );
    }

    #[tokio::test]
    async fn test_utf8_sequence_split_across_chunks() {
        // "ocurrió" with the two bytes of 'ó' delivered in separate chunks.
        let full = "data: {\"type\":\"token\",\"content\":\"ocurrió\"}\n".as_bytes();
        let split = full.len() - 4;
        let events = collect_events(vec![&full[..split], &full[split..]]).await;
        assert_eq!(events, vec![token("ocurrió")]);
    }

    #[tokio::test]
    async fn test_malformed_event_is_skipped() {
        let events = collect_events(vec![
            b"data: {not json}\n",
            b"data: {\"type\":\"token\",\"content\":\"sigue\"}\n",
        ])
        .await;
        assert_eq!(events, vec![token("sigue")]);
    }

    #[tokio::test]
    async fn test_crlf_and_blank_lines_tolerated() {
        let events = collect_events(vec![
            b"data: {\"type\":\"token\",\"content\":\"a\"}\r\n\r\n",
            b"data: {\"type\":\"done\"}\r\n",
        ])
        .await;
        assert_eq!(events, vec![token("a"), StreamEvent::Done { thread_id: None }]);
    }

    #[tokio::test]
    async fn test_unterminated_final_line_flushes_at_eof() {
        let events = collect_events(vec![b"data: {\"type\":\"done\",\"thread_id\":\"t2\"}"]).await;
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                thread_id: Some("t2".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_non_data_lines_are_skipped() {
        let events = collect_events(vec![
            b": keepalive\nevent: message\ndata: {\"type\":\"token\",\"content\":\"ok\"}\n",
        ])
        .await;
        assert_eq!(events, vec![token("ok")]);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"type\":\"token\",\"content\":\"a\"}\n",
            )),
            Err(std::io::Error::other("reset by peer")),
        ];
        let mut decoder = EventLineDecoder::new(futures_util::stream::iter(chunks));

        let first = decoder.next().await.unwrap().unwrap();
        assert_eq!(first, token("a"));
        let err = decoder.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind, ClientErrorKind::Connect);
    }
}
