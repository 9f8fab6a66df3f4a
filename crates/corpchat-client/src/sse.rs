//! Event-stream decoder
//!
//! Consumes the raw byte stream relayed from the model provider and yields
//! the incremental text deltas it carries. Lines are newline-delimited;
//! relevant lines begin with `data:` and carry either a JSON event or the
//! literal `[DONE]` sentinel.

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::error::{ChatError, Result};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

/// Push-based incremental decoder.
///
/// Bytes are buffered until a full line is available, so a delta whose UTF-8
/// sequence or JSON payload is split across chunk boundaries reassembles
/// before decoding. Once the `[DONE]` sentinel is seen the decoder is
/// terminal: anything still buffered and all later input is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk, returning every delta completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.done {
            return deltas;
        }
        self.buf.extend_from_slice(chunk);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(delta) = self.decode_line(&line) {
                deltas.push(delta);
            }
            if self.done {
                self.buf.clear();
                break;
            }
        }
        deltas
    }

    /// Drain a trailing line left unterminated when the reader is exhausted.
    pub fn finish(&mut self) -> Vec<String> {
        if self.done || self.buf.is_empty() {
            return Vec::new();
        }
        let mut rest = std::mem::take(&mut self.buf);
        rest.push(b'\n');
        self.feed(&rest)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<String> {
        // A complete line decodes cleanly: multi-byte UTF-8 sequences never
        // contain the newline byte.
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload == DONE_SENTINEL {
            self.done = true;
            return None;
        }
        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(event) => event
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty()),
            Err(err) => {
                // A single malformed event must not abort the stream.
                tracing::warn!(error = %err, "skipping malformed stream event");
                None
            }
        }
    }
}

/// Wrap a fallible byte-chunk stream into a lazy, finite, non-restartable
/// stream of text deltas.
///
/// The stream ends on the `[DONE]` sentinel or on reader exhaustion,
/// whichever comes first. A transport error is yielded once and ends the
/// stream.
pub fn delta_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<ChatError>,
{
    stream! {
        let mut decoder = SseDecoder::new();
        let mut bytes = std::pin::pin!(bytes);
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for delta in decoder.feed(chunk.as_ref()) {
                        yield Ok(delta);
                    }
                    if decoder.is_done() {
                        return;
                    }
                }
                Err(err) => {
                    yield Err(err.into());
                    return;
                }
            }
        }
        for delta in decoder.finish() {
            yield Ok(delta);
        }
    }
}
