//! Line-oriented SSE relay from the backend to one client
//!
//! Each upstream line becomes at most one downstream frame:
//!
//! - `data: [DONE]` is forwarded as the sentinel and ends the relay
//! - other `data:` payloads get their `model` rewritten; undecodable ones are dropped
//! - blank separators are swallowed (every emitted data frame carries its own)
//! - anything else (`event:`, `id:`, `retry:`, comments) passes through verbatim

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;
use crate::translate::rewrite_chunk;

const DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

/// How a relay ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The sentinel was forwarded
    Done,
    /// The client went away or the token fired
    Cancelled,
    /// The backend closed the stream without a sentinel
    UpstreamClosed,
    /// Reading from the backend failed mid-stream
    UpstreamFailed,
}

/// Pump `upstream` into `sink` until the sentinel, EOF, an error or cancellation
///
/// The sink is dropped on return, which ends the downstream body. The
/// upstream stream is dropped too, closing the backend connection.
pub async fn relay<S>(
    mut upstream: S,
    requested_model: &str,
    sink: mpsc::Sender<Bytes>,
    cancel: &CancellationToken,
) -> RelayOutcome
where
    S: Stream<Item = Result<Bytes, LlmError>> + Unpin,
{
    let mut relay = Relay {
        model: requested_model,
        sink,
        cancel,
        frames: 0,
    };
    let mut lines = LineBuffer::default();

    let outcome = loop {
        if cancel.is_cancelled() {
            break RelayOutcome::Cancelled;
        }

        if let Some(line) = lines.next_line() {
            match relay.handle_line(&line).await {
                Some(outcome) => break outcome,
                None => continue,
            }
        }

        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => break RelayOutcome::Cancelled,
            next = upstream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => lines.extend(&chunk),
            Some(Err(e)) => {
                tracing::warn!(error = %e, frames = relay.frames, "backend stream failed");
                break RelayOutcome::UpstreamFailed;
            }
            None => {
                if let Some(line) = lines.finish()
                    && let Some(outcome) = relay.handle_line(&line).await
                {
                    break outcome;
                }
                break RelayOutcome::UpstreamClosed;
            }
        }
    };

    tracing::debug!(outcome = ?outcome, frames = relay.frames, "relay finished");
    outcome
}

struct Relay<'a> {
    model: &'a str,
    sink: mpsc::Sender<Bytes>,
    cancel: &'a CancellationToken,
    frames: usize,
}

impl Relay<'_> {
    /// Process one upstream line; `Some` ends the relay
    async fn handle_line(&mut self, line: &[u8]) -> Option<RelayOutcome> {
        let frame = match classify(line) {
            Line::Blank => return None,
            Line::Done => {
                return Some(if self.emit(Bytes::from_static(DONE_FRAME)).await {
                    RelayOutcome::Done
                } else {
                    RelayOutcome::Cancelled
                });
            }
            Line::Data(payload) => match self.rewrite(payload) {
                Some(json) => Bytes::from(format!("data: {json}\n\n")),
                None => return None,
            },
            Line::Other(line) => {
                let mut frame = BytesMut::with_capacity(line.len() + 1);
                frame.extend_from_slice(line);
                frame.extend_from_slice(b"\n");
                frame.freeze()
            }
        };

        if self.emit(frame).await {
            None
        } else {
            Some(RelayOutcome::Cancelled)
        }
    }

    fn rewrite(&self, payload: &[u8]) -> Option<String> {
        let payload = match std::str::from_utf8(payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "dropping non-UTF-8 data line");
                return None;
            }
        };

        match rewrite_chunk(payload, self.model) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::debug!(error = %e, "dropping undecodable data line");
                None
            }
        }
    }

    /// Hand one frame to the client; `false` means the client is gone
    async fn emit(&mut self, frame: Bytes) -> bool {
        let sent = tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            sent = self.sink.send(frame) => sent.is_ok(),
        };

        if sent {
            self.frames += 1;
        }
        sent
    }
}

enum Line<'a> {
    Blank,
    Done,
    Data(&'a [u8]),
    Other(&'a [u8]),
}

fn classify(line: &[u8]) -> Line<'_> {
    if line.trim_ascii().is_empty() {
        return Line::Blank;
    }

    match line.strip_prefix(b"data:") {
        Some(payload) => {
            let payload = payload.trim_ascii();
            if payload == b"[DONE]" {
                Line::Done
            } else if payload.is_empty() {
                Line::Blank
            } else {
                Line::Data(payload)
            }
        }
        None => Line::Other(line),
    }
}

/// Accumulates network chunks and yields complete lines without terminators
#[derive(Default)]
struct LineBuffer {
    buf: BytesMut,
    /// Bytes already searched for a newline
    scanned: usize,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next LF- or CRLF-terminated line, if one is complete
    fn next_line(&mut self) -> Option<BytesMut> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buf.len();
            return None;
        };

        let mut line = self.buf.split_to(self.scanned + offset + 1);
        self.scanned = 0;

        line.truncate(line.len() - 1);
        strip_cr(&mut line);
        Some(line)
    }

    /// Whatever is left once the stream ends, as a final unterminated line
    fn finish(&mut self) -> Option<BytesMut> {
        if self.buf.is_empty() {
            return None;
        }

        self.scanned = 0;
        let mut line = self.buf.split();
        strip_cr(&mut line);
        Some(line)
    }
}

fn strip_cr(line: &mut BytesMut) {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
}
