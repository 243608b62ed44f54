//! Decoding of newline-delimited JSON response bodies.
//!
//! Streaming endpoints answer with one JSON object per line over a single
//! response body. [`NdjsonStream`] reassembles lines across arbitrary chunk
//! boundaries and yields each line decoded as a record `M`, in arrival order.

use std::marker::PhantomData;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use serde_json::Value;

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::types::StreamRecord;
use crate::{ApiError, Error, Result};

/// Longest line accepted before the read fails, in bytes.
pub const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// A stream of records decoded from a line-delimited JSON body.
///
/// - Blank lines are ignored.
/// - Lines that are not JSON, or do not decode as `M`, are skipped; the stream
///   carries on.
/// - A line holding only the server's `{"error": "..."}` envelope ends the stream
///   with [`Error::Api`].
/// - After a record whose [`StreamRecord::is_terminal`] is `true`, the stream ends
///   without reading any further bytes.
/// - An unterminated last line is decoded when the body ends.
/// - Read errors from the underlying body end the stream and are passed through.
pub struct NdjsonStream<S, M> {
    inner: S,
    buffer: Vec<u8>,
    // bytes of `buffer` already known to hold no newline
    scanned: usize,
    status: u16,
    finished: bool,
    _marker: PhantomData<fn() -> M>,
}

impl<S, M> NdjsonStream<S, M>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
    M: StreamRecord,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            scanned: 0,
            status: 200,
            finished: false,
            _marker: PhantomData,
        }
    }

    /// Sets the HTTP status reported on errors raised from in-band error records.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Pops complete lines off the buffer until one decodes to an item.
    fn next_buffered(&mut self) -> Option<Result<M>> {
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let newline_pos = self.scanned + offset;
            let line = self.buffer.drain(..=newline_pos).collect::<Vec<u8>>();
            self.scanned = 0;
            if let Some(item) = self.decode_line(&line) {
                return Some(item);
            }
        }
        self.scanned = self.buffer.len();
        None
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<Result<M>> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value = match serde_json::from_str::<Value>(line) {
            Ok(value) => value,
            Err(err) => return skip(line, err),
        };

        // Checked first: every record field is optional, so the envelope
        // would also decode as a record.
        if let Some(message) = error_record(&value) {
            self.finished = true;
            return Some(Err(ApiError::new(self.status, message).into()));
        }

        match serde_json::from_value::<M>(value) {
            Ok(record) => {
                if record.is_terminal() {
                    self.finished = true;
                }
                Some(Ok(record))
            }
            Err(err) => skip(line, err),
        }
    }
}

/// The message of a line that is exactly `{"error": "..."}`.
fn error_record(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get("error")?.as_str()
}

fn skip<T>(_line: &str, _err: serde_json::Error) -> Option<T> {
    #[cfg(feature = "tracing")]
    tracing::debug!(error = %_err, line = _line, "skipping undecodable stream line");
    #[cfg(feature = "metrics")]
    counter!("ollama_client.stream_lines_skipped_total").increment(1);
    None
}

impl<S, M> Stream for NdjsonStream<S, M>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
    M: StreamRecord,
{
    type Item = Result<M>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Every field is Unpin, so the pinned reference can be unwrapped.
        let this = self.get_mut();

        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            if let Some(item) = this.next_buffered() {
                return Poll::Ready(Some(item));
            }

            // Whatever is left is a single unterminated line.
            if this.buffer.len() > MAX_LINE_LENGTH {
                this.finished = true;
                this.buffer.clear();
                return Poll::Ready(Some(Err(Error::StreamRead(format!(
                    "line exceeds {} bytes",
                    MAX_LINE_LENGTH
                )))));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    let rest = mem::take(&mut this.buffer);
                    this.scanned = 0;
                    return Poll::Ready(this.decode_line(&rest));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
