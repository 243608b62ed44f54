//! Drives a line-delimited JSON response body into a caller-supplied callback.
//!
//! The callback runs inline between reads: records are delivered in arrival
//! order, one at a time, and a slow callback slows down consumption of the body.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::parser::NdjsonStream;
use crate::types::{ByteStream, StreamRecord};
use crate::{Error, Result};

/// Reads `body` to the end (or up to its terminal record), calling `on_record`
/// for every decoded record.
///
/// Cancellation is observed before each record is handed over and while waiting
/// for more bytes. The body is dropped on every return path, which releases the
/// connection.
pub(crate) async fn drive<M, F>(
    status: u16,
    body: ByteStream,
    cancellation: &CancellationToken,
    mut on_record: F,
) -> Result<()>
where
    M: StreamRecord,
    F: FnMut(M),
{
    let mut records = NdjsonStream::<_, M>::new(body).with_status(status);

    loop {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let next = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(Error::Cancelled),
            next = records.next() => next,
        };

        match next {
            Some(Ok(record)) => on_record(record),
            Some(Err(e)) => return Err(e),
            None => return Ok(()),
        }
    }
}
