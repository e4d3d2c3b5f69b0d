//! Streamed response parsing
//!
//! Turns the service's delimited-text response body into typed
//! [`ResultRecord`]s, lazily and in a single pass. The stream is backed by a
//! live network response and is never restartable; each record is yielded
//! exactly once, in emission order.
//!
//! Field positions are fixed by the query kind: field 0 is the series key;
//! for plain (filter/join) rows field 1 is unused and fields 2+ are values,
//! with a blank cell meaning an explicitly absent value; for group-aggregate
//! rows field 1 is the bucket timestamp and fields 2+ are the aggregate
//! values in declared function order.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};

use shared::{FieldValue, ResultRecord, SeriesName, VerifyError, VerifyResult, parse_timestamp};

/// Row layout of the response being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// Filter and join responses: field 1 is not part of the contract.
    Plain,
    /// Group-aggregate responses: field 1 is the bucket timestamp and every
    /// aggregate field must carry a value.
    GroupAggregate,
}

/// Lazy, single-pass record stream over a chunked response body.
///
/// Yields `Err` for rows that fail to parse (keeping the raw line) and for
/// transport failures mid-stream; the caller decides that both abort the
/// scenario.
pub struct ResponseStream<S> {
    inner: S,
    shape: RowShape,
    buffer: Vec<u8>,
    rows: usize,
    done: bool,
}

impl<S> ResponseStream<S> {
    pub fn new(shape: RowShape, inner: S) -> Self {
        Self {
            inner,
            shape,
            buffer: Vec::new(),
            rows: 0,
            done: false,
        }
    }

    /// Number of non-empty rows yielded so far.
    pub fn rows_seen(&self) -> usize {
        self.rows
    }
}

impl<S, B, E> ResponseStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    pub async fn next_record(&mut self) -> Option<VerifyResult<ResultRecord>> {
        self.next().await
    }
}

impl<S, B, E> Stream for ResponseStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    type Item = VerifyResult<ResultRecord>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            // Drain any complete lines already buffered.
            while let Some(pos) = this.buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = this.buffer.drain(..=pos).collect();
                let text = String::from_utf8_lossy(&line_bytes);
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                this.rows += 1;
                return Poll::Ready(Some(parse_row(this.shape, line)));
            }

            if this.done {
                // Final line without a trailing newline.
                let line_bytes = std::mem::take(&mut this.buffer);
                let text = String::from_utf8_lossy(&line_bytes);
                let line = text.trim();
                if line.is_empty() {
                    return Poll::Ready(None);
                }
                this.rows += 1;
                return Poll::Ready(Some(parse_row(this.shape, line)));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buffer.extend_from_slice(chunk.as_ref()),
                Poll::Ready(Some(Err(err))) => {
                    this.done = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(VerifyError::transport(format!(
                        "response stream ended abnormally: {err}"
                    )))));
                }
                Poll::Ready(None) => this.done = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Parse one response row. Failures keep the offending line verbatim.
pub fn parse_row(shape: RowShape, line: &str) -> VerifyResult<ResultRecord> {
    let malformed = || VerifyError::MalformedRow {
        line: line.to_string(),
    };

    let columns: Vec<&str> = line.split(',').collect();
    if columns.len() < 3 {
        return Err(malformed());
    }

    let series = SeriesName::parse(columns[0].trim())?.key();

    let timestamp = match shape {
        RowShape::Plain => None,
        RowShape::GroupAggregate => {
            Some(parse_timestamp(columns[1].trim()).map_err(|_| malformed())?)
        }
    };

    let mut fields = Vec::with_capacity(columns.len() - 2);
    for cell in &columns[2..] {
        let cell = cell.trim();
        if cell.is_empty() {
            // A blank aggregate cell means the service dropped a declared
            // function; a blank plain cell is a legitimate absent value.
            if shape == RowShape::GroupAggregate {
                return Err(malformed());
            }
            fields.push(FieldValue::Absent);
        } else {
            let value: f64 = cell.parse().map_err(|_| malformed())?;
            fields.push(FieldValue::Present(value));
        }
    }

    Ok(ResultRecord::new(series, timestamp, fields).with_raw(line))
}
