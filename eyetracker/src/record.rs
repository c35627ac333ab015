//! Inbound stream records.
//!
//! Once data sending is enabled the tracker emits one XML statement per line. TCP delivers those
//! lines in arbitrarily sized chunks, so [`RecordCodec`] holds on to a trailing fragment until
//! the rest of its line arrives. The content of a line is never inspected.

use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use std::str::Utf8Error;
use tokio_util::codec::Decoder;

#[cfg(test)]
mod tests;

/// Default upper bound on the length of a single record.
pub const DEFAULT_MAX_LENGTH: usize = 64 * 1024;

/// One line received from the eye tracker, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    bytes: Bytes,
}

impl Record {
    /// Creates a new [`Record`].
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the raw contents of the record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the contents of the record as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not valid UTF-8.
    pub fn to_str(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }

    /// Consumes the record, returning its contents.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Returns the length of the record in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the record has no contents.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Splits a byte stream into [`Record`]s at each `\n`.
///
/// A `\r` right before the `\n` is removed as well, and empty lines are skipped.
///
/// A line longer than the maximum length results in [`Error::RecordTooLong`]. If the line was
/// terminated, it is dropped and decoding carries on with the next line. If it is still growing
/// without a terminator, the fragment stays in the buffer and every further call fails, as the
/// codec has no way to find the start of the next record.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    max_length: usize,
    /// Bytes of the buffer already known not to contain a `\n`.
    next_index: usize,
}

impl RecordCodec {
    /// Creates a new [`RecordCodec`] with the given maximum record length.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    /// Returns the maximum length of a record.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn too_long(&self, length: usize) -> Error {
        Error::RecordTooLong {
            length,
            max: self.max_length,
        }
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl Decoder for RecordCodec {
    type Item = Record;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Record>> {
        loop {
            let offset = self.next_index.min(src.len());
            let Some(position) = src[offset..].iter().position(|&byte| byte == b'\n') else {
                self.next_index = src.len();
                // Leave room for a `\r` whose `\n` has not arrived yet.
                if src.len() > self.max_length.saturating_add(1) {
                    return Err(self.too_long(src.len()));
                }
                return Ok(None);
            };
            self.next_index = 0;

            let mut line = src.split_to(offset + position + 1);
            line.truncate(line.len() - 1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if line.len() > self.max_length {
                return Err(self.too_long(line.len()));
            }
            if line.is_empty() {
                continue;
            }
            return Ok(Some(Record::new(line.freeze())));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Record>> {
        if let Some(record) = self.decode(src)? {
            return Ok(Some(record));
        }
        if !src.is_empty() {
            tracing::warn!(
                length = src.len(),
                "discarding unterminated record at end of stream"
            );
            src.clear();
            self.next_index = 0;
        }
        Ok(None)
    }
}
