//! Incremental decoding of concatenated JSON records.
//!
//! The stream body is a sequence of JSON objects separated by whitespace
//! (newlines in practice) and split across arbitrary chunk boundaries.

use serde_json::Deserializer;

use crate::domain::StreamRecord;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct RecordDecoder {
    buf: Vec<u8>,
}

impl RecordDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes received but not yet decoded.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Decode the next complete record.
    ///
    /// Returns `Ok(None)` when the buffer holds only a partial record or
    /// whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the buffered bytes cannot be a record.
    /// The decoder is unusable afterwards.
    pub fn next_record(&mut self) -> Result<Option<StreamRecord>> {
        let mut records = Deserializer::from_slice(&self.buf).into_iter::<StreamRecord>();
        match records.next() {
            None => {
                self.buf.clear();
                Ok(None)
            }
            Some(Ok(record)) => {
                let consumed = records.byte_offset();
                self.buf.drain(..consumed);
                Ok(Some(record))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(Error::Decode(e.to_string())),
        }
    }
}
