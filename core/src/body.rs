//! Request and response body primitives.
//!
//! # Design
//! Request bodies are immutable backing bytes behind an `Arc`, so a
//! transport can replay them any number of times (redirects, retries)
//! by asking for fresh readers. Response bodies are single-consumption
//! streams with an explicit close step; the inspector in `res` takes,
//! reads, and closes them exactly once per terminal operation.

use std::io::{self, Cursor, Read};
use std::sync::Arc;

/// Replayable request body content.
///
/// The backing bytes are immutable and shared; [`Body::reader`] is the
/// replay factory, producing an independent stream per call without
/// corrupting previously issued readers. Empty content never becomes a
/// `Body`: the request's body field holds `None` instead, so transports
/// can distinguish "no body" from "empty body".
#[derive(Debug, Clone)]
pub struct Body {
    bytes: Arc<[u8]>,
}

impl Body {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Byte length of the encoded content.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Fresh independent reader over the backing bytes.
    pub fn reader(&self) -> BodyReader {
        BodyReader {
            bytes: Arc::clone(&self.bytes),
            pos: 0,
        }
    }
}

/// Reader produced by [`Body::reader`].
#[derive(Debug)]
pub struct BodyReader {
    bytes: Arc<[u8]>,
    pos: usize,
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.bytes[self.pos..];
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.pos += count;
        Ok(count)
    }
}

/// Single-consumption response body stream.
///
/// `close` must be called exactly once after the first full consumption;
/// the decoders in [`crate::Res`] do this even when reading or decoding
/// fails. The default impl is a no-op, which suits in-memory bodies.
pub trait ResBody: Read {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory [`ResBody`], the usual carrier for transports and tests.
#[derive(Debug)]
pub struct BytesBody(Cursor<Vec<u8>>);

impl BytesBody {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Cursor::new(bytes.into()))
    }
}

impl Read for BytesBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl ResBody for BytesBody {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_bytes_not_characters() {
        let body = Body::new("héllo".as_bytes().to_vec());
        assert_eq!(body.len(), 6);
    }

    #[test]
    fn replay_factory_yields_independent_readers() {
        let body = Body::new(b"payload".to_vec());

        let mut first = body.reader();
        let mut partial = String::new();
        std::io::Read::take(&mut first, 3).read_to_string(&mut partial).unwrap();
        assert_eq!(partial, "pay");

        for _ in 0..3 {
            let mut out = Vec::new();
            body.reader().read_to_end(&mut out).unwrap();
            assert_eq!(out, b"payload");
        }

        // the partially consumed reader keeps its own position
        let mut rest = String::new();
        first.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "load");
    }

    #[test]
    fn bytes_body_reads_and_closes() {
        let mut body = BytesBody::new(b"ok".to_vec());
        let mut out = Vec::new();
        body.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"ok");
        assert!(body.close().is_ok());
    }
}
