//! Error type for the request/response layer.
//!
//! # Design
//! One enum covers every failure kind the layer can produce. Causes are
//! boxed `dyn Error` values so generic middleware can walk `source()`
//! chains, and the numeric HTTP status is discoverable through
//! [`Error::http_status`]. Unexpected-status errors embed a bounded body
//! preview; anything past [`BODY_PREVIEW_LIMIT`] is clipped and marked
//! in the rendering.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Response bodies longer than this are clipped in error text.
pub const BODY_PREVIEW_LIMIT: usize = 4096;

type Cause = Box<dyn StdError + Send + Sync>;

#[derive(Debug)]
pub enum Error {
    /// The destination URL is missing or failed to parse.
    Url(String),
    /// An empty URL path segment was supplied where a non-empty one is
    /// required. Guards against accidentally requesting the site root.
    EmptySegment,
    /// The request payload could not be serialized.
    Encode(Cause),
    /// The transport collaborator could not complete the exchange.
    Transport(Cause),
    /// The response body could not be read.
    Read(io::Error),
    /// The response body could not be parsed into the requested shape.
    Decode(Cause),
    /// The response status fell outside the asserted range.
    Status {
        status: u16,
        reason: &'static str,
        preview: Vec<u8>,
        truncated: bool,
    },
}

impl Error {
    /// Builds an unexpected-status error, clipping the body preview at
    /// [`BODY_PREVIEW_LIMIT`].
    pub(crate) fn status(status: u16, reason: &'static str, body: Vec<u8>) -> Self {
        let truncated = body.len() > BODY_PREVIEW_LIMIT;
        let mut preview = body;
        preview.truncate(BODY_PREVIEW_LIMIT);
        Error::Status {
            status,
            reason,
            preview,
            truncated,
        }
    }

    /// The HTTP status code carried by this error, or 0 when it has none.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Status { status, .. } => *status,
            _ => 0,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http error")?;
        match self {
            Error::Url(msg) => write!(f, ": invalid request URL: {msg}"),
            Error::EmptySegment => write!(f, ": empty URL path segment"),
            Error::Encode(cause) => write!(f, ": failed to encode request body: {cause}"),
            Error::Transport(cause) => write!(f, ": failed to perform request: {cause}"),
            Error::Read(cause) => write!(f, ": failed to read response body: {cause}"),
            Error::Decode(cause) => write!(f, ": failed to decode response body: {cause}"),
            Error::Status {
                status,
                reason,
                preview,
                truncated,
            } => {
                if *status != 0 {
                    write!(f, " (status {status})")?;
                }
                write!(f, ": {reason}")?;
                if !preview.is_empty() {
                    write!(f, "; body: {}", String::from_utf8_lossy(preview))?;
                    if *truncated {
                        write!(f, " ... (truncated)")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Encode(cause) | Error::Transport(cause) | Error::Decode(cause) => {
                Some(cause.as_ref())
            }
            Error::Read(cause) => Some(cause),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_renders_code_and_body() {
        let err = Error::status(404, "unexpected non-OK response", b"not found".to_vec());
        let text = err.to_string();
        assert!(text.contains("404"), "{text}");
        assert!(text.contains("not found"), "{text}");
        assert!(text.starts_with("http error"), "{text}");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn status_error_without_body_omits_preview() {
        let err = Error::status(500, "unexpected non-OK response", Vec::new());
        assert!(!err.to_string().contains("body:"));
    }

    #[test]
    fn oversized_preview_is_clipped_and_marked() {
        let body = vec![b'x'; BODY_PREVIEW_LIMIT + 100];
        let err = Error::status(502, "unexpected non-OK response", body);

        match &err {
            Error::Status { preview, truncated, .. } => {
                assert_eq!(preview.len(), BODY_PREVIEW_LIMIT);
                assert!(*truncated);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().ends_with("(truncated)"));
    }

    #[test]
    fn non_status_errors_report_zero_code() {
        assert_eq!(Error::EmptySegment.http_status(), 0);
        assert_eq!(Error::Url("nope".to_string()).http_status(), 0);
    }

    #[test]
    fn causes_are_reachable_through_source() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "cut off");
        let err = Error::Read(io_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&Error::EmptySegment).is_none());
    }
}
