//! Response inspection and decoding shortcuts.
//!
//! # Design
//! `Res` wraps status, headers, and a single-consumption body stream.
//! Decode operations take the body, read it, and close it exactly once,
//! even when reading or decoding fails. Assertions (`ok`, `redir`)
//! consume the body only on mismatch, to build a descriptive error;
//! on match they leave it untouched for the caller.

use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::fmt;
use std::io::Read;
use url::Url;

use crate::body::{BytesBody, ResBody};
use crate::error::Error;
use crate::head::HeadMap;
use crate::util::{
    is_client_err, is_info, is_ok, is_redir, is_server_err, CONTENT_TYPE, TYPE_FORM, TYPE_JSON,
    TYPE_MULTI,
};

/// HTTP response handed back by a transport.
pub struct Res {
    pub status: u16,
    pub head: HeadMap,
    pub body: Option<Box<dyn ResBody>>,
}

impl fmt::Debug for Res {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Res")
            .field("status", &self.status)
            .field("head", &self.head)
            .field("body", &self.body.as_ref().map(|_| "dyn ResBody"))
            .finish()
    }
}

fn decode_err(err: impl StdError + Send + Sync + 'static) -> Error {
    Error::Decode(Box::new(err))
}

impl Res {
    pub fn new(status: u16, head: HeadMap, body: Option<Box<dyn ResBody>>) -> Self {
        Self { status, head, body }
    }

    /// Builds a response over in-memory bytes; empty bytes mean no body.
    pub fn from_bytes(status: u16, head: HeadMap, body: Vec<u8>) -> Self {
        let body: Option<Box<dyn ResBody>> = if body.is_empty() {
            None
        } else {
            Some(Box::new(BytesBody::new(body)))
        };
        Self { status, head, body }
    }

    // --- classification ---

    pub fn is_info(&self) -> bool {
        is_info(self.status)
    }

    pub fn is_ok(&self) -> bool {
        is_ok(self.status)
    }

    pub fn is_redir(&self) -> bool {
        is_redir(self.status)
    }

    pub fn is_client_err(&self) -> bool {
        is_client_err(self.status)
    }

    pub fn is_server_err(&self) -> bool {
        is_server_err(self.status)
    }

    // --- assertions ---

    /// Asserts a 2xx status. On mismatch, reads and closes the body and
    /// panics with an error carrying the status and a body preview; on
    /// match, returns the response with the body untouched.
    pub fn ok(self) -> Self {
        match self.try_ok() {
            Ok(res) => res,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_ok(self) -> Result<Self, Error> {
        if self.is_ok() {
            return Ok(self);
        }
        Err(self.into_status_error("unexpected non-OK response"))
    }

    /// Asserts a 3xx status; same contract as [`Res::ok`].
    pub fn redir(self) -> Self {
        match self.try_redir() {
            Ok(res) => res,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_redir(self) -> Result<Self, Error> {
        if self.is_redir() {
            return Ok(self);
        }
        Err(self.into_status_error("unexpected non-redirect response"))
    }

    fn into_status_error(mut self, reason: &'static str) -> Error {
        let status = self.status;
        let body = self.take_bytes().ok().flatten().unwrap_or_default();
        Error::status(status, reason, body)
    }

    // --- headers ---

    /// The `Location` header, useful on redirect responses.
    pub fn location(&self) -> &str {
        self.head.get("Location")
    }

    /// Parses the `Location` header as a URL, resolving relative
    /// targets (the common redirect shape) against `base`, normally the
    /// URL the request was sent to. Absolute targets pass through.
    pub fn location_url(&self, base: &Url) -> Url {
        match self.try_location_url(base) {
            Ok(url) => url,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_location_url(&self, base: &Url) -> Result<Url, Error> {
        base.join(self.location())
            .map_err(|err| Error::Url(err.to_string()))
    }

    /// The raw `Content-Type` header, parameters included.
    pub fn content_type(&self) -> &str {
        self.head.get(CONTENT_TYPE)
    }

    /// The media type of `Content-Type`, lowercased, with parameters
    /// such as `charset` stripped.
    pub fn media_type(&self) -> String {
        self.content_type()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn is_json(&self) -> bool {
        self.media_type() == TYPE_JSON
    }

    pub fn is_form(&self) -> bool {
        self.media_type() == TYPE_FORM
    }

    pub fn is_multi(&self) -> bool {
        self.media_type() == TYPE_MULTI
    }

    // --- body consumption ---

    /// Closes the body if present. Safe to call repeatedly.
    pub fn done(&mut self) {
        if let Some(mut body) = self.body.take() {
            let _ = body.close();
        }
    }

    /// Takes, fully reads, and closes the body. `None` means the
    /// response had no body. The close happens even when reading fails.
    fn take_bytes(&mut self) -> Result<Option<Vec<u8>>, Error> {
        let Some(mut body) = self.body.take() else {
            return Ok(None);
        };
        let mut buf = Vec::new();
        let read = body.read_to_end(&mut buf);
        let closed = body.close();
        read.map_err(Error::Read)?;
        closed.map_err(Error::Read)?;
        Ok(Some(buf))
    }

    /// Reads the whole body, closing it. Panicking form of
    /// [`Res::try_read_bytes`].
    pub fn read_bytes(self) -> Vec<u8> {
        match self.try_read_bytes() {
            Ok(bytes) => bytes,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_read_bytes(mut self) -> Result<Vec<u8>, Error> {
        Ok(self.take_bytes()?.unwrap_or_default())
    }

    /// Reads the whole body as UTF-8 text, closing it.
    pub fn read_string(self) -> String {
        match self.try_read_string() {
            Ok(text) => text,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_read_string(self) -> Result<String, Error> {
        String::from_utf8(self.try_read_bytes()?).map_err(decode_err)
    }

    // --- decoding ---

    /// JSON-decodes the body into `T`. Always closes the body, on
    /// success and on failure alike.
    pub fn json<T: DeserializeOwned>(self) -> T {
        match self.try_json() {
            Ok(val) => val,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_json<T: DeserializeOwned>(mut self) -> Result<T, Error> {
        let bytes = self.take_bytes()?.unwrap_or_default();
        serde_json::from_slice(&bytes).map_err(decode_err)
    }

    /// Decodes the body as `T` when the status is 2xx and as `E`
    /// otherwise. Always closes the body.
    pub fn json_either<T, E>(self) -> Result<T, E>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        match self.try_json_either() {
            Ok(either) => either,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_json_either<T, E>(mut self) -> Result<Result<T, E>, Error>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        let ok = self.is_ok();
        let bytes = self.take_bytes()?.unwrap_or_default();
        if ok {
            serde_json::from_slice(&bytes).map(Ok).map_err(decode_err)
        } else {
            serde_json::from_slice(&bytes).map(Err).map_err(decode_err)
        }
    }

    /// XML-decodes the body into `T`. Always closes the body.
    pub fn xml<T: DeserializeOwned>(self) -> T {
        match self.try_xml() {
            Ok(val) => val,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_xml<T: DeserializeOwned>(mut self) -> Result<T, Error> {
        let bytes = self.take_bytes()?.unwrap_or_default();
        let text = std::str::from_utf8(&bytes).map_err(decode_err)?;
        quick_xml::de::from_str(text).map_err(decode_err)
    }

    /// Decodes the body as form-encoded key-value pairs. Always closes
    /// the body.
    pub fn form(self) -> Vec<(String, String)> {
        match self.try_form() {
            Ok(pairs) => pairs,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_form(mut self) -> Result<Vec<(String, String)>, Error> {
        let bytes = self.take_bytes()?.unwrap_or_default();
        let text = std::str::from_utf8(&bytes).map_err(decode_err)?;
        serde_urlencoded::from_str(text).map_err(decode_err)
    }
}
