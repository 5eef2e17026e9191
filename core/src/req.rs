//! Fluent request builder.
//!
//! # Design
//! `Req` is plain data with chaining setters; nothing here performs I/O.
//! Defaults (method GET) are filled by `init` at send time only, so a
//! partially built request shows exactly what was set. The target client
//! and the deadline are ordinary dedicated fields; the transport is the
//! only party that interprets them.
//!
//! Every fallible operation comes in two forms with identical error
//! content: a panicking one for terse chaining and a `try_` one that
//! returns the error as a value.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::body::Body;
use crate::error::Error;
use crate::head::HeadMap;
use crate::res::Res;
use crate::transport::Transport;
use crate::util::{self, CONTENT_TYPE, TYPE_FORM, TYPE_JSON, TYPE_MULTI};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }

    /// True for verbs that conventionally carry no request body.
    pub fn is_read_only(self) -> bool {
        matches!(self, Method::Get | Method::Head | Method::Options)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP request under construction.
///
/// Exclusively owned by the builder chain until handed to a
/// [`Transport`]. Cloning is cheap (the body backing is shared), which
/// makes partially built requests usable as templates.
#[derive(Clone, Default)]
pub struct Req {
    pub method: Option<Method>,
    pub url: Option<Url>,
    pub head: HeadMap,
    pub body: Option<Body>,
    /// Deadline for the whole exchange, honored by the transport only.
    pub timeout: Option<Duration>,
    pub client: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for Req {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Req")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("head", &self.head)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("client", &self.client.as_ref().map(|_| "dyn Transport"))
            .finish()
    }
}

impl Req {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte length of the encoded body, 0 when there is none.
    pub fn content_length(&self) -> u64 {
        self.body.as_ref().map(Body::len).unwrap_or(0)
    }

    /// True if the method is unset, GET, HEAD, or OPTIONS.
    pub fn is_read_only(&self) -> bool {
        self.method.map_or(true, Method::is_read_only)
    }

    // --- method ---

    pub fn meth(mut self, val: Method) -> Self {
        self.method = Some(val);
        self
    }

    pub fn get(self) -> Self {
        self.meth(Method::Get)
    }

    pub fn post(self) -> Self {
        self.meth(Method::Post)
    }

    pub fn put(self) -> Self {
        self.meth(Method::Put)
    }

    pub fn patch(self) -> Self {
        self.meth(Method::Patch)
    }

    pub fn delete(self) -> Self {
        self.meth(Method::Delete)
    }

    pub fn options(self) -> Self {
        self.meth(Method::Options)
    }

    // --- destination ---

    /// Parses the input and sets it as the destination URL. Panics on
    /// parse errors; see [`Req::try_to`].
    pub fn to(self, val: &str) -> Self {
        unwrap_fluent(self.try_to(val))
    }

    pub fn try_to(mut self, val: &str) -> Result<Self, Error> {
        let url = Url::parse(val).map_err(|err| Error::Url(err.to_string()))?;
        self.url = Some(url);
        Ok(self)
    }

    pub fn url(mut self, val: Url) -> Self {
        self.url = Some(val);
        self
    }

    fn url_mut(&mut self) -> Result<&mut Url, Error> {
        self.url
            .as_mut()
            .ok_or_else(|| Error::Url("request URL is not set; call `to` or `url` first".to_string()))
    }

    /// Replaces the URL path. Panicking form of [`Req::try_path`].
    pub fn path(self, val: &str) -> Self {
        unwrap_fluent(self.try_path(val))
    }

    pub fn try_path(mut self, val: &str) -> Result<Self, Error> {
        self.url_mut()?.set_path(val);
        Ok(self)
    }

    /// Appends one path segment, slash-separated. Panics on an empty
    /// segment; see [`Req::try_append`].
    pub fn append(self, segment: impl fmt::Display) -> Self {
        unwrap_fluent(self.try_append(segment))
    }

    pub fn try_append(mut self, segment: impl fmt::Display) -> Result<Self, Error> {
        let segment = segment.to_string();
        util::url_append(self.url_mut()?, &segment)?;
        Ok(self)
    }

    /// Appends several path segments via [`Req::append`].
    pub fn join<I, S>(self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        unwrap_fluent(self.try_join(segments))
    }

    pub fn try_join<I, S>(mut self, segments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        for segment in segments {
            self = self.try_append(segment)?;
        }
        Ok(self)
    }

    /// Sets the query string verbatim; an empty string clears it.
    pub fn raw_query(self, val: &str) -> Self {
        unwrap_fluent(self.try_raw_query(val))
    }

    pub fn try_raw_query(mut self, val: &str) -> Result<Self, Error> {
        let query = if val.is_empty() { None } else { Some(val) };
        self.url_mut()?.set_query(query);
        Ok(self)
    }

    /// URL-encodes the value as the query string.
    pub fn query<T: Serialize + ?Sized>(self, val: &T) -> Self {
        unwrap_fluent(self.try_query(val))
    }

    pub fn try_query<T: Serialize + ?Sized>(self, val: &T) -> Result<Self, Error> {
        let encoded =
            serde_urlencoded::to_string(val).map_err(|err| Error::Encode(Box::new(err)))?;
        self.try_raw_query(&encoded)
    }

    // --- headers ---

    /// Replaces the whole header map.
    pub fn head(mut self, val: HeadMap) -> Self {
        self.head = val;
        self
    }

    pub fn head_add(mut self, key: &str, val: impl Into<String>) -> Self {
        self.head.add(key, val);
        self
    }

    pub fn head_set(mut self, key: &str, val: impl Into<String>) -> Self {
        self.head.set(key, val);
        self
    }

    pub fn head_remove(mut self, key: &str) -> Self {
        self.head.remove(key);
        self
    }

    pub fn head_replace(mut self, key: &str, vals: Vec<String>) -> Self {
        self.head.replace(key, vals);
        self
    }

    pub fn head_patch<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        self.head.patch(entries);
        self
    }

    /// Sets the `Content-Type` header; an empty value removes the header
    /// entirely instead of storing an empty string.
    pub fn content_type(mut self, val: &str) -> Self {
        if val.is_empty() {
            self.head.remove(CONTENT_TYPE);
        } else {
            self.head.set(CONTENT_TYPE, val);
        }
        self
    }

    pub fn type_json(self) -> Self {
        self.content_type(TYPE_JSON)
    }

    pub fn type_form(self) -> Self {
        self.content_type(TYPE_FORM)
    }

    pub fn type_multi(self) -> Self {
        self.content_type(TYPE_MULTI)
    }

    // --- body ---

    /// Uses the string as the request body. Content length is the UTF-8
    /// byte length; empty input clears the body to the "no body" state.
    pub fn body_str(self, val: impl Into<String>) -> Self {
        self.body_bytes(val.into().into_bytes())
    }

    /// Same contract as [`Req::body_str`], over raw bytes.
    pub fn body_bytes(mut self, val: impl Into<Vec<u8>>) -> Self {
        let val = val.into();
        self.body = if val.is_empty() { None } else { Some(Body::new(val)) };
        self
    }

    /// URL-encodes the value as the request body without touching
    /// headers. An empty pair set encodes to an empty string, which
    /// clears the body.
    pub fn vals<T: Serialize + ?Sized>(self, val: &T) -> Self {
        unwrap_fluent(self.try_vals(val))
    }

    pub fn try_vals<T: Serialize + ?Sized>(self, val: &T) -> Result<Self, Error> {
        let encoded =
            serde_urlencoded::to_string(val).map_err(|err| Error::Encode(Box::new(err)))?;
        Ok(self.body_str(encoded))
    }

    /// Form-encoded body: [`Req::type_form`] plus [`Req::vals`]. Note
    /// that an empty pair set still sets the content type while leaving
    /// the body absent.
    pub fn form_vals<T: Serialize + ?Sized>(self, val: &T) -> Self {
        unwrap_fluent(self.try_form_vals(val))
    }

    pub fn try_form_vals<T: Serialize + ?Sized>(self, val: &T) -> Result<Self, Error> {
        self.type_form().try_vals(val)
    }

    /// JSON-encodes the payload as the request body and sets the JSON
    /// content type. A `None` payload on a read-only method skips
    /// encoding and clears the body, so the call is safe to make
    /// unconditionally without producing GET requests that carry a body.
    /// On other methods `None` encodes JSON `null`.
    pub fn json<T: Serialize + ?Sized>(self, val: Option<&T>) -> Self {
        unwrap_fluent(self.try_json(val))
    }

    pub fn try_json<T: Serialize + ?Sized>(mut self, val: Option<&T>) -> Result<Self, Error> {
        self = self.type_json();

        if val.is_none() && self.is_read_only() {
            self.body = None;
            return Ok(self);
        }

        let chunk = match val {
            Some(val) => serde_json::to_vec(val).map_err(|err| Error::Encode(Box::new(err)))?,
            None => b"null".to_vec(),
        };
        Ok(self.body_bytes(chunk))
    }

    /// Trusts the input to be valid JSON and uses it as the body.
    pub fn json_str(self, val: impl Into<String>) -> Self {
        self.type_json().body_str(val)
    }

    /// Trusts the input to be valid JSON and uses it as the body.
    pub fn json_bytes(self, val: impl Into<Vec<u8>>) -> Self {
        self.type_json().body_bytes(val)
    }

    // --- execution ---

    /// Stores the transport used by [`Req::send`].
    pub fn client(mut self, client: impl Transport + 'static) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    pub fn timeout(mut self, val: Duration) -> Self {
        self.timeout = Some(val);
        self
    }

    /// Fills send-time defaults. Called by the send operations; building
    /// never fills defaults eagerly.
    pub fn init(&mut self) {
        if self.method.is_none() {
            self.method = Some(Method::Get);
        }
    }

    /// Performs the request through the stored client. Panics on
    /// failure; see [`Req::try_send`].
    pub fn send(self) -> Res {
        unwrap_fluent(self.try_send())
    }

    pub fn try_send(mut self) -> Result<Res, Error> {
        let client = self.client.take().ok_or_else(|| {
            Error::Transport("no transport configured; use `client` or `send_with`".into())
        })?;
        self.dispatch(&*client)
    }

    /// Performs the request through the given transport. Panics on
    /// failure; see [`Req::try_send_with`].
    pub fn send_with(self, transport: &dyn Transport) -> Res {
        unwrap_fluent(self.try_send_with(transport))
    }

    pub fn try_send_with(self, transport: &dyn Transport) -> Result<Res, Error> {
        self.dispatch(transport)
    }

    fn dispatch(mut self, transport: &dyn Transport) -> Result<Res, Error> {
        self.init();
        let url = match &self.url {
            Some(url) => url.as_str().to_string(),
            None => return Err(Error::Url("request URL is not set".to_string())),
        };
        log::debug!(
            "sending {} request to {url}",
            self.method.unwrap_or(Method::Get)
        );

        let res = transport.perform(self)?;
        log::debug!("received status {} from {url}", res.status);
        Ok(res)
    }
}

fn unwrap_fluent<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(val) => val,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_post_request_with_json_body() {
        let payload = serde_json::json!({ "inputVal": "x" });
        let req = Req::new()
            .post()
            .to("https://example.com")
            .join(["submit"])
            .json(Some(&payload));

        assert_eq!(req.method, Some(Method::Post));
        assert_eq!(req.url.as_ref().unwrap().path(), "/submit");
        assert_eq!(req.head.get(CONTENT_TYPE), TYPE_JSON);
        let expected = serde_json::to_vec(&payload).unwrap();
        assert_eq!(req.content_length(), expected.len() as u64);
        assert_eq!(req.body.as_ref().unwrap().bytes(), &expected[..]);
    }

    #[test]
    fn json_none_on_read_only_method_skips_encoding() {
        let req = Req::new().get().json(None::<&serde_json::Value>);

        assert!(req.body.is_none());
        assert_eq!(req.content_length(), 0);
        // the content type is still negotiated
        assert_eq!(req.head.get("content-type"), TYPE_JSON);
    }

    #[test]
    fn json_none_on_write_method_encodes_null() {
        let req = Req::new().post().json(None::<&serde_json::Value>);
        assert_eq!(req.body.as_ref().unwrap().bytes(), b"null");
    }

    #[test]
    fn empty_bodies_normalize_to_absent() {
        let req = Req::new().body_str("x").body_str("");
        assert!(req.body.is_none());
        assert_eq!(req.content_length(), 0);

        let req = Req::new().body_bytes(Vec::new());
        assert!(req.body.is_none());
    }

    #[test]
    fn empty_form_sets_type_but_no_body() {
        let req = Req::new().post().form_vals(&Vec::<(String, String)>::new());
        assert_eq!(req.head.get(CONTENT_TYPE), TYPE_FORM);
        assert!(req.body.is_none());
    }

    #[test]
    fn vals_encode_without_setting_headers() {
        let req = Req::new().vals(&vec![("a", "1"), ("b", "two")]);
        assert_eq!(req.body.as_ref().unwrap().bytes(), b"a=1&b=two");
        assert!(!req.head.has(CONTENT_TYPE));
    }

    #[test]
    fn content_length_counts_utf8_bytes() {
        let req = Req::new().body_str("héllo");
        assert_eq!(req.content_length(), 6);
    }

    #[test]
    fn empty_content_type_removes_the_header() {
        let req = Req::new().type_json().content_type("");
        assert!(!req.head.has(CONTENT_TYPE));
    }

    #[test]
    fn query_is_url_encoded() {
        let req = Req::new()
            .to("https://example.com")
            .query(&vec![("q", "rust lang")]);
        assert_eq!(req.url.unwrap().query(), Some("q=rust+lang"));
    }

    #[test]
    fn append_accepts_stringable_segments() {
        let req = Req::new().to("https://example.com").append("users").append(42);
        assert_eq!(req.url.unwrap().path(), "/users/42");
    }

    #[test]
    #[should_panic(expected = "empty URL path segment")]
    fn append_panics_on_empty_segment() {
        let _ = Req::new().to("https://example.com").append("");
    }

    #[test]
    fn try_append_reports_empty_segment() {
        let err = Req::new()
            .to("https://example.com")
            .try_append("")
            .unwrap_err();
        assert!(matches!(err, Error::EmptySegment));
    }

    #[test]
    fn path_helpers_require_a_destination() {
        let err = Req::new().try_path("/x").unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn try_to_reports_parse_errors() {
        let err = Req::new().try_to("not a url").unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn init_defaults_method_to_get() {
        let mut req = Req::new();
        assert_eq!(req.method, None);
        req.init();
        assert_eq!(req.method, Some(Method::Get));
    }

    #[test]
    fn unset_method_counts_as_read_only() {
        assert!(Req::new().is_read_only());
        assert!(Req::new().options().is_read_only());
        assert!(!Req::new().post().is_read_only());
    }

    #[test]
    fn send_fills_defaults_and_delegates_to_transport() {
        let transport = |req: Req| -> Result<Res, Error> {
            assert_eq!(req.method, Some(Method::Get));
            assert_eq!(req.url.as_ref().unwrap().as_str(), "https://example.com/");
            Ok(Res::from_bytes(200, HeadMap::new(), b"hi".to_vec()))
        };

        let res = Req::new()
            .to("https://example.com")
            .try_send_with(&transport)
            .unwrap();
        assert_eq!(res.try_read_string().unwrap(), "hi");
    }

    #[test]
    fn send_without_url_is_an_error() {
        let transport =
            |_req: Req| -> Result<Res, Error> { Ok(Res::from_bytes(200, HeadMap::new(), Vec::new())) };
        let err = Req::new().try_send_with(&transport).unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn send_uses_the_stored_client() {
        let transport = |req: Req| -> Result<Res, Error> {
            // the client slot is cleared before the hand-off
            assert!(req.client.is_none());
            Ok(Res::from_bytes(204, HeadMap::new(), Vec::new()))
        };

        let res = Req::new()
            .to("https://example.com")
            .client(transport)
            .try_send()
            .unwrap();
        assert_eq!(res.status, 204);
    }

    #[test]
    fn deadline_reaches_the_transport() {
        let transport = |req: Req| -> Result<Res, Error> {
            assert_eq!(req.timeout, Some(Duration::from_secs(3)));
            Ok(Res::from_bytes(204, HeadMap::new(), Vec::new()))
        };

        let res = Req::new()
            .to("https://example.com")
            .timeout(Duration::from_secs(3))
            .try_send_with(&transport)
            .unwrap();
        assert_eq!(res.status, 204);
    }

    #[test]
    fn send_without_client_is_a_transport_error() {
        let err = Req::new().to("https://example.com").try_send().unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn cloned_requests_serve_as_templates() {
        let template = Req::new().to("https://example.com").type_json();

        let one = template.clone().append("one");
        let two = template.clone().append("two");

        assert_eq!(one.url.unwrap().path(), "/one");
        assert_eq!(two.url.unwrap().path(), "/two");
        assert_eq!(template.url.unwrap().path(), "/");
    }
}
