//! Fluent request building and response inspection for HTTP clients.
//!
//! # Overview
//! Builds [`Req`] values through a chainable API and digests [`Res`]
//! values without touching the network. Execution belongs to a
//! [`Transport`] collaborator the caller supplies, keeping the core
//! deterministic and testable.
//!
//! # Design
//! - Header keys are normalized to canonical MIME form on every write,
//!   so `content-type` and `Content-Type` address the same entry.
//! - Request bodies are replayable in-memory buffers; response bodies
//!   are single-consumption streams closed by whichever digest runs.
//! - Every operation comes in two spellings: a panicking one for
//!   scripts and tests, and a `try_`-prefixed one returning
//!   [`Result`] for production code. Both produce the same error text.

pub mod body;
pub mod error;
pub mod head;
pub mod req;
pub mod res;
pub mod transport;
pub mod util;

pub use body::{Body, BodyReader, BytesBody, ResBody};
pub use error::{Error, BODY_PREVIEW_LIMIT};
pub use head::{canonical_key, HeadMap};
pub use req::{Method, Req};
pub use res::Res;
pub use transport::Transport;
pub use util::{
    is_client_err, is_info, is_ok, is_redir, is_server_err, CONTENT_TYPE, TYPE_FORM, TYPE_JSON,
    TYPE_MULTI,
};
