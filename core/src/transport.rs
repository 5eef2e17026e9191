//! The collaborator boundary: request execution is delegated here.

use crate::error::Error;
use crate::req::Req;
use crate::res::Res;

/// Executes a finalized request and produces a response.
///
/// This layer never performs I/O itself; implementations own the actual
/// exchange, including connection handling, TLS, redirects, and retries.
/// A transport may read the request body several times through the
/// replay factory ([`crate::Body::reader`]) and is the only party that
/// interprets the request's deadline.
pub trait Transport {
    fn perform(&self, req: Req) -> Result<Res, Error>;
}

/// Any matching closure is a transport, handy for tests and adapters.
impl<F> Transport for F
where
    F: Fn(Req) -> Result<Res, Error>,
{
    fn perform(&self, req: Req) -> Result<Res, Error> {
        self(req)
    }
}
