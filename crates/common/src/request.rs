//! Request context abstraction.
//!
//! The fingerprint accessor never touches process-global request state;
//! everything it reads comes through [`RequestContext`], so callers can hand
//! it a real server request or a synthetic one in tests.

use http::header::USER_AGENT;
use http::HeaderMap;

/// The slice of the server environment the fingerprint accessor consumes.
///
/// Session tracking is owned entirely by an external subsystem; this trait
/// only reports its outcome. `session_id` returns `Some` iff a session is
/// active, carrying the externally assigned identifier.
pub trait RequestContext {
    /// The remote peer address, as the server reported it (`REMOTE_ADDR`
    /// equivalent). Untrimmed and unvalidated.
    fn remote_addr(&self) -> Option<&str>;

    /// The raw user-agent header value, if the client sent one.
    fn user_agent(&self) -> Option<&str>;

    /// The active session identifier, if the external session subsystem
    /// reports an active session.
    fn session_id(&self) -> Option<&str>;
}

/// A [`RequestContext`] backed by `http` crate header types.
///
/// Built from the pieces a server framework hands out per request: the peer
/// address, the request headers, and the session state from whatever session
/// middleware is in front.
#[derive(Debug, Default)]
pub struct HttpContext {
    remote_addr: Option<String>,
    headers: HeaderMap,
    session_id: Option<String>,
}

impl HttpContext {
    /// Creates a context for a request from the given peer address.
    pub fn new(remote_addr: impl Into<String>) -> Self {
        Self {
            remote_addr: Some(remote_addr.into()),
            headers: HeaderMap::new(),
            session_id: None,
        }
    }

    /// Attaches the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attaches the active session identifier.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

impl RequestContext for HttpContext {
    fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    fn user_agent(&self) -> Option<&str> {
        // A non-UTF-8 header value reads as absent.
        self.headers.get(USER_AGENT).and_then(|value| value.to_str().ok())
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}
