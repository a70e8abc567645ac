use super::params;
use std::collections::HashMap;

/// A request made to the server, described by the variables of a CGI
/// environment plus the raw body.
///
/// A `Request` is filled in by a [`Parser`](struct.Parser.html) as bytes
/// arrive, and handed over with
/// [`Parser::take_request`](struct.Parser.html#method.take_request) once
/// complete.
#[derive(Debug, Eq, PartialEq)]
pub struct Request {
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) path: String,
    pub(crate) verb: String,
}

impl Request {
    /// The bytes of the body received so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Release the body buffer.
    pub fn close(&mut self) {
        self.body = Vec::new();
    }

    /// The number of body bytes announced by the `Content-Length` header, or
    /// zero if there is no such header.
    #[must_use]
    pub fn content_length(&self) -> usize {
        params::parse_content_length(
            self.params.get("CONTENT_LENGTH").map(String::as_str)
        )
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.body.len() >= self.content_length()
    }

    #[must_use]
    pub fn new() -> Self {
        Self{
            body: Vec::new(),
            params: params::seed(),
            path: String::new(),
            verb: String::new(),
        }
    }

    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// All the CGI variables of the request.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// The path of the request target, exactly as it appeared in the request
    /// line (no percent-decoding).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.param("REQUEST_METHOD").unwrap_or_default(),
            self.param("REQUEST_URI").unwrap_or_default()
        )
    }
}
