use std::fmt;

use serde_json::Value;

/// HTTP verbs the API surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound call, built per request and never persisted.
///
/// The path is held as raw (unencoded) segments; the client percent-encodes
/// each one when joining it onto the base URL, so an identifier containing
/// `/` or spaces stays a single segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub body: Option<Value>,
    pub requires_auth: bool,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Authenticated request to a `/`-separated path such as `/lesson-admin`.
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            body: None,
            requires_auth: true,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: &str, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append one raw segment (typically a resource id).
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Send without a bearer header even if a credential is stored.
    pub fn without_auth(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// The body to put on the wire. GET requests never carry one.
    pub fn wire_body(&self) -> Option<String> {
        match self.method {
            Method::Get => None,
            _ => self.body.as_ref().map(Value::to_string),
        }
    }

    /// Unencoded path for log lines.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}
