use super::upload::MultipartPart;
use crate::ids::SessionId;
use http::Method;
use indexmap::IndexMap;

/// Query and form parameters in arrival order.
///
/// A key that appears several times keeps all of its values, in order.
/// Keys are hashed, so grouping and lookup do not grow with the number of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: IndexMap<String, Vec<String>>,
}

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` string (query string or form body).
    #[must_use]
    pub fn from_urlencoded(input: &[u8]) -> Self {
        let mut params = Self::new();
        params.extend_urlencoded(input);
        params
    }

    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        for (k, v) in url::form_urlencoded::parse(input) {
            self.push(k.into_owned(), v.into_owned());
        }
    }

    /// Append a value, grouping it under an existing key if present.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// First value for `key`, the way a single-valued lookup sees it.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }

    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the dispatch pipeline reads from an inbound request.
///
/// The transport builds one of these per request; header parsing and multipart
/// decoding happen before this point.
///
/// ```rust
/// use frontdispatch::server::InboundRequest;
/// use http::Method;
///
/// let req = InboundRequest::new(Method::GET, "/items/5?tag=a&tag=b&q=x");
/// assert_eq!(req.path(), "/items/5");
/// assert_eq!(req.params().values("tag"), ["a", "b"]);
/// assert_eq!(req.params().first("q"), Some("x"));
/// ```
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    path: String,
    params: RequestParams,
    parts: Vec<MultipartPart>,
    content_type: Option<String>,
    session: Option<SessionId>,
}

impl InboundRequest {
    /// Create a request. Anything after `?` in `target` is decoded as the query string.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        let params = query
            .map(|q| RequestParams::from_urlencoded(q.as_bytes()))
            .unwrap_or_default();
        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            params,
            parts: Vec::new(),
            content_type: None,
            session: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(key, value);
        self
    }

    /// Merge an urlencoded form body into the parameters (after the query values).
    #[must_use]
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.params.extend_urlencoded(body);
        if self.content_type.is_none() {
            self.content_type = Some("application/x-www-form-urlencoded".to_string());
        }
        self
    }

    /// Attach a decoded multipart part. Marks the request `multipart/form-data`
    /// unless a content type was already set.
    #[must_use]
    pub fn with_part(mut self, part: MultipartPart) -> Self {
        self.parts.push(part);
        if self.content_type.is_none() {
            self.content_type = Some("multipart/form-data".to_string());
        }
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    #[must_use]
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Part with the given field name, if the request is multipart.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&MultipartPart> {
        if !self.is_multipart() {
            return None;
        }
        self.parts.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/"))
            .unwrap_or(false)
    }

    #[must_use]
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }
}
