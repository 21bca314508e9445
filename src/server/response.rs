use crate::ids::SessionId;
use serde_json::{Map, Value};

/// Outcome classification handed back to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    Success,
    NotFound,
    Forbidden,
    ServerError,
}

impl ResponseStatus {
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            ResponseStatus::Success => 200,
            ResponseStatus::NotFound => 404,
            ResponseStatus::Forbidden => 403,
            ResponseStatus::ServerError => 500,
        }
    }

    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            ResponseStatus::Success => "OK",
            ResponseStatus::NotFound => "Not Found",
            ResponseStatus::Forbidden => "Forbidden",
            ResponseStatus::ServerError => "Internal Server Error",
        }
    }
}

/// Response payload, by content kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Encoded JSON text
    Json(String),
    /// Plain text written as-is
    Text(String),
    /// Small HTML page (used for the forbidden page)
    Html(String),
    /// Hand-off to the view layer: view identifier, request attributes and,
    /// when a view renderer is configured, its output
    Forward {
        view: String,
        attributes: Map<String, Value>,
        output: Option<String>,
    },
}

impl ResponseBody {
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            ResponseBody::Json(_) => "application/json;charset=UTF-8",
            ResponseBody::Text(_) => "text/plain;charset=UTF-8",
            ResponseBody::Html(_) | ResponseBody::Forward { .. } => "text/html;charset=UTF-8",
        }
    }

    /// Bytes the transport should write, if this body has been fully produced.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(s) | ResponseBody::Text(s) | ResponseBody::Html(s) => Some(s),
            ResponseBody::Forward { output, .. } => output.as_deref(),
        }
    }
}

/// What the pipeline produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    pub status: ResponseStatus,
    pub body: ResponseBody,
    /// Set when the pipeline created a new session the client must be told about.
    pub new_session: Option<SessionId>,
}

impl DispatchResponse {
    #[must_use]
    pub fn new(status: ResponseStatus, body: ResponseBody) -> Self {
        Self {
            status,
            body,
            new_session: None,
        }
    }

    #[must_use]
    pub fn ok(body: ResponseBody) -> Self {
        Self::new(ResponseStatus::Success, body)
    }

    #[must_use]
    pub fn with_new_session(mut self, session: Option<SessionId>) -> Self {
        self.new_session = session;
        self
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.body.content_type()
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self.body, ResponseBody::Json(_))
    }
}
