//! Error types shared across the pipeline.

use crate::dispatcher::BindError;
use crate::render::RenderError;
use crate::router::RouteNotFound;

/// A route could not be registered.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("route template `{template}` does not compile")]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Why a request did not produce a successful response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    RouteNotFound(#[from] RouteNotFound),
    #[error("access denied, required role: {}", .required.join(" or "))]
    AccessDenied { required: Vec<String> },
    #[error(transparent)]
    Binding(#[from] BindError),
    #[error("handler `{handler}` failed")]
    Handler {
        handler: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("handler `{handler}` panicked: {message}")]
    HandlerPanicked { handler: String, message: String },
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl DispatchError {
    /// The error and every source below it, joined with `": "`.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
