use super::model::Renderable;
use super::view::ViewRenderer;
use crate::error::DispatchError;
use crate::json::to_json;
use crate::server::{DispatchResponse, ResponseBody, ResponseStatus};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// A handler result could not be turned into a response.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("JSON encoding failed")]
    Json(#[from] serde_json::Error),
    #[error("view `{view}` failed to render")]
    View {
        view: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Turns handler results and pipeline errors into [`DispatchResponse`]s.
#[derive(Clone, Default)]
pub struct ResponseRenderer {
    views: Option<Arc<dyn ViewRenderer>>,
    expose_errors: bool,
}

impl ResponseRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render view results with `views` instead of leaving the forward to the transport.
    #[must_use]
    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = Some(views);
        self
    }

    /// Include the full error chain in server-error bodies.
    #[must_use]
    pub fn expose_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    #[must_use]
    pub fn has_views(&self) -> bool {
        self.views.is_some()
    }

    /// Render a handler result.
    ///
    /// JSON routes encode the model of a view result, or the raw result
    /// otherwise. Other routes forward views, write text literally, and answer
    /// structured values with an "unsupported return type" message.
    pub fn render(&self, result: Renderable, json: bool) -> Result<DispatchResponse, RenderError> {
        if json {
            let body = match &result {
                Renderable::View(mv) => to_json(mv.data())?,
                Renderable::Text(text) => to_json(text)?,
                Renderable::Data(value) => to_json(value)?,
            };
            return Ok(DispatchResponse::ok(ResponseBody::Json(body)));
        }

        let body = match result {
            Renderable::View(mv) => {
                let (view, model) = mv.into_parts();
                let mut attributes = Map::with_capacity(model.len());
                attributes.extend(model);
                let output = match &self.views {
                    Some(views) => Some(views.render(&view, &attributes).map_err(|source| {
                        RenderError::View {
                            view: view.clone(),
                            source,
                        }
                    })?),
                    None => None,
                };
                debug!(view = %view, attributes = attributes.len(), "Forwarding to view");
                ResponseBody::Forward {
                    view,
                    attributes,
                    output,
                }
            }
            Renderable::Text(text) => ResponseBody::Text(text),
            other @ Renderable::Data(_) => {
                ResponseBody::Text(format!("Unsupported return type: {}", other.describe()))
            }
        };
        Ok(DispatchResponse::ok(body))
    }

    /// Render a pipeline failure.
    #[must_use]
    pub fn render_error(&self, err: &DispatchError, path: &str, json: bool) -> DispatchResponse {
        match err {
            DispatchError::RouteNotFound(_) => DispatchResponse::new(
                ResponseStatus::NotFound,
                ResponseBody::Text(format!("No handler found for: {path}")),
            ),
            DispatchError::AccessDenied { required } => {
                let body = if json {
                    ResponseBody::Json(error_json(&json!({
                        "error": "Forbidden",
                        "required_roles": required,
                    })))
                } else {
                    ResponseBody::Html(forbidden_page(required))
                };
                DispatchResponse::new(ResponseStatus::Forbidden, body)
            }
            other => {
                let message = if self.expose_errors {
                    other.chain()
                } else {
                    ResponseStatus::ServerError.reason().to_string()
                };
                let body = if json {
                    ResponseBody::Json(error_json(&json!({ "error": message })))
                } else {
                    ResponseBody::Text(message)
                };
                DispatchResponse::new(ResponseStatus::ServerError, body)
            }
        }
    }
}

fn error_json(value: &Value) -> String {
    to_json(value).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode error body");
        String::from("{\"error\":\"Internal Server Error\"}")
    })
}

fn forbidden_page(required: &[String]) -> String {
    let roles = required
        .iter()
        .map(|r| escape_html(r))
        .collect::<Vec<_>>()
        .join(" or ");
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>403 Forbidden</title></head>\n<body>\n\
         <h1>403 Forbidden</h1>\n<p>Access denied. Required role: {roles}</p>\n</body>\n</html>\n"
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
