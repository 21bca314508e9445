use super::resolver::ArgumentResolver;
use crate::error::DispatchError;
use crate::handlers::ParameterDescriptor;
use crate::ids::{RequestId, SessionId};
use crate::render::{MiniJinjaViews, ResponseRenderer};
use crate::router::RouteTable;
use crate::runtime_config::DispatchConfig;
use crate::security::AccessDecision;
use crate::server::{DispatchResponse, InboundRequest};
use crate::session::{SessionBridge, SessionScope};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

/// Single entry point of the pipeline.
///
/// Owns the immutable [`RouteTable`] and the collaborators used around each
/// handler call. `handle` takes `&self`, so one controller serves any number of
/// concurrent requests.
pub struct FrontController {
    routes: RouteTable,
    resolver: ArgumentResolver,
    sessions: SessionBridge,
    renderer: ResponseRenderer,
}

struct Outcome {
    json: bool,
    new_session: Option<SessionId>,
}

impl FrontController {
    /// Controller with default collaborators: in-memory sessions, default
    /// upload limits, no view renderer, error details hidden.
    #[must_use]
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            resolver: ArgumentResolver::default(),
            sessions: SessionBridge::in_memory(),
            renderer: ResponseRenderer::new(),
        }
    }

    /// Controller configured from a [`DispatchConfig`].
    ///
    /// The role session key is applied when the table is built, see
    /// [`DispatchConfig::route_builder`].
    #[must_use]
    pub fn from_config(routes: RouteTable, config: &DispatchConfig) -> Self {
        let mut renderer = ResponseRenderer::new().expose_errors(config.expose_errors);
        if let Some(dir) = &config.view_dir {
            renderer = renderer.with_views(Arc::new(MiniJinjaViews::from_dir(dir.clone())));
        }
        Self {
            routes,
            resolver: ArgumentResolver::new(config.upload_limits),
            sessions: SessionBridge::in_memory(),
            renderer,
        }
    }

    #[must_use]
    pub fn with_sessions(mut self, sessions: SessionBridge) -> Self {
        self.sessions = sessions;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: ResponseRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: ArgumentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionBridge {
        &self.sessions
    }

    /// Run one request through match, role check, argument resolution,
    /// invocation, session write-back and rendering.
    ///
    /// Every failure is rendered; this never panics on handler panics.
    pub fn handle(&self, request: &InboundRequest) -> DispatchResponse {
        let request_id = RequestId::new();
        let span = info_span!(
            "dispatch",
            request_id = %request_id,
            method = %request.method(),
            path = %request.path()
        );
        let _enter = span.enter();
        let start = Instant::now();

        let mut outcome = Outcome {
            json: false,
            new_session: None,
        };
        let response = match self.dispatch(request, &mut outcome) {
            Ok(response) => response,
            Err(err) => self.renderer.render_error(&err, request.path(), outcome.json),
        };

        info!(
            status = response.status_code(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Request complete"
        );
        response.with_new_session(outcome.new_session)
    }

    fn dispatch(
        &self,
        request: &InboundRequest,
        outcome: &mut Outcome,
    ) -> Result<DispatchResponse, DispatchError> {
        let matched = self.routes.resolve(request.path(), request.method())?;
        let entry = matched.entry;
        let handler = entry.handler();
        outcome.json = handler.produces_json();

        if !outcome.json {
            debug!(
                route_pattern = %entry.template(),
                verb = %entry.verb(),
                handler_name = %handler.name(),
                "Matched route"
            );
        }

        // A1: Role check, before any resolution side effect
        let reader = self.sessions.reader(request.session());
        if let AccessDecision::Denied { required } = entry.access().authorize(&reader) {
            warn!(
                handler_name = %handler.name(),
                session_key = %entry.access().session_key(),
                required_roles = ?required,
                "Access denied"
            );
            return Err(DispatchError::AccessDenied { required });
        }

        let scope: Option<SessionScope> = handler
            .parameters()
            .iter()
            .any(ParameterDescriptor::is_session)
            .then(|| self.sessions.load(request.session()));
        if let Some(scope) = &scope {
            outcome.new_session = scope.new_session();
        }

        let mut args = self
            .resolver
            .resolve(
                handler.parameters(),
                &matched,
                request,
                scope.as_ref().map(SessionScope::attributes),
            )
            .map_err(|e| {
                warn!(handler_name = %handler.name(), error = %e, "Argument binding failed");
                e
            })?;

        // H2: Handler execution start
        info!(
            handler_name = %handler.name(),
            arguments = args.len(),
            "Handler execution start"
        );
        let execution_start = Instant::now();

        let result = match catch_unwind(AssertUnwindSafe(|| handler.invoke(&mut args))) {
            Ok(Ok(result)) => result,
            Ok(Err(source)) => {
                error!(
                    handler_name = %handler.name(),
                    error = %source,
                    "Handler failed"
                );
                return Err(DispatchError::Handler {
                    handler: handler.name().to_string(),
                    source,
                });
            }
            Err(panic) => {
                // H3: Handler panic caught
                let message = panic_message(panic.as_ref());
                error!(
                    handler_name = %handler.name(),
                    panic_message = %message,
                    "Handler panicked"
                );
                return Err(DispatchError::HandlerPanicked {
                    handler: handler.name().to_string(),
                    message,
                });
            }
        };

        // H4: Handler execution complete
        info!(
            handler_name = %handler.name(),
            execution_time_ms = execution_start.elapsed().as_millis() as u64,
            result = result.describe(),
            "Handler execution complete"
        );

        if let Some(scope) = &scope {
            for (index, parameter) in handler.parameters().iter().enumerate() {
                if !parameter.is_session() {
                    continue;
                }
                if let Some(attributes) = args.session(index) {
                    self.sessions.save(&scope.id(), attributes);
                }
            }
        }

        Ok(self.renderer.render(result, outcome.json)?)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("non-string panic payload")
    }
}
