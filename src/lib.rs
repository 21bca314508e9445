//! # frontdispatch
//!
//! A front-controller dispatch engine: one entry point receives every request,
//! matches it against an explicit registry of handlers, binds request data to
//! typed handler arguments, invokes the handler and renders its result.
//!
//! ## Architecture
//!
//! - **[`router`]** - `{name}` templates compiled to anchored regexes; first
//!   match in registration order
//! - **[`security`]** - role checks against a session attribute
//! - **[`dispatcher`]** - the pipeline ([`FrontController`]) and the
//!   [`ArgumentResolver`](dispatcher::ArgumentResolver)
//! - **[`handlers`]** - handler and parameter descriptors, call arguments,
//!   field binders for object parameters
//! - **[`session`]** - session load and merge-back around the handler call
//! - **[`render`]** - JSON, view-forward and text rendering
//! - **[`server`]** - request and response views exchanged with the transport
//! - **[`convert`]** / **[`json`]** - scalar conversion and JSON encoding
//! - **[`runtime_config`]** / **[`logging`]** - environment configuration and
//!   tracing setup
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant T as Transport
//!     participant FC as FrontController
//!     participant RT as RouteTable
//!     participant AP as AccessRule
//!     participant AR as ArgumentResolver
//!     participant H as Handler
//!     participant SB as SessionBridge
//!     participant RR as ResponseRenderer
//!
//!     T->>FC: handle(&InboundRequest)
//!     FC->>RT: resolve(path, method)
//!     RT-->>FC: MatchResult | RouteNotFound (404)
//!     FC->>AP: authorize(session reader)
//!     AP-->>FC: Allowed | Denied (403)
//!     FC->>SB: load(client) if a session parameter is declared
//!     FC->>AR: resolve(parameters, match, request, session)
//!     AR-->>FC: CallArguments | BindError (500)
//!     FC->>H: invoke(&mut args)
//!     H-->>FC: Renderable | error or panic (500)
//!     FC->>SB: save(session arguments)
//!     FC->>RR: render(result, json)
//!     RR-->>T: DispatchResponse
//! ```
//!
//! ## Example
//!
//! ```rust
//! use frontdispatch::convert::ScalarKind;
//! use frontdispatch::handlers::{HandlerDescriptor, ParameterDescriptor};
//! use frontdispatch::render::Renderable;
//! use frontdispatch::router::{Route, RouteTable};
//! use frontdispatch::server::{InboundRequest, ResponseBody};
//! use frontdispatch::FrontController;
//! use http::Method;
//!
//! # fn main() -> Result<(), frontdispatch::error::RegistrationError> {
//! let hello = HandlerDescriptor::new("hello", |args| {
//!     let name = args.text(0).unwrap_or("world").to_string();
//!     Ok(Renderable::data(&serde_json::json!({ "hello": name }))?)
//! })
//! .param(ParameterDescriptor::text("name"))
//! .json();
//!
//! let routes = RouteTable::builder()
//!     .register(Route::get("/hello/{name}"), hello)?
//!     .build();
//! let controller = FrontController::new(routes);
//!
//! let response = controller.handle(&InboundRequest::new(Method::GET, "/hello/ann"));
//! assert_eq!(response.status_code(), 200);
//! assert_eq!(response.body, ResponseBody::Json(r#"{"hello":"ann"}"#.into()));
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod json;
pub mod logging;
pub mod render;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod server;
pub mod session;

pub use dispatcher::FrontController;
pub use error::{DispatchError, RegistrationError};
pub use render::{ModelView, Renderable};
pub use router::{Route, RouteTable, Verb};
