//! # Dispatcher Module
//!
//! The request pipeline.
//!
//! [`FrontController::handle`] runs one [`InboundRequest`](crate::server::InboundRequest):
//!
//! 1. resolve the route (first match in registration order), else 404
//! 2. check the route's roles against the client session, else 403
//! 3. load the session if the handler declares a session parameter
//! 4. resolve arguments with the [`ArgumentResolver`]; a failed scalar
//!    conversion or an oversize upload stops here with a 500
//! 5. invoke the handler once; errors and panics become a 500
//! 6. merge every session argument back into the client session
//! 7. render the result as JSON, a view forward or text
//!
//! Each request runs inside a `dispatch` tracing span carrying a fresh
//! request id.

mod core;
mod resolver;

pub use core::FrontController;
pub use resolver::{
    ArgumentResolver, BindError, UploadLimits, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_REQUEST_SIZE,
};
