//! # Request and Response Views
//!
//! Types exchanged with the transport. The transport parses the HTTP request
//! (headers, query string, form body, multipart parts, session cookie) into an
//! [`InboundRequest`], hands it to
//! [`FrontController::handle`](crate::dispatcher::FrontController::handle) and
//! writes the returned [`DispatchResponse`] back to the client.

pub mod request;
pub mod response;
pub mod upload;

pub use request::{InboundRequest, RequestParams};
pub use response::{DispatchResponse, ResponseBody, ResponseStatus};
pub use upload::{MultipartPart, UploadedFile};
