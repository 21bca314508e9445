//! # Handlers Module
//!
//! Handlers are registered as explicit descriptors: a name, an ordered list of
//! [`ParameterDescriptor`]s, a JSON flag, and a closure receiving the resolved
//! [`CallArguments`].
//!
//! ```rust
//! use frontdispatch::convert::ScalarKind;
//! use frontdispatch::handlers::{HandlerDescriptor, ParameterDescriptor};
//! use frontdispatch::render::Renderable;
//!
//! let show = HandlerDescriptor::new("show_item", |args| {
//!     let id: i32 = args.scalar(0).unwrap_or_default();
//!     Ok(Renderable::text(format!("item {id}")))
//! })
//! .param(ParameterDescriptor::scalar("id", ScalarKind::Int));
//! assert_eq!(show.parameters().len(), 1);
//! ```

mod args;
mod binder;
mod types;

pub use args::{Argument, CallArguments, SessionMap, MAX_INLINE_ARGS};
pub use binder::{BindingFailure, FieldBinder, ObjectBinder};
pub use types::{HandlerDescriptor, HandlerFn, ParamKind, ParameterDescriptor};
