//! # Router Module
//!
//! Route registration and matching.
//!
//! ## Compilation
//!
//! At startup every [`Route`] template (e.g. `/emp/{id}/edit`) is compiled into
//! an anchored regex where each `{name}` matches exactly one non-empty path
//! segment, and the variable names are recorded in template order. The result
//! is an immutable [`RouteTable`] that can be shared across threads without
//! locking.
//!
//! ## Matching
//!
//! [`RouteTable::resolve`] walks the entries in registration order and returns
//! the first whose template matches the whole path and whose [`Verb`] accepts
//! the request method. Overlapping templates are resolved by registration
//! order, not by specificity: with `/items/{id}` registered before
//! `/items/new`, a request for `/items/new` goes to `/items/{id}`.
//! [`RouteTable::shadowed_routes`] reports such pairs, and building the table
//! logs them.
//!
//! ```rust
//! use frontdispatch::handlers::HandlerDescriptor;
//! use frontdispatch::render::Renderable;
//! use frontdispatch::router::{Route, RouteTable};
//! use http::Method;
//!
//! # fn main() -> Result<(), frontdispatch::error::RegistrationError> {
//! let ok = || HandlerDescriptor::new("h", |_| Ok(Renderable::text("ok")));
//! let table = RouteTable::builder()
//!     .register(Route::get("/emp/{dept}/{id}"), ok())?
//!     .register(Route::any("/health"), ok())?
//!     .build();
//!
//! let m = table.resolve("/emp/sales/42", &Method::GET).unwrap();
//! assert_eq!(m.variable("dept"), Some("sales"));
//! assert_eq!(m.variable("id"), Some("42"));
//! assert!(table.resolve("/emp/sales/42", &Method::POST).is_err());
//! assert!(table.resolve("/health", &Method::DELETE).is_ok());
//! # Ok(())
//! # }
//! ```

mod core;

pub use core::{
    MatchResult, ParamVec, Route, RouteEntry, RouteNotFound, RouteTable, RouteTableBuilder, Verb,
    MAX_INLINE_PARAMS,
};
