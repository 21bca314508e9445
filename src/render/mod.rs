//! # Render Module
//!
//! Turns a handler's [`Renderable`] result into a [`DispatchResponse`](crate::server::DispatchResponse).
//!
//! | Route      | Result        | Response                                   |
//! |------------|---------------|--------------------------------------------|
//! | JSON       | view + model  | model map encoded as JSON                  |
//! | JSON       | anything else | the result encoded as JSON                 |
//! | non-JSON   | view + model  | forward to the view with the model entries |
//! | non-JSON   | text          | the text, literally                        |
//! | non-JSON   | data          | `Unsupported return type: <shape>`         |
//!
//! The view layer is a collaborator behind [`ViewRenderer`]. Without one, a
//! forward is returned to the transport as a view name plus attributes.
//! [`MiniJinjaViews`] renders views from MiniJinja templates.

mod core;
mod model;
mod view;

pub use core::{RenderError, ResponseRenderer};
pub use model::{ModelView, Renderable};
pub use view::{MiniJinjaViews, ViewRenderer};
