//! Model-View-Controller core.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → model.rs (Model::run → ResponseDescriptor)
//!     → controller.rs
//!         redirect set  → http::redirect (query params) + session writes
//!         otherwise     → view.rs (render template with data ∪ session_data)
//!     → axum Response
//! ```
//!
//! # Design Decisions
//! - Controllers render with request-scoped variables; a View shared by all
//!   requests of a route never holds per-request state
//! - Templates are read from disk on every render so edits show up immediately
//! - Models are trait objects so routes can mix model types freely

pub mod controller;
pub mod descriptor;
pub mod model;
pub mod view;

pub use controller::Controller;
pub use descriptor::{Data, ResponseDescriptor};
pub use model::{EmptyModel, FnModel, Model};
pub use view::{TemplatePolicy, View};
