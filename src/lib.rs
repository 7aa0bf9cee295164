//! Lei: a small Model-View-Controller layer for axum.
//!
//! A `Model` produces a [`ResponseDescriptor`], a `View` renders a template
//! file, and a `Controller` glues the two together. Controllers are bound to
//! `(path, method)` pairs through [`Route`]s registered on an [`Engine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod mvc;
pub mod observability;
pub mod session;

pub use config::schema::LeiConfig;
pub use engine::{Engine, Route, RouteMethod};
pub use error::{LeiError, ModelError, Result};
pub use http::RequestContext;
pub use lifecycle::Shutdown;
pub use mvc::{Controller, Data, FnModel, Model, ResponseDescriptor, TemplatePolicy, View};
pub use session::{MemoryStore, Session, SessionStore};
