//! Engine: server lifecycle, middleware and the route table.
//!
//! # Data Flow
//! ```text
//! Route { name, path, method, controller }
//!     → route.rs (method check, path normalisation)
//!     → server.rs (register on the axum Router)
//!
//! Incoming request
//!     → request ID, tracing, timeout, body limit
//!     → JSON body → URL-encoded body → session → multipart uploads
//!     → matched route → Controller::run
//! ```
//!
//! # Design Decisions
//! - Bad routes fail at registration time, never at request time
//! - Only GET and POST are accepted
//! - The listener binds loopback only

pub mod route;
pub mod server;

pub use route::{Route, RouteInfo, RouteMethod};
pub use server::Engine;
