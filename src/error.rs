//! Framework error type.
//!
//! Configuration errors (bad routes, invalid config) are returned from setup
//! calls and abort startup. Per-request errors (model failures, template
//! failures) are logged and become a plain `500 Internal Server Error`.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::engine::RouteMethod;
use crate::observability::metrics;
use crate::session::SessionError;

/// Error returned by user models. Any error type can be boxed into it with `?`.
pub type ModelError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T, E = LeiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LeiError {
    /// Route registered with a method other than GET or POST.
    #[error("The method '{0}' is not supported yet")]
    UnsupportedMethod(String),

    /// Route path does not start with `/`.
    #[error("Invalid route path '{0}': paths must start with '/'")]
    InvalidRoutePath(String),

    /// The same path and method were registered twice.
    #[error("Route {method} {path} is already registered")]
    DuplicateRoute { method: RouteMethod, path: String },

    /// The route's parameters clash with an already registered route.
    #[error("Route {path} conflicts with registered route {existing}")]
    ConflictingRoute { path: String, existing: String },

    /// A strict view was rendered without a template file.
    #[error("No template file set for this view")]
    TemplateNotSet,

    /// The template file could not be read.
    #[error("Failed to read template {path:?}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template failed to compile or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The model returned an error.
    #[error("Model failed: {0}")]
    Model(#[source] ModelError),

    /// The model returned a status code outside 100..=599.
    #[error("Invalid status code {0}")]
    InvalidStatus(u16),

    /// The redirect target could not be resolved against the request host.
    #[error("Invalid redirect target '{target}': {source}")]
    InvalidRedirect {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for LeiError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            LeiError::TemplateNotSet | LeiError::TemplateRead { .. } | LeiError::Template(_)
        ) {
            metrics::record_render_error();
        }
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
