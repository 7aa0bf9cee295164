//! The engine: route registration and the HTTP server.
//!
//! # Responsibilities
//! - Register controllers on an axum Router by path and method
//! - Wire up middleware (request ID, tracing, timeout, body limit, body
//!   parsing, sessions, uploads, metrics)
//! - Bind to loopback and serve until shutdown
//! - Run the session reaper alongside the server

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{Method, StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validation::validate_config, ConfigError, LeiConfig};
use crate::engine::route::{conflicts, normalize_path, Route, RouteInfo, RouteMethod};
use crate::error::{LeiError, Result};
use crate::http::{body, upload, RequestContext};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::session::{session_middleware, MemoryStore, SessionManager, SessionReaper, SessionStore};

/// Owns the route table and the middleware configuration of one HTTP server.
pub struct Engine {
    config: LeiConfig,
    router: Router,
    routes: Vec<RouteInfo>,
    sessions: SessionManager,
}

impl Engine {
    /// Create an engine with an in-memory session store.
    pub fn new(config: LeiConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create an engine backed by the given session store.
    pub fn with_store(config: LeiConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let sessions = SessionManager::new(config.session.clone(), store)?;
        Ok(Self {
            config,
            router: Router::new(),
            routes: Vec::new(),
            sessions,
        })
    }

    pub fn config(&self) -> &LeiConfig {
        &self.config
    }

    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Register a route.
    ///
    /// Fails without registering anything if the method is not GET or POST,
    /// the path is malformed, the same path and method are already registered,
    /// or the path's parameters clash with a registered route.
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        let Route {
            name,
            path,
            method,
            controller,
        } = route;

        let method = RouteMethod::parse(method.as_deref())?;
        let path = normalize_path(&path)?;
        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.path == path)
        {
            return Err(LeiError::DuplicateRoute { method, path });
        }
        if let Some(existing) = self.routes.iter().find(|r| conflicts(&r.path, &path)) {
            return Err(LeiError::ConflictingRoute {
                path,
                existing: existing.path.clone(),
            });
        }

        let mut controller = controller;
        controller.apply_defaults(&self.config);
        let controller = Arc::new(controller);
        let handler = move |ctx: RequestContext| {
            let controller = Arc::clone(&controller);
            async move { controller.run(ctx).await }
        };
        let method_router = match method {
            RouteMethod::Get => get(handler),
            RouteMethod::Post => post(handler),
        };

        let router = std::mem::replace(&mut self.router, Router::new());
        self.router = router.route(&path, method_router);

        tracing::info!(name = %name, method = %method, path = %path, "Route registered");
        self.routes.push(RouteInfo { name, method, path });
        Ok(())
    }

    /// The fully layered router serving the registered routes.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let config = &self.config;
        let mut router = self.router.clone();
        if !self.routes.is_empty() {
            router = router.route_layer(middleware::from_fn(metrics::track_requests));
        }

        // Layers wrap everything added before them, so the request passes
        // through them bottom to top.
        router
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(
                config.uploads.clone(),
                upload::multipart_body,
            ))
            .layer(middleware::from_fn_with_state(
                self.sessions.clone(),
                session_middleware,
            ))
            .layer(middleware::from_fn(body::urlencoded_body))
            .layer(middleware::from_fn(body::json_body))
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Listen on `127.0.0.1:port` (the configured port if `None`) until Ctrl+C.
    pub async fn run(self, port: impl Into<Option<u16>>) -> Result<()> {
        let port = port.into().unwrap_or(self.config.listener.port);
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).await?;
        tracing::info!(port, "Lei/Axum Server is running on port {}", port);

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        tokio::spawn(signals::shutdown_on_ctrl_c(shutdown));

        self.serve(listener, receiver).await
    }

    /// Serve on an already bound listener until `shutdown` fires.
    pub async fn serve(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.routes.len(), "HTTP server starting");

        let reaper = SessionReaper::new(
            self.sessions.store(),
            Duration::from_secs(self.config.session.reap_interval_secs),
        );
        tokio::spawn(reaper.run(shutdown.resubscribe()));

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        format!("Cannot {} {}", method, uri.path()),
    )
}
