//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use lei::{Engine, LeiConfig, Shutdown, View};

/// Write a template into `dir` and return a view for it.
pub fn view(dir: &TempDir, name: &str, source: &str) -> View {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    View::new(path)
}

pub fn engine() -> Engine {
    Engine::new(LeiConfig::default()).unwrap()
}

/// Send one request through the router.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the response's Set-Cookie header, if any.
pub fn cookie_pair(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn get(path: &str) -> Request<Body> {
    Request::get(path)
        .header(header::HOST, "example.test")
        .body(Body::empty())
        .unwrap()
}

pub fn post(path: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(path)
        .header(header::HOST, "example.test")
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap()
}

/// Serve the engine on an ephemeral loopback port.
pub async fn spawn_engine(engine: Engine) -> (SocketAddr, Shutdown, JoinHandle<lei::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(engine.serve(listener, shutdown.subscribe()));
    (addr, shutdown, handle)
}

pub fn template_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

