//! Per-request context handed to models.
//!
//! # Responsibilities
//! - Snapshot method, URI, headers, path parameters and query of the request
//! - Carry the parsed body and uploads attached by middleware
//! - Carry the client's [`Session`] explicitly instead of as ambient state

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::{header, request::Parts, HeaderMap, Method, Uri},
};
use serde_json::Value;

use crate::http::body::{parse_urlencoded, ParsedBody};
use crate::http::upload::{UploadedFile, Uploads};
use crate::mvc::Data;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Data,
    query: Data,
    body: Data,
    files: Vec<UploadedFile>,
    session: Session,
}

impl RequestContext {
    /// Build a context with an empty body and a fresh, detached session.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        let query = uri
            .query()
            .map(|q| parse_urlencoded(q.as_bytes()))
            .unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            params: Data::new(),
            query,
            body: Data::new(),
            files: Vec::new(),
            session: Session::default(),
        }
    }

    pub fn with_params(mut self, params: Data) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Data) -> Self {
        self.body = body;
        self
    }

    pub fn with_files(mut self, files: Vec<UploadedFile>) -> Self {
        self.files = files;
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Path parameters captured by the route (`/users/{id}` or `/users/:id`).
    pub fn params(&self) -> &Data {
        &self.params
    }

    pub fn query(&self) -> &Data {
        &self.query
    }

    pub fn body(&self) -> &Data {
        &self.body
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// First uploaded file sent under `field`.
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Look a value up in path parameters, then the body, then the query string.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .get(name)
            .or_else(|| self.body.get(name))
            .or_else(|| self.query.get(name))
    }

    /// Request scheme: `X-Forwarded-Proto` if present, else the URI scheme, else `http`.
    pub fn scheme(&self) -> &str {
        self.header("x-forwarded-proto")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| self.uri.scheme_str())
            .unwrap_or("http")
    }

    /// Request host from the `Host` header or the URI authority.
    pub fn host(&self) -> Option<&str> {
        self.header(header::HOST.as_str())
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = match RawPathParams::from_request_parts(parts, state).await {
            Ok(raw) => raw
                .iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect(),
            Err(_) => Data::new(),
        };
        let body = parts
            .extensions
            .get::<ParsedBody>()
            .map(|b| b.0.clone())
            .unwrap_or_default();
        let files = parts
            .extensions
            .get::<Uploads>()
            .map(|u| u.0.clone())
            .unwrap_or_default();
        let session = parts.extensions.get::<Session>().cloned().unwrap_or_default();

        Ok(
            RequestContext::new(parts.method.clone(), parts.uri.clone(), parts.headers.clone())
                .with_params(params)
                .with_body(body)
                .with_files(files)
                .with_session(session),
        )
    }
}
