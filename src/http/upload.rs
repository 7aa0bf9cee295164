//! Multipart upload parsing middleware.
//!
//! File parts become [`UploadedFile`]s on the request; plain text parts are
//! merged into the parsed body. Upload contents are never interpreted.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::config::UploadConfig;
use crate::http::body::{has_content_type, insert_pair, merge_body};
use crate::mvc::Data;

/// A file received in a `multipart/form-data` body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file was sent under.
    pub field: String,
    /// File name supplied by the client.
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// All files uploaded with the current request.
#[derive(Debug, Clone, Default)]
pub struct Uploads(pub Vec<UploadedFile>);

pub async fn multipart_body(
    State(config): State<UploadConfig>,
    req: Request,
    next: Next,
) -> Response {
    if !config.enabled || !has_content_type(req.headers(), "multipart/form-data") {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let mut inner = Request::new(body);
    *inner.headers_mut() = parts.headers.clone();
    *inner.extensions_mut() = parts.extensions.clone();

    let mut multipart = match Multipart::from_request(inner, &()).await {
        Ok(multipart) => multipart,
        Err(rejection) => return rejection.into_response(),
    };

    let mut files = Vec::new();
    let mut fields = Data::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (e.status(), e.body_text()).into_response(),
        };
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                if files.len() >= config.max_files {
                    tracing::warn!(max_files = config.max_files, "Too many files in upload");
                    return (StatusCode::PAYLOAD_TOO_LARGE, "Too many files").into_response();
                }
                let content_type = field.content_type().map(str::to_owned);
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => return (e.status(), e.body_text()).into_response(),
                };
                files.push(UploadedFile {
                    field: name,
                    file_name,
                    content_type,
                    data,
                });
            }
            None => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(e) => return (e.status(), e.body_text()).into_response(),
                };
                insert_pair(&mut fields, &name, Value::String(text));
            }
        }
    }

    tracing::debug!(files = files.len(), fields = fields.len(), "Parsed multipart body");

    let mut req = Request::from_parts(parts, Body::empty());
    merge_body(&mut req, fields);
    req.extensions_mut().insert(Uploads(files));
    next.run(req).await
}
