//! Request body parsing middleware.
//!
//! # Responsibilities
//! - Parse `application/json` object bodies; other JSON values leave the body empty
//! - Parse `application/x-www-form-urlencoded` bodies, with `a[b]=c` and `a[]=c` nesting
//! - Attach the parsed fields to the request as [`ParsedBody`]
//!
//! # Design Decisions
//! - Each parser only touches its own content type; everything else passes through
//! - The buffered body is put back on the request for downstream extractors
//! - Body size limits come from axum's `DefaultBodyLimit`, installed by the engine

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::mvc::Data;

/// Fields parsed from the request body.
#[derive(Debug, Clone, Default)]
pub struct ParsedBody(pub Data);

/// Deepest bracket nesting honoured in form keys; deeper keys are kept literally.
const MAX_DEPTH: usize = 5;

pub async fn json_body(req: Request, next: Next) -> Response {
    if !is_json(req.headers()) {
        return next.run(req).await;
    }
    let (mut req, bytes) = match buffer(req).await {
        Ok(buffered) => buffered,
        Err(response) => return response,
    };

    let data = if bytes.iter().all(u8::is_ascii_whitespace) {
        Data::new()
    } else {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::debug!("Ignoring non-object JSON body");
                Data::new()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Malformed JSON body");
                return (StatusCode::BAD_REQUEST, "Malformed JSON body").into_response();
            }
        }
    };

    merge_body(&mut req, data);
    next.run(req).await
}

pub async fn urlencoded_body(req: Request, next: Next) -> Response {
    if !has_content_type(req.headers(), "application/x-www-form-urlencoded") {
        return next.run(req).await;
    }
    let (mut req, bytes) = match buffer(req).await {
        Ok(buffered) => buffered,
        Err(response) => return response,
    };

    let data = parse_urlencoded(&bytes);
    merge_body(&mut req, data);
    next.run(req).await
}

/// Read the whole body, returning a request that still carries it.
async fn buffer(req: Request) -> Result<(Request, Bytes), Response> {
    let (parts, body) = req.into_parts();
    let mut inner = Request::new(body);
    *inner.extensions_mut() = parts.extensions.clone();

    let bytes = Bytes::from_request(inner, &())
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((Request::from_parts(parts, Body::from(bytes.clone())), bytes))
}

/// Add fields to the request's [`ParsedBody`], creating it if needed.
pub(crate) fn merge_body(req: &mut Request, data: Data) {
    match req.extensions_mut().get_mut::<ParsedBody>() {
        Some(ParsedBody(existing)) => existing.extend(data),
        None => {
            req.extensions_mut().insert(ParsedBody(data));
        }
    }
}

pub(crate) fn has_content_type(headers: &HeaderMap, expected: &str) -> bool {
    content_type(headers).is_some_and(|mime| mime.eq_ignore_ascii_case(expected))
}

fn is_json(headers: &HeaderMap) -> bool {
    content_type(headers).is_some_and(|mime| {
        let mime = mime.to_ascii_lowercase();
        mime == "application/json" || mime.ends_with("+json")
    })
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
}

/// Parse `application/x-www-form-urlencoded` input (also used for query strings).
///
/// Repeated keys collect into arrays, `a[]=x` always yields an array and
/// `a[b]=x` yields nested objects.
pub fn parse_urlencoded(input: &[u8]) -> Data {
    let mut data = Data::new();
    for (key, value) in form_urlencoded::parse(input) {
        insert_pair(&mut data, &key, Value::String(value.into_owned()));
    }
    data
}

pub(crate) fn insert_pair(data: &mut Data, key: &str, value: Value) {
    let segments = key_segments(key);
    if segments.len() > MAX_DEPTH + 1 {
        append_value(data, key, value);
    } else {
        insert_nested(data, &segments, value);
    }
}

fn key_segments(key: &str) -> Vec<&str> {
    match key.find('[') {
        Some(open) if open > 0 && key.ends_with(']') => {
            let mut segments = vec![&key[..open]];
            segments.extend(key[open + 1..key.len() - 1].split("]["));
            segments
        }
        _ => vec![key],
    }
}

fn insert_nested(target: &mut Data, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    match rest {
        [] => append_value(target, first, value),
        [""] => {
            let slot = target
                .entry(first.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(value),
                other => {
                    let previous = other.take();
                    *other = Value::Array(vec![previous, value]);
                }
            }
        }
        _ => {
            let slot = target
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Data::new()));
            if !slot.is_object() {
                *slot = Value::Object(Data::new());
            }
            if let Value::Object(child) = slot {
                insert_nested(child, rest, value);
            }
        }
    }
}

fn append_value(target: &mut Data, key: &str, value: Value) {
    match target.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            target.insert(key.to_string(), value);
        }
    }
}
