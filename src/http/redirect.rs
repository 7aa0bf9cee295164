//! Redirect target resolution and redirect responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use url::Url;

use crate::error::{LeiError, Result};
use crate::http::RequestContext;
use crate::mvc::Data;

/// Resolve `target` against the request's own origin and append `params` as
/// query parameters.
pub fn resolve(ctx: &RequestContext, target: &str, params: &Data) -> Result<Url> {
    let invalid = |source| LeiError::InvalidRedirect {
        target: target.to_string(),
        source,
    };

    let origin = format!("{}://{}/", ctx.scheme(), ctx.host().unwrap_or("localhost"));
    let base = Url::parse(&origin).map_err(invalid)?;
    let mut url = base.join(target).map_err(invalid)?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, &coerce(value));
        }
    }
    Ok(url)
}

/// String form of a value used as a query parameter.
///
/// Strings are used as-is, arrays are comma-joined, everything else uses its
/// JSON text (`7`, `true`, `null`, `{"a":1}`).
pub fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(coerce).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

pub fn respond(status: StatusCode, location: &Url) -> Response {
    (
        status,
        [(header::LOCATION, location.as_str().to_owned())],
        format!("Redirecting to {}", location),
    )
        .into_response()
}
