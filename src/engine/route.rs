//! Route definitions.

use std::fmt;
use std::str::FromStr;

use crate::error::{LeiError, Result};
use crate::mvc::Controller;

/// HTTP methods a route can be registered under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    #[default]
    Get,
    Post,
}

impl RouteMethod {
    /// Parse a method name case-insensitively. `None` means GET.
    pub fn parse(method: Option<&str>) -> Result<Self> {
        match method {
            None => Ok(RouteMethod::Get),
            Some(m) if m.eq_ignore_ascii_case("get") => Ok(RouteMethod::Get),
            Some(m) if m.eq_ignore_ascii_case("post") => Ok(RouteMethod::Post),
            Some(other) => Err(LeiError::UnsupportedMethod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMethod {
    type Err = LeiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

/// A named binding of a path and method to a controller.
///
/// `name` is descriptive only; it is logged but never used for lookup.
#[derive(Debug)]
pub struct Route {
    pub name: String,
    pub path: String,
    /// Method name, checked when the route is registered. `None` means GET.
    pub method: Option<String>,
    pub controller: Controller,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>, controller: Controller) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method: None,
            controller,
        }
    }

    pub fn get(name: impl Into<String>, path: impl Into<String>, controller: Controller) -> Self {
        Self::new(name, path, controller).with_method("GET")
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>, controller: Controller) -> Self {
        Self::new(name, path, controller).with_method("POST")
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// A registered route, as listed by `Engine::routes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub name: String,
    pub method: RouteMethod,
    /// Path as registered with axum, after normalisation.
    pub path: String,
}

/// Check a route path and rewrite `:param`, `*` and `*name` segments to
/// axum's `{param}`, `{*wildcard}` and `{*name}` syntax.
///
/// Anything axum would refuse is rejected here: a missing leading `/`, empty
/// or malformed parameter names, stray braces, a wildcard that is not the
/// last segment and repeated parameter names.
pub(crate) fn normalize_path(path: &str) -> Result<String> {
    let invalid = || LeiError::InvalidRoutePath(path.to_string());
    if !path.starts_with('/') {
        return Err(invalid());
    }

    let raw: Vec<&str> = path.split('/').collect();
    let mut names = Vec::new();
    let mut segments = Vec::with_capacity(raw.len());
    for (i, segment) in raw.iter().enumerate() {
        let normalized = match Segment::parse(segment).ok_or_else(invalid)? {
            Segment::Static(s) => s.to_string(),
            Segment::Param(name) => {
                names.push(name);
                format!("{{{}}}", name)
            }
            Segment::CatchAll(name) => {
                if i + 1 != raw.len() {
                    return Err(invalid());
                }
                names.push(name);
                format!("{{*{}}}", name)
            }
        };
        segments.push(normalized);
    }

    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != names.len() {
        return Err(invalid());
    }
    Ok(segments.join("/"))
}

/// Whether axum would refuse to hold both normalised paths in one router.
///
/// Paths clash when, at the same position after an identical static prefix,
/// both have a parameter or wildcard and the two differ in kind or name.
pub(crate) fn conflicts(a: &str, b: &str) -> bool {
    for (left, right) in a.split('/').zip(b.split('/')) {
        match (Segment::parse(left), Segment::parse(right)) {
            (Some(Segment::Static(x)), Some(Segment::Static(y))) if x == y => continue,
            (Some(Segment::Param(x)), Some(Segment::Param(y))) if x == y => continue,
            (Some(Segment::CatchAll(x)), Some(Segment::CatchAll(y))) => return x != y,
            (Some(Segment::Static(_)), _) | (_, Some(Segment::Static(_))) => return false,
            _ => return true,
        }
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    CatchAll(&'a str),
}

impl<'a> Segment<'a> {
    /// Classify one segment in either Express (`:id`, `*rest`) or axum
    /// (`{id}`, `{*rest}`) syntax. `None` if it is malformed.
    fn parse(segment: &'a str) -> Option<Self> {
        if segment == "*" {
            return Some(Segment::CatchAll("wildcard"));
        }
        if let Some(name) = segment.strip_prefix(':') {
            return is_ident(name).then_some(Segment::Param(name));
        }
        if let Some(name) = segment.strip_prefix('*') {
            return is_ident(name).then_some(Segment::CatchAll(name));
        }
        if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            return match inner.strip_prefix('*') {
                Some(name) => is_ident(name).then_some(Segment::CatchAll(name)),
                None => is_ident(inner).then_some(Segment::Param(inner)),
            };
        }
        if segment.contains(['{', '}']) {
            return None;
        }
        Some(Segment::Static(segment))
    }
}

fn is_ident(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
