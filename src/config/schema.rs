//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::mvc::TemplatePolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LeiConfig {
    /// Listener configuration (port, timeouts).
    pub listener: ListenerConfig,

    /// Session cookie and store settings.
    pub session: SessionConfig,

    /// Multipart upload parsing.
    pub uploads: UploadConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Template rendering.
    pub views: ViewConfig,

    /// Redirect responses.
    pub redirect: RedirectConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
///
/// The server always binds the loopback interface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port used by `Engine::run` when no port is given.
    pub port: u16,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Secret used to sign session cookies.
    pub secret: String,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Cookie lifetime in seconds, counted from each cookie's issuance.
    pub max_age_secs: u64,

    /// Mark the cookie `Secure`.
    pub secure: bool,

    /// Interval between sweeps of expired sessions, in seconds.
    pub reap_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            secret: "secret".to_string(),
            cookie_name: "lei.sid".to_string(),
            max_age_secs: 365 * 24 * 60 * 60,
            secure: false,
            reap_interval_secs: 60,
        }
    }
}

/// Multipart upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Parse `multipart/form-data` bodies.
    pub enabled: bool,

    /// Maximum number of file parts per request.
    pub max_files: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_files: 16,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// View configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Policy for views rendered without a template file, unless the view sets its own.
    pub template_policy: TemplatePolicy,
}

/// Redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Status used for redirects when the model does not set one.
    pub default_status: u16,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { default_status: 200 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "lei=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
