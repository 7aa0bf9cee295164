//! Configuration validation.
//!
//! Returns all validation errors, not just the first.

use thiserror::Error;

use crate::config::schema::LeiConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("session.secret must not be empty")]
    EmptySecret,

    #[error("session.cookie_name must be a non-empty cookie token")]
    InvalidCookieName,

    #[error("session.max_age_secs must be greater than 0")]
    ZeroMaxAge,

    #[error("session.max_age_secs {0} exceeds the ten year limit")]
    MaxAgeTooLarge(u64),

    #[error("session.reap_interval_secs must be greater than 0")]
    ZeroReapInterval,

    #[error("redirect.default_status {0} is not a valid HTTP status")]
    InvalidRedirectStatus(u16),

    #[error("limits.max_body_size must be greater than 0")]
    ZeroBodyLimit,

    #[error("listener.request_timeout_secs must be greater than 0")]
    ZeroTimeout,
}

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

pub fn validate_config(config: &LeiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.session.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    let name = &config.session.cookie_name;
    if name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "()<>@,;:\\\"/[]?={}".contains(c))
    {
        errors.push(ValidationError::InvalidCookieName);
    }
    if config.session.max_age_secs == 0 {
        errors.push(ValidationError::ZeroMaxAge);
    } else if config.session.max_age_secs > MAX_SESSION_AGE_SECS {
        errors.push(ValidationError::MaxAgeTooLarge(config.session.max_age_secs));
    }
    if config.session.reap_interval_secs == 0 {
        errors.push(ValidationError::ZeroReapInterval);
    }
    if !(100..=599).contains(&config.redirect.default_status) {
        errors.push(ValidationError::InvalidRedirectStatus(
            config.redirect.default_status,
        ));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
