//! Session middleware.
//!
//! # Responsibilities
//! - Resolve the signed session cookie to a stored session
//! - Attach a [`Session`] handle to the request
//! - After the handler: save modified sessions, destroy destroyed ones, set or clear the cookie

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SessionConfig;
use crate::session::cookie::{clear_cookie, find_cookie, session_cookie, CookieSigner};
use crate::session::{Session, SessionError, SessionId, SessionStore};

/// Shared state of the session middleware.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    signer: CookieSigner,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig, store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        Ok(Self {
            signer: CookieSigner::new(&config.secret)?,
            store,
            config,
        })
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    pub fn signer(&self) -> &CookieSigner {
        &self.signer
    }

    /// Load the session named by the request's cookie, or start a fresh one.
    ///
    /// Missing, unsigned, tampered and expired cookies all yield a fresh session.
    pub async fn load(&self, headers: &HeaderMap) -> Result<Session, SessionError> {
        let Some(raw) = find_cookie(headers, &self.config.cookie_name) else {
            return Ok(Session::fresh());
        };
        let Some(id) = self.signer.unsign(raw) else {
            tracing::debug!("Ignoring session cookie with invalid signature");
            return Ok(Session::fresh());
        };
        match self.store.load(&id).await? {
            Some(data) => Ok(Session::existing(id, data)),
            None => Ok(Session::fresh()),
        }
    }

    /// Persist the outcome of a request's session changes.
    pub async fn commit(&self, session: &Session, response: &mut Response) -> Result<(), SessionError> {
        let current = session.id();

        if session.is_destroyed() {
            if let Some(id) = current {
                self.store.destroy(&id).await?;
                append_cookie(response, &clear_cookie(&self.config));
                tracing::debug!(session = %id, "Session destroyed");
            }
            return Ok(());
        }

        if !session.is_modified() {
            return Ok(());
        }

        let id = match current {
            Some(old) if session.wants_regenerate() => {
                self.store.destroy(&old).await?;
                SessionId::generate()
            }
            Some(id) => id,
            None => SessionId::generate(),
        };
        let max_age = self.config.max_age_secs;
        let expires_at = SystemTime::now()
            .checked_add(Duration::from_secs(max_age))
            .ok_or(SessionError::ExpiryOverflow(max_age))?;
        self.store.save(&id, session.snapshot(), expires_at).await?;
        append_cookie(response, &session_cookie(&self.config, &self.signer.sign(&id)));
        Ok(())
    }
}

fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Session cookie is not a valid header value"),
    }
}

pub async fn session_middleware(
    State(manager): State<SessionManager>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = match manager.load(req.headers()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Err(e) = manager.commit(&session, &mut response).await {
        tracing::error!(error = %e, "Failed to save session");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    response
}
