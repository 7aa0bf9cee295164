//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → cookie.rs (find + verify signed session ID)
//!     → store.rs (load session data)
//!     → Session handle attached to the request
//!     → handler / controller reads and writes the handle
//!     → middleware.rs (save if modified, set or clear cookie)
//!
//! Background:
//!     reaper.rs purges expired sessions on an interval
//! ```
//!
//! # Design Decisions
//! - Never resave: an untouched session is not written back
//! - Never save uninitialised: a new session gets no cookie until something is written
//! - Cookie Max-Age is counted from each cookie's issuance
//! - Stores are pluggable through the `SessionStore` trait; `MemoryStore` is the default

pub mod cookie;
pub mod middleware;
pub mod reaper;
#[allow(clippy::module_inception)]
pub mod session;
pub mod store;

use thiserror::Error;

pub use cookie::CookieSigner;
pub use middleware::{session_middleware, SessionManager};
pub use reaper::SessionReaper;
pub use session::Session;
pub use store::{MemoryStore, SessionId, SessionStore};

/// Errors raised by session stores and cookie signing.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The signing secret was rejected.
    #[error("Invalid session secret")]
    InvalidSecret,

    /// The configured max age cannot be added to the current time.
    #[error("Session max age of {0}s overflows the clock")]
    ExpiryOverflow(u64),

    /// The backing store failed.
    #[error("Session store error: {0}")]
    Store(String),
}
