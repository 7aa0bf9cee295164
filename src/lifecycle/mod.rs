//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (Engine::run):
//!     Bind loopback listener → spawn session reaper → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains, reaper exits
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
