//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → LeiConfig (validated, immutable)
//!     → handed to Engine, which copies what each middleware needs
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Config is read once at startup; templates are the only thing re-read at runtime

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LeiConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, RedirectConfig, SessionConfig,
    UploadConfig, ViewConfig,
};
