//! HTTP plumbing between axum and the MVC layer.
//!
//! # Data Flow
//! ```text
//! axum Request
//!     → body.rs (JSON / URL-encoded → ParsedBody)
//!     → session::middleware (Session handle)
//!     → upload.rs (multipart → Uploads + ParsedBody)
//!     → request.rs (RequestContext extractor)
//!     → Controller
//!     → redirect.rs (redirect responses)
//! ```

pub mod body;
pub mod redirect;
pub mod request;
pub mod upload;

pub use body::ParsedBody;
pub use request::RequestContext;
pub use upload::{UploadedFile, Uploads};
