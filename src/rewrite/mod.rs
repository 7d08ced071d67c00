//! Header-to-query rewrite subsystem.
//!
//! # Data Flow
//! ```text
//! RawRewriteConfig (config file)
//!     → config.rs (defaults applied, header name parsed)
//!     → RewriteConfig (immutable, shared via Arc)
//!
//! Inbound request
//!     → layer.rs (HeaderToQuery service)
//!     → transform.rs (path gate, extract, strip, trim, append, remove header)
//!     → query.rs (byte-level query parse / encode)
//!     → inner service
//! ```
//!
//! # Design Decisions
//! - The credential is opaque; no JWT parsing or validation
//! - No error path: a missing header becomes an empty parameter
//! - No per-request state survives the call

pub mod config;
pub mod layer;
pub mod query;
pub mod transform;

pub use config::{RawRewriteConfig, RewriteConfig, RewriteConfigError};
pub use layer::{HeaderToQuery, HeaderToQueryLayer};
pub use transform::{rewrite_request, Outcome};
