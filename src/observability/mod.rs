//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rewrite layer, http server
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (rewrite / pass-through counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Credentials never appear in log fields
//! - Counters are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
