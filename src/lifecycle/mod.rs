//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! signals.rs:  SIGTERM/SIGINT → Shutdown::trigger
//! shutdown.rs: Shutdown broadcast → server stops accepting, drains, returns
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
