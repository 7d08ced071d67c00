//! JWT header-to-query rewriting proxy library.
//!
//! Moves a credential carried in a request header into a query parameter
//! before the request reaches the next handler. The core is the `rewrite`
//! module; everything else hosts it as a small forwarding proxy.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rewrite::{rewrite_request, HeaderToQuery, HeaderToQueryLayer, RewriteConfig};
