//! Rewrite configuration.
//!
//! `RawRewriteConfig` is what arrives from a config file (every field optional,
//! camelCase names). `RewriteConfig` is the resolved form: defaults applied,
//! header name parsed, never mutated afterwards.

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_HEADER_NAME: &str = "Authorization";
pub const DEFAULT_HEADER_PREFIX: &str = "";
pub const DEFAULT_PARAM_NAME: &str = "jwt";

/// Error raised while resolving a rewrite configuration.
#[derive(Debug, thiserror::Error)]
pub enum RewriteConfigError {
    #[error("invalid header name {name:?}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: axum::http::header::InvalidHeaderName,
    },
}

/// Unresolved rewrite settings as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRewriteConfig {
    /// Exact request path the rewrite applies to.
    pub path: Option<String>,

    /// Header carrying the credential.
    pub header_name: Option<String>,

    /// Literal prefix stripped from the header value (e.g. `"Bearer "`).
    pub header_prefix: Option<String>,

    /// Query parameter the credential is written under.
    pub param_name: Option<String>,
}

/// Resolved, immutable rewrite settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    match_path: String,
    header_name: HeaderName,
    header_prefix: String,
    param_name: String,
}

impl RewriteConfig {
    /// Apply defaults to a raw configuration.
    ///
    /// Absent and empty fields both fall back to their default. The only
    /// failure is a header name that is not a legal HTTP token.
    pub fn resolve(raw: RawRewriteConfig) -> Result<Self, RewriteConfigError> {
        let header_name = or_default(raw.header_name, DEFAULT_HEADER_NAME);
        let header_name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|source| {
            RewriteConfigError::InvalidHeaderName {
                name: header_name.clone(),
                source,
            }
        })?;

        Ok(Self {
            match_path: or_default(raw.path, DEFAULT_PATH),
            header_name,
            header_prefix: or_default(raw.header_prefix, DEFAULT_HEADER_PREFIX),
            param_name: or_default(raw.param_name, DEFAULT_PARAM_NAME),
        })
    }

    pub fn match_path(&self) -> &str {
        &self.match_path
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    pub fn header_prefix(&self) -> &str {
        &self.header_prefix
    }

    pub fn param_name(&self) -> &str {
        &self.param_name
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            match_path: DEFAULT_PATH.to_string(),
            header_name: axum::http::header::AUTHORIZATION,
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            param_name: DEFAULT_PARAM_NAME.to_string(),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}
