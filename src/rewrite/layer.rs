//! Tower middleware wrapping [`rewrite_request`].
//!
//! The layer holds the resolved configuration behind an `Arc`; every service
//! it produces shares it read-only. Each call rewrites the request it owns and
//! hands it straight to the inner service.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::observability::metrics;
use crate::rewrite::config::RewriteConfig;
use crate::rewrite::transform::{rewrite_request, Outcome};

const DEFAULT_NAME: &str = "jwt-header-to-query";

/// Layer that mounts [`HeaderToQuery`] in front of a service.
#[derive(Debug, Clone)]
pub struct HeaderToQueryLayer {
    config: Arc<RewriteConfig>,
    name: Arc<str>,
}

impl HeaderToQueryLayer {
    pub fn new(config: RewriteConfig) -> Self {
        Self::named(config, DEFAULT_NAME)
    }

    /// Create a layer with an instance name, used as the `plugin` log field.
    pub fn named(config: RewriteConfig, name: impl Into<Arc<str>>) -> Self {
        Self {
            config: Arc::new(config),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S> Layer<S> for HeaderToQueryLayer {
    type Service = HeaderToQuery<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeaderToQuery {
            inner,
            config: self.config.clone(),
            name: self.name.clone(),
        }
    }
}

/// Middleware that moves a header credential into the query string.
#[derive(Debug, Clone)]
pub struct HeaderToQuery<S> {
    inner: S,
    config: Arc<RewriteConfig>,
    name: Arc<str>,
}

impl<S> HeaderToQuery<S> {
    pub fn new(inner: S, config: RewriteConfig) -> Self {
        HeaderToQueryLayer::new(config).layer(inner)
    }
}

impl<S, B> Service<Request<B>> for HeaderToQuery<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let outcome = rewrite_request(&self.config, &mut req);

        match outcome {
            Outcome::PassThrough => {
                tracing::trace!(
                    plugin = %self.name,
                    path = %req.uri().path(),
                    "Path not matched, passing through"
                );
            }
            Outcome::Rewritten { header_present } => {
                tracing::debug!(
                    plugin = %self.name,
                    path = %req.uri().path(),
                    header = %self.config.header_name().as_str(),
                    param = %self.config.param_name(),
                    header_present,
                    "Moved header credential into query"
                );
            }
        }
        metrics::record_outcome(outcome);

        self.inner.call(req)
    }
}
