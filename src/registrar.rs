// src/registrar.rs

//! The seam where an application's route table plugs into the adapter.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use crate::error::Result;
use crate::models::Config;
use crate::utils::{EnvLookup, join_path};

/// Everything a registrar may consult while building routes.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub env: EnvLookup,
}

impl AppContext {
    /// Application path for a route suffix, e.g. `/api/version` for `/version`.
    pub fn api_path(&self, suffix: &str) -> String {
        join_path(&self.config.function.api_prefix, suffix)
    }
}

/// Builds the application's route table.
///
/// Implementations add their routes to `router` and hand it back. Returning
/// an error, or panicking while building routes, puts the adapter into
/// degraded mode instead of failing the function.
///
/// The adapter owns `{api_prefix}/health`; registrars must not route it.
#[async_trait]
pub trait RouteRegistrar: Send + Sync {
    async fn register(&self, ctx: &AppContext, router: Router) -> Result<Router>;
}

#[async_trait]
impl<R: RouteRegistrar + ?Sized> RouteRegistrar for Arc<R> {
    async fn register(&self, ctx: &AppContext, router: Router) -> Result<Router> {
        (**self).register(ctx, router).await
    }
}
