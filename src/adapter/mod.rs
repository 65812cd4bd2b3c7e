// src/adapter/mod.rs

//! Request adapter: wraps an application route table into a callable the
//! function host can invoke.
//!
//! Building an adapter:
//! 1. Validates configuration (errors here are fatal and reach the caller)
//! 2. Registers the application's routes plus the health route
//! 3. Falls back to the degraded route table if registration fails
//!
//! Each call then translates a host event into an HTTP request, runs it
//! through the router and turns the response back into the host shape.

pub mod routes;
pub mod translate;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::Router;
use futures::FutureExt;
use tower::ServiceExt;
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, Result};
use crate::models::{Config, FunctionEvent, FunctionResponse, InboundRequest, InvocationContext};
use crate::registrar::{AppContext, RouteRegistrar};
use crate::utils::media::BinaryTypes;
use crate::utils::{EnvLookup, panic_message, process_env};

/// Whether the adapter serves the application or the degraded stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterMode {
    Ready,
    Degraded { message: String },
}

/// Built request-handling callable.
#[derive(Debug, Clone)]
pub struct Adapter {
    router: Router,
    mode: AdapterMode,
    mount_prefix: Arc<str>,
    binary: BinaryTypes,
    max_response_bytes: usize,
}

impl Adapter {
    pub fn mode(&self) -> &AdapterMode {
        &self.mode
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, AdapterMode::Degraded { .. })
    }

    /// Run one host event through the application.
    #[instrument(skip_all, fields(method = ?event.request_method(), path = ?event.request_path()))]
    pub async fn handle(
        &self,
        event: FunctionEvent,
        ctx: InvocationContext,
    ) -> Result<FunctionResponse> {
        let inbound = InboundRequest::try_from(event)?;
        let request = translate::to_http_request(inbound, &self.mount_prefix, ctx)?;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };
        debug!("Application answered {}", response.status());

        translate::to_function_response(response, &self.binary, self.max_response_bytes).await
    }
}

/// Builds [`Adapter`]s from a configuration and a route registrar.
///
/// Builds share nothing mutable, so calling [`AdapterBuilder::build`] twice
/// yields two independent, equivalent adapters.
#[derive(Clone)]
pub struct AdapterBuilder {
    config: Arc<Config>,
    registrar: Arc<dyn RouteRegistrar>,
    env: EnvLookup,
}

impl AdapterBuilder {
    pub fn new(config: Config, registrar: impl RouteRegistrar + 'static) -> Self {
        Self {
            config: Arc::new(config),
            registrar: Arc::new(registrar),
            env: process_env(),
        }
    }

    /// Replace the environment lookup handed to registrars and diagnostics.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn env(&self) -> &EnvLookup {
        &self.env
    }

    /// Build an adapter.
    ///
    /// Fails only when the configuration is unusable. Registration failures
    /// produce a degraded adapter instead.
    pub async fn build(&self) -> Result<Adapter> {
        self.config.validate()?;
        let function = &self.config.function;
        let binary = BinaryTypes::parse(&function.binary_content_types)?;
        let health_path = self.config.health_path();

        let ctx = AppContext {
            config: Arc::clone(&self.config),
            env: Arc::clone(&self.env),
        };

        let attempt = AssertUnwindSafe(async {
            let router = self.registrar.register(&ctx, Router::new()).await?;
            Ok::<_, AppError>(routes::with_health(router, &health_path, &function.platform))
        })
        .catch_unwind()
        .await;

        let (router, mode) = match attempt {
            Ok(Ok(router)) => {
                info!("Routes registered, health check at {}", health_path);
                (router, AdapterMode::Ready)
            }
            Ok(Err(e)) => degrade(&health_path, e.detail()),
            Err(panic) => degrade(
                &health_path,
                format!("route registration panicked: {}", panic_message(panic)),
            ),
        };

        Ok(Adapter {
            router,
            mode,
            mount_prefix: Arc::from(function.mount_prefix.as_str()),
            binary,
            max_response_bytes: function.max_response_bytes,
        })
    }
}

fn degrade(health_path: &str, message: String) -> (Router, AdapterMode) {
    warn!("Route registration failed, serving degraded routes: {}", message);
    (
        routes::degraded(health_path, &message),
        AdapterMode::Degraded { message },
    )
}
