// src/handler.rs

//! Function entry point.
//!
//! The host calls [`FunctionEntry::invoke`] once per request. The first call
//! builds the adapter; later calls reuse it. Whatever goes wrong, the host
//! gets a well-formed response back:
//!
//! - registration failures are absorbed by the adapter (degraded mode)
//! - build or delegation failures become a 500 diagnostic envelope

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::OnceCell;
use tracing::{error, info, instrument};

use crate::adapter::{Adapter, AdapterBuilder};
use crate::diagnostics::{EnvPresence, failure_envelope};
use crate::error::{AppError, Result};
use crate::models::{FunctionEvent, FunctionResponse, InvocationContext};
use crate::utils::panic_message;

/// Lazily built, process-wide adapter plus the recipe to build it.
///
/// Concurrent cold-start calls wait on the same build. A failed build is not
/// cached, so the next call tries again; a degraded adapter is cached like a
/// healthy one.
pub struct FunctionEntry {
    builder: AdapterBuilder,
    adapter: OnceCell<Adapter>,
}

impl FunctionEntry {
    pub fn new(builder: AdapterBuilder) -> Self {
        Self {
            builder,
            adapter: OnceCell::new(),
        }
    }

    pub fn builder(&self) -> &AdapterBuilder {
        &self.builder
    }

    /// The cached adapter, if one has been built.
    pub fn cached(&self) -> Option<&Adapter> {
        self.adapter.get()
    }

    /// Get the cached adapter or build it.
    pub async fn adapter(&self) -> Result<&Adapter> {
        self.adapter
            .get_or_try_init(|| async {
                info!("Building request adapter");
                self.builder.build().await
            })
            .await
    }

    /// Handle one invocation. Never fails.
    #[instrument(skip_all, fields(request_id = ctx.request_id.as_deref().unwrap_or("-")))]
    pub async fn invoke(&self, event: FunctionEvent, ctx: InvocationContext) -> FunctionResponse {
        let path = event.request_path().map(str::to_string);

        match self.try_invoke(event, ctx).await {
            Ok(response) => response,
            Err(e) => {
                error!("Invocation failed ({}): {}", e.kind(), e);
                self.failure_response(&e, path.as_deref())
            }
        }
    }

    async fn try_invoke(&self, event: FunctionEvent, ctx: InvocationContext) -> Result<FunctionResponse> {
        let adapter = self.adapter().await?;
        AssertUnwindSafe(adapter.handle(event, ctx))
            .catch_unwind()
            .await
            .map_err(|panic| AppError::Handler(panic_message(panic)))?
    }

    /// The 500 envelope for an error, with current environment presence.
    pub fn failure_response(&self, err: &AppError, path: Option<&str>) -> FunctionResponse {
        let presence = EnvPresence::probe(&self.builder.config().diagnostics, self.builder.env());
        FunctionResponse::json(500, &failure_envelope(err, path, presence))
    }
}
