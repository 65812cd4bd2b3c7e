// src/api.rs

//! Built-in route table served by the function binaries.

use async_trait::async_trait;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;

use crate::diagnostics::EnvPresence;
use crate::error::{AppError, Result};
use crate::models::InvocationContext;
use crate::registrar::{AppContext, RouteRegistrar};
use crate::utils::is_present;

/// Application routes for the deployed function.
///
/// Registration needs the database connection string; without it the
/// function comes up degraded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiRoutes;

#[derive(Debug, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvReport {
    platform: String,
    #[serde(flatten)]
    presence: EnvPresence,
    request_id: Option<String>,
}

#[async_trait]
impl RouteRegistrar for ApiRoutes {
    async fn register(&self, ctx: &AppContext, router: Router) -> Result<Router> {
        let db_var = &ctx.config.diagnostics.database_url_var;
        if !is_present(&ctx.env, db_var) {
            return Err(AppError::registration(format!("{db_var} is not set")));
        }

        let presence = EnvPresence::probe(&ctx.config.diagnostics, &ctx.env);
        let platform = ctx.config.function.platform.clone();

        Ok(router
            .route(
                &ctx.api_path("/version"),
                get(|| async {
                    Json(VersionInfo {
                        name: env!("CARGO_PKG_NAME"),
                        version: env!("CARGO_PKG_VERSION"),
                    })
                }),
            )
            .route(
                &ctx.api_path("/env"),
                get(move |Extension(invocation): Extension<InvocationContext>| {
                    let platform = platform.clone();
                    async move {
                        Json(EnvReport {
                            platform,
                            presence,
                            request_id: invocation.request_id,
                        })
                    }
                }),
            ))
    }
}
