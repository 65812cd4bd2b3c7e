//! AWS Lambda entry point for the function adapter.
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//!
//! ## Environment Variables
//!
//! - `FUNCTION_CONFIG`: Path to the TOML config (default: `function.toml`)
//! - `DEPLOY_PLATFORM`: Platform identifier reported by the health route
//! - `DATABASE_URL`: Required by the built-in routes
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};

use function_adapter::api::ApiRoutes;
use function_adapter::models::{FunctionEvent, FunctionResponse, InvocationContext};
use function_adapter::{AdapterBuilder, FunctionEntry, config};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    let config = config::load_from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!(
        "Function adapter starting (platform={}, mount_prefix={})",
        config.function.platform, config.function.mount_prefix
    );

    // The adapter itself is built on the first invocation.
    let entry = Arc::new(FunctionEntry::new(AdapterBuilder::new(config, ApiRoutes)));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<FunctionEvent>| {
        let entry = Arc::clone(&entry);
        async move { handler(&entry, event).await }
    }))
    .await
}

/// Handler for AWS Lambda events.
async fn handler(
    entry: &FunctionEntry,
    event: LambdaEvent<FunctionEvent>,
) -> Result<FunctionResponse, LambdaError> {
    let (payload, context) = event.into_parts();
    let ctx = InvocationContext {
        request_id: Some(context.request_id.clone()),
        function_name: Some(context.env_config.function_name.clone()),
        deadline_ms: Some(context.deadline),
    };
    Ok(entry.invoke(payload, ctx).await)
}
