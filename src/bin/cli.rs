//! Function adapter CLI
//!
//! Local execution entry point: runs host events through the same entry
//! point the deployed function uses. For AWS Lambda, use `function-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use function_adapter::{
    AdapterBuilder, AdapterMode, FunctionEntry,
    api::ApiRoutes,
    config,
    diagnostics::EnvPresence,
    error::Result,
    models::{Config, FunctionEvent, FunctionResponse, InvocationContext},
    utils::process_env,
};

/// Serverless function adapter
#[derive(Parser, Debug)]
#[command(
    name = "function-cli",
    version,
    about = "Invoke the serverless function adapter locally"
)]
struct Cli {
    /// Path to the TOML config (default: $FUNCTION_CONFIG or function.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON host event file through the function
    Invoke {
        /// Path to the event JSON
        #[arg(short, long)]
        event: PathBuf,

        /// Request id handed to the application
        #[arg(long, default_value = "local")]
        request_id: String,
    },

    /// Call the health route
    Health,

    /// Validate configuration
    Validate,

    /// Show configuration, adapter mode and environment presence
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let env = process_env();
    match path {
        Some(path) => {
            let mut config = Config::load_or_default(path);
            config::apply_overrides(&mut config, &env);
            config
        }
        None => config::load_with(&env),
    }
}

fn print_response(response: &FunctionResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_logging(cli.verbose, &config.logging.level);

    log::info!(
        "Loaded configuration (platform={}, api_prefix={})",
        config.function.platform,
        config.function.api_prefix
    );

    match cli.command {
        Command::Invoke { event, request_id } => {
            let content = tokio::fs::read_to_string(&event).await?;
            let event: FunctionEvent = serde_json::from_str(&content)?;
            let entry = FunctionEntry::new(AdapterBuilder::new(config, ApiRoutes));

            let ctx = InvocationContext {
                request_id: Some(request_id),
                function_name: Some("local".to_string()),
                deadline_ms: None,
            };
            let response = entry.invoke(event, ctx).await;
            print_response(&response)?;
        }

        Command::Health => {
            let path = config.health_path();
            let entry = FunctionEntry::new(AdapterBuilder::new(config, ApiRoutes));
            let response = entry
                .invoke(FunctionEvent::new("GET", &path), InvocationContext::default())
                .await;
            print_response(&response)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let presence = EnvPresence::probe(&config.diagnostics, &process_env());
            log::info!("Platform: {}", config.function.platform);
            log::info!("Mount prefix: {}", config.function.mount_prefix);
            log::info!("Health route: {}", config.health_path());
            log::info!(
                "Binary content types: {}",
                config.function.binary_content_types.join(", ")
            );
            log::info!(
                "{}: {}",
                config.diagnostics.database_url_var,
                if presence.has_database_url { "set" } else { "not set" }
            );
            log::info!(
                "Supabase credentials: {}",
                if presence.has_supabase { "set" } else { "incomplete" }
            );

            match AdapterBuilder::new(config, ApiRoutes).build().await {
                Ok(adapter) => match adapter.mode() {
                    AdapterMode::Ready => log::info!("Adapter: ready"),
                    AdapterMode::Degraded { message } => {
                        log::warn!("Adapter: degraded ({})", message)
                    }
                },
                Err(e) => log::error!("Adapter: build failed ({})", e),
            }
        }
    }

    Ok(())
}
