//! devops-demo: service info and health check over HTTP.
//!
//! This is the application entry point. It loads `.env`, resolves configuration
//! from file, environment and flags, initializes tracing, builds the
//! application and serves it until the process is stopped.

use std::collections::HashMap;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devops_demo::config::{
    env_var, read_env_file, with_env_file, AppConfig, CliOverrides, LogFormat, LoggingConfig,
    DEFAULT_CONFIG_PATH, DEFAULT_ENV_FILE,
};
use devops_demo::{start_server, Application};

/// devops-demo: a minimal HTTP service with a health check
#[derive(Parser, Debug)]
#[command(name = "devops-demo", version, about)]
struct Args {
    /// Path to configuration file (defaults apply if the default path is absent)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to a dotenv file loaded before configuration is read
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: String,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Log level filter (e.g., "devops_demo=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Entries from the env file never replace variables that are already set
    let env_loaded = Path::new(&args.env_file).exists();
    let env_file = if env_loaded {
        read_env_file(&args.env_file)?
    } else {
        HashMap::new()
    };

    let base = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_optional(DEFAULT_CONFIG_PATH)?,
    };
    let overrides = CliOverrides {
        port: args.port,
        host: args.host,
        log_filter: args.log_level,
    };

    // Priority: CLI > env > file > default
    let config = AppConfig::resolve(base, with_env_file(env_var, env_file), &overrides)?;

    init_tracing(&config.logging);

    if env_loaded {
        tracing::info!(path = %args.env_file, "Loaded environment file");
    }
    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        version = %config.app.version,
        "Loaded configuration"
    );

    let http_config = config.http.clone();
    let app = Application::build(config);

    let server = start_server(app.into_router(), &http_config).await?;

    server.wait().await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(&logging.filter);
    let format = logging.log_format();

    match format.unwrap_or(LogFormat::Text) {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    if format.is_none() {
        tracing::warn!(format = %logging.format, "Unknown log format, using text");
    }
}
