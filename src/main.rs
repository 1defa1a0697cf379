use ai_commenter::server::{AppState, Server};
use ai_commenter::{AppConfig, build_model};
use anyhow::Result;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};

/// Upload limit used when the configuration could not be loaded
const FALLBACK_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "ai-commenter")]
#[command(author, version, about = "Generate replies to conversation screenshots in any tone")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "AI_COMMENTER_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "AI_COMMENTER_PORT", default_value_t = 8501)]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal in production
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    // Configuration problems are reported once here; the page keeps working
    // and shows the same message instead of accepting uploads.
    let state = match AppConfig::from_env().and_then(|config| {
        let model = build_model(&config)?;
        Ok((config, model))
    }) {
        Ok((config, model)) => {
            info!(
                provider = config.provider.as_str(),
                model = %config.model,
                timeout_secs = config.timeout,
                "Model client ready"
            );
            AppState::new(model, config.max_upload_bytes).with_provider(config.provider.as_str())
        }
        Err(e) => {
            error!("{}", e);
            AppState::misconfigured(&e, FALLBACK_MAX_UPLOAD_BYTES)
        }
    };

    let addr = SocketAddr::new(cli.host, cli.port);
    Server::new(addr, state).run().await
}
