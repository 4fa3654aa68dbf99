//! agentdeck CLI binary entry point.

use agentdeck::cli::{chat::handle_chat, demo::handle_demo, Cli, Commands};
use agentdeck::config::AgentConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    let config = AgentConfig::from_env();

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(args, config).await,
        Commands::Demo => handle_demo(config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
