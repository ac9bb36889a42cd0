use anyhow::anyhow;
use clap::Parser;
use pmdesk_lib::file_storage::default_data_dir;
use pmdesk_lib::server::{run_server, ServerAppState};
use std::path::PathBuf;

/// PMDesk - document backend for PM code reviews and PRDs
#[derive(Parser, Debug)]
#[command(name = "pmdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the API server to
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Address to bind the API server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Directory holding the document collections (defaults to ~/.pmdesk/data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Allowed CORS origin (repeatable); all origins allowed when unset
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Anthropic API key for the enhancement proxy; /api/ai returns 503
    /// when unset
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    let state = ServerAppState::new(&data_dir, cli.api_key).map_err(|e| anyhow!(e))?;

    let cors_origins = if cli.cors_origins.is_empty() {
        None
    } else {
        Some(cli.cors_origins)
    };

    run_server(cli.port, &cli.bind, state, cors_origins)
        .await
        .map_err(|e| anyhow!(e))
}
