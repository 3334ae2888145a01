use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nb_core::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use nb_core::Result;
use nb_fetch::cli::{handle_command, BriefingArgs, BriefingCommands};
use nb_fetch::logging::init_logging;
use nb_fetch::{BriefingManager, FetchConfig, RemoteNewsSource};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personalized news briefings", long_about = None)]
pub struct Cli {
    /// Base URL of the news and summarization API
    #[arg(long, env = "NB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    #[arg(long, env = "NB_STORAGE", default_value = "memory", help = "Storage backend: memory (default), sqlite")]
    storage: String,
    /// SQLite file or `sqlite:` URL
    #[arg(long, env = "NB_DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "NB_MODEL", default_value = "remote", help = "Summarization model: remote (default), dummy")]
    model: String,
    #[arg(long = "user", env = "NB_USER_ID", default_value = "local")]
    user_id: String,
    /// Request timeout in seconds
    #[arg(long, env = "NB_TIMEOUT", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Briefing(BriefingCommands),
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "NB_LISTEN", default_value = "127.0.0.1:3000")]
        listen: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout);

    let storage = nb_storage::create_storage(&cli.storage, cli.database_url.as_deref()).await?;

    let inference_config = nb_inference::Config {
        api_url: cli.api_url.clone(),
        model_name: Some(cli.model.clone()),
        timeout,
    };
    let model = nb_inference::create_model(Some(inference_config)).await?;
    info!("🧠 Inference model initialized successfully (using {})", model.name());

    let fetch_config = FetchConfig {
        api_url: cli.api_url.clone(),
        timeout,
        ..FetchConfig::default()
    };
    let news = Arc::new(RemoteNewsSource::new(&fetch_config)?);
    let manager = BriefingManager::new(storage, news, model, fetch_config);

    match cli.command {
        Commands::Briefing(command) => {
            handle_command(BriefingArgs { command }, &manager, &cli.user_id).await?;
        }
        Commands::Serve { listen } => {
            nb_web::serve(nb_web::AppState::new(manager), listen).await?;
        }
    }

    Ok(())
}
