/// Cadence CLI - inspect and edit a saved playlist
use cadence_cli::{commands, AppConfig, Session};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence player playlist tool", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./cadence.toml if present)
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the playlist
    List,
    /// Add local audio files
    Add {
        /// Files to add, in playlist order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a track by id
    Remove {
        /// Track id as shown by `list`
        id: String,
    },
    /// Restore stored tracks and report missing assets
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_cli=info,cadence_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let mut session = Session::open(&config).await?;
    let mut out = std::io::stdout().lock();

    let outcome = match cli.command {
        Commands::List => commands::list(&mut session, &mut out).await,
        Commands::Add { files } => commands::add(&mut session, &files, &mut out)
            .await
            .map(|_| ()),
        Commands::Remove { id } => commands::remove(&mut session, &id, &mut out).await,
        Commands::Check => commands::check(&mut session, &mut out).await.map(|_| ()),
    };

    let released = session.close();
    tracing::debug!(released, "Released live handles");

    outcome?;
    Ok(())
}
