use clap::{Parser, Subcommand};
use repo_router::commands::{list_repositories, pick_repository, rank_repositories};
use repo_router::config::{resolve_config_dir, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repo-router")]
#[command(about = "Rank your GitHub repositories by similarity to an issue description")]
#[command(version)]
struct Cli {
    /// Configuration directory (defaults to ~/.repo-router)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure API endpoints and picker behaviour
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// List every repository visible to the token, with keywords
    List,
    /// Rank repositories against a description
    Rank {
        /// Free-text issue description
        description: String,
        /// Only print the best N matches
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Filter a repository picker interactively; each stdin line is a new description
    Pick {
        /// File with one picker option per line (defaults to every indexed repository)
        #[arg(long)]
        options: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = resolve_config_dir(cli.config_dir)?;

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::List => {
            list_repositories(&config_dir).await?;
        }
        Commands::Rank { description, limit } => {
            rank_repositories(&config_dir, description, limit).await?;
        }
        Commands::Pick { options } => {
            pick_repository(&config_dir, options).await?;
        }
    }

    Ok(())
}
