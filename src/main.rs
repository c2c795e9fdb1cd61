//! CLI entry point for repo-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "repo-blog")]
#[command(version)]
#[command(about = "Read a public GitHub repository of markdown files as a blog", long_about = None)]
struct Cli {
    /// Directory holding _config.yml (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Repository to read as owner/name, overriding the config
    #[arg(short, long, global = true)]
    repo: Option<String>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reader server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Do not poll for new posts
        #[arg(long)]
        no_monitor: bool,
    },

    /// List the posts of the repository
    List {
        /// Show every listing entry, marking posts with '*'
        #[arg(long)]
        all_files: bool,
    },

    /// Render the page once as HTML
    Show {
        /// Render all posts instead of the latest one
        #[arg(short, long)]
        all: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Poll for new posts and print a line when some appear
    Watch,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "repo_blog=debug,info"
    } else {
        "repo_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let repo = cli.repo;
    let load = || repo_blog::RepoBlog::new(&base_dir, repo.as_deref());

    match cli.command {
        Commands::Serve {
            port,
            ip,
            open,
            no_monitor,
        } => {
            let blog = load()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            repo_blog::server::start(&blog, &ip, port, !no_monitor, open).await?;
        }

        Commands::List { all_files } => {
            repo_blog::commands::list::run(&load()?, all_files).await?;
        }

        Commands::Show { all, output } => {
            repo_blog::commands::show::run(&load()?, all, output.as_deref()).await?;
        }

        Commands::Watch => {
            repo_blog::commands::watch::run(&load()?).await?;
        }

        Commands::Version => {
            println!("repo-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
