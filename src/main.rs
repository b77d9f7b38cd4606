//! CLI entry point for docsite

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsite::Site;

#[derive(Parser)]
#[command(name = "docsite")]
#[command(version)]
#[command(about = "Turn a directory of documentation files into a navigable site", long_about = None)]
struct Cli {
    /// Set the project directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    cwd: Option<PathBuf>,

    /// Configuration file, relative to the project directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter project
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,

        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Render every page into the output directory
    #[command(alias = "b")]
    Build,

    /// Serve pages rendered on demand
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host name to bind to (defaults to server.hostname)
        #[arg(long)]
        hostname: Option<String>,
    },

    /// Remove the output directory
    Clean,

    /// Print the content tree
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "docsite=debug,info"
    } else {
        "docsite=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let load = || Site::load(&base_dir, cli.config.as_deref());

    match cli.command {
        Commands::Init { folder, force } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            docsite::commands::init::init_site(&target_dir, force)?;
            println!("Initialized documentation project in {:?}", target_dir);
        }

        Commands::Build => {
            let site = load()?;
            let stats = docsite::commands::build::run(&site)?;
            println!(
                "Built {} pages and {} files into {:?}",
                stats.pages, stats.raw_files, site.output_dir
            );
        }

        Commands::Serve { port, hostname } => {
            let site = load()?;
            let port = port.unwrap_or(site.config.server.port);
            let hostname = hostname.unwrap_or_else(|| site.config.server.hostname.clone());
            docsite::server::start(site, &hostname, port).await?;
        }

        Commands::Clean => {
            let site = load()?;
            docsite::commands::clean::run(&site)?;
            println!("Cleaned {:?}", site.output_dir);
        }

        Commands::List => {
            let site = load()?;
            docsite::commands::list::run(&site)?;
        }
    }

    Ok(())
}
