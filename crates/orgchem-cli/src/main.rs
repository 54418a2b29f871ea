mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orgchem")]
#[command(version, about = "Organic Chem Resources - site client tools", long_about = None)]
struct Cli {
    /// Configuration file (defaults to orgchem.toml in the site directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one route headlessly and print the resulting page
    Render {
        /// Browser path to render, e.g. /lessons/alcohols
        path: String,

        /// Site directory holding templates/ and content/
        #[arg(short, long, default_value = ".")]
        site: PathBuf,

        /// Page shell to render into (defaults to <site>/index.html)
        #[arg(long)]
        shell: Option<PathBuf>,

        /// JSON file with stored preferences (theme, sidebarCollapsed, fontSize)
        #[arg(long)]
        prefs: Option<PathBuf>,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which page and fragment each path resolves to
    Resolve {
        /// Browser paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List lesson topics in teaching order
    Topics,

    /// Verify lesson content and sidebar.json files
    Check {
        /// Site directory holding templates/ and content/
        #[arg(short, long, default_value = ".")]
        site: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Render {
            path,
            site,
            shell,
            prefs,
            output,
        } => {
            let options = commands::render::RenderOptions {
                path,
                site,
                shell,
                prefs,
            };
            commands::render::execute(&options, config, output.as_deref()).await?;
        }
        Commands::Resolve { paths } => {
            commands::resolve::execute(&paths, config)?;
        }
        Commands::Topics => {
            commands::topics::execute(config)?;
        }
        Commands::Check { site } => {
            commands::check::execute(&site, config).await?;
        }
    }

    Ok(())
}
