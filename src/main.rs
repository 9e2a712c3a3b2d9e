use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use creatorhub::hub_config::{CliOverrides, DEFAULT_CONFIG_FILE, HubConfig, jwt_secret_from_env};
use creatorhub::{server, telemetry};

#[derive(Parser)]
#[command(name = "creatorhub")]
#[command(version, about = "Creator and brand networking backend")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Directory for uploaded media
        #[arg(long)]
        upload_dir: Option<PathBuf>,

        /// Enable dev mode (permissive CORS for a local client dev server)
        #[arg(long)]
        dev: bool,
    },
    /// Create the database and run migrations, then exit
    InitDb {
        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Print the effective configuration and any problems with it
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            host,
            db_path,
            upload_dir,
            dev,
        } => {
            let overrides = CliOverrides {
                host,
                port,
                db_path,
                upload_dir,
                dev_mode: dev,
            };
            let config = HubConfig::resolve(&cli.config, &overrides)?;
            let _guard = telemetry::init(&config.logging)?;
            for problem in config.validate() {
                tracing::warn!(%problem, "configuration problem");
            }
            let secret = jwt_secret_from_env()?;
            server::start_server(config, &secret).await?;
        }
        Commands::InitDb { db_path } => {
            let overrides = CliOverrides {
                db_path,
                ..Default::default()
            };
            let config = HubConfig::resolve(&cli.config, &overrides)?;
            server::open_database(&config)?;
            println!("Database initialized at {}", config.server.db_path.display());
        }
        Commands::Config => {
            let config = HubConfig::resolve(&cli.config, &CliOverrides::default())?;
            print!("{}", config.to_toml().context("Failed to render configuration")?);
            let problems = config.validate();
            if problems.is_empty() {
                println!("# configuration OK");
            } else {
                for problem in problems {
                    println!("# warning: {}", problem);
                }
            }
        }
    }

    Ok(())
}
