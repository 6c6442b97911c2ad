mod crawl;
mod records;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapcrawl")]
#[command(about = "Crawl map-grounded business listings city by city")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query every (city, zone, category) tuple; Ctrl-C stops the run
    Crawl {
        /// Latitude used to bias map grounding
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude used to bias map grounding
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
    /// Write the collected records to a CSV file
    Export {
        /// Directory to write into (defaults to the current directory)
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Discard every collected record and the backup
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show how many records are held, per city
    Status,
    /// Print the tuple plan without querying anything
    Targets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = mapcrawl_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Crawl { lat, lng }) => {
            let location = lat
                .zip(lng)
                .map(|(lat, lng)| mapcrawl_core::LatLng { lat, lng });
            crawl::run_crawl(&config, location).await?;
        }
        Some(Commands::Export { out_dir }) => records::run_export(&config, &out_dir)?,
        Some(Commands::Reset { yes }) => records::run_reset(&config, yes)?,
        Some(Commands::Status) => records::run_status(&config)?,
        Some(Commands::Targets) => crawl::run_targets(&config)?,
        None => println!("nothing to do; see `mapcrawl --help`"),
    }

    Ok(())
}
