mod nearby;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ghumfir-cli")]
#[command(about = "Find destinations near a point in Nepal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve destinations near a coordinate
    Nearby(NearbyArgs),
    /// Great-circle distance in kilometres between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lng1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lng2: f64,
    },
    /// List the popular-destination catalog
    Popular {
        /// Catalog file
        #[arg(long, env = "GHUMFIR_POPULAR_PATH", default_value = "./config/popular.yaml")]
        file: PathBuf,
        /// Sort by distance from this latitude (requires --lng)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
    /// Print the loaded configuration
    Config,
}

#[derive(Debug, Args)]
pub(crate) struct NearbyArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
    #[arg(long, default_value_t = 50.0)]
    pub radius_km: f64,
    /// Category to keep (empty or "All" keeps everything)
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f64,
    #[arg(long, default_value_t = 1000.0)]
    pub max_distance_km: f64,
    /// Maximum results (defaults to GHUMFIR_RESULT_LIMIT)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Seed placeholder ratings for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Nearby(args)) => {
            let config = ghumfir_core::load_app_config()?;
            nearby::run_nearby(&config, &args).await?;
        }
        Some(Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        }) => {
            let from = ghumfir_core::Coordinate::new(lat1, lng1)?;
            let to = ghumfir_core::Coordinate::new(lat2, lng2)?;
            println!("{:.1} km", from.distance_km(&to));
        }
        Some(Commands::Popular { file, lat, lng }) => {
            let catalog = ghumfir_core::load_popular(&file)?;
            let origin = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(ghumfir_core::Coordinate::new(lat, lng)?),
                _ => None,
            };
            nearby::print_destinations(&catalog.destinations_from(origin.as_ref()));
        }
        Some(Commands::Config) => {
            let config = ghumfir_core::load_app_config()?;
            println!("{config:#?}");
        }
        None => println!("ghumfir-cli ready; see --help"),
    }

    Ok(())
}
