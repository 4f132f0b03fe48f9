//! Tripgraph CLI — load taxi trips into Neo4j and query the loaded graph
//!
//! `load` runs the retrying ETL pipeline; `path`, `rank`, `status`, and
//! `clear` open a fresh connection per invocation.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use tripgraph::{algo, loader, GraphClient, Settings};

#[derive(Parser)]
#[command(name = "tripgraph", version, about = "NYC taxi trip graph over Neo4j GDS")]
struct Cli {
    /// Settings file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bolt URI of the Neo4j server
    #[arg(long, global = true, env = "TRIPGRAPH_URI")]
    uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true)]
    user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a Parquet trip file into the graph, retrying on failure
    Load {
        /// Path to the trip file
        file: PathBuf,
    },
    /// Find the path connecting two zones in the undirected trip graph
    Path {
        /// Source zone ID
        source: i64,
        /// Target zone ID
        target: i64,
    },
    /// Highest- and lowest-ranked zones by weighted PageRank
    Rank {
        /// Maximum PageRank iterations
        #[arg(long, default_value_t = 20)]
        iterations: u32,
        /// Relationship property used as edge weight
        #[arg(long, default_value = "distance")]
        weight: String,
    },
    /// Show node and relationship counts
    Status,
    /// Delete all loaded locations and trips
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let settings = match build_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Load { file } => run_load(&settings, file, &cli.format).await,
        Commands::Path { source, target } => {
            run_path(&settings, *source, *target, &cli.format).await
        }
        Commands::Rank { iterations, weight } => {
            run_rank(&settings, *iterations, weight, &cli.format).await
        }
        Commands::Status => run_status(&settings, &cli.format).await,
        Commands::Clear => run_clear(&settings).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Settings precedence: flags over config file over defaults.
fn build_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    if let Some(uri) = &cli.uri {
        settings.uri = uri.clone();
    }
    if let Some(user) = &cli.user {
        settings.user = user.clone();
    }
    if let Some(password) = &cli.password {
        settings.password = password.clone();
    }

    Ok(settings)
}

async fn run_load(
    settings: &Settings,
    file: &Path,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = loader::load_with_retry(settings, file).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            println!("Data loaded successfully!");
            println!("Rows read:    {}", summary.rows_read);
            println!("Trips loaded: {}", summary.rows_loaded);
            println!("Zones:        {}", summary.zones);
        }
    }

    Ok(())
}

async fn run_path(
    settings: &Settings,
    source: i64,
    target: i64,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GraphClient::connect(settings).await?;
    let paths = algo::shortest_path(&client, source, target).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
        OutputFormat::Table => {
            if paths.is_empty() {
                println!("(no path from {source} to {target})");
                return Ok(());
            }

            for path in &paths {
                let hops: Vec<String> = path.zones.iter().map(|z| z.to_string()).collect();
                println!("{} ({} hops)", hops.join(" -> "), path.hops());
            }
        }
    }

    Ok(())
}

async fn run_rank(
    settings: &Settings,
    iterations: u32,
    weight: &str,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GraphClient::connect(settings).await?;
    let ranked = algo::page_rank(&client, iterations, weight).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(["Type", "Zone", "Score"]);

            for zone in &ranked {
                table.add_row([
                    zone.kind.clone(),
                    zone.name.to_string(),
                    format!("{:.6}", zone.score),
                ]);
            }

            println!("{table}");
        }
    }

    Ok(())
}

async fn run_status(
    settings: &Settings,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GraphClient::connect(settings).await?;
    let stats = client.stats().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Table => {
            println!("Locations: {}", stats.locations);
            println!("Trips:     {}", stats.trips);
        }
    }

    Ok(())
}

async fn run_clear(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let client = GraphClient::connect(settings).await?;
    let removed = client.clear().await?;
    println!("Removed {removed} location(s)");
    Ok(())
}
