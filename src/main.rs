mod catalog;
mod commands;
mod error;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DEFAULT_CATALOG: &str = "data/destinations";
const DEFAULT_INDEX: &str = "data/derived/index.db";

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(about = "Find road trip destinations matching your travel preferences", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the destination index from catalog JSON files
    Build {
        #[arg(long, default_value = DEFAULT_CATALOG, help = "Catalog directory of *.json records")]
        catalog: PathBuf,
        #[arg(long, default_value = DEFAULT_INDEX, help = "Index file to publish")]
        index: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Search destinations matching a travel preference query
    Search {
        query: String,
        #[arg(short = 'k', long = "top", default_value_t = 5, help = "Number of results")]
        top: usize,
        #[arg(
            short = 'w',
            long = "weight",
            value_name = "ASPECT=VALUE",
            help = "Aspect weight (repeatable); unmentioned aspects weigh 0"
        )]
        weight: Vec<String>,
        #[arg(long, help = "Only destinations in this country")]
        country: Option<String>,
        #[arg(long, help = "Only this budget tier (luxury, mid-range, budget-friendly)")]
        budget: Option<String>,
        #[arg(long, help = "Only destinations in season")]
        season: Option<String>,
        #[arg(long, default_value = DEFAULT_INDEX, help = "Index file to search")]
        index: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show index status
    Status {
        #[arg(long, default_value = DEFAULT_INDEX, help = "Index file to inspect")]
        index: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Start an interactive search session
    Interactive {
        #[arg(long, default_value = DEFAULT_INDEX, help = "Index file to search")]
        index: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            catalog,
            index,
            json,
        } => commands::build::run(&catalog, &index, json),
        Commands::Search {
            query,
            top,
            weight,
            country,
            budget,
            season,
            index,
            json,
        } => commands::search::run(&query, top, &weight, country, budget, season, &index, json),
        Commands::Status { index, json } => commands::status::run(&index, json),
        Commands::Interactive { index } => commands::interactive::run(&index),
    }
}
