mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "procura",
    version,
    about = "Catalog ingestion and cross-supplier matching for hospitality procurement"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a supplier catalog file or URL into structured items
    Ingest {
        /// Path to a csv/xlsx/pdf file, or an http(s) URL to fetch
        input: String,

        /// Source format override (csv, xlsx, pdf); inferred from the
        /// extension when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// Currency for items whose source carries none
        #[arg(short, long, default_value = "USD")]
        currency: String,

        /// Directory for extracted images; omit to skip image extraction
        #[arg(long, value_name = "DIR")]
        images_dir: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the ingested catalog to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Match a procurement item list against one or more supplier catalogs
    Match {
        /// JSON file with the procurement items
        #[arg(short, long, value_name = "FILE")]
        items: PathBuf,

        /// Supplier catalog JSON file(s), as written by `ingest --out`
        #[arg(short = 'c', long = "catalog", value_name = "FILE")]
        catalogs: Vec<PathBuf>,

        /// Similarity floor below which items count as unmatched
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Compose quote-request messages from picked comparison winners
    Rfp {
        /// JSON file with the picked selections
        #[arg(short, long, value_name = "FILE")]
        selections: PathBuf,

        /// Project name used in subject and signature
        #[arg(short, long, default_value = "Procurement")]
        project: String,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest {
            input,
            format,
            currency,
            images_dir,
            output,
            out,
        } => commands::ingest::run(&input, format.as_deref(), currency, images_dir, &output, out),
        Commands::Match {
            items,
            catalogs,
            threshold,
            output,
        } => commands::matching::run(items, catalogs, threshold, &output),
        Commands::Rfp {
            selections,
            project,
            output,
        } => commands::rfp::run(selections, &project, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
