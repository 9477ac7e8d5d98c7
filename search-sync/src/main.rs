use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use search_sync::{Dependencies, IndexingError, LogFormat, Settings};
use search_sync_pipeline::consumer::StreamBatch;
use search_sync_repository::SearchIndexProvider;
use search_sync_shared::{SearchQuery, SortDirection, TermFilter, DEFAULT_LIMIT};

#[derive(Parser)]
#[command(name = "search-sync")]
#[command(about = "Apply change-stream batches to the search index and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a change-stream batch read from FILE, or stdin when omitted
    Apply {
        file: Option<PathBuf>,
    },
    /// Print the stored source of a document
    Get {
        #[arg(long)]
        index: String,
        #[arg(long)]
        id: String,
    },
    /// Run a full-text search
    Search {
        #[arg(long)]
        index: String,
        #[arg(long)]
        query: String,
        /// Field to match against; repeatable
        #[arg(long = "field")]
        fields: Vec<String>,
        /// Exact-match filter as FIELD=VALUE; repeatable
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<TermFilter>,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long, requires = "sort_direction")]
        sort_by: Option<String>,
        #[arg(long, requires = "sort_by")]
        sort_direction: Option<SortDirection>,
    },
    /// Run a single-field wildcard query and print the hit count
    Wildcard {
        #[arg(long)]
        index: String,
        #[arg(long)]
        field: String,
        #[arg(long)]
        pattern: String,
    },
    /// Delete an entire index
    DropIndex {
        #[arg(long)]
        index: String,
    },
}

fn parse_filter(value: &str) -> Result<TermFilter, String> {
    match value.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok(TermFilter::new(field.trim(), value)),
        _ => Err(format!("expected FIELD=VALUE, got '{}'", value)),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(settings.log_format);

    match run(cli.command, &settings).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "search-sync failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, settings: &Settings) -> Result<ExitCode, IndexingError> {
    let deps = Dependencies::new(settings).await?;
    let result = execute(command, &deps).await;
    deps.shutdown();
    result
}

async fn execute(command: Commands, deps: &Dependencies) -> Result<ExitCode, IndexingError> {
    let client = deps.provider();

    match command {
        Commands::Apply { file } => {
            let batch = match file {
                Some(path) => StreamBatch::from_reader(BufReader::new(File::open(path)?))?,
                None => StreamBatch::from_reader(io::stdin().lock())?,
            };
            info!(records = batch.len(), "Decoded batch");

            let summary = deps.dispatcher.process_batch(&batch.records).await;
            println!("{}", summary);

            if summary.has_errors() {
                error!(failed = summary.failed, "Batch had failed records");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Get { index, id } => match client.get_one(&index, &id).await? {
            Some(source) => println!("{}", serde_json::to_string_pretty(&source)?),
            None => {
                println!("Document {}/{} not found", index, id);
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Search {
            index,
            query,
            fields,
            filters,
            limit,
            offset,
            sort_by,
            sort_direction,
        } => {
            let mut search = SearchQuery::new(query)
                .with_search_fields(fields)
                .with_limit(limit);
            for filter in filters {
                search = search.with_filter(filter);
            }
            if let Some(offset) = offset {
                search = search.with_offset(offset);
            }
            if let (Some(field), Some(direction)) = (sort_by, sort_direction) {
                search = search.sorted_by(field, direction);
            }

            let result = client.search(&index, &search).await?;
            let output = json!({
                "total_hits": result.total_hits,
                "hits": result.hits,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Wildcard {
            index,
            field,
            pattern,
        } => {
            let result = client.wildcard(&index, &pattern, &field).await?;
            println!("{}", result.total_hits);
        }
        Commands::DropIndex { index } => {
            client.drop_index(&index).await?;
            println!("Dropped index {}", index);
        }
    }

    Ok(ExitCode::SUCCESS)
}
