use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use listings_search::indexes::prepare_indexes;
use listings_search::seed::{apply_seed, SeedFile};
use listings_search::{Dependencies, ListingsError};
use listings_search_repository::{ListingStore, StoreQuery};
use listings_search_shared::{EntityKind, EventQuery, JobQuery};

#[derive(Parser)]
#[command(name = "listings-search")]
#[command(about = "Operate the job and event listing search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing indexes and apply their settings
    Prepare,
    /// Rebuild index documents from the listings database
    Reindex {
        /// Only this entity kind (job|event); both when omitted
        #[arg(long)]
        entity: Option<EntityKind>,
    },
    /// Print row and document counts and index settings per entity kind
    Stats,
    /// Load listings from a JSON file
    Seed {
        /// File with `jobs` and `events` arrays
        file: PathBuf,
    },
    /// Run a query and print the page as JSON
    Search {
        #[arg(long, default_value = "job")]
        entity: EntityKind,
        /// Query object, e.g. '{"skills":["Rust"],"page":2}'
        #[arg(long, default_value = "{}")]
        filter: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), ListingsError> {
    let deps = Dependencies::new()?;

    match command {
        Commands::Prepare => {
            let Some(provider) = deps.provider() else {
                return Err(ListingsError::config("search index is not enabled"));
            };
            prepare_indexes(provider.as_ref(), &deps.config.indexes).await?;
            if let Some(client) = &deps.index_client {
                for index in client.list_indexes().await?.results {
                    info!(uid = %index.uid, primary_key = ?index.primary_key, "Index present");
                }
            }
            info!("Indexes ready");
        }
        Commands::Reindex { entity } => {
            let kinds = match entity {
                Some(kind) => vec![kind],
                None => EntityKind::ALL.to_vec(),
            };
            for kind in kinds {
                let count = deps.hooks.reindex(kind).await?;
                info!(entity = %kind, count = count, "Reindex finished");
            }
        }
        Commands::Stats => {
            for kind in EntityKind::ALL {
                let rows = deps.store.count(&StoreQuery::new(kind)).await?;
                match deps.provider() {
                    Some(provider) => {
                        let index = deps.config.indexes.for_kind(kind);
                        let stats = provider.stats(index).await?;
                        let settings = provider.settings(index).await?;
                        println!(
                            "{}: {} rows, {} documents{}",
                            kind,
                            rows,
                            stats.number_of_documents,
                            if stats.is_indexing { " (indexing)" } else { "" }
                        );
                        println!(
                            "  filterable: {}",
                            settings.filterable_attributes.unwrap_or_default().join(", ")
                        );
                        println!(
                            "  sortable: {}",
                            settings.sortable_attributes.unwrap_or_default().join(", ")
                        );
                    }
                    None => println!("{}: {} rows", kind, rows),
                }
            }
        }
        Commands::Seed { file } => {
            let seed = SeedFile::load(&file)?;
            let report = apply_seed(&deps.store, &deps.hooks, &seed).await?;
            info!(jobs = report.jobs, events = report.events, file = %file.display(), "Seeded");
        }
        Commands::Search { entity, filter } => {
            let cancel = CancellationToken::new();
            let json = match entity {
                EntityKind::Job => {
                    let query: JobQuery = parse_filter(&filter)?;
                    to_json(&deps.queries.search_jobs(&query, &cancel).await?)?
                }
                EntityKind::Event => {
                    let query: EventQuery = parse_filter(&filter)?;
                    to_json(&deps.queries.search_events(&query, &cancel).await?)?
                }
            };
            println!("{}", json);
        }
    }

    Ok(())
}

fn parse_filter<T: serde::de::DeserializeOwned>(filter: &str) -> Result<T, ListingsError> {
    serde_json::from_str(filter).map_err(|e| ListingsError::parse(format!("filter: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ListingsError> {
    serde_json::to_string_pretty(value).map_err(|e| ListingsError::parse(e.to_string()))
}
