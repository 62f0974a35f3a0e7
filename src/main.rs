use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use opportunity_hub::apis::CollectorRegistry;
use opportunity_hub::config::Config;
use opportunity_hub::logging::init_logging;
use opportunity_hub::metrics::init_metrics;
use opportunity_hub::pipeline::{CollectionOrchestrator, Normalizer, QualityScorer};
use opportunity_hub::server::{start_server, AppState};
use opportunity_hub::storage::{SqliteStore, Store};
use opportunity_hub::tasks::spawn_scheduler;
use opportunity_hub::types::{Category, RecordFilter, Source};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "opportunity_hub")]
#[command(about = "Collects hackathons, jobs, competitions and certifications per user")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = opportunity_hub::config::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API and the schedule poller
    Serve {
        /// Overrides `[server] bind`
        #[arg(long)]
        bind: Option<String>,
        /// Seconds between checks for due schedules
        #[arg(long, default_value_t = 60)]
        poll_seconds: u64,
    },
    /// Run one collection pass for a user
    Collect {
        #[arg(long)]
        user: String,
    },
    /// Print dashboard counts for a user
    Stats {
        #[arg(long)]
        user: String,
    },
    /// List collected records as JSON
    Data {
        #[arg(long)]
        user: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Manage a user's sources
    Sources {
        #[command(subcommand)]
        action: SourceAction,
    },
}

#[derive(Subcommand)]
enum SourceAction {
    List {
        #[arg(long)]
        user: String,
    },
    Add {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        category: String,
    },
}

fn build_orchestrator(config: &Config, store: Arc<dyn Store>) -> Result<CollectionOrchestrator> {
    let collectors = CollectorRegistry::with_defaults(&config.http).context("building collectors")?;
    Ok(CollectionOrchestrator::new(store, collectors)
        .with_normalizer(Normalizer::with_config(config.normalize.clone()))
        .with_scorer(QualityScorer::with_config(config.scoring.clone())))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load_from(&cli.config).context("loading configuration")?;

    init_logging(&config.logging).context("initializing logging")?;
    init_metrics();
    info!("Using configuration from {}", cli.config);
    let store: Arc<dyn Store> =
        Arc::new(SqliteStore::open(&config.database.path).context("opening database")?);

    match cli.command {
        Commands::Serve { bind, poll_seconds } => {
            let orchestrator = Arc::new(build_orchestrator(&config, store.clone())?);
            let _scheduler = spawn_scheduler(orchestrator.clone(), store.clone(), Duration::from_secs(poll_seconds));
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            start_server(AppState::new(store, orchestrator), &bind)
                .await
                .map_err(|e| anyhow!(e))?;
        }
        Commands::Collect { user } => {
            let orchestrator = build_orchestrator(&config, store)?;
            let summary = orchestrator.run(&user).await?;
            info!("Collection for {} finished", user);
            println!("\n📊 Collection results for {}:", user);
            println!("   Active sources: {}", summary.active_sources);
            println!("   Sources processed: {}", summary.sources_processed);
            println!("   Sources failed: {}", summary.sources_failed);
            println!("   Collected: {}", summary.collected);
            println!("   Verified: {}", summary.verified);
            println!("   Duplicates skipped: {}", summary.skipped_duplicates);
        }
        Commands::Stats { user } => {
            let counts = store.aggregate_counts(&user).await?;
            println!("Total: {}", counts.total);
            println!("Verified: {}  Pending: {}  Rejected: {}", counts.verified, counts.pending, counts.rejected);
            for (category, n) in &counts.by_category {
                println!("  {}: {}", category, n);
            }
        }
        Commands::Data { user, category, status, limit } => {
            let filter = RecordFilter::parse(category.as_deref(), status.as_deref(), limit)?;
            let records = store.query_records(&user, &filter).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Sources { action } => match action {
            SourceAction::List { user } => {
                for source in store.list_sources(&user).await? {
                    let state = if source.active { "active" } else { "inactive" };
                    println!("{}  {:<14} {:<8} {}  {}", source.id, source.category.as_str(), state, source.name, source.url);
                }
            }
            SourceAction::Add { user, name, url, category } => {
                let category: Category = category.parse()?;
                let source = Source::new(&user, &name, &url, category);
                store.insert_source(&source).await?;
                println!("Created source {} ({})", source.name, source.id);
            }
        },
    }

    Ok(())
}
