use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use wpcache::config::Config;
use wpcache::error::format_transport_error;
use wpcache::resource::{get_all_resource_keys, Resources};
use wpcache::{selectors, HttpTransport, Query, ResourceHandle};

/// Query cache for WordPress REST resources
#[derive(Parser, Debug)]
#[command(name = "wpcache", version, about, long_about = None)]
struct Args {
    /// Site URL, e.g. https://example.com/
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Resource kind to query
    #[arg(short, long, global = true)]
    resource: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a list of entities
    List {
        /// Query parameters as key=value
        params: Vec<String>,
        /// Fetch pages 1..=N concurrently, overriding `paged`
        #[arg(long)]
        pages: Option<u32>,
    },
    /// Fetch a single entity by slug
    Get { slug: String },
    /// Print the cache key of a query without fetching
    Key { params: Vec<String> },
    /// Remember a site URL in the config file
    Use { endpoint: String },
    /// List known resource kinds
    Resources,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("wpcache started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("wpcache").join("wpcache.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".wpcache").join("wpcache.log");
    }
    PathBuf::from("wpcache.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    let resource_key = config.effective_resource(args.resource.as_deref());

    match args.command {
        Command::Use { endpoint } => {
            HttpTransport::new(&endpoint)?;
            config.set_endpoint(&endpoint)?;
            println!("Using {}", endpoint);
            Ok(())
        }
        Command::Resources => {
            for key in get_all_resource_keys() {
                println!("{}", key);
            }
            Ok(())
        }
        Command::Key { params } => {
            let def = wpcache::get_resource(&resource_key)
                .with_context(|| format!("Unknown resource: {}", resource_key))?;
            let query = Query::from_pairs(&params)?;
            println!("{}", def.key(&query));
            Ok(())
        }
        Command::List { params, pages } => {
            let handle = open_resource(&config, args.endpoint.as_deref(), &resource_key)?;
            let query = Query::from_pairs(&params)?;
            run_list(&handle, query, pages).await
        }
        Command::Get { slug } => {
            let handle = open_resource(&config, args.endpoint.as_deref(), &resource_key)?;
            run_get(&handle, &slug).await
        }
    }
}

fn open_resource(config: &Config, endpoint: Option<&str>, resource_key: &str) -> Result<ResourceHandle> {
    let endpoint = config.effective_endpoint(endpoint).context(
        "No site configured. Pass --endpoint, set WPCACHE_ENDPOINT or run 'wpcache use <url>'",
    )?;

    tracing::info!("Using endpoint: {}, resource: {}", endpoint, resource_key);

    let transport = HttpTransport::with_options(&endpoint, config.user_agent(), config.timeout())?;
    let resources = Resources::from_registry(Arc::new(transport), config.query_capacity);

    resources
        .get(resource_key)
        .cloned()
        .with_context(|| format!("Unknown resource: {}", resource_key))
}

async fn run_list(handle: &ResourceHandle, query: Query, pages: Option<u32>) -> Result<()> {
    let queries: Vec<Query> = match pages {
        Some(n) => (1..=n.max(1))
            .map(|page| query.clone().with("paged", page))
            .collect(),
        None => vec![query],
    };

    let results = handle.orchestrator().fetch_lists(queries.clone()).await;

    let state = handle.store().read().await;
    let mut output: Vec<Value> = Vec::new();

    for (query, result) in queries.iter().zip(results) {
        if let Err(error) = result {
            eprintln!("{}: {}", handle.def().key(query), format_transport_error(&error));
            continue;
        }

        let entities: Vec<Value> = selectors::get_entities_for_query(&state, query)
            .unwrap_or_default()
            .into_iter()
            .map(|entity| entity.as_value())
            .collect();

        output.push(json!({
            "query": handle.def().key(query).as_str(),
            "total": selectors::get_known_total_for_query(&state, query),
            "entities": entities,
        }));
    }

    println!("{}", serde_json::to_string_pretty(&output)?);

    if output.len() < queries.len() {
        return Err(anyhow::anyhow!(
            "{} of {} requests failed",
            queries.len() - output.len(),
            queries.len()
        ));
    }
    Ok(())
}

async fn run_get(handle: &ResourceHandle, slug: &str) -> Result<()> {
    if let Err(error) = handle.orchestrator().fetch_single(slug).await {
        return Err(anyhow::anyhow!(format_transport_error(&error)));
    }

    let state = handle.store().read().await;
    let entity = selectors::get_entity_by_slug(&state, slug)
        .with_context(|| format!("'{}' resolved but is not cached", slug))?;

    println!("{}", serde_json::to_string_pretty(&entity.as_value())?);
    Ok(())
}
