use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dexcache::api::ApiClient;
use dexcache::config::Config;
use dexcache::resource::{self, GenericResource, ResourceKey};
use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Query a paginated REST resource API with in-memory caching
#[derive(Parser, Debug)]
#[command(name = "dexcache", version, about, long_about = None)]
struct Args {
    /// API base URL (defaults to the configured or public PokeAPI URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one resource by id or name
    Get {
        /// Resource category, e.g. "berry"
        category: String,
        /// Numeric id or name
        key: String,
    },
    /// Fetch one page of a category listing
    List {
        category: String,
        /// Page size (defaults to the configured page limit)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Fetch the complete listing of a category
    All { category: String },
    /// Show known categories
    Categories,
    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the saved configuration
    Show,
    /// Save settings; `--base-url` given to this command is saved too
    Set {
        #[arg(long)]
        page_limit: Option<usize>,
        #[arg(long)]
        user_agent: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
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

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not open log file {:?}: {}", log_path, e);
            return None;
        }
    };

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

    tracing::info!("dexcache started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("dexcache").join("dexcache.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".dexcache").join("dexcache.log");
    }
    PathBuf::from("dexcache.log")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

fn category_def(category: &str) -> Result<&'static resource::CategoryDef> {
    resource::get_category(category).with_context(|| {
        format!(
            "Unknown category '{}'. Run 'dexcache categories' to list them",
            category
        )
    })
}

fn build_client(config: &Config, cli_base_url: Option<&str>) -> Result<ApiClient> {
    let base_url = config.effective_base_url(cli_base_url);
    tracing::info!("Using base URL: {}", base_url);

    let client = ApiClient::http(&base_url, &config.transport_options())
        .context("Failed to create API client")?
        .with_page_limit(config.effective_page_limit());
    Ok(client)
}

fn run_config(mut config: Config, base_url: Option<String>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print_json(&config),
        ConfigAction::Set {
            page_limit,
            user_agent,
            timeout_secs,
        } => {
            let changes = Config {
                base_url,
                page_limit,
                user_agent,
                timeout_secs,
            };
            if let Some(url) = &changes.base_url {
                url::Url::parse(url).with_context(|| format!("Invalid base URL '{}'", url))?;
            }
            if !config.merge(changes) {
                anyhow::bail!("Nothing to set. Pass --base-url, --page-limit, --user-agent or --timeout-secs");
            }
            config.save().context("Failed to save configuration")?;
            if let Some(path) = Config::config_path() {
                println!("Saved {}", path.display());
            }
            print_json(&config)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();

    let cli_base_url = args.base_url.as_deref();

    match args.command {
        Command::Get { category, key } => {
            let def = category_def(&category)?;
            let client = build_client(&config, cli_base_url)?;
            let key: ResourceKey = key.parse().unwrap_or_else(|never: Infallible| match never {});

            let resource = if def.named {
                client
                    .named_endpoint::<GenericResource>(&category)
                    .resolve(key.clone())
                    .await
            } else {
                let ResourceKey::Id(id) = key else {
                    anyhow::bail!("{} resources can only be looked up by id, got '{}'", category, key);
                };
                client.endpoint::<GenericResource>(&category).resolve(id).await
            }
            .with_context(|| format!("Failed to fetch {}/{}", category, key))?;

            print_json(&*resource)
        }
        Command::List {
            category,
            limit,
            offset,
        } => {
            category_def(&category)?;
            let client = build_client(&config, cli_base_url)?;
            let endpoint = client.endpoint::<GenericResource>(&category);
            let limit = limit.unwrap_or(endpoint.page_limit());

            let listing = endpoint
                .list(limit, offset)
                .await
                .with_context(|| format!("Failed to list {}", category))?;

            print_json(listing.page())
        }
        Command::All { category } => {
            category_def(&category)?;
            let client = build_client(&config, cli_base_url)?;
            let listing = client
                .endpoint::<GenericResource>(&category)
                .list_all()
                .await
                .with_context(|| format!("Failed to list all {}", category))?;

            print_json(listing.page())
        }
        Command::Categories => {
            for key in resource::all_category_keys() {
                if let Some(def) = resource::get_category(key) {
                    let suffix = if def.named { "" } else { " (id only)" };
                    println!("{:<28} {}{}", key, def.display_name, suffix);
                }
            }
            Ok(())
        }
        Command::Config { action } => run_config(config, args.base_url.clone(), action),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!("{:?}", err);
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}
