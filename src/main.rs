use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rulebridge::api::{format_api_error, DashboardClient};
use rulebridge::config::Config;
use rulebridge::i18n::{Catalog, Locale};
use rulebridge::resource::{Dispatcher, ResourcePayload};
use rulebridge::schema::{load_components, validate_form, SchemaMutator, SchemaPair, ValidationContext};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage rule-engine actions and bridges, and shape connector form schemas
#[derive(Parser, Debug)]
#[command(name = "rulebridge", version = rulebridge::VERSION, about, long_about = None)]
struct Args {
    /// Dashboard API root, e.g. http://127.0.0.1:18083/api/v5
    #[arg(long, env = "RULEBRIDGE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// API key
    #[arg(long, env = "RULEBRIDGE_API_KEY", global = true)]
    api_key: Option<String>,

    /// API secret
    #[arg(long, env = "RULEBRIDGE_API_SECRET", hide_env_values = true, global = true)]
    api_secret: Option<String>,

    /// Message language (en, zh)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show an action or bridge by `{type}:{name}` id
    Get { id: String },
    /// Create a resource from a JSON/YAML payload file
    Create { file: PathBuf },
    /// Update a resource from a JSON/YAML payload file (must include `id`)
    Update { file: PathBuf },
    /// Delete a resource
    Delete { id: String },
    /// Enable an action or start a bridge
    Enable { id: String },
    /// Disable an action or stop a bridge
    Disable { id: String },
    /// Show runtime metrics of a resource
    Metrics { id: String },
    /// Print which endpoint family serves an id
    Family { id: String },
    /// Print the form schema for a connector type
    Schema {
        /// Connector type, e.g. redis
        #[arg(short = 't', long = "type")]
        connector_type: String,
        /// Components file (JSON or YAML)
        file: PathBuf,
    },
    /// Validate form values against a connector schema
    Validate {
        #[arg(short = 't', long = "type")]
        connector_type: String,
        /// Components file (JSON or YAML)
        #[arg(long)]
        schema: PathBuf,
        /// Values file (JSON or YAML object)
        #[arg(long)]
        values: PathBuf,
        /// Validate as for a connection test rather than a submit
        #[arg(long)]
        testing_connection: bool,
    },
    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the saved configuration
    Show,
    /// Save the dashboard API root
    SetUrl { url: String },
    /// Save API credentials
    SetCredentials { api_key: String, api_secret: String },
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
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

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

    tracing::info!("rulebridge started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("rulebridge").join("rulebridge.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".rulebridge").join("rulebridge.log");
    }
    PathBuf::from("rulebridge.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {err:#}");
            None
        },
    };

    if let Err(err) = run(args).await {
        tracing::error!("command failed: {:#}", err);
        eprintln!("Error: {}", format_api_error(&err));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    let locale = args
        .locale
        .as_deref()
        .map(Locale::from_code)
        .unwrap_or_else(|| config.effective_locale());

    match args.command {
        Command::Get { ref id } => {
            let resource = dispatcher(&args, &config)?.get_detail(id).await?;
            print_json(&resource)
        },
        Command::Create { ref file } => {
            let payload = read_payload(file)?;
            let created = dispatcher(&args, &config)?.add_action(&payload).await?;
            print_json(&created)
        },
        Command::Update { ref file } => {
            let payload = read_payload(file)?;
            let updated = dispatcher(&args, &config)?.update_action(payload).await?;
            print_json(&updated)
        },
        Command::Delete { ref id } => {
            dispatcher(&args, &config)?.delete_action(id).await?;
            println!("Deleted {}", id);
            Ok(())
        },
        Command::Enable { ref id } => {
            dispatcher(&args, &config)?.toggle_action_enable(id, true).await?;
            println!("Enabled {}", id);
            Ok(())
        },
        Command::Disable { ref id } => {
            dispatcher(&args, &config)?.toggle_action_enable(id, false).await?;
            println!("Disabled {}", id);
            Ok(())
        },
        Command::Metrics { ref id } => {
            let metrics = dispatcher(&args, &config)?.get_metrics(id).await?;
            print_json(&metrics)
        },
        Command::Family { ref id } => {
            println!("{}", dispatcher(&args, &config)?.family_of_id(id));
            Ok(())
        },
        Command::Schema {
            ref connector_type,
            ref file,
        } => {
            let pair = mutated_schema(connector_type, file, locale)?;
            print_json(&pair)
        },
        Command::Validate {
            ref connector_type,
            ref schema,
            ref values,
            testing_connection,
        } => {
            let pair = mutated_schema(connector_type, schema, locale)?;
            let values = read_object(values)?;
            let ctx = ValidationContext { testing_connection };

            match validate_form(&pair.rules, &values, &ctx).await {
                Ok(()) => {
                    println!("OK");
                    Ok(())
                },
                Err(errors) => {
                    for error in &errors {
                        println!("{}", error);
                    }
                    Err(anyhow::anyhow!("{} field(s) failed validation", errors.len()))
                },
            }
        },
        Command::Config { ref action } => match action {
            ConfigCommand::Show => {
                let mut shown = config.clone();
                if shown.api_secret.is_some() {
                    shown.api_secret = Some("******".to_string());
                }
                print_json(&shown)
            },
            ConfigCommand::SetUrl { url } => {
                config.set_base_url(url)?;
                println!("Saved base URL {}", url);
                Ok(())
            },
            ConfigCommand::SetCredentials {
                api_key,
                api_secret,
            } => {
                config.set_credentials(api_key, api_secret)?;
                println!("Saved credentials for {}", api_key);
                Ok(())
            },
        },
    }
}

fn dispatcher(args: &Args, config: &Config) -> Result<Dispatcher> {
    let base_url = config.effective_base_url(args.base_url.as_deref());
    let credentials = config.effective_credentials(args.api_key.as_deref(), args.api_secret.as_deref());
    if credentials.is_none() {
        tracing::warn!("No API credentials configured, sending unauthenticated requests");
    }

    tracing::info!("Using dashboard API: {}", base_url);
    let client = DashboardClient::new(&base_url, credentials, config.request_timeout())?;
    Ok(Dispatcher::new(Arc::new(client), Arc::new(config.catalog())))
}

fn mutated_schema(connector_type: &str, file: &Path, locale: Locale) -> Result<SchemaPair> {
    let mutator = SchemaMutator::new(Arc::new(Catalog::new(locale)));
    let components = load_components(file)?;
    let pair = SchemaPair::from_components(components, mutator.translator());
    Ok(mutator.mutate(connector_type, pair))
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str(&content)
            .with_context(|| format!("{} is neither valid JSON nor valid YAML", path.display()))?,
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!("{} must contain an object", path.display())),
    }
}

fn read_payload(path: &Path) -> Result<ResourcePayload> {
    let object = read_object(path)?;
    serde_json::from_value(Value::Object(object))
        .with_context(|| format!("{} is not a resource payload (missing `type`?)", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
