use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use talentprep::{
    embeddings::loader_from_config,
    llm::OpenAIConnector,
    logging::{init_logging, LogLevel},
    preprocessing::{
        normalize_text_column, validate_input_frame_value, validate_input_value,
        validate_job_functions_value,
    },
    PrepConfig, ReadinessProbe, Table,
};
use tokio::fs;
use tracing::info;

#[derive(Parser)]
#[clap(name = "talentprep")]
#[clap(about = "Validate and normalize staff talent statements before embedding or scoring")]
#[clap(version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a table against the schema and content rules
    Validate {
        /// JSON table (records or column object)
        #[clap(short, long)]
        input: PathBuf,
    },

    /// Normalize the TalentStatement column of a table
    Normalize {
        #[clap(short, long)]
        input: PathBuf,

        /// Write the normalized table here instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Coerce loosely named columns into StaffId/TalentStatement, drop empty
    /// statements and normalize the text
    Ingest {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate and normalize a JSON list of job functions
    JobFunctions {
        #[clap(short, long)]
        input: PathBuf,
    },

    /// Check that the chat and embedding services are ready
    Preflight {
        #[clap(flatten)]
        service: ServiceArgs,
    },

    /// Run the validators on built-in sample data
    Demo {
        /// Also probe the configured model services
        #[clap(long)]
        with_preflight: bool,

        #[clap(flatten)]
        service: ServiceArgs,
    },
}

/// Model-service settings that override the configuration file and the
/// environment.
#[derive(Args)]
struct ServiceArgs {
    /// Chat-completion API key [default: OPENAI_API_KEY or AZURE_OPENAI_API_KEY]
    #[clap(long)]
    api_key: Option<String>,

    /// Chat model name [default: AZURE_OPENAI_MODEL]
    #[clap(long)]
    model: Option<String>,

    /// Embedding model name
    #[clap(long)]
    embedding_model: Option<String>,
}

impl ServiceArgs {
    fn apply(self, config: &mut PrepConfig) {
        if let Some(api_key) = self.api_key {
            config.llm_api_key = Some(api_key);
        }
        if let Some(model) = self.model {
            config.llm_model = model;
        }
        if let Some(embedding_model) = self.embedding_model {
            config.embedding_model = embedding_model;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => PrepConfig::load(path)?,
        None => PrepConfig::default(),
    };
    config.apply_env();
    if cli.verbose {
        config.verbose = true;
        config.logging.level = LogLevel::Debug;
    }

    // Initialize logging
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Validate { input } => {
            let raw = read_json(&input).await?;
            let result = validate_input_value(&raw);
            print_json(&result)?;
            if !result.is_valid {
                std::process::exit(1);
            }
        }

        Commands::Normalize { input, output } => {
            let table = Table::from_json(&read_json(&input).await?)?;
            let normalized = normalize_text_column(&table)?;
            write_table(&normalized, output.as_deref()).await?;
        }

        Commands::Ingest { input, output } => {
            let validated = validate_input_frame_value(&read_json(&input).await?)?;
            let normalized = normalize_text_column(&validated)?;
            info!("Ingested {} rows", normalized.len());
            write_table(&normalized, output.as_deref()).await?;
        }

        Commands::JobFunctions { input } => {
            let result = validate_job_functions_value(&read_json(&input).await?);
            print_json(&result)?;
            if !result.is_valid {
                std::process::exit(1);
            }
        }

        Commands::Preflight { service } => {
            service.apply(&mut config);

            let state = run_preflight(&config).await?;
            print_json(&state)?;
            if !state.is_ready() {
                std::process::exit(1);
            }
        }

        Commands::Demo {
            with_preflight,
            service,
        } => {
            service.apply(&mut config);
            demo_command(&config, with_preflight).await?;
        }
    }

    Ok(())
}

async fn run_preflight(config: &PrepConfig) -> Result<talentprep::ReadinessState> {
    let request_timeout = Duration::from_secs(config.request_timeout_secs);
    let probe = ReadinessProbe::new(
        Arc::new(OpenAIConnector::new(config.llm_base_url.clone(), request_timeout)),
        Arc::from(loader_from_config(config)?),
    )
    .with_budget(Duration::from_secs(config.probe_timeout_secs));

    info!(
        "Probing {} and {} embedding model {}",
        config.llm_model, config.embedding_provider, config.embedding_model
    );
    Ok(probe
        .run(&config.gpt_config_value(), &json!(config.embedding_model))
        .await)
}

async fn demo_command(config: &PrepConfig, with_preflight: bool) -> Result<()> {
    let table = json!([
        {"StaffId": "S001", "TalentStatement": "I want to move into data engineering."},
        {"StaffId": "S002", "TalentStatement": "Happy in current role."}
    ]);
    let validation = validate_input_value(&table);
    print_json(&json!({"table_validation": validation}))?;

    let job_functions = json!(["data engineering", "Product Management", "Product management"]);
    let labels = validate_job_functions_value(&job_functions);
    print_json(&json!({"job_functions": labels}))?;

    let sample = Table::from_json(&json!({
        "StaffId": ["E001"],
        "TalentStatement": ["  I   aspire to  lead product.  "]
    }))?;
    let normalized = normalize_text_column(&sample)?;
    print_json(&json!({"normalized": normalized}))?;

    if with_preflight {
        let state = run_preflight(config).await?;
        print_json(&json!({"preflight": state}))?;
    }

    Ok(())
}

async fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

async fn write_table(table: &Table, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(table)?;
    match output {
        Some(path) => {
            fs::write(path, rendered).await?;
            info!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
