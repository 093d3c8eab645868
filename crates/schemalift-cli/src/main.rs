mod logging;
mod settings;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use logging::{init_logging, LoggingError};
use schemalift_accessor::{normalize_secret_id, validate_table_overlap, AccessorError};
use schemalift_core::{
    render_ddl, table_order, validate_schema, DdlConfig, Dialect, Error as CoreError,
    MigrationType, SchemaModel,
};
use settings::{Settings, SettingsError};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Accessor(#[from] AccessorError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid schema file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "schemalift", version, about = "Schema lifecycle tooling")]
struct Cli {
    /// Settings file. Missing files and keys fall back to defaults.
    #[arg(long, global = true, default_value = "schemalift.toml")]
    config: PathBuf,
    /// Write JSON logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render DDL for a schema JSON file.
    Ddl(DdlArgs),
    /// Validate a schema and check it against existing table names.
    Verify(VerifyArgs),
    /// Print a secret id pinned to a version.
    SecretId(SecretIdArgs),
    /// Print the effective settings as TOML.
    Settings,
}

#[derive(Args, Debug)]
struct DdlArgs {
    /// Path to schema.json.
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
    /// Override the schema's dialect.
    #[arg(long)]
    dialect: Option<Dialect>,
    /// Migration type; decides whether foreign keys are inlined.
    #[arg(long, default_value = "bulk")]
    migration: MigrationType,
    /// Emit only foreign key statements.
    #[arg(long, default_value_t = false)]
    foreign_keys_only: bool,
    /// Prefix statements with source comments.
    #[arg(long, default_value_t = false)]
    comments: bool,
    /// Optional output path. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Path to schema.json.
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
    /// Table names already present in the target database.
    #[arg(long, value_delimiter = ',')]
    existing: Vec<String>,
}

#[derive(Args, Debug)]
struct SecretIdArgs {
    #[arg(value_name = "SECRET_ID")]
    secret_id: String,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let timer = Instant::now();
    let command = match &cli.command {
        Command::Ddl(_) => "ddl",
        Command::Verify(_) => "verify",
        Command::SecretId(_) => "secret-id",
        Command::Settings => "settings",
    };
    tracing::info!(event = "run_started", command);

    match cli.command {
        Command::Ddl(args) => run_ddl(args)?,
        Command::Verify(args) => run_verify(args)?,
        Command::SecretId(args) => println!("{}", normalize_secret_id(&args.secret_id)),
        Command::Settings => run_settings(&cli.config)?,
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", command, duration_ms);
    Ok(())
}

fn load_schema(path: &Path) -> Result<SchemaModel, CliError> {
    let content = std::fs::read_to_string(path)?;
    let schema: SchemaModel = serde_json::from_str(&content)?;
    validate_schema(&schema)?;
    tracing::info!(
        event = "schema_loaded",
        path = %path.display(),
        tables = schema.tables.len(),
        foreign_keys = schema.foreign_key_count()
    );
    Ok(schema)
}

fn run_ddl(args: DdlArgs) -> Result<(), CliError> {
    let mut schema = load_schema(&args.schema)?;
    if let Some(dialect) = args.dialect {
        schema.dialect = dialect;
    }

    let config = if args.foreign_keys_only {
        DdlConfig::for_target(schema.dialect, schema.source.clone())
            .tables(false)
            .foreign_keys(true)
    } else {
        DdlConfig::for_target(schema.dialect, schema.source.clone())
            .foreign_keys(args.migration.inlines_foreign_keys(schema.dialect))
    }
    .comments(args.comments);

    let statements = render_ddl(&config, &schema.tables, &schema.sequences);
    let mut rendered = String::new();
    for statement in &statements {
        rendered.push_str(statement);
        rendered.push_str(";\n\n");
    }

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!(event = "ddl_written", path = %path.display(), statements = statements.len());
        }
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), CliError> {
    let schema = load_schema(&args.schema)?;
    validate_table_overlap(&schema, &args.existing)?;

    let order: Vec<&str> = table_order(&schema.tables)
        .into_iter()
        .map(|table| table.name.as_str())
        .collect();
    tracing::info!(event = "schema_verified", existing = args.existing.len());
    println!("ok: {} tables, creation order: {}", order.len(), order.join(", "));
    Ok(())
}

fn run_settings(path: &Path) -> Result<(), CliError> {
    let settings = Settings::load(path)?;
    print!("{}", settings.to_toml()?);

    let options = settings.into_options();
    tracing::debug!(
        event = "settings_loaded",
        path = %path.display(),
        heartbeat_interval = ?options.heartbeat_interval,
        ddl_deadline = ?options.ddl_deadline,
        max_workers = options.max_workers,
        dispatch_interval = ?options.dispatch_interval
    );
    Ok(())
}
