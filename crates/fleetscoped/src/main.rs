//! fleetscoped: runs one fleet inspection pass and prints its summary.
//!
//! # Usage
//!
//! ```text
//! fleetscoped --fleet fleet.json --namespace Fleet/Versions current
//! fleetscoped --config fleetscope.toml --fleet fleet.json history --earlier-days 90
//! fleetscoped --config fleetscope.toml --fleet fleet.json run
//! fleetscoped --config fleetscope.toml validate
//! ```
//!
//! Metric points go to stdout in the selected `--format`. The run summary
//! and logs go to stderr, so stdout stays a single parseable stream.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use fleetscope_core::InspectorConfig;
use fleetscope_discovery::FileFleet;
use fleetscope_inspector::{Inspector, RunRequest, RunSummary};
use fleetscope_metrics::{OutputFormat, WriterSink};

#[derive(Parser)]
#[command(name = "fleetscoped", about = "Fleet version inspector")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Metric namespace; overrides the configuration file.
    #[arg(long, global = true, env = "FLEETSCOPE_NAMESPACE")]
    namespace: Option<String>,

    /// JSON fleet document serving as registry and history store.
    #[arg(long, global = true)]
    fleet: Option<PathBuf>,

    /// Rendering of published metric points on stdout.
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pass the configuration describes, history included when
    /// `include_history` is set.
    Run,
    /// Inspect live tags only.
    Current,
    /// Inspect live tags plus tag history.
    History {
        /// Start of the history window, in days before now. Defaults to
        /// the configured `earlier_days`.
        #[arg(long, allow_negative_numbers = true)]
        earlier_days: Option<i64>,

        /// End of the history window, in days before now. Defaults to the
        /// configured `later_days`.
        #[arg(long, allow_negative_numbers = true)]
        later_days: Option<i64>,
    },
    /// Load and validate the configuration without inspecting anything.
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Prometheus,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Prometheus => OutputFormat::Prometheus,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut config = load_config(cli.config.as_deref(), cli.namespace.clone())?;
    apply_command(&mut config, &cli.command);

    if let Command::Validate = cli.command {
        let validated = config.validate().context("invalid configuration")?;
        info!(namespace = %validated.namespace, "configuration valid");
        return Ok(());
    }

    let fleet_path = cli
        .fleet
        .context("--fleet is required to run an inspection pass")?;
    let fleet = Arc::new(
        FileFleet::from_path(&fleet_path, config.registry_page_size)
            .with_context(|| format!("loading fleet from {}", fleet_path.display()))?,
    );
    info!(path = %fleet_path.display(), units = fleet.len(), "fleet document loaded");

    run_pass(
        config,
        fleet,
        std::io::stdout(),
        cli.format.into(),
        &mut std::io::stderr(),
    )
    .await?;
    Ok(())
}

/// Fold subcommand flags into the configuration. Flags win over the file;
/// unset flags keep the file value.
fn apply_command(config: &mut InspectorConfig, command: &Command) {
    match command {
        Command::Run | Command::Validate => {}
        Command::Current => config.include_history = false,
        Command::History {
            earlier_days,
            later_days,
        } => {
            config.include_history = true;
            if let Some(days) = earlier_days {
                config.earlier_days = *days;
            }
            if let Some(days) = later_days {
                config.later_days = *days;
            }
        }
    }
}

/// Run one pass, writing metric points to `metrics_out` and the summary to
/// `summary_out`.
async fn run_pass<W: Write + Send + 'static>(
    config: InspectorConfig,
    fleet: Arc<FileFleet>,
    metrics_out: W,
    format: OutputFormat,
    summary_out: &mut impl Write,
) -> anyhow::Result<RunSummary> {
    let request = RunRequest::from_config(&config);
    let sink = Arc::new(WriterSink::new(metrics_out, format));
    let inspector = Inspector::new(fleet.clone(), fleet, sink, config);

    let summary = inspector
        .run_request(request)
        .await
        .context("invalid configuration")?;
    writeln!(summary_out, "{}", serde_json::to_string_pretty(&summary)?)?;
    Ok(summary)
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fleetscope=debug,fleetscoped=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the configuration file, if any, and apply flag overrides.
///
/// The namespace falls back to `CLOUDWATCH_NAMESPACE` when neither the flag,
/// `FLEETSCOPE_NAMESPACE`, nor the file set it.
fn load_config(path: Option<&Path>, namespace: Option<String>) -> anyhow::Result<InspectorConfig> {
    let mut config = match path {
        Some(path) => InspectorConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => InspectorConfig::default(),
    };
    apply_namespace(
        &mut config,
        namespace,
        std::env::var("CLOUDWATCH_NAMESPACE").ok(),
    );
    Ok(config)
}

fn apply_namespace(config: &mut InspectorConfig, flag: Option<String>, fallback: Option<String>) {
    if let Some(namespace) = flag {
        config.namespace = Some(namespace);
    } else if config.namespace.is_none() {
        config.namespace = fallback;
    }
}
