use std::fs;
use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use drawledger_kernel::client::{Draw, HistoryClient, PrizeTier};
use drawledger_kernel::config::LedgerConfig;
use drawledger_kernel::guard::{Caller, Manageable};
use drawledger_kernel::history::{HistoryEvent, Record};
use drawledger_kernel::search::DrawId;

/// Drawledger CLI
#[derive(Parser, Debug)]
#[command(name = "drawledger")]
#[command(about = "Draw-indexed parameter history lookups", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Auto, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the record in effect at each draw id
    Lookup {
        #[command(flatten)]
        ledger: LedgerArgs,

        /// Draw ids to resolve
        #[arg(long = "draw-id", required = true, num_args = 1..)]
        draw_ids: Vec<DrawId>,
    },

    /// Validate a timeline and summarize it
    Inspect {
        #[command(flatten)]
        ledger: LedgerArgs,
    },
}

#[derive(Args, Debug)]
struct LedgerArgs {
    /// Record type stored in the timeline
    #[arg(long, value_enum)]
    kind: Kind,

    /// Path to timeline JSON (array of records, oldest first)
    #[arg(long)]
    timeline: String,

    /// Path to ledger config JSON
    #[arg(long)]
    config: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Tiers,
    Draws,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormat {
    Auto,
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct LookupOutput<'a, R> {
    ledger: &'static str,
    results: Vec<LookupResult<'a, R>>,
}

#[derive(Debug, Serialize)]
struct LookupResult<'a, R> {
    draw_id: DrawId,
    record: &'a R,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    ledger: &'static str,
    count: usize,
    oldest_id: DrawId,
    newest_id: DrawId,
    events: Vec<HistoryEvent>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Command::Lookup { ledger, draw_ids } => match ledger.kind {
            Kind::Tiers => lookup::<PrizeTier>("prize-tiers", &ledger, &draw_ids),
            Kind::Draws => lookup::<Draw>("draws", &ledger, &draw_ids),
        },
        Command::Inspect { ledger } => match ledger.kind {
            Kind::Tiers => inspect::<PrizeTier>("prize-tiers", &ledger),
            Kind::Draws => inspect::<Draw>("draws", &ledger),
        },
    }
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !std::io::stderr().is_terminal(),
    };

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

// A config file overrides the kind's built-in policy field by field.
fn load_config(args: &LedgerArgs) -> Result<LedgerConfig> {
    let defaults = match args.kind {
        Kind::Tiers => LedgerConfig::prize_tiers(),
        Kind::Draws => LedgerConfig::draws(),
    };
    let Some(path) = &args.config else {
        return Ok(defaults);
    };

    let data = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    Ok(defaults.merge_json(&data)?)
}

fn load_timeline<R: DeserializeOwned>(path: &str) -> Result<Vec<R>> {
    let data = fs::read_to_string(path).with_context(|| format!("reading timeline {path}"))?;
    let timeline = serde_json::from_str(&data).with_context(|| format!("parsing timeline {path}"))?;
    Ok(timeline)
}

fn lookup<R>(label: &'static str, args: &LedgerArgs, draw_ids: &[DrawId]) -> Result<()>
where
    R: Record + Serialize + DeserializeOwned,
{
    let config = load_config(args)?;
    let timeline: Vec<R> = load_timeline(&args.timeline)?;

    // Reads never consult the guard.
    let guard = Manageable::new(Caller(Uuid::new_v4()));
    let ledger = HistoryClient::from_config(label, guard, &config, timeline)?;

    let records = ledger.get_list(draw_ids)?;
    tracing::info!(ledger = label, lookups = draw_ids.len(), "lookup complete");

    let output = LookupOutput {
        ledger: ledger.label(),
        results: draw_ids
            .iter()
            .zip(records)
            .map(|(draw_id, record)| LookupResult {
                draw_id: *draw_id,
                record,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn inspect<R>(label: &'static str, args: &LedgerArgs) -> Result<()>
where
    R: Record + DeserializeOwned,
{
    let config = load_config(args)?;
    let timeline: Vec<R> = load_timeline(&args.timeline)?;

    // Replay the timeline through the guarded mutation path so every
    // ordering and domain rule is applied.
    let operator = Caller(Uuid::new_v4());
    let guard = Manageable::new(operator);
    let mut ledger = HistoryClient::from_config(label, guard, &config, Vec::new())?;
    ledger.inject_timeline(&operator, timeline)?;

    let output = InspectOutput {
        ledger: ledger.label(),
        count: ledger.count(),
        oldest_id: ledger.oldest_id()?,
        newest_id: ledger.newest_id()?,
        events: ledger.take_events(),
    };
    tracing::info!(ledger = label, count = output.count, "timeline valid");

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
