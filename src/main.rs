use anyhow::{Context, Result};
use clap::Parser;
use caloprof::analysis::{Analysis, RunSummary};
use caloprof::cli::{Cli, OutputFormat};
use caloprof::config::{AnalysisConfig, AnalysisKind};
use caloprof::hit::{Deposit, HitRecord, TowerRecord};
use caloprof::input::EventReader;
use caloprof::sink::{CsvSink, JsonSink, OutputSink};
use caloprof::source::{EventRecord, SourceProvider};
use std::io::BufRead;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration file (if any) and apply CLI overrides
fn build_config(args: &Cli) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_overrides(base);
    if let Err(msg) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", msg);
    }
    Ok(config)
}

fn open_sink(args: &Cli) -> Box<dyn OutputSink> {
    match args.format {
        OutputFormat::Json => Box::new(JsonSink::new(&args.output)),
        OutputFormat::Csv => Box::new(CsvSink::new(&args.output)),
    }
}

/// Drive one analysis over the whole event stream
fn run_analysis<R>(
    config: AnalysisConfig,
    sink: Box<dyn OutputSink>,
    events: EventReader<Box<dyn BufRead>>,
) -> Result<RunSummary>
where
    R: Deposit,
    EventRecord: SourceProvider<R>,
{
    let mut analysis: Analysis<R, _> = Analysis::new(config, sink)?;
    analysis.setup().context("Failed to set up analysis")?;

    for (index, event) in events.enumerate() {
        let event = event?;
        let status = analysis.process_event(&event)?;
        match status.into_result(&analysis.config().truth_node) {
            Ok((hits, total_energy)) => {
                tracing::debug!(
                    "Event {}: {} deposit(s), {:.6} GeV",
                    index + 1,
                    hits,
                    total_energy
                );
            }
            Err(reason) => tracing::debug!("Event {} skipped: {}", index + 1, reason),
        }
    }

    let summary = analysis.finalize().context("Failed to write histograms")?;
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    eprintln!("caloprof: {} event(s) read", summary.events_seen);
    eprintln!("  processed:            {}", summary.events_processed);
    eprintln!("  missing truth record: {}", summary.events_missing_truth);
    eprintln!("  no sources:           {}", summary.events_without_sources);
    eprintln!("  deposits:             {}", summary.deposits_processed);
    eprintln!("  histograms written:   {}", summary.histograms_written);
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = build_config(&args)?;
    let events = EventReader::from_path(&args.input)?;
    let sink = open_sink(&args);

    let summary = match config.kind {
        AnalysisKind::Shower => run_analysis::<HitRecord>(config, sink, events)?,
        AnalysisKind::Tower => run_analysis::<TowerRecord>(config, sink, events)?,
    };

    if args.summary {
        print_summary(&summary);
    }

    Ok(())
}
