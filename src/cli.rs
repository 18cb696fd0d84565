//! CLI argument parsing for caloprof

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{AnalysisConfig, AnalysisKind, HistogramSpec};

/// Output format for booked histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON document (default)
    Json,
    /// One CSV row per bin
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "caloprof")]
#[command(version)]
#[command(about = "Aggregate calorimeter hits into event energy sums and shower profiles", long_about = None)]
pub struct Cli {
    /// Event stream, one JSON event per line ("-" for stdin)
    #[arg(value_name = "EVENTS")]
    pub input: PathBuf,

    /// TOML analysis configuration
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file for histograms
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "caloprof.json")]
    pub output: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Record shape to analyse (overrides config)
    #[arg(long = "kind", value_enum)]
    pub kind: Option<AnalysisKind>,

    /// Hit source to read each event (repeatable, names not already in the config are appended)
    #[arg(short = 's', long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// Truth container gating each event (overrides config)
    #[arg(long = "truth-node", value_name = "NAME")]
    pub truth_node: Option<String>,

    /// Book event energy sum histogram as BINS,MIN,MAX
    #[arg(long = "esum", value_name = "BINS,MIN,MAX", value_parser = HistogramSpec::parse_triplet)]
    pub esum: Option<HistogramSpec>,

    /// Book longitudinal profile histogram as BINS,MIN,MAX
    #[arg(long = "lprof", value_name = "BINS,MIN,MAX", value_parser = HistogramSpec::parse_triplet)]
    pub lprof: Option<HistogramSpec>,

    /// Book radial profile histogram as BINS,MIN,MAX
    #[arg(long = "rprof", value_name = "BINS,MIN,MAX", value_parser = HistogramSpec::parse_triplet)]
    pub rprof: Option<HistogramSpec>,

    /// Print run summary to stderr
    #[arg(long = "summary")]
    pub summary: bool,

    /// Enable debug tracing output
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a base configuration
    pub fn apply_overrides(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        if let Some(node) = &self.truth_node {
            config.truth_node = node.clone();
        }
        for name in &self.sources {
            if !config.sources.contains(name) {
                config.sources.push(name.clone());
            }
        }
        if let Some(spec) = self.esum {
            config.esum = spec;
        }
        if let Some(spec) = self.lprof {
            config.lprof = spec;
        }
        if let Some(spec) = self.rprof {
            config.rprof = spec;
        }
        config
    }
}
