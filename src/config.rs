//! Analysis configuration
//!
//! Enable flags and binning for each optional output distribution, plus the
//! ordered list of hit sources to read each event. Loaded from TOML and
//! immutable once a controller has been set up.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the truth container used as the event-validity gate
pub const DEFAULT_TRUTH_NODE: &str = "G4TruthInfo";

/// Largest accepted bin count per distribution
pub const MAX_BINS: usize = i32::MAX as usize;

/// Binning for one output distribution
///
/// A disabled entry is never booked, so nothing is ever filled or written for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramSpec {
    pub enabled: bool,
    pub bins: usize,
    pub min: f64,
    pub max: f64,
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self::disabled()
    }
}

impl HistogramSpec {
    /// Enabled spec with the given binning
    pub fn new(bins: usize, min: f64, max: f64) -> Self {
        Self {
            enabled: true,
            bins,
            min,
            max,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            bins: 100,
            min: 0.0,
            max: 1.0,
        }
    }

    /// Parse `BINS,MIN,MAX` as given on the command line
    pub fn parse_triplet(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected BINS,MIN,MAX, got '{}'", s));
        }
        let bins = parts[0]
            .parse::<usize>()
            .map_err(|e| format!("invalid bin count '{}': {}", parts[0], e))?;
        let min = parts[1]
            .parse::<f64>()
            .map_err(|e| format!("invalid min '{}': {}", parts[1], e))?;
        let max = parts[2]
            .parse::<f64>()
            .map_err(|e| format!("invalid max '{}': {}", parts[2], e))?;
        Ok(Self::new(bins, min, max))
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.bins == 0 {
            return Err(format!("{}: bins must be > 0", name));
        }
        if self.bins > MAX_BINS {
            return Err(format!(
                "{}: bins must be <= {}, got {}",
                name, MAX_BINS, self.bins
            ));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(format!(
                "{}: range must be finite, got [{}, {})",
                name, self.min, self.max
            ));
        }
        if self.min >= self.max {
            return Err(format!(
                "{}: min must be < max, got [{}, {})",
                name, self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Which record shape the analysis consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Step-level hits with entry/exit points
    #[default]
    Shower,
    /// Calorimeter towers (Et, eta, phi)
    Tower,
}

/// Full analysis configuration
///
/// # Example TOML
/// ```toml
/// kind = "shower"
/// sources = ["G4HIT_CEMC", "G4HIT_HCALIN"]
///
/// [esum]
/// enabled = true
/// bins = 100
/// min = 0.0
/// max = 10.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub kind: AnalysisKind,
    /// Truth container that must be present for an event to be processed
    pub truth_node: String,
    /// Ordered hit-source names resolved each event
    pub sources: Vec<String>,
    /// Event-level energy sum
    pub esum: HistogramSpec,
    /// Longitudinal profile, keyed by midpoint z
    pub lprof: HistogramSpec,
    /// Radial profile, keyed by midpoint sqrt(x² + y²)
    pub rprof: HistogramSpec,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kind: AnalysisKind::Shower,
            truth_node: DEFAULT_TRUTH_NODE.to_string(),
            sources: Vec::new(),
            esum: HistogramSpec::disabled(),
            lprof: HistogramSpec::disabled(),
            rprof: HistogramSpec::disabled(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).context("Failed to parse TOML analysis configuration")?;
        Ok(config)
    }

    /// Validate binning of every enabled distribution
    ///
    /// An empty source list is not rejected here; it surfaces per event as
    /// `EventStatus::NoRegisteredSources`.
    pub fn validate(&self) -> Result<(), String> {
        self.esum.validate("esum")?;
        self.lprof.validate("lprof")?;
        self.rprof.validate("rprof")?;

        if self.kind == AnalysisKind::Tower && (self.lprof.enabled || self.rprof.enabled) {
            return Err("tower analysis has no spatial profiles; disable lprof/rprof".to_string());
        }

        if self.truth_node.is_empty() {
            return Err("truth_node must not be empty".to_string());
        }

        Ok(())
    }

    /// Number of distributions that will be booked
    pub fn enabled_count(&self) -> usize {
        [self.esum, self.lprof, self.rprof]
            .iter()
            .filter(|spec| spec.enabled)
            .count()
    }
}
