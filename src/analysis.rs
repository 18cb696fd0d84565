//! Lifecycle controllers for the shower and tower analyses
//!
//! `setup` books the enabled histograms and opens the sink. Each
//! `process_event` drains every registered source of one event into the
//! accumulators; `finalize` writes each booked histogram once and releases
//! the sink.
//!
//! Both analyses run the same pipeline; they differ only in the record type
//! their sources yield. Tower records carry no position, so only the
//! event-level sum is filled for them.

use serde::Serialize;
use std::marker::PhantomData;

use crate::accumulator::EventAccumulator;
use crate::binner::ProfileBinner;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, EventStatus};
use crate::histogram::{Book, Histogram1D};
use crate::hit::{Deposit, HitRecord, TowerRecord};
use crate::sink::OutputSink;
use crate::source::{HitSourceRegistry, SourceProvider};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Finalized,
    /// A finalize attempt failed; the output is incomplete
    Failed,
}

impl Lifecycle {
    fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Ready => "ready",
            Lifecycle::Finalized => "finalized",
            Lifecycle::Failed => "failed",
        }
    }
}

/// Event counters reported at finalize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub events_seen: u64,
    pub events_processed: u64,
    pub events_missing_truth: u64,
    pub events_without_sources: u64,
    pub deposits_processed: u64,
    pub histograms_written: usize,
}

impl RunSummary {
    pub fn events_skipped(&self) -> u64 {
        self.events_missing_truth + self.events_without_sources
    }
}

/// Analysis over hit collections with longitudinal and radial profiles
pub type ShowerAnalysis<S, H = Histogram1D> = Analysis<HitRecord, S, H>;

/// Analysis over tower collections, event-level sum only
pub type TowerAnalysis<S, H = Histogram1D> = Analysis<TowerRecord, S, H>;

/// Generic lifecycle controller
///
/// Single-threaded: events are processed one at a time and the histograms
/// are owned exclusively by the controller.
pub struct Analysis<R, S, H = Histogram1D>
where
    R: Deposit,
    S: OutputSink<H>,
    H: Book,
{
    config: AnalysisConfig,
    registry: HitSourceRegistry,
    accumulator: EventAccumulator,
    esum: Option<H>,
    binner: ProfileBinner<H>,
    sink: S,
    state: Lifecycle,
    summary: RunSummary,
    _record: PhantomData<fn(&R)>,
}

impl<R, S, H> Analysis<R, S, H>
where
    R: Deposit,
    S: OutputSink<H>,
    H: Book,
{
    /// Create a controller from a validated configuration and an unopened sink
    pub fn new(config: AnalysisConfig, sink: S) -> Result<Self, AnalysisError> {
        config.validate().map_err(AnalysisError::InvalidConfig)?;
        let registry = config.sources.iter().cloned().collect();
        Ok(Self {
            config,
            registry,
            accumulator: EventAccumulator::new(),
            esum: None,
            binner: ProfileBinner::default(),
            sink,
            state: Lifecycle::Uninitialized,
            summary: RunSummary::default(),
            _record: PhantomData,
        })
    }

    /// Register an additional source. Only allowed before setup.
    pub fn add_source(&mut self, name: impl Into<String>) -> Result<(), AnalysisError> {
        self.expect_state(Lifecycle::Uninitialized)?;
        self.registry.register(name);
        Ok(())
    }

    fn expect_state(&self, expected: Lifecycle) -> Result<(), AnalysisError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AnalysisError::InvalidState {
                expected: expected.as_str(),
                found: self.state.as_str(),
            })
        }
    }

    /// Open the sink and book every enabled histogram
    pub fn setup(&mut self) -> Result<(), AnalysisError> {
        self.expect_state(Lifecycle::Uninitialized)?;
        self.sink.open()?;

        let config = &self.config;
        self.esum = config
            .esum
            .enabled
            .then(|| H::book("h_esum", &config.esum, "E [GeV]", "# Entries / #Sigma Entries"));
        let lprof = config
            .lprof
            .enabled
            .then(|| H::book("h_lprof", &config.lprof, "z [m]", "<E> [GeV]"));
        let rprof = config
            .rprof
            .enabled
            .then(|| H::book("h_rprof", &config.rprof, "r [m]", "<E> [GeV]"));
        self.binner = ProfileBinner::new(lprof, rprof);

        self.state = Lifecycle::Ready;
        tracing::info!(
            "Analysis ready: {} source(s), {} histogram(s) booked",
            self.registry.len(),
            self.config.enabled_count()
        );
        Ok(())
    }

    /// Aggregate one event
    ///
    /// A missing truth record or an empty registry skips the event and is
    /// reported through the returned status; only lifecycle misuse is an
    /// `Err`.
    pub fn process_event<P>(&mut self, event: &P) -> Result<EventStatus, AnalysisError>
    where
        P: SourceProvider<R> + ?Sized,
    {
        self.expect_state(Lifecycle::Ready)?;
        self.summary.events_seen += 1;
        self.accumulator.reset();

        if !event.has_truth(&self.config.truth_node) {
            tracing::warn!(
                "Event {}: can't find truth record '{}', skipping",
                self.summary.events_seen,
                self.config.truth_node
            );
            self.summary.events_missing_truth += 1;
            return Ok(EventStatus::MissingTruthRecord);
        }

        if self.registry.is_empty() {
            tracing::warn!(
                "Event {}: no hit sources registered, skipping",
                self.summary.events_seen
            );
            self.summary.events_without_sources += 1;
            return Ok(EventStatus::NoRegisteredSources);
        }

        for (_name, records) in self.registry.resolve(event) {
            for record in records {
                let energy = record.energy();
                self.accumulator.add(energy);
                if let Some(position) = record.position() {
                    self.binner.fill(position, energy);
                }
            }
        }

        let hits = self.accumulator.deposits();
        let total_energy = self.accumulator.commit(self.esum.as_mut());
        self.summary.events_processed += 1;
        self.summary.deposits_processed += hits as u64;

        Ok(EventStatus::Processed { hits, total_energy })
    }

    /// Write every booked histogram once and close the sink
    ///
    /// Calling again after a successful finalize returns the same summary
    /// without touching the sink. The sink is closed even if a write fails;
    /// the controller is then `Failed` and every later call is an `Err`.
    pub fn finalize(&mut self) -> Result<RunSummary, AnalysisError> {
        if self.state == Lifecycle::Finalized {
            return Ok(self.summary);
        }
        self.expect_state(Lifecycle::Ready)?;

        let written = self.write_histograms();
        let closed = self.sink.close();
        self.state = Lifecycle::Failed;

        self.summary.histograms_written = written?;
        closed?;
        self.state = Lifecycle::Finalized;

        tracing::info!(
            "Analysis finalized: {} event(s), {} processed, {} skipped, {} histogram(s) written",
            self.summary.events_seen,
            self.summary.events_processed,
            self.summary.events_skipped(),
            self.summary.histograms_written
        );
        Ok(self.summary)
    }

    fn write_histograms(&mut self) -> Result<usize, AnalysisError> {
        let mut written = 0;
        let booked = [
            self.esum.as_ref(),
            self.binner.longitudinal(),
            self.binner.radial(),
        ];
        for hist in booked.into_iter().flatten() {
            self.sink.write(hist)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn registry(&self) -> &HitSourceRegistry {
        &self.registry
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Energy total of the most recent event
    pub fn last_event_energy(&self) -> f64 {
        self.accumulator.total_energy()
    }

    pub fn esum(&self) -> Option<&H> {
        self.esum.as_ref()
    }

    pub fn longitudinal(&self) -> Option<&H> {
        self.binner.longitudinal()
    }

    pub fn radial(&self) -> Option<&H> {
        self.binner.radial()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<R, S, H> Drop for Analysis<R, S, H>
where
    R: Deposit,
    S: OutputSink<H>,
    H: Book,
{
    fn drop(&mut self) {
        if self.state == Lifecycle::Ready {
            tracing::warn!("Analysis dropped without finalize; discarding output");
            if let Err(e) = self.sink.abort() {
                tracing::warn!("Failed to discard output: {}", e);
            }
        }
    }
}
