//! End-to-end aggregation tests through the public API
//!
//! A recording histogram captures every fill so the exact calls made by the
//! pipeline can be compared against expectations.

use caloprof::analysis::{Analysis, Lifecycle, ShowerAnalysis};
use caloprof::config::{AnalysisConfig, HistogramSpec};
use caloprof::error::EventStatus;
use caloprof::histogram::{Book, Fill, Histogram1D};
use caloprof::hit::{HitRecord, Point3};
use caloprof::sink::MemorySink;
use caloprof::source::{EventRecord, SourceProvider};

#[derive(Debug, Clone, PartialEq)]
struct Recorder {
    name: String,
    fills: Vec<(f64, f64)>,
}

impl Fill for Recorder {
    fn fill(&mut self, value: f64, weight: f64) {
        self.fills.push((value, weight));
    }
}

impl Book for Recorder {
    fn book(name: &str, _spec: &HistogramSpec, _x: &str, _y: &str) -> Self {
        Recorder {
            name: name.to_string(),
            fills: Vec::new(),
        }
    }
}

fn config(sources: &[&str], esum: bool, lprof: bool, rprof: bool) -> AnalysisConfig {
    let spec = |enabled: bool| HistogramSpec {
        enabled,
        ..HistogramSpec::new(50, 0.0, 10.0)
    };
    AnalysisConfig {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        esum: spec(esum),
        lprof: spec(lprof),
        rprof: spec(rprof),
        ..AnalysisConfig::default()
    }
}

fn step(edep: f64, entry: [f64; 3], exit: [f64; 3]) -> HitRecord {
    HitRecord::new(edep, Point3::from(entry), Point3::from(exit))
}

#[test]
fn test_two_sources_end_to_end() {
    let event = EventRecord::new()
        .with_hits("A", vec![step(2.0, [0.0, 0.0, 0.0], [0.0, 0.0, 2.0])])
        .with_hits("B", vec![step(3.0, [1.0, 0.0, 0.0], [1.0, 0.0, 0.0])]);

    let mut analysis: ShowerAnalysis<MemorySink<Recorder>, Recorder> =
        Analysis::new(config(&["A", "B"], true, true, true), MemorySink::new()).unwrap();
    analysis.setup().unwrap();
    let status = analysis.process_event(&event).unwrap();

    assert_eq!(
        status,
        EventStatus::Processed {
            hits: 2,
            total_energy: 5.0
        }
    );
    assert_eq!(analysis.esum().unwrap().fills, vec![(5.0, 1.0)]);
    assert_eq!(
        analysis.longitudinal().unwrap().fills,
        vec![(1.0, 2.0), (0.0, 3.0)]
    );
    assert_eq!(
        analysis.radial().unwrap().fills,
        vec![(0.0, 2.0), (1.0, 3.0)]
    );
}

#[test]
fn test_total_independent_of_registration_order() {
    let event = EventRecord::new()
        .with_hits("A", vec![step(0.25, [0.0; 3], [0.0; 3]), step(1.5, [0.0; 3], [0.0; 3])])
        .with_hits("B", vec![step(0.75, [0.0; 3], [0.0; 3])])
        .with_hits("C", vec![step(4.0, [0.0; 3], [0.0; 3])]);

    let mut totals = Vec::new();
    for order in [["A", "B", "C"], ["C", "A", "B"], ["B", "C", "A"]] {
        let mut analysis: ShowerAnalysis<MemorySink> =
            Analysis::new(config(&order, true, false, false), MemorySink::new()).unwrap();
        analysis.setup().unwrap();
        analysis.process_event(&event).unwrap();
        totals.push(analysis.last_event_energy());
    }
    assert!(totals.iter().all(|&t| t == 6.5));
}

#[test]
fn test_disabled_longitudinal_never_filled() {
    let event = EventRecord::new().with_hits("A", vec![step(1.0, [0.0; 3], [2.0, 2.0, 2.0])]);

    let mut analysis: ShowerAnalysis<MemorySink<Recorder>, Recorder> =
        Analysis::new(config(&["A"], true, false, true), MemorySink::new()).unwrap();
    analysis.setup().unwrap();
    analysis.process_event(&event).unwrap();
    analysis.finalize().unwrap();

    assert!(analysis.longitudinal().is_none());
    let names: Vec<&str> = analysis
        .sink()
        .written
        .iter()
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(names, vec!["h_esum", "h_rprof"]);
}

#[test]
fn test_empty_registry_reports_and_continues() {
    let event = EventRecord::new().with_hits("A", vec![step(1.0, [0.0; 3], [0.0; 3])]);

    let mut analysis: ShowerAnalysis<MemorySink<Recorder>, Recorder> =
        Analysis::new(config(&[], true, true, true), MemorySink::new()).unwrap();
    analysis.setup().unwrap();

    assert_eq!(
        analysis.process_event(&event).unwrap(),
        EventStatus::NoRegisteredSources
    );
    assert_eq!(analysis.last_event_energy(), 0.0);
    assert!(analysis.esum().unwrap().fills.is_empty());

    let summary = analysis.finalize().unwrap();
    assert_eq!(summary.events_without_sources, 1);
    assert_eq!(summary.events_processed, 0);
}

#[test]
fn test_missing_truth_checked_before_registry() {
    let mut analysis: ShowerAnalysis<MemorySink> =
        Analysis::new(config(&[], true, false, false), MemorySink::new()).unwrap();
    analysis.setup().unwrap();

    let status = analysis
        .process_event(&EventRecord::new().without_truth())
        .unwrap();
    assert_eq!(status, EventStatus::MissingTruthRecord);
}

#[test]
fn test_custom_provider() {
    /// Provider that only knows one collection and always has truth
    struct Single(Vec<HitRecord>);

    impl SourceProvider<HitRecord> for Single {
        fn has_truth(&self, node: &str) -> bool {
            node == "G4TruthInfo"
        }

        fn resolve(&self, name: &str) -> Option<&[HitRecord]> {
            (name == "ONLY").then_some(self.0.as_slice())
        }
    }

    let mut analysis: ShowerAnalysis<MemorySink> =
        Analysis::new(config(&["ONLY", "OTHER"], true, true, false), MemorySink::new()).unwrap();
    analysis.setup().unwrap();
    let status = analysis
        .process_event(&Single(vec![step(2.5, [0.0, 0.0, 1.0], [0.0, 0.0, 3.0])]))
        .unwrap();
    assert!(status.is_processed());

    let lprof: &Histogram1D = analysis.longitudinal().unwrap();
    assert_eq!(lprof.bin_content(lprof.bin_index(2.0).unwrap()), 2.5);
}

#[test]
fn test_histograms_accumulate_across_events() {
    let event = EventRecord::new().with_hits(
        "A",
        vec![
            step(1.0, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            step(2.0, [3.0, 4.0, 5.0], [3.0, 4.0, 5.0]),
        ],
    );
    let mut analysis: ShowerAnalysis<MemorySink> =
        Analysis::new(config(&["A"], true, true, true), MemorySink::new()).unwrap();
    analysis.setup().unwrap();
    for _ in 0..3 {
        analysis.process_event(&event).unwrap();
    }

    let esum = analysis.esum().unwrap();
    assert_eq!(esum.entries, 3);
    assert_eq!(esum.bin_content(esum.bin_index(3.0).unwrap()), 3.0);

    let rprof = analysis.radial().unwrap();
    assert_eq!(rprof.sum_weights, 9.0);
    assert_eq!(rprof.bin_content(rprof.bin_index(5.0).unwrap()), 6.0);

    let summary = analysis.finalize().unwrap();
    assert_eq!(summary.events_processed, 3);
    assert_eq!(summary.deposits_processed, 6);
    assert_eq!(summary.histograms_written, 3);
    assert_eq!(analysis.state(), Lifecycle::Finalized);
    assert_eq!(analysis.sink().written.len(), 3);
}
