//! Hit-source registry and per-event resolution
//!
//! Sources are named slots resolved against each event. A name that does not
//! resolve in a given event contributes nothing; that is expected, since not
//! every detector fires every event.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::hit::{HitRecord, TowerRecord};

/// Per-event view of the host framework's data
///
/// One provider is handed to the controller per event; records are borrowed
/// for the duration of that event only.
pub trait SourceProvider<R> {
    /// Whether the truth container `node` is present in this event
    fn has_truth(&self, node: &str) -> bool;

    /// Records for the collection named `name`, or `None` if it did not fire
    fn resolve(&self, name: &str) -> Option<&[R]>;
}

/// Ordered list of source names to read each event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitSourceRegistry {
    names: Vec<String>,
}

impl HitSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source name
    ///
    /// A name registered twice is resolved, and summed, once per registration.
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.names.contains(&name) {
            tracing::warn!("Hit source '{}' registered more than once", name);
        }
        self.names.push(name);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve every registered name against `provider`, in registration
    /// order, skipping names absent from this event
    pub fn resolve<'a, R, P>(&'a self, provider: &'a P) -> impl Iterator<Item = (&'a str, &'a [R])>
    where
        P: SourceProvider<R> + ?Sized,
        R: 'a,
    {
        self.names.iter().filter_map(move |name| match provider.resolve(name) {
            Some(records) => Some((name.as_str(), records)),
            None => {
                tracing::debug!("Hit source '{}' not present in event", name);
                None
            }
        })
    }
}

impl<S: Into<String>> FromIterator<S> for HitSourceRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = Self::new();
        for name in iter {
            registry.register(name);
        }
        registry
    }
}

fn truth_present() -> bool {
    true
}

/// One event as delivered by the input stream
///
/// # Example JSON
/// ```json
/// {"truth": true,
///  "collections": {"G4HIT_CEMC": [{"edep": 2.0, "entry": [0,0,0], "exit": [0,0,2]}]},
///  "towers": {"TOWER_CEMC": [{"et": 1.2, "eta": 0.3, "phi": 0.0}]}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Presence of the truth container; defaults to present
    #[serde(default = "truth_present")]
    pub truth: bool,
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<HitRecord>>,
    #[serde(default)]
    pub towers: BTreeMap<String, Vec<TowerRecord>>,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            truth: true,
            collections: BTreeMap::new(),
            towers: BTreeMap::new(),
        }
    }
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_truth(mut self) -> Self {
        self.truth = false;
        self
    }

    pub fn with_hits(mut self, name: impl Into<String>, hits: Vec<HitRecord>) -> Self {
        self.collections.insert(name.into(), hits);
        self
    }

    pub fn with_towers(mut self, name: impl Into<String>, towers: Vec<TowerRecord>) -> Self {
        self.towers.insert(name.into(), towers);
        self
    }
}

impl SourceProvider<HitRecord> for EventRecord {
    fn has_truth(&self, _node: &str) -> bool {
        self.truth
    }

    fn resolve(&self, name: &str) -> Option<&[HitRecord]> {
        self.collections.get(name).map(Vec::as_slice)
    }
}

impl SourceProvider<TowerRecord> for EventRecord {
    fn has_truth(&self, _node: &str) -> bool {
        self.truth
    }

    fn resolve(&self, name: &str) -> Option<&[TowerRecord]> {
        self.towers.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::Point3;

    fn hit(edep: f64) -> HitRecord {
        HitRecord::new(edep, Point3::default(), Point3::default())
    }

    #[test]
    fn test_register_preserves_order() {
        let registry: HitSourceRegistry = ["B", "A", "C"].into_iter().collect();
        assert_eq!(registry.names(), ["B", "A", "C"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_register_keeps_duplicates() {
        let registry: HitSourceRegistry = ["A", "B", "A"].into_iter().collect();
        assert_eq!(registry.names(), ["A", "B", "A"]);

        let event = EventRecord::new().with_hits("A", vec![hit(1.5)]);
        let total: f64 = registry
            .resolve::<HitRecord, _>(&event)
            .flat_map(|(_, hits)| hits.iter().map(|h| h.energy_deposit))
            .sum();
        assert_eq!(total, 3.0);
    }

    #[test]
    fn test_resolve_skips_missing() {
        let registry: HitSourceRegistry = ["A", "MISSING", "B"].into_iter().collect();
        let event = EventRecord::new()
            .with_hits("A", vec![hit(1.0)])
            .with_hits("B", vec![hit(2.0), hit(3.0)]);

        let resolved: Vec<(&str, usize)> = registry
            .resolve::<HitRecord, _>(&event)
            .map(|(name, hits)| (name, hits.len()))
            .collect();
        assert_eq!(resolved, vec![("A", 1), ("B", 2)]);
    }

    #[test]
    fn test_event_record_json_defaults() {
        let event: EventRecord = serde_json::from_str(r#"{"collections": {}}"#).unwrap();
        assert!(event.truth);
        assert!(event.towers.is_empty());

        let event: EventRecord = serde_json::from_str(r#"{"truth": false}"#).unwrap();
        assert!(!SourceProvider::<HitRecord>::has_truth(&event, "G4TruthInfo"));
    }

    #[test]
    fn test_towers_resolve_separately() {
        let event = EventRecord::new()
            .with_hits("CEMC", vec![hit(1.0)])
            .with_towers("CEMC", vec![TowerRecord::new(1.0, 0.0, 0.0)]);
        let hits = SourceProvider::<HitRecord>::resolve(&event, "CEMC");
        let towers = SourceProvider::<TowerRecord>::resolve(&event, "CEMC");
        assert_eq!(hits.map(|h| h.len()), Some(1));
        assert_eq!(towers.map(|t| t.len()), Some(1));
    }
}
