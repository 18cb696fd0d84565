//! Per-event running energy total

use crate::histogram::Fill;

/// Event-scoped energy sum
///
/// Reset at the start of every event, incremented once per deposit across
/// all sources, and committed exactly once at the end of the event.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventAccumulator {
    total_energy: f64,
    deposits: usize,
}

impl EventAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.total_energy = 0.0;
        self.deposits = 0;
    }

    /// Add one deposit. Runs whether or not the event histogram is booked.
    pub fn add(&mut self, energy: f64) {
        self.total_energy += energy;
        self.deposits += 1;
    }

    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    pub fn deposits(&self) -> usize {
        self.deposits
    }

    /// Fill the event-level histogram with the final total, if booked
    pub fn commit<H: Fill>(&self, esum: Option<&mut H>) -> f64 {
        if let Some(hist) = esum {
            hist.fill(self.total_energy, 1.0);
        }
        self.total_energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Histogram1D;

    #[test]
    fn test_add_and_reset() {
        let mut acc = EventAccumulator::new();
        acc.add(2.0);
        acc.add(3.0);
        assert_eq!(acc.total_energy(), 5.0);
        assert_eq!(acc.deposits(), 2);

        acc.reset();
        assert_eq!(acc.total_energy(), 0.0);
        assert_eq!(acc.deposits(), 0);
    }

    #[test]
    fn test_commit_fills_once() {
        let mut acc = EventAccumulator::new();
        acc.add(1.5);
        let mut hist = Histogram1D::new("h_esum", 10, 0.0, 10.0);
        assert_eq!(acc.commit(Some(&mut hist)), 1.5);
        assert_eq!(hist.entries, 1);
        assert_eq!(hist.bin_content(1), 1.0);
    }

    #[test]
    fn test_commit_without_histogram() {
        let mut acc = EventAccumulator::new();
        acc.add(4.0);
        assert_eq!(acc.commit::<Histogram1D>(None), 4.0);
    }
}
