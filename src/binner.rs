//! Longitudinal and radial shower-profile binning

use crate::histogram::Fill;
use crate::hit::Point3;

/// Routes located deposits into the booked profile histograms
///
/// Each profile is optional; an unbooked profile is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileBinner<H> {
    longitudinal: Option<H>,
    radial: Option<H>,
}

impl<H> Default for ProfileBinner<H> {
    fn default() -> Self {
        Self {
            longitudinal: None,
            radial: None,
        }
    }
}

impl<H: Fill> ProfileBinner<H> {
    pub fn new(longitudinal: Option<H>, radial: Option<H>) -> Self {
        Self {
            longitudinal,
            radial,
        }
    }

    /// Fill the longitudinal profile at `z`, if booked
    pub fn fill_longitudinal(&mut self, z: f64, weight: f64) {
        if let Some(hist) = self.longitudinal.as_mut() {
            hist.fill(z, weight);
        }
    }

    /// Fill the radial profile at `r`, if booked
    pub fn fill_radial(&mut self, r: f64, weight: f64) {
        if let Some(hist) = self.radial.as_mut() {
            hist.fill(r, weight);
        }
    }

    /// Bin one deposit at `position` with `weight`
    pub fn fill(&mut self, position: Point3, weight: f64) {
        self.fill_longitudinal(position.z, weight);
        self.fill_radial(position.radius(), weight);
    }

    pub fn longitudinal(&self) -> Option<&H> {
        self.longitudinal.as_ref()
    }

    pub fn radial(&self) -> Option<&H> {
        self.radial.as_ref()
    }

    /// Hand the booked histograms back to the controller for writing
    pub fn into_parts(self) -> (Option<H>, Option<H>) {
        (self.longitudinal, self.radial)
    }
}
