//! Energy-deposit records consumed by the analysis pipelines
//!
//! Hits carry the entry and exit points of a simulated step; towers carry
//! transverse energy and pseudorapidity. Both are read through [`Deposit`].

use serde::{Deserialize, Serialize};

/// A point in detector coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Componentwise arithmetic mean of two points
    pub fn midpoint(a: Point3, b: Point3) -> Point3 {
        Point3 {
            x: 0.5 * (a.x + b.x),
            y: 0.5 * (a.y + b.y),
            z: 0.5 * (a.z + b.z),
        }
    }

    /// Transverse distance from the beam axis, `sqrt(x² + y²)`
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// A single simulated energy deposit with two step endpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Deposited energy (GeV), expected to be non-negative
    #[serde(rename = "edep")]
    pub energy_deposit: f64,
    pub entry: Point3,
    pub exit: Point3,
}

impl HitRecord {
    pub fn new(energy_deposit: f64, entry: Point3, exit: Point3) -> Self {
        Self {
            energy_deposit,
            entry,
            exit,
        }
    }

    /// Representative location of the deposit.
    ///
    /// Always the geometric midpoint of the step, never an energy-weighted
    /// centroid.
    pub fn midpoint(&self) -> Point3 {
        Point3::midpoint(self.entry, self.exit)
    }
}

/// A calorimeter tower summarised by transverse energy and direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerRecord {
    /// Transverse energy (GeV)
    pub et: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuth (radians); carried but not used by the aggregation
    #[serde(default)]
    pub phi: f64,
}

impl TowerRecord {
    pub fn new(et: f64, eta: f64, phi: f64) -> Self {
        Self { et, eta, phi }
    }

    /// Longitudinal momentum `Et * sinh(eta)` assuming a massless deposit
    pub fn pz(&self) -> f64 {
        self.et * self.eta.sinh()
    }

    /// Total energy `sqrt(Et² + pz²)`.
    ///
    /// Provisional: the tower transform has not been confirmed for
    /// massive showers.
    pub fn energy(&self) -> f64 {
        let pz = self.pz();
        (self.et * self.et + pz * pz).sqrt()
    }
}

/// Anything the pipeline can sum and, optionally, locate in space
pub trait Deposit {
    /// Energy added to the event total
    fn energy(&self) -> f64;

    /// Location used for profile binning; `None` if the record has no
    /// spatial extent
    fn position(&self) -> Option<Point3>;
}

impl Deposit for HitRecord {
    fn energy(&self) -> f64 {
        self.energy_deposit
    }

    fn position(&self) -> Option<Point3> {
        Some(self.midpoint())
    }
}

impl Deposit for TowerRecord {
    fn energy(&self) -> f64 {
        TowerRecord::energy(self)
    }

    fn position(&self) -> Option<Point3> {
        None
    }
}
