//! Weighted 1D histograms
//!
//! The pipeline only talks to histograms through [`Fill`]. [`Histogram1D`]
//! is the concrete fixed-width accumulator persisted by the output sinks.

use serde::{Deserialize, Serialize};

use crate::config::HistogramSpec;

/// Weighted accumulation seam used by the pipeline
///
/// Implementations absorb out-of-range values according to their own
/// policy; a fill never fails.
pub trait Fill {
    fn fill(&mut self, value: f64, weight: f64);
}

/// Construction of an accumulator from its configuration entry
pub trait Book: Fill + Sized {
    fn book(name: &str, spec: &HistogramSpec, x_title: &str, y_title: &str) -> Self;
}

/// Fixed-width weighted histogram with underflow and overflow bins
///
/// Values below `min` land in underflow, values at or above `max` (and NaN)
/// land in overflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    pub name: String,
    pub x_title: String,
    pub y_title: String,
    pub min: f64,
    pub max: f64,
    pub contents: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    /// Number of fill calls, including out-of-range ones
    pub entries: u64,
    /// Sum of all fill weights, including out-of-range ones
    pub sum_weights: f64,
    /// Sum of weight * value over in-range fills
    #[serde(skip)]
    sum_weighted_values: f64,
    #[serde(skip)]
    in_range_weights: f64,
}

impl Histogram1D {
    /// Book an empty histogram with `bins` equal-width bins over `[min, max)`
    pub fn new(name: impl Into<String>, bins: usize, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            x_title: String::new(),
            y_title: String::new(),
            min,
            max,
            contents: vec![0.0; bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            sum_weights: 0.0,
            sum_weighted_values: 0.0,
            in_range_weights: 0.0,
        }
    }

    /// Book a histogram from a configuration entry
    pub fn from_spec(name: impl Into<String>, spec: &HistogramSpec) -> Self {
        Self::new(name, spec.bins, spec.min, spec.max)
    }

    pub fn with_titles(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_title = x_title.into();
        self.y_title = y_title.into();
        self
    }

    pub fn bins(&self) -> usize {
        self.contents.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins() as f64
    }

    /// Index of the in-range bin holding `value`, or `None` for
    /// underflow/overflow
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !(value >= self.min && value < self.max) || self.contents.is_empty() {
            return None;
        }
        let index = ((value - self.min) / self.bin_width()) as usize;
        // Rounding can push values just below max into a non-existent bin
        Some(index.min(self.bins() - 1))
    }

    pub fn bin_content(&self, index: usize) -> f64 {
        self.contents.get(index).copied().unwrap_or(0.0)
    }

    pub fn bin_low_edge(&self, index: usize) -> f64 {
        self.min + index as f64 * self.bin_width()
    }

    pub fn bin_center(&self, index: usize) -> f64 {
        self.bin_low_edge(index) + 0.5 * self.bin_width()
    }

    /// Unit-weight fill, used for event-level quantities
    pub fn fill_unweighted(&mut self, value: f64) {
        self.fill(value, 1.0);
    }

    /// Weighted mean of in-range fills, `None` if nothing landed in range
    pub fn mean(&self) -> Option<f64> {
        if self.in_range_weights == 0.0 {
            None
        } else {
            Some(self.sum_weighted_values / self.in_range_weights)
        }
    }

    /// Sum of in-range bin contents
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }
}

impl Book for Histogram1D {
    fn book(name: &str, spec: &HistogramSpec, x_title: &str, y_title: &str) -> Self {
        Self::from_spec(name, spec).with_titles(x_title, y_title)
    }
}

impl Fill for Histogram1D {
    fn fill(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        self.sum_weights += weight;
        match self.bin_index(value) {
            Some(index) => {
                self.contents[index] += weight;
                self.sum_weighted_values += weight * value;
                self.in_range_weights += weight;
            }
            None if value < self.min => self.underflow += weight,
            None => self.overflow += weight,
        }
    }
}
