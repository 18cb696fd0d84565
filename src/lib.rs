//! caloprof - calorimeter hit aggregation and shower profiles
//!
//! Sums the energy deposited across named hit collections into one total per
//! event and bins the same deposits by longitudinal and radial position into
//! accumulated shower-profile histograms.

pub mod accumulator;
pub mod analysis;
pub mod binner;
pub mod cli;
pub mod config;
pub mod error;
pub mod histogram;
pub mod hit;
pub mod input;
pub mod sink;
pub mod source;
