//! Geospatial estimation demos.
//!
//! Each demo builds a synthetic scenario, runs one computation over it and
//! saves a chart:
//!
//! - `geometry`: basin volume from a sparse survey, mean depth vs RBF
//! - `spectral`: reflectance signatures and the band that separates them
//! - `groundwater`: summed consumption stress with flow lines
//! - `mass_balance`: rainfall through a lake to a lagged outlet

pub mod analysis;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod report;
pub mod run;
