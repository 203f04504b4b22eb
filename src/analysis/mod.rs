//! Numeric side of each demo.  Nothing here touches the filesystem or draws.

pub mod geometry;
pub mod groundwater;
pub mod mass_balance;
pub mod rbf;
pub mod spectral;
