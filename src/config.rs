use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};

use crate::error::{DemoError, Result};

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// All tunable parameters.  Every section falls back to the built-in scenario,
/// so a JSON file only needs the values it wants to change:
///
/// ```json
/// { "mass_balance": { "lag_hours": 6 }, "geometry": { "seed": 7 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub output: OutputConfig,
    pub geometry: GeometryParams,
    pub groundwater: GroundwaterParams,
    pub mass_balance: MassBalanceParams,
}

impl DemoConfig {
    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> AnyResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DemoConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the demos cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.groundwater.validate()?;
        self.mass_balance.validate()
    }
}

fn invalid(msg: impl Into<String>) -> DemoError {
    DemoError::InvalidConfig(msg.into())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Where images and side files land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Base directory; each demo's fixed relative path is joined onto it.
    pub dir: PathBuf,
    /// Also write the computed series as CSV next to each image.
    pub export_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            export_csv: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryParams {
    /// Nodes per axis of the square `[-1, 1]` grid.
    pub grid_size: usize,
    /// Area attributed to each grid node when summing volumes.
    pub pixel_area: f64,
    /// Depth at the basin centre (negative = below datum).
    pub max_depth: f64,
    pub seed: u64,
    /// Random candidates drawn before filtering.
    pub candidates: usize,
    /// Cap on the number of survey points kept.
    pub max_points: usize,
    /// Lower-left corner of the inaccessible quadrant.
    pub obstruction: (f64, f64),
    /// RBF smoothing term subtracted from the kernel diagonal.
    pub smooth: f64,
    /// Fixed RBF shape parameter; `None` derives it from the point spread.
    pub epsilon: Option<f64>,
    /// Load survey points from CSV/JSON instead of sampling them.
    pub survey_file: Option<PathBuf>,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            grid_size: 100,
            pixel_area: 0.0004,
            max_depth: -10.0,
            seed: 42,
            candidates: 100,
            max_points: 40,
            obstruction: (0.2, 0.2),
            smooth: 0.1,
            epsilon: None,
            survey_file: None,
        }
    }
}

impl GeometryParams {
    fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(invalid("geometry.grid_size must be at least 2"));
        }
        if !(self.pixel_area > 0.0) {
            return Err(invalid("geometry.pixel_area must be positive"));
        }
        if self.max_points == 0 {
            return Err(invalid("geometry.max_points must be positive"));
        }
        if matches!(self.epsilon, Some(e) if !(e > 0.0)) {
            return Err(invalid("geometry.epsilon must be positive when set"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Groundwater
// ---------------------------------------------------------------------------

/// One Gaussian consumption (or recharge) source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceParams {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub sigma: f64,
    pub amplitude: f64,
    /// Recharge sources subtract from the stress field.
    #[serde(default)]
    pub recharge: bool,
}

impl SourceParams {
    fn new(name: &str, x: f64, y: f64, sigma: f64, amplitude: f64, recharge: bool) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            sigma,
            amplitude,
            recharge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroundwaterParams {
    pub grid_size: usize,
    /// Side length of the square domain in km.
    pub extent: f64,
    pub sources: Vec<SourceParams>,
    pub critical_zone: (f64, f64),
    /// Streamline density, 1.0 ≈ a 30 × 30 seed lattice.
    pub density: f64,
}

impl Default for GroundwaterParams {
    fn default() -> Self {
        Self {
            grid_size: 100,
            extent: 100.0,
            sources: vec![
                SourceParams::new("Agriculture", 25.0, 75.0, 15.0, 0.8, false),
                SourceParams::new("Built-up", 75.0, 75.0, 10.0, 1.0, false),
                SourceParams::new("Forest", 25.0, 25.0, 20.0, 0.3, false),
                SourceParams::new("Water Body", 75.0, 25.0, 12.0, 0.6, true),
            ],
            critical_zone: (50.0, 50.0),
            density: 1.5,
        }
    }
}

impl GroundwaterParams {
    fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(invalid("groundwater.grid_size must be at least 2"));
        }
        if !(self.extent > 0.0) {
            return Err(invalid("groundwater.extent must be positive"));
        }
        if let Some(bad) = self.sources.iter().find(|s| !(s.sigma > 0.0)) {
            return Err(invalid(format!(
                "groundwater source '{}' needs a positive sigma",
                bad.name
            )));
        }
        if !(self.density > 0.0) {
            return Err(invalid("groundwater.density must be positive"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mass balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MassBalanceParams {
    pub timesteps: usize,
    /// Rainfall volume delivered as an impulse at t = 0.
    pub rainfall_total: f64,
    /// Share of rainfall lost to evaporation and infiltration.
    pub loss_fraction: f64,
    /// Share of lake storage released per step once the lag has elapsed.
    pub discharge_coefficient: f64,
    pub lag_hours: usize,
    /// Observed lake rise, drawn as a reference line.
    pub observed_rise: f64,
}

impl Default for MassBalanceParams {
    fn default() -> Self {
        Self {
            timesteps: 24,
            rainfall_total: 1000.0,
            loss_fraction: 0.4,
            discharge_coefficient: 0.1,
            lag_hours: 12,
            observed_rise: 400.0,
        }
    }
}

impl MassBalanceParams {
    fn validate(&self) -> Result<()> {
        if self.timesteps == 0 {
            return Err(invalid("mass_balance.timesteps must be positive"));
        }
        if !(0.0..=1.0).contains(&self.loss_fraction) {
            return Err(invalid("mass_balance.loss_fraction must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.discharge_coefficient) {
            return Err(invalid(
                "mass_balance.discharge_coefficient must lie in [0, 1]",
            ));
        }
        if self.rainfall_total < 0.0 {
            return Err(invalid("mass_balance.rainfall_total must not be negative"));
        }
        Ok(())
    }
}
