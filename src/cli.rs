use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::DemoConfig;

#[derive(Parser, Debug)]
#[command(name = "basin-demos")]
#[command(about = "Geospatial estimation demos rendered as PNG charts")]
pub struct Cli {
    /// JSON file overriding the built-in scenario parameters
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base directory the images are written under
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also write the computed series as CSV next to each image
    #[arg(long = "export-csv")]
    pub export_csv: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Basin volume from a sparse survey: mean depth vs RBF interpolation
    Geometry {
        /// Seed for the random survey
        #[arg(long)]
        seed: Option<u64>,
        /// Read survey points from a .csv or .json file instead
        #[arg(long)]
        survey: Option<PathBuf>,
    },
    /// Reflectance signatures of water, algae, haze and glint
    Spectral,
    /// Groundwater stress field with flow lines
    Groundwater,
    /// Rainfall, lake storage and lagged outlet response
    MassBalance,
    /// Every demo in turn
    All,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)?,
            None => DemoConfig::default(),
        };
        if let Some(dir) = &self.out_dir {
            config.output.dir = dir.clone();
        }
        if self.export_csv {
            config.output.export_csv = true;
        }
        if let Command::Geometry { seed, survey } = &self.command {
            if let Some(seed) = seed {
                config.geometry.seed = *seed;
            }
            if let Some(survey) = survey {
                config.geometry.survey_file = Some(survey.clone());
            }
        }
        config.validate()?;
        Ok(config)
    }
}
