use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::geometry::{self, GeometrySummary};
use crate::analysis::groundwater::{self, GroundwaterSummary};
use crate::analysis::mass_balance::{self, MassBalanceSummary};
use crate::analysis::spectral::{self, SpectralSummary};
use crate::cli::Command;
use crate::config::DemoConfig;
use crate::data::model::{Band, Signature, SignatureKind};
use crate::data::{export, loader, synthetic};
use crate::render;
use crate::report::RunReport;

// ---------------------------------------------------------------------------
// Output locations, relative to the configured output directory
// ---------------------------------------------------------------------------

pub const GEOMETRY_PNG: &str = "Problem_1_Geometry/geometry_analysis.png";
pub const SPECTRAL_PNG: &str = "Problem_2_Spectral/spectral_signature.png";
pub const GROUNDWATER_PNG: &str = "groundwater_model.png";
pub const MASS_BALANCE_PNG: &str = "mass_balance_simulation.png";

/// A CSV side file placed in the same directory as `image`.
fn beside(image: &Path, name: &str) -> PathBuf {
    image
        .parent()
        .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
}

/// Run `command` and collect the summaries of every demo it ran.
pub fn execute(command: &Command, config: &DemoConfig) -> Result<RunReport> {
    let mut report = RunReport::default();
    let all = matches!(command, Command::All);

    if all || matches!(command, Command::Geometry { .. }) {
        let (summary, path) = run_geometry(config)?;
        report.geometry = Some(summary);
        report.images.push(path.display().to_string());
    }
    if all || matches!(command, Command::Spectral) {
        let (summary, path) = run_spectral(config)?;
        report.spectral = Some(summary);
        report.images.push(path.display().to_string());
    }
    if all || matches!(command, Command::Groundwater) {
        let (summary, path) = run_groundwater(config)?;
        report.groundwater = Some(summary);
        report.images.push(path.display().to_string());
    }
    if all || matches!(command, Command::MassBalance) {
        let (summary, path) = run_mass_balance(config)?;
        report.mass_balance = Some(summary);
        report.images.push(path.display().to_string());
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Demos
// ---------------------------------------------------------------------------

pub fn run_geometry(config: &DemoConfig) -> Result<(GeometrySummary, PathBuf)> {
    let params = &config.geometry;
    let truth = synthetic::true_basin(params);
    let survey = match &params.survey_file {
        Some(path) => loader::load_survey(path)?,
        None => synthetic::random_survey(params),
    };
    log::info!("geometry: {} survey points", survey.len());

    let analysis = geometry::analyse(params, truth, survey).context("basin analysis")?;

    let path = config.output.dir.join(GEOMETRY_PNG);
    render::geometry::render(&path, &analysis, params.obstruction)?;
    if config.output.export_csv {
        export::write_survey(&beside(&path, "survey_points.csv"), &analysis.survey)?;
    }
    println!("Geometry analysis complete. Saved to {}", path.display());
    Ok((analysis.summary, path))
}

#[derive(Debug, Serialize)]
struct SignatureRow<'a> {
    label: &'a str,
    kind: SignatureKind,
    band: &'a str,
    wavelength_nm: f64,
    reflectance: f64,
}

fn signature_rows<'a>(
    bands: &'a [Band],
    library: &'a [Signature],
) -> impl Iterator<Item = SignatureRow<'a>> + 'a {
    library.iter().flat_map(move |sig| {
        bands
            .iter()
            .zip(sig.reflectance.iter())
            .map(move |(band, &reflectance)| SignatureRow {
                label: sig.label,
                kind: sig.kind,
                band: band.name,
                wavelength_nm: band.wavelength_nm,
                reflectance,
            })
    })
}

pub fn run_spectral(config: &DemoConfig) -> Result<(SpectralSummary, PathBuf)> {
    let bands = synthetic::sensor_bands();
    let library = synthetic::signature_library();
    let summary = spectral::analyse(&bands, &library).context("spectral analysis")?;

    let path = config.output.dir.join(SPECTRAL_PNG);
    render::spectral::render(&path, &bands, &library)?;
    if config.output.export_csv {
        export::write_rows(
            &beside(&path, "spectral_signatures.csv"),
            signature_rows(&bands, &library),
        )?;
    }
    println!("Spectral plot saved to {}", path.display());
    Ok((summary, path))
}

pub fn run_groundwater(config: &DemoConfig) -> Result<(GroundwaterSummary, PathBuf)> {
    let params = &config.groundwater;
    let analysis = groundwater::analyse(params);

    let path = config.output.dir.join(GROUNDWATER_PNG);
    render::groundwater::render(&path, &analysis, params)?;
    if config.output.export_csv {
        export::write_grid(&beside(&path, "groundwater_field.csv"), &analysis.field)?;
    }
    println!("Spatial model complete. Heatmap saved to {}", path.display());
    Ok((analysis.summary, path))
}

pub fn run_mass_balance(config: &DemoConfig) -> Result<(MassBalanceSummary, PathBuf)> {
    let run = mass_balance::simulate(&config.mass_balance);

    let path = config.output.dir.join(MASS_BALANCE_PNG);
    render::mass_balance::render(&path, &run)?;
    if config.output.export_csv {
        export::write_rows(&beside(&path, "mass_balance.csv"), run.steps.iter())?;
    }
    println!("Simulation complete. Chart saved to {}", path.display());
    Ok((run.summary, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_files_land_next_to_the_image() {
        assert_eq!(
            beside(Path::new("out/Problem_2_Spectral/spectral_signature.png"), "a.csv"),
            PathBuf::from("out/Problem_2_Spectral/a.csv")
        );
        assert_eq!(
            beside(Path::new("groundwater_model.png"), "a.csv"),
            PathBuf::from("a.csv")
        );
    }

    #[test]
    fn one_signature_row_per_band() {
        let bands = synthetic::sensor_bands();
        let library = synthetic::signature_library();
        let rows: Vec<_> = signature_rows(&bands, &library).collect();
        assert_eq!(rows.len(), bands.len() * library.len());
        let nir_algae = rows
            .iter()
            .find(|r| r.kind == SignatureKind::Biological && r.band == "NIR")
            .unwrap();
        assert_eq!(nir_algae.reflectance, 0.40);
    }

    #[test]
    fn mass_balance_writes_image_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DemoConfig::default();
        config.output.dir = dir.path().to_path_buf();
        config.output.export_csv = true;

        let (summary, path) = run_mass_balance(&config).unwrap();
        assert_eq!(summary.first_outflow_hour, Some(12));
        assert!(path.exists());

        let mut reader = csv::Reader::from_path(dir.path().join("mass_balance.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "hour");
        assert_eq!(&headers[6], "cumulative_outflow");
        assert_eq!(reader.records().count(), 24);
    }
}
