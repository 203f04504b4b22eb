use std::path::Path;

use basin_demos::cli::{Cli, Command};
use basin_demos::config::DemoConfig;
use basin_demos::render;
use basin_demos::run::{self, GEOMETRY_PNG, GROUNDWATER_PNG, MASS_BALANCE_PNG, SPECTRAL_PNG};
use clap::Parser;

fn dimensions(path: &Path) -> (u32, u32) {
    image::open(path).unwrap().to_rgb8().dimensions()
}

fn config_in(dir: &Path) -> DemoConfig {
    let mut config = DemoConfig::default();
    config.output.dir = dir.to_path_buf();
    config
}

#[test]
fn all_writes_every_chart_at_its_size() {
    let dir = tempfile::tempdir().unwrap();
    let report = run::execute(&Command::All, &config_in(dir.path())).unwrap();

    assert_eq!(dimensions(&dir.path().join(GEOMETRY_PNG)), render::geometry::SIZE);
    assert_eq!(dimensions(&dir.path().join(SPECTRAL_PNG)), render::spectral::SIZE);
    assert_eq!(dimensions(&dir.path().join(GROUNDWATER_PNG)), render::groundwater::SIZE);
    assert_eq!(
        dimensions(&dir.path().join(MASS_BALANCE_PNG)),
        render::mass_balance::SIZE
    );

    assert_eq!(report.images.len(), 4);
    let geometry = report.geometry.unwrap();
    assert!(geometry.survey_points > 0 && geometry.survey_points <= 40);
    assert!(geometry.interpolated_error_pct.abs() < 25.0);
    assert_eq!(
        report.spectral.unwrap().discriminating_band.as_deref(),
        Some("NIR")
    );
    assert!(report.groundwater.unwrap().streamline_count > 0);
    assert_eq!(report.mass_balance.unwrap().first_outflow_hour, Some(12));
}

#[test]
fn single_command_runs_only_its_demo() {
    let dir = tempfile::tempdir().unwrap();
    let report = run::execute(&Command::Spectral, &config_in(dir.path())).unwrap();

    assert!(report.spectral.is_some());
    assert!(report.geometry.is_none());
    assert!(dir.path().join(SPECTRAL_PNG).exists());
    assert!(!dir.path().join(GROUNDWATER_PNG).exists());
}

#[test]
fn csv_export_and_report_from_the_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let report_path = dir.path().join("report.json");
    let cli = Cli::try_parse_from([
        "basin-demos",
        "--out-dir",
        out.to_str().unwrap(),
        "--report",
        report_path.to_str().unwrap(),
        "--export-csv",
        "all",
    ])
    .unwrap();

    let config = cli.resolve_config().unwrap();
    let report = run::execute(&cli.command, &config).unwrap();
    report.write(&report_path).unwrap();

    for csv in [
        "Problem_1_Geometry/survey_points.csv",
        "Problem_2_Spectral/spectral_signatures.csv",
        "groundwater_field.csv",
        "mass_balance.csv",
    ] {
        assert!(out.join(csv).exists(), "missing {csv}");
    }

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    for key in ["geometry", "spectral", "groundwater", "mass_balance"] {
        assert!(json.get(key).is_some(), "report lacks {key}");
    }
}

#[test]
fn geometry_uses_a_survey_file_when_given() {
    let dir = tempfile::tempdir().unwrap();
    let survey = dir.path().join("survey.csv");
    std::fs::write(
        &survey,
        "x,y,z\n0.0,0.0,-10.0\n-0.5,0.0,-7.5\n0.0,-0.5,-7.5\n-0.5,-0.5,-5.0\n0.1,-0.8,-3.5\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "basin-demos",
        "--out-dir",
        dir.path().to_str().unwrap(),
        "geometry",
        "--survey",
        survey.to_str().unwrap(),
    ])
    .unwrap();
    let config = cli.resolve_config().unwrap();
    let report = run::execute(&cli.command, &config).unwrap();

    let geometry = report.geometry.unwrap();
    assert_eq!(geometry.survey_points, 5);
    assert!(dir.path().join(GEOMETRY_PNG).exists());
}

#[test]
fn bad_config_is_rejected_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bad.json");
    std::fs::write(&config_path, r#"{ "mass_balance": { "loss_fraction": 1.5 } }"#).unwrap();

    let cli = Cli::try_parse_from([
        "basin-demos",
        "--config",
        config_path.to_str().unwrap(),
        "mass-balance",
    ])
    .unwrap();
    assert!(cli.resolve_config().is_err());
}
