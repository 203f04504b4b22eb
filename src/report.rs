use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::geometry::GeometrySummary;
use crate::analysis::groundwater::GroundwaterSummary;
use crate::analysis::mass_balance::MassBalanceSummary;
use crate::analysis::spectral::SpectralSummary;

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Summary numbers of every demo run in one invocation.  Demos that did not
/// run are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometrySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral: Option<SpectralSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groundwater: Option<GroundwaterSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_balance: Option<MassBalanceSummary>,
    /// Paths of the images written, as printed on success.
    pub images: Vec<String>,
}

impl RunReport {
    /// Pretty-printed JSON at `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialising run report")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("run report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mass_balance::simulate;
    use crate::config::MassBalanceParams;

    #[test]
    fn empty_report_only_lists_images() {
        let report = RunReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({ "images": [] }));
    }

    #[test]
    fn written_report_round_trips_as_json() {
        let run = simulate(&MassBalanceParams::default());
        let report = RunReport {
            mass_balance: Some(run.summary.clone()),
            images: vec!["mass_balance_simulation.png".into()],
            ..RunReport::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        report.write(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["mass_balance"]["first_outflow_hour"], 12);
        assert_eq!(value["images"][0], "mass_balance_simulation.png");
        assert!(value.get("geometry").is_none());
    }
}
