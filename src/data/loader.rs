use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::SurveyPoint;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load survey soundings from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with `x`, `y` and `z` columns (extra columns ignored)
/// * `.json` – `[{ "x": 0.1, "y": -0.4, "z": -7.2 }, ...]`
pub fn load_survey(path: &Path) -> Result<Vec<SurveyPoint>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let points = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => bail!("Unsupported survey file extension: .{other}"),
    };

    if let Some((i, _)) = points
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        bail!("Survey point {i} has a non-finite coordinate");
    }
    log::info!("loaded {} survey points from {}", points.len(), path.display());
    Ok(points)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<SurveyPoint>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    for required in ["x", "y", "z"] {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    reader
        .deserialize::<SurveyPoint>()
        .enumerate()
        .map(|(row_no, rec)| rec.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Vec<SurveyPoint>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(SurveyPoint {
                x: json_number(obj.get("x"), i, "x")?,
                y: json_number(obj.get("y"), i, "y")?,
                z: json_number(obj.get("z"), i, "z")?,
            })
        })
        .collect()
}

fn json_number(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    val.and_then(|v| v.as_f64())
        .with_context(|| format!("Row {row}: missing or non-numeric '{col}'"))
}
