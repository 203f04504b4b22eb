use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{Grid2, SurveyPoint};

/// Write any serialisable rows as a headed CSV file.
pub fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

pub fn write_survey(path: &Path, points: &[SurveyPoint]) -> Result<()> {
    write_rows(path, points.iter())
}

#[derive(Serialize)]
struct CellRow {
    x: f64,
    y: f64,
    value: f64,
}

/// Long-format dump of a grid: one `x,y,value` row per node.
pub fn write_grid(path: &Path, grid: &Grid2) -> Result<()> {
    let rows = (0..grid.rows()).flat_map(|r| {
        (0..grid.cols()).map(move |c| CellRow {
            x: grid.x.at(c),
            y: grid.y.at(r),
            value: grid.get(r, c),
        })
    });
    write_rows(path, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_survey;
    use crate::data::model::Axis;

    #[test]
    fn survey_export_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        let pts = vec![
            SurveyPoint { x: 0.25, y: -0.5, z: -7.0 },
            SurveyPoint { x: -0.75, y: 0.0, z: -3.5 },
        ];
        write_survey(&path, &pts).unwrap();
        assert_eq!(load_survey(&path).unwrap(), pts);
    }

    #[test]
    fn grid_export_has_one_row_per_node() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        let g = Grid2::from_fn(Axis::new(0.0, 1.0, 3), Axis::new(0.0, 1.0, 2), |x, y| x * y);
        write_grid(&path, &g).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x,y,value");
        assert_eq!(lines.len(), 1 + 6);
    }
}
