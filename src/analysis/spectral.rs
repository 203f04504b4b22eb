//! Why a water-quality satellite confuses algae with haze and glint, and
//! which band settles it.

use serde::Serialize;

use crate::data::model::{Band, Signature, SignatureKind};
use crate::error::{DemoError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexValue {
    pub label: String,
    pub kind: SignatureKind,
    pub index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSeparation {
    pub band: String,
    pub wavelength_nm: f64,
    /// Smallest gap between the biological signature and any non-biological
    /// one, after dividing each signature by its mean brightness.
    pub min_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralSummary {
    pub normalized_difference: Vec<IndexValue>,
    pub separation: Vec<BandSeparation>,
    pub discriminating_band: Option<String>,
}

/// `(NIR - Red) / (NIR + Red)`; zero when both bands are dark.
pub fn normalized_difference(nir: f64, red: f64) -> f64 {
    let sum = nir + red;
    if sum == 0.0 {
        0.0
    } else {
        (nir - red) / sum
    }
}

fn band_index(bands: &[Band], name: &str) -> Option<usize> {
    bands.iter().position(|b| b.name == name)
}

fn check_lengths(bands: &[Band], library: &[Signature]) -> Result<()> {
    match library.iter().find(|s| s.reflectance.len() != bands.len()) {
        Some(bad) => Err(DemoError::LengthMismatch {
            name: bad.label.to_string(),
            got: bad.reflectance.len(),
            expected: bands.len(),
        }),
        None => Ok(()),
    }
}

/// Reflectance divided by its mean, so haze and glint cannot win on
/// brightness alone.  An all-dark signature stays all zero.
pub fn shape(reflectance: &[f64]) -> Vec<f64> {
    let mean = reflectance.iter().sum::<f64>() / reflectance.len().max(1) as f64;
    if mean == 0.0 {
        vec![0.0; reflectance.len()]
    } else {
        reflectance.iter().map(|r| r / mean).collect()
    }
}

/// Per-band smallest |biological - non-biological| gap in spectral shape.
pub fn band_separation(bands: &[Band], library: &[Signature]) -> Result<Vec<BandSeparation>> {
    check_lengths(bands, library)?;
    let shapes_of = |kind: SignatureKind| -> Vec<Vec<f64>> {
        library
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| shape(&s.reflectance))
            .collect()
    };
    let bio = shapes_of(SignatureKind::Biological);
    let non_bio = shapes_of(SignatureKind::NonBiological);

    Ok(bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let min_gap = bio
                .iter()
                .flat_map(|b| non_bio.iter().map(move |n| (b[i] - n[i]).abs()))
                .fold(f64::INFINITY, f64::min);
            BandSeparation {
                band: band.name.to_string(),
                wavelength_nm: band.wavelength_nm,
                min_gap,
            }
        })
        .collect())
}

pub fn analyse(bands: &[Band], library: &[Signature]) -> Result<SpectralSummary> {
    check_lengths(bands, library)?;
    let normalized_difference = match (band_index(bands, "NIR"), band_index(bands, "Red")) {
        (Some(nir), Some(red)) => library
            .iter()
            .map(|s| IndexValue {
                label: s.label.to_string(),
                kind: s.kind,
                index: normalized_difference(s.reflectance[nir], s.reflectance[red]),
            })
            .collect(),
        _ => Vec::new(),
    };

    let separation = band_separation(bands, library)?;
    let discriminating_band = separation
        .iter()
        .filter(|s| s.min_gap.is_finite())
        .max_by(|a, b| a.min_gap.total_cmp(&b.min_gap))
        .map(|s| s.band.clone());

    if let Some(band) = &discriminating_band {
        log::info!("spectral: {band} band best separates biological from non-biological signal");
    }
    Ok(SpectralSummary {
        normalized_difference,
        separation,
        discriminating_band,
    })
}
