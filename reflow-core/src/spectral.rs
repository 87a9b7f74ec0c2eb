//! Spectral Analysis
//!
//! ## Overview
//!
//! A penetrant sample is characterised by its UV-Vis intensity profile on a
//! fixed 100-point grid over 200–800 nm. The analyzer compares the profile to
//! three reference spectra and derives a composition estimate and a set of
//! signal-quality indicators. Turning an image into a spectrum happens on the
//! collaborator side; the analyzer accepts the sampled intensities.
//!
//! ## Composition
//!
//! ```text
//! Σ    = total intensity        peak = max intensity
//! w    = points above peak / 2
//!
//! purity        = min(100, 120·Σ)
//! contamination = max(0, (1 − peak)·100)
//! degradation   = max(0, w − 30) / 70 · 100
//! ```
//!
//! ## Indicators
//!
//! ```text
//! signal_to_noise    = peak / std          (0 for a flat profile)
//! spectral_purity    = peak / mean
//! baseline_stability = 1 − std(first 10) / mean
//! overall_quality    = min(100, 150·peak)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::spectral::{
    BASELINE_WINDOW, CLEAN_PEAKS, CONTAMINATED_PEAKS, DEGRADATION_BASE_WIDTH,
    DEGRADATION_WIDTH_SPAN, DEGRADED_PEAKS, EXCELLENT_PEAK_INTENSITY, EXCELLENT_TOTAL_INTENSITY,
    FILTRATION_TOTAL_INTENSITY, GOOD_PEAK_INTENSITY, GOOD_TOTAL_INTENSITY, PEAK_WIDTH_NM,
    PURITY_SCALE, QUALITY_SCORE_SCALE, SPECTRUM_POINTS, WAVELENGTH_END_NM, WAVELENGTH_START_NM,
};
use crate::errors::{DecisionError, DecisionResult};

/// Action suggested by the composition estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpectralAction {
    /// Liquid is as good as new
    ExcellentQuality,
    /// Liquid is fit for use
    GoodQuality,
    /// Filtration can still recover the liquid
    NeedsFiltration,
    /// Liquid should be discarded
    ReplaceLiquid,
}

impl SpectralAction {
    fn from_intensities(total: f64, peak: f64) -> Self {
        if total > EXCELLENT_TOTAL_INTENSITY && peak > EXCELLENT_PEAK_INTENSITY {
            SpectralAction::ExcellentQuality
        } else if total > GOOD_TOTAL_INTENSITY && peak > GOOD_PEAK_INTENSITY {
            SpectralAction::GoodQuality
        } else if total > FILTRATION_TOTAL_INTENSITY {
            SpectralAction::NeedsFiltration
        } else {
            SpectralAction::ReplaceLiquid
        }
    }
}

/// Composition estimate, all percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralComposition {
    /// Penetrant purity (0–100)
    pub purity: f64,
    /// Contamination level (0–100)
    pub contamination_level: f64,
    /// Degradation index (0–100)
    pub degradation_index: f64,
    /// Suggested action
    pub recommended_action: SpectralAction,
}

/// Signal-quality indicators of one spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIndicators {
    /// Peak over standard deviation
    pub signal_to_noise_ratio: f64,
    /// Peak over mean
    pub spectral_purity: f64,
    /// One minus baseline spread over mean
    pub baseline_stability: f64,
    /// Peak-derived score (0–100)
    pub overall_quality_score: f64,
}

/// Full analyzer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralAssessment {
    /// Cosine similarity to each reference, by reference name
    pub similarity_scores: BTreeMap<String, f64>,
    /// Composition estimate
    pub composition: SpectralComposition,
    /// Signal-quality indicators
    pub indicators: QualityIndicators,
}

/// Named reference profile sampled on the analyzer grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpectrum {
    /// Reference name
    pub name: String,
    /// Intensities on the analyzer grid
    pub intensities: Vec<f64>,
}

/// Compares sampled spectra to the reference library
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralAnalyzer {
    wavelengths: Vec<f64>,
    references: Vec<ReferenceSpectrum>,
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralAnalyzer {
    /// Analyzer on the standard grid with the built-in references
    pub fn new() -> Self {
        let step = (WAVELENGTH_END_NM - WAVELENGTH_START_NM) / (SPECTRUM_POINTS - 1) as f64;
        let wavelengths: Vec<f64> = (0..SPECTRUM_POINTS)
            .map(|i| WAVELENGTH_START_NM + step * i as f64)
            .collect();

        let references = [
            ("clean_penetrant", &CLEAN_PEAKS),
            ("contaminated", &CONTAMINATED_PEAKS),
            ("degraded", &DEGRADED_PEAKS),
        ]
        .into_iter()
        .map(|(name, peaks)| ReferenceSpectrum {
            name: name.to_string(),
            intensities: gaussian_profile(&wavelengths, peaks),
        })
        .collect();

        Self { wavelengths, references }
    }

    /// Grid wavelengths (nm)
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Reference library
    pub fn references(&self) -> &[ReferenceSpectrum] {
        &self.references
    }

    /// Intensities of a named reference
    pub fn reference(&self, name: &str) -> Option<&[f64]> {
        self.references
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.intensities.as_slice())
    }

    /// Analyze a spectrum sampled on [`Self::wavelengths`]
    pub fn analyze(&self, spectrum: &[f64]) -> DecisionResult<SpectralAssessment> {
        self.check(spectrum)?;

        let similarity_scores = self
            .references
            .iter()
            .map(|r| (r.name.clone(), cosine_similarity(spectrum, &r.intensities)))
            .collect();

        Ok(SpectralAssessment {
            similarity_scores,
            composition: composition(spectrum),
            indicators: indicators(spectrum),
        })
    }

    fn check(&self, spectrum: &[f64]) -> DecisionResult<()> {
        if spectrum.is_empty() {
            return Err(DecisionError::validation("spectrum is empty"));
        }
        if spectrum.len() != self.wavelengths.len() {
            return Err(DecisionError::validation(format!(
                "spectrum has {} points, grid has {}",
                spectrum.len(),
                self.wavelengths.len()
            )));
        }
        if let Some(i) = spectrum.iter().position(|v| !v.is_finite()) {
            return Err(DecisionError::validation(format!("spectrum point {i} is not finite")));
        }
        if mean(spectrum) <= 0.0 {
            return Err(DecisionError::validation("spectrum carries no intensity"));
        }
        Ok(())
    }
}

fn gaussian_profile(wavelengths: &[f64], peaks: &[(f64, f64)]) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|w| {
            peaks
                .iter()
                .map(|(intensity, centre)| intensity * (-((w - centre) / PEAK_WIDTH_NM).powi(2)).exp())
                .sum::<f64>()
        })
        .collect()
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn composition(spectrum: &[f64]) -> SpectralComposition {
    let total: f64 = spectrum.iter().sum();
    let peak = max(spectrum);
    let half_width = spectrum.iter().filter(|v| **v > peak * 0.5).count() as f64;

    SpectralComposition {
        purity: (total * PURITY_SCALE).min(100.0),
        contamination_level: ((1.0 - peak) * 100.0).max(0.0),
        degradation_index: (half_width - DEGRADATION_BASE_WIDTH).max(0.0) / DEGRADATION_WIDTH_SPAN * 100.0,
        recommended_action: SpectralAction::from_intensities(total, peak),
    }
}

fn indicators(spectrum: &[f64]) -> QualityIndicators {
    let peak = max(spectrum);
    let mean = mean(spectrum);
    let std = std_dev(spectrum);
    let baseline = &spectrum[..BASELINE_WINDOW.min(spectrum.len())];

    QualityIndicators {
        signal_to_noise_ratio: if std > 0.0 { peak / std } else { 0.0 },
        spectral_purity: peak / mean,
        baseline_stability: 1.0 - std_dev(baseline) / mean,
        overall_quality_score: (peak * QUALITY_SCORE_SCALE).min(100.0),
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
