//! Per-channel processing stages
//!
//! - [`KWeightingStage`]: high shelf → high pass cascade, yields weighted energy
//! - [`TruePeakStage`]: polyphase oversampler, yields the inter-sample peak
//! - [`PeakTracker`]: running true-peak maximum with lazy dB conversion

use crate::coefficients::KWeightingCoefficients;
use crate::filter::{BiquadFilter, PolyphaseFirFilter};

/// K-weighting cascade for one channel
#[derive(Debug, Clone)]
pub struct KWeightingStage {
    high_shelf: BiquadFilter,
    high_pass: BiquadFilter,
}

impl KWeightingStage {
    pub fn new(coefficients: &KWeightingCoefficients) -> Self {
        Self {
            high_shelf: BiquadFilter::new(coefficients.high_shelf),
            high_pass: BiquadFilter::new(coefficients.high_pass),
        }
    }

    /// K-weighted sample
    #[inline]
    pub fn process(&mut self, sample: f64) -> f64 {
        self.high_pass.process(self.high_shelf.process(sample))
    }

    /// Squared K-weighted sample (instantaneous channel energy)
    #[inline]
    pub fn energy(&mut self, sample: f64) -> f64 {
        let weighted = self.process(sample);
        weighted * weighted
    }

    pub fn set_coefficients(&mut self, coefficients: &KWeightingCoefficients) {
        self.high_shelf.set_coefficients(coefficients.high_shelf);
        self.high_pass.set_coefficients(coefficients.high_pass);
    }

    pub fn reset(&mut self) {
        self.high_shelf.reset();
        self.high_pass.reset();
    }
}

/// Oversampling peak estimator for one channel
///
/// Input is scaled down by `attenuation_db` before entering the phase bank;
/// [`PeakTracker`] adds it back when converting to dBTP.
#[derive(Debug, Clone)]
pub struct TruePeakStage {
    phases: Vec<PolyphaseFirFilter>,
    attenuation: f64,
}

impl TruePeakStage {
    pub fn new(phases: &[&[f64]], attenuation_db: f64) -> Self {
        Self {
            phases: phases.iter().map(|taps| PolyphaseFirFilter::new(taps)).collect(),
            attenuation: 10.0_f64.powf(-attenuation_db / 20.0),
        }
    }

    /// Largest absolute oversampled value produced for this input sample
    ///
    /// The result is in the attenuated domain.
    #[inline]
    pub fn process(&mut self, sample: f64) -> f64 {
        let attenuated = sample * self.attenuation;
        self.phases
            .iter_mut()
            .map(|phase| phase.process(attenuated).abs())
            .fold(0.0, f64::max)
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn reset(&mut self) {
        for phase in &mut self.phases {
            phase.reset();
        }
    }
}

/// Running maximum of attenuated oversampled values
///
/// The engine asks for the level once at the end of every block rather than
/// at hop or snapshot time, so `metrics()` is current after each `process`
/// call. The logarithm is only evaluated when the maximum actually moved.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    max_value: Option<f64>,
    dirty: bool,
    attenuation_db: f64,
}

impl PeakTracker {
    pub fn new(attenuation_db: f64) -> Self {
        Self {
            max_value: None,
            dirty: false,
            attenuation_db,
        }
    }

    /// Feed one stage output
    #[inline]
    pub fn observe(&mut self, value: f64) {
        match self.max_value {
            Some(max) if value <= max => {}
            _ => {
                self.max_value = Some(value);
                self.dirty = true;
            }
        }
    }

    /// New level in dBTP if the maximum changed since the last call
    pub fn take_level(&mut self) -> Option<f64> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.max_value
            .map(|value| 20.0 * value.log10() + self.attenuation_db)
    }

    pub fn reset(&mut self) {
        self.max_value = None;
        self.dirty = false;
    }
}
