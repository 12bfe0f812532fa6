//! Delivery loudness standards and compliance checks

use crate::metrics::Metrics;
use serde::Serialize;

/// Delivery context a standard belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StandardCategory {
    Broadcast,
    Music,
}

impl StandardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broadcast => "Broadcast",
            Self::Music => "Music",
        }
    }
}

/// Integrated loudness target and true-peak ceiling of a delivery spec
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoudnessStandard {
    pub name: &'static str,
    pub category: StandardCategory,
    /// Target integrated loudness (LUFS)
    pub integrated_target: f64,
    /// Maximum allowed true peak (dBTP)
    pub true_peak_ceiling: f64,
}

/// Built-in standards, broadcast first
pub const STANDARDS: [LoudnessStandard; 5] = [
    LoudnessStandard {
        name: "EBU R128",
        category: StandardCategory::Broadcast,
        integrated_target: -23.0,
        true_peak_ceiling: -1.0,
    },
    LoudnessStandard {
        name: "ATSC A/85",
        category: StandardCategory::Broadcast,
        integrated_target: -24.0,
        true_peak_ceiling: -1.0,
    },
    LoudnessStandard {
        name: "Netflix",
        category: StandardCategory::Broadcast,
        integrated_target: -27.0,
        true_peak_ceiling: -2.0,
    },
    LoudnessStandard {
        name: "Spotify",
        category: StandardCategory::Music,
        integrated_target: -14.0,
        true_peak_ceiling: -1.0,
    },
    LoudnessStandard {
        name: "Apple Music",
        category: StandardCategory::Music,
        integrated_target: -16.0,
        true_peak_ceiling: -1.0,
    },
];

/// Result of checking measurements against a standard
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Compliance {
    /// Integrated loudness minus target (LU), `None` until measurable
    pub integrated_deviation: Option<f64>,
    /// Ceiling minus true peak (dB, positive means headroom), `None` until measurable
    pub true_peak_margin: Option<f64>,
    pub integrated_ok: bool,
    pub true_peak_ok: bool,
}

impl Compliance {
    pub fn is_compliant(&self) -> bool {
        self.integrated_ok && self.true_peak_ok
    }
}

impl LoudnessStandard {
    /// Look up a built-in standard by name, ignoring case
    pub fn from_name(name: &str) -> Option<&'static Self> {
        STANDARDS
            .iter()
            .find(|standard| standard.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Built-in standards of one category
    pub fn in_category(category: StandardCategory) -> impl Iterator<Item = &'static Self> {
        STANDARDS
            .iter()
            .filter(move |standard| standard.category == category)
    }

    /// Check `metrics` against this standard
    ///
    /// Integrated loudness passes within `tolerance_lu` of the target. True
    /// peak passes at or below the ceiling; a signal with no measurable peak
    /// passes, one with no integrated loudness does not.
    pub fn assess(&self, metrics: &Metrics, tolerance_lu: f64) -> Compliance {
        let integrated_deviation = metrics
            .integrated_loudness
            .is_finite()
            .then(|| metrics.integrated_loudness - self.integrated_target);
        let true_peak_margin = metrics
            .maximum_true_peak_level
            .is_finite()
            .then(|| self.true_peak_ceiling - metrics.maximum_true_peak_level);

        Compliance {
            integrated_deviation,
            true_peak_margin,
            integrated_ok: integrated_deviation.is_some_and(|d| d.abs() <= tolerance_lu.abs()),
            true_peak_ok: true_peak_margin.map_or(true, |m| m >= 0.0),
        }
    }

    /// Gain (dB) that moves integrated loudness onto the target
    ///
    /// Capped so the resulting true peak stays at or under the ceiling.
    /// `None` until integrated loudness is measurable.
    pub fn gain_to_target(&self, metrics: &Metrics) -> Option<f64> {
        if !metrics.integrated_loudness.is_finite() {
            return None;
        }

        let gain = self.integrated_target - metrics.integrated_loudness;
        if metrics.maximum_true_peak_level.is_finite() {
            Some(gain.min(self.true_peak_ceiling - metrics.maximum_true_peak_level))
        } else {
            Some(gain)
        }
    }
}
