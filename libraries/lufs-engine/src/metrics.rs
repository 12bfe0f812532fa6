//! Measurement values reported per logical input

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current loudness measurements of one logical input
///
/// Every field starts at negative infinity, meaning "not measurable yet".
/// The `maximum_*` fields never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Loudness of the last 400 ms (LUFS)
    pub momentary_loudness: f64,

    /// Loudness of the last 3 s (LUFS)
    pub short_term_loudness: f64,

    /// Gated loudness since the start of measurement (LUFS)
    pub integrated_loudness: f64,

    /// Highest momentary loudness seen (LUFS)
    pub maximum_momentary_loudness: f64,

    /// Highest short-term loudness seen (LUFS)
    pub maximum_short_term_loudness: f64,

    /// Highest inter-sample peak seen (dBTP)
    pub maximum_true_peak_level: f64,

    /// Spread of gated short-term loudness (LU)
    pub loudness_range: f64,
}

impl Metrics {
    /// Whether integrated loudness has been established
    pub fn has_integrated(&self) -> bool {
        self.integrated_loudness.is_finite()
    }

    pub(crate) fn update_momentary(&mut self, loudness: f64) {
        self.momentary_loudness = loudness;
        self.maximum_momentary_loudness = self.maximum_momentary_loudness.max(loudness);
    }

    pub(crate) fn update_short_term(&mut self, loudness: f64) {
        self.short_term_loudness = loudness;
        self.maximum_short_term_loudness = self.maximum_short_term_loudness.max(loudness);
    }

    pub(crate) fn update_true_peak(&mut self, level: f64) {
        self.maximum_true_peak_level = self.maximum_true_peak_level.max(level);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            momentary_loudness: f64::NEG_INFINITY,
            short_term_loudness: f64::NEG_INFINITY,
            integrated_loudness: f64::NEG_INFINITY,
            maximum_momentary_loudness: f64::NEG_INFINITY,
            maximum_short_term_loudness: f64::NEG_INFINITY,
            maximum_true_peak_level: f64::NEG_INFINITY,
            loudness_range: f64::NEG_INFINITY,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M: {:.1} LUFS, S: {:.1} LUFS, I: {:.1} LUFS, LRA: {:.1} LU, TP: {:.1} dBTP",
            self.momentary_loudness,
            self.short_term_loudness,
            self.integrated_loudness,
            self.loudness_range,
            self.maximum_true_peak_level
        )
    }
}

/// Point-in-time report covering every logical input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Host frame counter at the block that triggered the report
    pub frame_index: u64,
    /// Host clock in seconds at the same block
    pub elapsed_time: f64,
    /// One entry per configured input, in input order
    pub metrics: Vec<Metrics>,
}
