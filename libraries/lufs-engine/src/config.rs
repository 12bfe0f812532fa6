//! Engine construction parameters

use crate::constants::{
    DEFAULT_SNAPSHOT_INTERVAL_SEC, MAX_HISTORY_ENTRIES, MOMENTARY_HOP_INTERVAL_SEC,
    SHORT_TERM_HOP_INTERVAL_SEC,
};
use crate::error::{LoudnessError, Result};
use crate::gating::GatingConstants;
use serde::{Deserialize, Serialize};

/// Configuration for a [`LoudnessEngine`](crate::LoudnessEngine)
///
/// # Example
///
/// ```ignore
/// use lufs_engine::EngineConfig;
///
/// let config = EngineConfig::new(48000.0)
///     .with_inputs(2)
///     .with_capacity(180.0)
///     .with_interval(0.05);
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host sample rate in Hz
    pub sample_rate: f64,

    /// Number of logical inputs measured independently
    pub number_of_inputs: usize,

    /// Planned total duration in seconds
    /// Bounds the loudness histories when set; histories grow without limit otherwise.
    /// At most `MAX_HISTORY_ENTRIES` hops of the finer history.
    pub capacity_sec: Option<f64>,

    /// Minimum time between two snapshots in seconds
    pub interval_sec: f64,

    /// Channel count per input, known ahead of the first block
    /// Lets the engine allocate everything at construction
    pub channel_counts: Option<Vec<usize>>,

    /// Spacing of momentary history entries in seconds
    pub momentary_hop_sec: f64,

    /// Spacing of short-term history entries in seconds
    pub short_term_hop_sec: f64,

    /// Gating thresholds and percentiles
    pub gating: GatingConstants,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            number_of_inputs: 1,
            capacity_sec: None,
            interval_sec: DEFAULT_SNAPSHOT_INTERVAL_SEC,
            channel_counts: None,
            momentary_hop_sec: MOMENTARY_HOP_INTERVAL_SEC,
            short_term_hop_sec: SHORT_TERM_HOP_INTERVAL_SEC,
            gating: GatingConstants::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration at `sample_rate`
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn with_inputs(mut self, number_of_inputs: usize) -> Self {
        self.number_of_inputs = number_of_inputs;
        self
    }

    pub fn with_capacity(mut self, capacity_sec: f64) -> Self {
        self.capacity_sec = Some(capacity_sec);
        self
    }

    pub fn with_interval(mut self, interval_sec: f64) -> Self {
        self.interval_sec = interval_sec;
        self
    }

    pub fn with_channel_counts(mut self, channel_counts: Vec<usize>) -> Self {
        self.channel_counts = Some(channel_counts);
        self
    }

    pub fn with_momentary_hop(mut self, hop_sec: f64) -> Self {
        self.momentary_hop_sec = hop_sec;
        self
    }

    pub fn with_short_term_hop(mut self, hop_sec: f64) -> Self {
        self.short_term_hop_sec = hop_sec;
        self
    }

    pub fn with_gating(mut self, gating: GatingConstants) -> Self {
        self.gating = gating;
        self
    }

    /// Samples between two entries of a history spaced `hop_sec` apart
    pub(crate) fn hop_samples(&self, hop_sec: f64) -> usize {
        (self.sample_rate * hop_sec).round() as usize
    }

    /// Check every parameter, returning the first violation
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(LoudnessError::InvalidSampleRate(self.sample_rate));
        }
        if self.number_of_inputs == 0 {
            return Err(LoudnessError::InvalidInputCount(self.number_of_inputs));
        }
        if !self.interval_sec.is_finite() || self.interval_sec < 0.0 {
            return Err(LoudnessError::InvalidInterval(self.interval_sec));
        }
        if let Some(capacity) = self.capacity_sec {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err(LoudnessError::InvalidCapacity(capacity));
            }
        }
        for hop in [self.momentary_hop_sec, self.short_term_hop_sec] {
            if !hop.is_finite() || hop <= 0.0 || self.hop_samples(hop) == 0 {
                return Err(LoudnessError::InvalidHopInterval(hop));
            }
        }
        if let Some(capacity) = self.capacity_sec {
            let hop = self.momentary_hop_sec.min(self.short_term_hop_sec);
            if (capacity / hop).ceil() > MAX_HISTORY_ENTRIES as f64 {
                return Err(LoudnessError::InvalidCapacity(capacity));
            }
        }
        if let Some(counts) = &self.channel_counts {
            if counts.len() != self.number_of_inputs {
                return Err(LoudnessError::ChannelCountMismatch {
                    expected: self.number_of_inputs,
                    actual: counts.len(),
                });
            }
            if let Some(&zero) = counts.iter().find(|&&count| count == 0) {
                return Err(LoudnessError::InvalidChannelCount(zero));
            }
        }
        Ok(())
    }
}
