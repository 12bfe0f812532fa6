//! Gated loudness aggregation
//!
//! Pure functions over a loudness history: integrated loudness (ITU-R BS.1770
//! two-stage gating) and loudness range (EBU Tech 3342). Nothing here owns
//! state; the engine decides when a history changed enough to re-run them.
//!
//! Both algorithms follow the same shape:
//!
//! ```text
//! history ──► absolute gate ──► mean energy ──► + relative offset
//!                  │                                   │
//!                  └──────────► relative gate ◄────────┘
//!                                    │
//!                     mean energy (I) / percentiles (LRA)
//! ```
//!
//! A gate that leaves two values or fewer yields `None`; callers keep the
//! previous result in that case.

use crate::constants::{
    ENERGY_FLOOR, LOUDNESS_OFFSET, LOUDNESS_RANGE_LOWER_PERCENTILE,
    LOUDNESS_RANGE_UPPER_PERCENTILE, LRA_ABSOLUTE_THRESHOLD, LRA_RELATIVE_THRESHOLD_FACTOR,
    LUFS_ABSOLUTE_THRESHOLD, LUFS_RELATIVE_THRESHOLD_FACTOR,
};
use serde::{Deserialize, Serialize};

/// Minimum number of gated values required before a result is produced
const MIN_GATED_VALUES: usize = 3;

/// Convert mean-square energy to loudness (LUFS)
///
/// Energy is floored at [`ENERGY_FLOOR`], so zero, negative and NaN inputs
/// all map to a finite (very low) loudness.
#[inline]
pub fn energy_to_loudness(energy: f64) -> f64 {
    LOUDNESS_OFFSET + 10.0 * energy.max(ENERGY_FLOOR).log10()
}

/// Loudness of a sliding window, or negative infinity when it holds no energy
///
/// Digital silence (mean energy at or below the floor) is reported as
/// "not measurable" rather than as the floor's loudness.
#[inline]
pub fn window_loudness(mean_energy: f64) -> f64 {
    if mean_energy > ENERGY_FLOOR {
        energy_to_loudness(mean_energy)
    } else {
        f64::NEG_INFINITY
    }
}

/// Convert loudness (LUFS) back to mean-square energy
#[inline]
pub fn loudness_to_energy(loudness: f64) -> f64 {
    10.0_f64.powf((loudness - LOUDNESS_OFFSET) / 10.0)
}

/// Absolute threshold and relative offset for one gating pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Values at or below this loudness (LUFS) are discarded
    pub absolute: f64,
    /// Added to the absolute-gated loudness to form the relative gate (LU)
    pub relative_offset: f64,
}

/// Gating constants for both aggregations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatingConstants {
    /// Gate applied to the momentary history for integrated loudness
    pub integrated: GateThresholds,
    /// Gate applied to the short-term history for loudness range
    pub range: GateThresholds,
    /// Lower percentile for loudness range (0.0-1.0)
    pub lower_percentile: f64,
    /// Upper percentile for loudness range (0.0-1.0)
    pub upper_percentile: f64,
}

impl Default for GatingConstants {
    fn default() -> Self {
        Self {
            integrated: GateThresholds {
                absolute: LUFS_ABSOLUTE_THRESHOLD,
                relative_offset: LUFS_RELATIVE_THRESHOLD_FACTOR,
            },
            range: GateThresholds {
                absolute: LRA_ABSOLUTE_THRESHOLD,
                relative_offset: LRA_RELATIVE_THRESHOLD_FACTOR,
            },
            lower_percentile: LOUDNESS_RANGE_LOWER_PERCENTILE,
            upper_percentile: LOUDNESS_RANGE_UPPER_PERCENTILE,
        }
    }
}

/// Count and energy sum of the values accepted by `keep`
fn accumulate<I, F>(values: I, keep: F) -> (usize, f64)
where
    I: Iterator<Item = f64>,
    F: Fn(f64) -> bool,
{
    values
        .filter(|&loudness| keep(loudness))
        .fold((0, 0.0), |(count, sum), loudness| {
            (count + 1, sum + loudness_to_energy(loudness))
        })
}

/// Relative gate for `values`, or `None` if the absolute gate leaves too few
fn relative_threshold<I>(values: I, gate: GateThresholds) -> Option<f64>
where
    I: Iterator<Item = f64>,
{
    let (count, sum) = accumulate(values, |loudness| loudness > gate.absolute);
    if count < MIN_GATED_VALUES {
        return None;
    }
    Some(energy_to_loudness(sum / count as f64) + gate.relative_offset)
}

/// Integrated loudness of a block-loudness history
///
/// Walks the history twice and allocates nothing.
pub fn integrated_loudness<I>(history: I, gate: GateThresholds) -> Option<f64>
where
    I: Iterator<Item = f64> + Clone,
{
    let relative = relative_threshold(history.clone(), gate)?;

    let (count, sum) = accumulate(history, |loudness| {
        loudness > gate.absolute && loudness > relative
    });
    if count < MIN_GATED_VALUES {
        return None;
    }

    Some(energy_to_loudness(sum / count as f64))
}

/// Loudness range of a short-term loudness history
///
/// `scratch` receives the gated values and is sorted in place; passing the
/// same vector on every call keeps steady-state aggregation allocation-free.
pub fn loudness_range<I>(
    history: I,
    gate: GateThresholds,
    lower_percentile: f64,
    upper_percentile: f64,
    scratch: &mut Vec<f64>,
) -> Option<f64>
where
    I: Iterator<Item = f64> + Clone,
{
    let relative = relative_threshold(history.clone(), gate)?;

    scratch.clear();
    scratch.extend(history.filter(|&loudness| loudness > gate.absolute && loudness > relative));
    if scratch.len() < MIN_GATED_VALUES {
        return None;
    }

    scratch.sort_by(f64::total_cmp);
    let lower = percentile(scratch, lower_percentile);
    let upper = percentile(scratch, upper_percentile);

    Some(upper - lower)
}

/// Linearly interpolated percentile of ascending `sorted` values
///
/// `p` is clamped to `[0, 1]`. For index `p·(n-1)` with integral value the
/// element is returned directly; otherwise the floor and ceiling elements are
/// blended by the fractional part. An empty slice yields negative infinity.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NEG_INFINITY;
    }

    let index = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        return sorted[lower];
    }

    sorted[lower] + (sorted[upper] - sorted[lower]) * (index - lower as f64)
}
