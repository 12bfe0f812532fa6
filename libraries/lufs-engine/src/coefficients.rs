//! Coefficient tables for K-weighting, true-peak interpolation and channel weighting
//!
//! The stages that consume these tables never derive coefficients themselves;
//! they are handed a table from here.

use crate::constants::HIGH_RATE_THRESHOLD_HZ;
use crate::filter::BiquadCoefficients;
use std::f64::consts::PI;

/// Sample rate the BS.1770 reference coefficients are published for
pub const REFERENCE_SAMPLE_RATE: f64 = 48_000.0;

/// Stage 1 (high shelf) at 48 kHz, ITU-R BS.1770 Table 1
const HIGH_SHELF_48K: BiquadCoefficients = BiquadCoefficients::new(
    [-1.69065929318241, 0.73248077421585],
    [1.53512485958697, -2.69169618940638, 1.19839281085285],
);

/// Stage 2 (RLB high pass) at 48 kHz, ITU-R BS.1770 Table 2
const HIGH_PASS_48K: BiquadCoefficients =
    BiquadCoefficients::new([-1.99004745483398, 0.99007225036621], [1.0, -2.0, 1.0]);

// Analog prototype of the two stages
const SHELF_FREQUENCY: f64 = 1681.974450955533;
const SHELF_GAIN_DB: f64 = 3.999843853973347;
const SHELF_Q: f64 = 0.7071752369554196;
const SHELF_BAND_EXPONENT: f64 = 0.4996667741545416;
const HIGH_PASS_FREQUENCY: f64 = 38.13547087602444;
const HIGH_PASS_Q: f64 = 0.5003270373238773;

/// Coefficient pair for the K-weighting cascade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KWeightingCoefficients {
    pub high_shelf: BiquadCoefficients,
    pub high_pass: BiquadCoefficients,
}

impl KWeightingCoefficients {
    /// The published 48 kHz table
    pub const fn reference() -> Self {
        Self {
            high_shelf: HIGH_SHELF_48K,
            high_pass: HIGH_PASS_48K,
        }
    }

    /// Coefficients for an arbitrary sample rate
    ///
    /// Returns the published table at 48 kHz and maps the analog prototype
    /// through the bilinear transform everywhere else.
    pub fn for_sample_rate(sample_rate: f64) -> Self {
        if (sample_rate - REFERENCE_SAMPLE_RATE).abs() < f64::EPSILON {
            return Self::reference();
        }

        let k = (PI * SHELF_FREQUENCY / sample_rate).tan();
        let vh = 10.0_f64.powf(SHELF_GAIN_DB / 20.0);
        let vb = vh.powf(SHELF_BAND_EXPONENT);
        let a0 = 1.0 + k / SHELF_Q + k * k;
        let high_shelf = BiquadCoefficients::new(
            [2.0 * (k * k - 1.0) / a0, (1.0 - k / SHELF_Q + k * k) / a0],
            [
                (vh + vb * k / SHELF_Q + k * k) / a0,
                2.0 * (k * k - vh) / a0,
                (vh - vb * k / SHELF_Q + k * k) / a0,
            ],
        );

        let k = (PI * HIGH_PASS_FREQUENCY / sample_rate).tan();
        let a0 = 1.0 + k / HIGH_PASS_Q + k * k;
        let high_pass = BiquadCoefficients::new(
            [2.0 * (k * k - 1.0) / a0, (1.0 - k / HIGH_PASS_Q + k * k) / a0],
            [1.0, -2.0, 1.0],
        );

        Self {
            high_shelf,
            high_pass,
        }
    }
}

/// 48-tap, 4-phase interpolation filter from ITU-R BS.1770 Annex 2
pub const TRUE_PEAK_PHASES: [[f64; 12]; 4] = [
    [
        0.0017089843750,
        0.0109863281250,
        -0.0196533203125,
        0.0332031250000,
        -0.0594482421875,
        0.1373291015625,
        0.9721679687500,
        -0.1022949218750,
        0.0476074218750,
        -0.0266113281250,
        0.0148925781250,
        -0.0083007812500,
    ],
    [
        -0.0291748046875,
        0.0292968750000,
        -0.0517578125000,
        0.0891113281250,
        -0.1665039062500,
        0.4650878906250,
        0.7797851562500,
        -0.2003173828125,
        0.1015625000000,
        -0.0582275390625,
        0.0330810546875,
        -0.0189208984375,
    ],
    [
        -0.0189208984375,
        0.0330810546875,
        -0.0582275390625,
        0.1015625000000,
        -0.2003173828125,
        0.7797851562500,
        0.4650878906250,
        -0.1665039062500,
        0.0891113281250,
        -0.0517578125000,
        0.0292968750000,
        -0.0291748046875,
    ],
    [
        -0.0083007812500,
        0.0148925781250,
        -0.0266113281250,
        0.0476074218750,
        -0.1022949218750,
        0.9721679687500,
        0.1373291015625,
        -0.0594482421875,
        0.0332031250000,
        -0.0196533203125,
        0.0109863281250,
        0.0017089843750,
    ],
];

/// Oversampling factor for a sample rate: 4x below 96 kHz, 2x at or above
pub fn oversampling_factor(sample_rate: f64) -> usize {
    if sample_rate >= HIGH_RATE_THRESHOLD_HZ {
        2
    } else {
        4
    }
}

/// Interpolation phases used at a sample rate
///
/// 2x oversampling keeps the two phases half a sample apart.
pub fn true_peak_phases(sample_rate: f64) -> Vec<&'static [f64]> {
    match oversampling_factor(sample_rate) {
        2 => vec![&TRUE_PEAK_PHASES[0][..], &TRUE_PEAK_PHASES[2][..]],
        _ => TRUE_PEAK_PHASES.iter().map(|phase| &phase[..]).collect(),
    }
}

/// Surround channel weight (+1.5 dB)
pub const SURROUND_WEIGHT: f64 = 1.41;

/// Per-channel weights keyed by channel count
///
/// Layouts not listed here weigh every channel at 1.0.
pub fn channel_weights(channel_count: usize) -> &'static [f64] {
    const MONO: [f64; 1] = [1.0];
    const STEREO: [f64; 2] = [1.0, 1.0];
    // L R C Ls Rs
    const FIVE_CHANNEL: [f64; 5] = [1.0, 1.0, 1.0, SURROUND_WEIGHT, SURROUND_WEIGHT];
    // L R C LFE Ls Rs
    const FIVE_ONE: [f64; 6] = [1.0, 1.0, 1.0, 0.0, SURROUND_WEIGHT, SURROUND_WEIGHT];
    // L R C LFE Ls Rs Lb Rb
    const SEVEN_ONE: [f64; 8] = [
        1.0,
        1.0,
        1.0,
        0.0,
        SURROUND_WEIGHT,
        SURROUND_WEIGHT,
        SURROUND_WEIGHT,
        SURROUND_WEIGHT,
    ];

    match channel_count {
        1 => &MONO,
        2 => &STEREO,
        5 => &FIVE_CHANNEL,
        6 => &FIVE_ONE,
        8 => &SEVEN_ONE,
        _ => &[],
    }
}

/// Weight of one channel, defaulting to unity
#[inline]
pub fn channel_weight(weights: &[f64], channel: usize) -> f64 {
    weights.get(channel).copied().unwrap_or(1.0)
}
