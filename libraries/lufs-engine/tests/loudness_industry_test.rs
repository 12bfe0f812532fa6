//! ITU-R BS.1770-5 / EBU R128 / EBU Tech 3342 Compliance Tests
//!
//! Known-answer tests plus a cross-check against the `ebur128` crate
//! (a port of libebur128) on identical signals.
//!
//! Key standards tested:
//! - 997 Hz reference tone at 0 dBFS = -3.01 LKFS
//! - Gating thresholds (-70 LKFS absolute, -10 LU relative)
//! - True peak measurement with 4x oversampling
//! - Loudness range (LRA) calculation
//! - Surround channel weighting

use ebur128::{EbuR128, Mode};
use lufs_engine::{measure_offline, Metrics};
use std::f64::consts::PI;

// ============================================================================
// Test Signal Generators
// ============================================================================

/// Planar sine at `level_dbfs`, identical on every channel
fn generate_sine_at_dbfs(
    sample_rate: u32,
    channels: usize,
    frequency_hz: f64,
    level_dbfs: f64,
    duration_secs: f64,
) -> Vec<Vec<f32>> {
    let amplitude = 10.0_f64.powf(level_dbfs / 20.0);
    let num_samples = (f64::from(sample_rate) * duration_secs) as usize;
    let channel: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f64 / f64::from(sample_rate);
            (amplitude * (2.0 * PI * frequency_hz * t).sin()) as f32
        })
        .collect();
    vec![channel; channels]
}

/// Append `tail` to `head` channel by channel
fn concat(mut head: Vec<Vec<f32>>, tail: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
    for (h, t) in head.iter_mut().zip(tail) {
        h.extend(t);
    }
    head
}

fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    let frames = channels[0].len();
    let mut interleaved = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        for channel in channels {
            interleaved.push(channel[i]);
        }
    }
    interleaved
}

// ============================================================================
// Helper Functions
// ============================================================================

fn measure(channels: &[Vec<f32>], sample_rate: u32) -> Metrics {
    let refs: Vec<&[f32]> = channels.iter().map(Vec::as_slice).collect();
    measure_offline(&refs, f64::from(sample_rate), 0.1)
        .unwrap()
        .metrics
}

/// Integrated loudness, LRA and true peak (dBTP, max over channels) from ebur128
fn reference(channels: &[Vec<f32>], sample_rate: u32) -> (f64, f64, f64) {
    let mut meter = EbuR128::new(
        channels.len() as u32,
        sample_rate,
        Mode::I | Mode::LRA | Mode::TRUE_PEAK,
    )
    .unwrap();
    meter.add_frames_f32(&interleave(channels)).unwrap();

    let true_peak = (0..channels.len() as u32)
        .map(|ch| meter.true_peak(ch).unwrap())
        .fold(0.0_f64, f64::max);

    (
        meter.loudness_global().unwrap(),
        meter.loudness_range().unwrap(),
        20.0 * true_peak.log10(),
    )
}

fn assert_close(label: &str, actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "{} FAILED\n\
         Expected: {:.3}\n\
         Got: {:.3}\n\
         Difference: {:.3}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

// ============================================================================
// ITU-R BS.1770-5 Reference Level Tests
// ============================================================================

/// "If a 0 dB FS, 1 kHz (997 Hz to be exact) sine wave is applied to the
/// left, centre, or right channel input, the indicated loudness will equal -3.01 LKFS"
#[test]
fn test_itu_reference_level_997hz_mono() {
    let signal = generate_sine_at_dbfs(48000, 1, 997.0, 0.0, 5.0);
    let metrics = measure(&signal, 48000);

    assert_close("0 dBFS mono integrated", metrics.integrated_loudness, -3.01, 0.1);
    assert_close("0 dBFS mono momentary", metrics.momentary_loudness, -3.01, 0.1);
    assert_close("0 dBFS mono short-term", metrics.short_term_loudness, -3.01, 0.1);
}

/// Two coherent channels sum to +3 dB
#[test]
fn test_itu_reference_level_997hz_stereo() {
    let signal = generate_sine_at_dbfs(48000, 2, 997.0, 0.0, 5.0);
    let metrics = measure(&signal, 48000);

    assert_close("0 dBFS stereo integrated", metrics.integrated_loudness, -0.01, 0.15);
}

#[test]
fn test_itu_reference_level_minus_20dbfs() {
    let signal = generate_sine_at_dbfs(48000, 1, 997.0, -20.0, 5.0);
    let metrics = measure(&signal, 48000);

    assert_close("-20 dBFS integrated", metrics.integrated_loudness, -23.01, 0.1);
}

// ============================================================================
// Sample Rate Tests
// ============================================================================

/// K-weighting is re-derived per rate, so the reference tone reads the same
#[test]
fn test_sample_rate_independence() {
    for sample_rate in [44100, 48000, 88200, 96000] {
        let signal = generate_sine_at_dbfs(sample_rate, 1, 997.0, -20.0, 5.0);
        let metrics = measure(&signal, sample_rate);

        assert_close(
            &format!("-20 dBFS at {} Hz", sample_rate),
            metrics.integrated_loudness,
            -23.01,
            0.1,
        );
    }
}

// ============================================================================
// Gating Tests
// ============================================================================

/// Blocks below -70 LKFS are excluded from integrated loudness
#[test]
fn test_absolute_gating_threshold() {
    let signal = concat(
        generate_sine_at_dbfs(48000, 1, 997.0, -20.0, 10.0),
        generate_sine_at_dbfs(48000, 1, 997.0, -80.0, 10.0),
    );
    let metrics = measure(&signal, 48000);

    // Without gating the quiet half would pull the result down ~3 LU
    assert_close("absolute gate", metrics.integrated_loudness, -23.01, 0.15);
}

/// Blocks more than 10 LU below the absolute-gated level are excluded
#[test]
fn test_relative_gating_threshold() {
    let signal = concat(
        generate_sine_at_dbfs(48000, 1, 997.0, -20.0, 10.0),
        generate_sine_at_dbfs(48000, 1, 997.0, -45.0, 10.0),
    );
    let metrics = measure(&signal, 48000);

    assert_close("relative gate", metrics.integrated_loudness, -23.01, 0.15);
}

// ============================================================================
// True Peak Tests
// ============================================================================

#[test]
fn test_true_peak_full_scale_sine() {
    let signal = generate_sine_at_dbfs(48000, 1, 997.0, 0.0, 1.0);
    let metrics = measure(&signal, 48000);

    assert!(
        metrics.maximum_true_peak_level >= -0.3 && metrics.maximum_true_peak_level < 0.5,
        "Full-scale sine true peak: {:.3} dBTP",
        metrics.maximum_true_peak_level
    );
}

/// A quarter-rate sine sampled 45° off its crests hides its peak between samples
#[test]
fn test_true_peak_intersample_detection() {
    let samples: Vec<f32> = (0..48000)
        .map(|i| (0.5 * (PI / 2.0 * i as f64 + PI / 4.0).sin()) as f32)
        .collect();
    let sample_peak_db = 20.0 * f64::from(samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()))).log10();

    let metrics = measure(&[samples], 48000);

    // Sample peak is -9.03 dBFS, the waveform itself peaks at -6.02
    assert!(
        metrics.maximum_true_peak_level > sample_peak_db + 2.5,
        "Inter-sample peak not detected\n\
         Sample peak: {:.3} dBFS\n\
         True peak: {:.3} dBTP",
        sample_peak_db,
        metrics.maximum_true_peak_level
    );
}

// ============================================================================
// Loudness Range (LRA) Tests (EBU Tech 3342)
// ============================================================================

#[test]
fn test_lra_constant_level() {
    let signal = generate_sine_at_dbfs(48000, 2, 997.0, -20.0, 10.0);
    let metrics = measure(&signal, 48000);

    assert!(
        metrics.loudness_range < 1.0,
        "LRA of constant level signal should be near 0 LU\nGot: {:.2} LU",
        metrics.loudness_range
    );
}

/// Alternating -10 / -30 dBFS sections, long enough for clean short-term blocks
#[test]
fn test_lra_dynamic_signal() {
    let mut signal = vec![Vec::new(); 2];
    for _ in 0..5 {
        signal = concat(signal, generate_sine_at_dbfs(48000, 2, 997.0, -10.0, 4.0));
        signal = concat(signal, generate_sine_at_dbfs(48000, 2, 997.0, -30.0, 4.0));
    }
    let metrics = measure(&signal, 48000);

    assert_close("dynamic LRA", metrics.loudness_range, 20.0, 1.0);
}

// ============================================================================
// Surround Tests
// ============================================================================

/// Surround channels carry +1.5 dB weight, LFE none
#[test]
fn test_surround_channel_weighting() {
    let tone = generate_sine_at_dbfs(48000, 1, 997.0, -20.0, 5.0).remove(0);
    let silence = vec![0.0_f32; tone.len()];

    // L R C LFE Ls Rs, tone on Ls only
    let mut layout = vec![silence; 6];
    layout[4] = tone.clone();
    let surround = measure(&layout, 48000);
    assert_close(
        "Ls weighting",
        surround.integrated_loudness,
        -23.01 + 10.0 * 1.41_f64.log10(),
        0.1,
    );

    // Tone on LFE only: nothing to measure
    let mut layout = vec![vec![0.0_f32; tone.len()]; 6];
    layout[3] = tone;
    let lfe = measure(&layout, 48000);
    assert_eq!(lfe.integrated_loudness, f64::NEG_INFINITY);
}

// ============================================================================
// Reference Implementation Cross-Check
// ============================================================================

#[test]
fn test_matches_ebur128_on_reference_tone() {
    for sample_rate in [44100, 48000] {
        let signal = generate_sine_at_dbfs(sample_rate, 2, 997.0, -18.0, 6.0);
        let metrics = measure(&signal, sample_rate);
        let (integrated, _, true_peak) = reference(&signal, sample_rate);

        assert_close(
            &format!("integrated vs ebur128 at {} Hz", sample_rate),
            metrics.integrated_loudness,
            integrated,
            0.1,
        );
        assert_close(
            &format!("true peak vs ebur128 at {} Hz", sample_rate),
            metrics.maximum_true_peak_level,
            true_peak,
            0.5,
        );
    }
}

#[test]
fn test_matches_ebur128_with_gating() {
    let signal = concat(
        concat(
            generate_sine_at_dbfs(48000, 2, 997.0, -16.0, 8.0),
            generate_sine_at_dbfs(48000, 2, 440.0, -40.0, 6.0),
        ),
        generate_sine_at_dbfs(48000, 2, 2000.0, -24.0, 8.0),
    );
    let metrics = measure(&signal, 48000);
    let (integrated, _, _) = reference(&signal, 48000);

    assert_close("gated integrated vs ebur128", metrics.integrated_loudness, integrated, 0.3);
}

#[test]
fn test_matches_ebur128_loudness_range_order() {
    let signal = concat(
        generate_sine_at_dbfs(48000, 1, 997.0, -20.0, 12.0),
        generate_sine_at_dbfs(48000, 1, 997.0, -26.0, 12.0),
    );
    let metrics = measure(&signal, 48000);
    let (_, range, _) = reference(&signal, 48000);

    // Percentile interpolation differs slightly from nearest-rank
    assert_close("LRA vs ebur128", metrics.loudness_range, range, 1.0);
}
