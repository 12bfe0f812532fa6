//! Whole-buffer measurement
//!
//! Drives a fresh [`LoudnessEngine`] over a complete planar buffer the way a
//! real-time host would, one render quantum at a time.

use crate::config::EngineConfig;
use crate::constants::RENDER_QUANTUM_FRAMES;
use crate::engine::{LoudnessEngine, RenderContext};
use crate::error::{LoudnessError, Result};
use crate::metrics::{Metrics, Snapshot};
use crate::sink::CallbackSink;

/// Outcome of [`measure_offline`]
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineMeasurement {
    /// Every snapshot emitted while rendering, in order
    pub snapshots: Vec<Snapshot>,
    /// Measurements after the last frame
    pub metrics: Metrics,
    /// Length of the buffer in seconds
    pub duration_sec: f64,
}

/// Measure a complete planar buffer
///
/// The loudness histories are bounded by the buffer duration. Snapshots are
/// emitted every `interval_sec` of rendered time.
///
/// # Errors
/// Returns an error if there are no channels, the channels differ in length,
/// or the sample rate or interval is invalid
pub fn measure_offline(
    channels: &[&[f32]],
    sample_rate: f64,
    interval_sec: f64,
) -> Result<OfflineMeasurement> {
    let Some(first) = channels.first() else {
        return Err(LoudnessError::InvalidChannelCount(0));
    };
    let frames = first.len();
    if let Some(channel) = channels.iter().find(|channel| channel.len() != frames) {
        return Err(LoudnessError::MismatchedChannelLengths {
            input: 0,
            expected: frames,
            actual: channel.len(),
        });
    }
    let duration_sec = frames as f64 / sample_rate;

    let mut config = EngineConfig::new(sample_rate)
        .with_interval(interval_sec)
        .with_channel_counts(vec![channels.len()]);
    if duration_sec > 0.0 {
        config = config.with_capacity(duration_sec);
    }

    let mut snapshots = Vec::new();
    let sink = CallbackSink::new(|snapshot: Snapshot| snapshots.push(snapshot));
    let mut engine = LoudnessEngine::new(config, sink)?;

    tracing::debug!(
        channels = channels.len(),
        frames,
        sample_rate,
        "Measuring buffer"
    );

    let mut block: Vec<&[f32]> = Vec::with_capacity(channels.len());
    let mut offset = 0;
    while offset < frames {
        let end = (offset + RENDER_QUANTUM_FRAMES).min(frames);
        block.clear();
        block.extend(channels.iter().map(|channel| &channel[offset..end]));

        let inputs: [&[&[f32]]; 1] = [&block];
        engine.process(&RenderContext::at_frame(offset as u64, sample_rate), &inputs, &mut [])?;
        offset = end;
    }

    let metrics = engine.metrics()[0];
    drop(engine);

    Ok(OfflineMeasurement {
        snapshots,
        metrics,
        duration_sec,
    })
}
