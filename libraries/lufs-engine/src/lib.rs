//! Streaming loudness measurement (ITU-R BS.1770-5, EBU R128, EBU Tech 3342)
//!
//! This crate provides:
//! - Momentary, short-term and integrated loudness (LUFS)
//! - Loudness range (LU)
//! - Maximum true peak level (dBTP) via 4x/2x polyphase oversampling
//! - Periodic snapshots delivered off the render thread
//! - Compliance checks against common delivery standards
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌──────────────────────┐
//! │ Host block │──►│ KWeightingStage  │──►│ CircularEnergyBuffer │
//! └────────────┘   │ TruePeakStage    │   │ (400 ms / 3 s)       │
//!       │          └──────────────────┘   └──────────────────────┘
//!       │                   │                        │ hop
//!       │                   ▼                        ▼
//!       │            ┌─────────────┐      ┌──────────────────────┐
//!       │            │ PeakTracker │      │ LoudnessHistory      │
//!       │            └─────────────┘      │ + gated aggregation  │
//!       │                   │             └──────────────────────┘
//!       │                   └──────────┬─────────────┘
//!       ▼                              ▼
//! ┌────────────┐               ┌───────────────┐   ┌──────────────┐
//! │ Output     │               │ Metrics       │──►│ SnapshotSink │
//! │ (verbatim) │               └───────────────┘   └──────────────┘
//! └────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lufs_engine::{snapshot_channel, EngineConfig, LoudnessEngine, RenderContext};
//!
//! let (sink, snapshots) = snapshot_channel(64);
//! let config = EngineConfig::new(48000.0).with_interval(0.1);
//! let mut engine = LoudnessEngine::new(config, sink)?;
//!
//! // Render thread: one call per block
//! let ctx = RenderContext::at_frame(frame, 48000.0);
//! engine.process(&ctx, &[&[&left, &right]], &mut [&mut [&mut out_l, &mut out_r]])?;
//!
//! // UI thread
//! for snapshot in snapshots.try_iter() {
//!     println!("Integrated: {:.1} LUFS", snapshot.metrics[0].integrated_loudness);
//! }
//! ```

#![deny(unsafe_code)]

mod buffer;
mod coefficients;
mod config;
pub mod constants;
mod engine;
mod error;
mod filter;
mod gating;
mod history;
mod metrics;
mod offline;
mod sink;
mod stages;
mod standards;

pub use buffer::{CircularEnergyBuffer, RingBuffer};
pub use coefficients::{
    channel_weight, channel_weights, oversampling_factor, true_peak_phases,
    KWeightingCoefficients, REFERENCE_SAMPLE_RATE, SURROUND_WEIGHT, TRUE_PEAK_PHASES,
};
pub use config::EngineConfig;
pub use engine::{BlockProcessor, Disposition, LoudnessEngine, RenderContext};
pub use error::{LoudnessError, Result};
pub use filter::{BiquadCoefficients, BiquadFilter, PolyphaseFirFilter};
pub use gating::{
    energy_to_loudness, integrated_loudness, loudness_range, loudness_to_energy, percentile,
    window_loudness, GateThresholds, GatingConstants,
};
pub use history::{HistoryIter, LoudnessHistory};
pub use metrics::{Metrics, Snapshot};
pub use offline::{measure_offline, OfflineMeasurement};
pub use sink::{snapshot_channel, CallbackSink, ChannelSink, NullSink, SnapshotSink};
pub use stages::{KWeightingStage, PeakTracker, TruePeakStage};
pub use standards::{Compliance, LoudnessStandard, StandardCategory, STANDARDS};
