//! Streaming loudness engine
//!
//! [`LoudnessEngine`] is driven block by block by a host scheduler. Each call
//! runs every sample of every logical input through the K-weighting and
//! true-peak stages, slides the momentary and short-term energy windows,
//! appends to the loudness histories at hop boundaries and re-runs the gated
//! aggregations when a history moved. Snapshots leave through a
//! [`SnapshotSink`] at a configured cadence. The audio itself is copied to the
//! output untouched.
//!
//! Per input the lifecycle is:
//!
//! ```text
//! UNINITIALIZED ──first block──► ACCUMULATING ──window full──► WINDOW_READY
//!                                      ▲                            │
//!                                      └────────── reset() ─────────┘
//! ```

use crate::buffer::CircularEnergyBuffer;
use crate::coefficients::{channel_weight, channel_weights, true_peak_phases, KWeightingCoefficients};
use crate::config::EngineConfig;
use crate::constants::{ATTENUATION_DB, MOMENTARY_WINDOW_SEC, SHORT_TERM_WINDOW_SEC};
use crate::error::{LoudnessError, Result};
use crate::gating::{energy_to_loudness, integrated_loudness, loudness_range, window_loudness, GatingConstants};
use crate::history::LoudnessHistory;
use crate::metrics::{Metrics, Snapshot};
use crate::sink::{NullSink, SnapshotSink};
use crate::stages::{KWeightingStage, PeakTracker, TruePeakStage};

/// Timing of the block being processed, supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderContext {
    /// Index of the first frame of the block
    pub current_frame: u64,
    /// Host clock in seconds at the first frame of the block
    pub current_time: f64,
}

impl RenderContext {
    pub fn new(current_frame: u64, current_time: f64) -> Self {
        Self {
            current_frame,
            current_time,
        }
    }

    /// Context for a frame index on a clock that started at zero
    pub fn at_frame(current_frame: u64, sample_rate: f64) -> Self {
        Self::new(current_frame, current_frame as f64 / sample_rate)
    }
}

/// What the host should do after a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep invoking the component
    Continue,
}

/// A component that accepts one block of planar audio at a time
///
/// `inputs[i][c]` is channel `c` of logical input `i`; `outputs` has the same
/// shape. All channels of one input share a length.
pub trait BlockProcessor {
    /// Process one block
    fn process(
        &mut self,
        ctx: &RenderContext,
        inputs: &[&[&[f32]]],
        outputs: &mut [&mut [&mut [f32]]],
    ) -> Result<Disposition>;

    /// Return to the state right after construction, keeping allocations
    fn reset(&mut self);
}

/// Filter banks of one input
///
/// The banks only ever grow. `active` is the channel count of the last block.
#[derive(Debug, Clone)]
struct ChannelBank {
    k_weighting: Vec<KWeightingStage>,
    true_peak: Vec<TruePeakStage>,
    active: usize,
}

impl ChannelBank {
    fn new(channel_count: usize, k_coefficients: &KWeightingCoefficients, phases: &[&[f64]]) -> Self {
        let mut bank = Self {
            k_weighting: Vec::with_capacity(channel_count),
            true_peak: Vec::with_capacity(channel_count),
            active: 0,
        };
        bank.resize(channel_count, k_coefficients, phases);
        bank
    }

    /// Switch to `channel_count` channels, growing the banks as needed
    fn resize(&mut self, channel_count: usize, k_coefficients: &KWeightingCoefficients, phases: &[&[f64]]) {
        while self.k_weighting.len() < channel_count {
            self.k_weighting.push(KWeightingStage::new(k_coefficients));
            self.true_peak.push(TruePeakStage::new(phases, ATTENUATION_DB));
        }
        self.reset();
        self.active = channel_count;
    }

    fn reset(&mut self) {
        for stage in &mut self.k_weighting {
            stage.reset();
        }
        for stage in &mut self.true_peak {
            stage.reset();
        }
    }
}

/// Everything the engine keeps for one logical input
#[derive(Debug, Clone)]
struct InputState {
    bank: ChannelBank,
    momentary: CircularEnergyBuffer,
    short_term: CircularEnergyBuffer,
    momentary_hop_count: usize,
    short_term_hop_count: usize,
    momentary_history: LoudnessHistory,
    short_term_history: LoudnessHistory,
    // History generation at the last aggregation
    integrated_generation: u64,
    range_generation: u64,
    range_scratch: Vec<f64>,
    peak: PeakTracker,
}

impl InputState {
    fn new(config: &EngineConfig, bank: ChannelBank) -> Self {
        let momentary_history = LoudnessHistory::for_duration(config.capacity_sec, config.momentary_hop_sec);
        let short_term_history = LoudnessHistory::for_duration(config.capacity_sec, config.short_term_hop_sec);
        let range_scratch = Vec::with_capacity(
            config
                .capacity_sec
                .map_or(0, |capacity| (capacity / config.short_term_hop_sec).ceil() as usize),
        );

        Self {
            bank,
            momentary: CircularEnergyBuffer::with_duration(config.sample_rate, MOMENTARY_WINDOW_SEC),
            short_term: CircularEnergyBuffer::with_duration(config.sample_rate, SHORT_TERM_WINDOW_SEC),
            momentary_hop_count: 0,
            short_term_hop_count: 0,
            momentary_history,
            short_term_history,
            integrated_generation: 0,
            range_generation: 0,
            range_scratch,
            peak: PeakTracker::new(ATTENUATION_DB),
        }
    }

    /// Run every frame of `block` through the stages and energy windows
    fn measure(&mut self, block: &[&[f32]], frames: usize, metrics: &mut Metrics) {
        let weights = channel_weights(block.len());
        let bank = &mut self.bank;

        for frame in 0..frames {
            let mut energy = 0.0;

            for (channel, samples) in block.iter().enumerate() {
                let sample = finite_or_zero(samples[frame]);
                energy += channel_weight(weights, channel) * bank.k_weighting[channel].energy(sample);
                self.peak.observe(bank.true_peak[channel].process(sample));
            }

            self.momentary.push(energy);
            self.short_term.push(energy);

            if self.momentary.is_full() {
                metrics.update_momentary(window_loudness(self.momentary.mean()));
            }
        }
    }

    /// Append to the histories for every hop boundary crossed by `frames`
    fn advance_hops(&mut self, frames: usize, momentary_hop: usize, short_term_hop: usize, metrics: &mut Metrics) {
        self.momentary_hop_count += frames;
        while self.momentary_hop_count >= momentary_hop {
            self.momentary_hop_count -= momentary_hop;
            if self.momentary.is_full() {
                self.momentary_history.push(energy_to_loudness(self.momentary.mean()));
            }
        }

        self.short_term_hop_count += frames;
        while self.short_term_hop_count >= short_term_hop {
            self.short_term_hop_count -= short_term_hop;
            if self.short_term.is_full() {
                let mean = self.short_term.mean();
                metrics.update_short_term(window_loudness(mean));
                self.short_term_history.push(energy_to_loudness(mean));
            }
        }
    }

    /// Refresh integrated loudness and loudness range if their history moved
    ///
    /// A gate that leaves too few values keeps the previous result.
    fn aggregate(&mut self, gating: &GatingConstants, metrics: &mut Metrics) {
        let generation = self.momentary_history.generation();
        if generation != self.integrated_generation {
            self.integrated_generation = generation;
            if let Some(integrated) = integrated_loudness(self.momentary_history.iter(), gating.integrated) {
                metrics.integrated_loudness = integrated;
            }
        }

        let generation = self.short_term_history.generation();
        if generation != self.range_generation {
            self.range_generation = generation;
            if let Some(range) = loudness_range(
                self.short_term_history.iter(),
                gating.range,
                gating.lower_percentile,
                gating.upper_percentile,
                &mut self.range_scratch,
            ) {
                metrics.loudness_range = range;
            }
        }

        if let Some(level) = self.peak.take_level() {
            metrics.update_true_peak(level);
        }
    }

    fn reset(&mut self) {
        self.bank.reset();
        self.momentary.clear();
        self.short_term.clear();
        self.momentary_hop_count = 0;
        self.short_term_hop_count = 0;
        self.momentary_history.clear();
        self.short_term_history.clear();
        self.integrated_generation = 0;
        self.range_generation = 0;
        self.peak.reset();
    }
}

/// Non-finite samples enter the stages as silence
#[inline]
fn finite_or_zero(sample: f32) -> f64 {
    if sample.is_finite() {
        f64::from(sample)
    } else {
        0.0
    }
}

/// BS.1770-5 loudness meter for any number of logical inputs
///
/// # Example
///
/// ```ignore
/// use lufs_engine::{snapshot_channel, EngineConfig, LoudnessEngine, RenderContext};
///
/// let (sink, snapshots) = snapshot_channel(64);
/// let mut engine = LoudnessEngine::new(EngineConfig::new(48000.0), sink)?;
///
/// // Inside the render callback
/// engine.process(&RenderContext::at_frame(frame, 48000.0), &inputs, &mut outputs)?;
///
/// // On another thread
/// while let Ok(snapshot) = snapshots.try_recv() {
///     println!("{}", snapshot.metrics[0]);
/// }
/// ```
pub struct LoudnessEngine<S = NullSink> {
    config: EngineConfig,
    k_coefficients: KWeightingCoefficients,
    true_peak_phases: Vec<&'static [f64]>,
    momentary_hop: usize,
    short_term_hop: usize,
    inputs: Vec<Option<InputState>>,
    metrics: Vec<Metrics>,
    last_emit_time: f64,
    sink: S,
}

impl<S: SnapshotSink> LoudnessEngine<S> {
    /// Create an engine
    ///
    /// # Errors
    /// Returns a configuration error if `config` fails validation
    pub fn new(config: EngineConfig, sink: S) -> Result<Self> {
        config.validate()?;

        let k_coefficients = KWeightingCoefficients::for_sample_rate(config.sample_rate);
        let true_peak_phases = true_peak_phases(config.sample_rate);
        let momentary_hop = config.hop_samples(config.momentary_hop_sec);
        let short_term_hop = config.hop_samples(config.short_term_hop_sec);

        let inputs = match &config.channel_counts {
            Some(counts) => counts
                .iter()
                .map(|&count| {
                    let bank = ChannelBank::new(count, &k_coefficients, &true_peak_phases);
                    Some(InputState::new(&config, bank))
                })
                .collect(),
            None => vec![None; config.number_of_inputs],
        };

        tracing::debug!(
            sample_rate = config.sample_rate,
            inputs = config.number_of_inputs,
            oversampling = true_peak_phases.len(),
            preallocated = config.channel_counts.is_some(),
            "Created loudness engine"
        );

        Ok(Self {
            metrics: vec![Metrics::default(); config.number_of_inputs],
            config,
            k_coefficients,
            true_peak_phases,
            momentary_hop,
            short_term_hop,
            inputs,
            last_emit_time: 0.0,
            sink,
        })
    }

    /// Process one block, emitting a snapshot if the interval elapsed
    ///
    /// Inputs with no channels are skipped. Inputs past the end of `inputs`
    /// keep their state untouched.
    ///
    /// # Errors
    /// Returns an error, before touching any state, if the block has more
    /// inputs than configured or an input's channels differ in length
    pub fn process(
        &mut self,
        ctx: &RenderContext,
        inputs: &[&[&[f32]]],
        outputs: &mut [&mut [&mut [f32]]],
    ) -> Result<Disposition> {
        Self::check_block(self.config.number_of_inputs, inputs)?;

        for (index, block) in inputs.iter().enumerate() {
            let Some(first) = block.first() else {
                continue;
            };
            let frames = first.len();

            let state = prepare_input(
                &mut self.inputs[index],
                index,
                block.len(),
                &self.config,
                &self.k_coefficients,
                &self.true_peak_phases,
            );
            let metrics = &mut self.metrics[index];

            state.measure(block, frames, metrics);
            state.advance_hops(frames, self.momentary_hop, self.short_term_hop, metrics);
            state.aggregate(&self.config.gating, metrics);
        }

        if ctx.current_time - self.last_emit_time >= self.config.interval_sec {
            self.sink.emit(Snapshot {
                frame_index: ctx.current_frame,
                elapsed_time: ctx.current_time,
                metrics: self.metrics.clone(),
            });
            self.last_emit_time = ctx.current_time;
        }

        copy_through(inputs, outputs);

        Ok(Disposition::Continue)
    }

    fn check_block(configured: usize, inputs: &[&[&[f32]]]) -> Result<()> {
        if inputs.len() > configured {
            return Err(LoudnessError::TooManyInputs {
                configured,
                received: inputs.len(),
            });
        }

        for (input, block) in inputs.iter().enumerate() {
            let Some(first) = block.first() else {
                continue;
            };
            let expected = first.len();
            if let Some(channel) = block.iter().find(|channel| channel.len() != expected) {
                return Err(LoudnessError::MismatchedChannelLengths {
                    input,
                    expected,
                    actual: channel.len(),
                });
            }
        }

        Ok(())
    }

    /// Current measurements, one entry per configured input
    pub fn metrics(&self) -> &[Metrics] {
        &self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Channel count of the last block seen on `input`, if any
    pub fn channel_count(&self, input: usize) -> Option<usize> {
        self.inputs.get(input)?.as_ref().map(|state| state.bank.active)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Clear every measurement and filter, keeping allocations
    pub fn reset(&mut self) {
        for state in self.inputs.iter_mut().flatten() {
            state.reset();
        }
        self.metrics.fill(Metrics::default());
        self.last_emit_time = 0.0;
    }
}

impl<S: SnapshotSink> BlockProcessor for LoudnessEngine<S> {
    fn process(
        &mut self,
        ctx: &RenderContext,
        inputs: &[&[&[f32]]],
        outputs: &mut [&mut [&mut [f32]]],
    ) -> Result<Disposition> {
        LoudnessEngine::process(self, ctx, inputs, outputs)
    }

    fn reset(&mut self) {
        LoudnessEngine::reset(self);
    }
}

/// State held in `slot`, allocated or re-banked for `channel_count`
fn prepare_input<'a>(
    slot: &'a mut Option<InputState>,
    index: usize,
    channel_count: usize,
    config: &EngineConfig,
    k_coefficients: &KWeightingCoefficients,
    phases: &[&[f64]],
) -> &'a mut InputState {
    let state = slot.get_or_insert_with(|| {
        tracing::debug!(input = index, channels = channel_count, "Allocating input state");
        InputState::new(config, ChannelBank::new(channel_count, k_coefficients, phases))
    });

    if state.bank.active != channel_count {
        tracing::debug!(
            input = index,
            from = state.bank.active,
            to = channel_count,
            "Channel count changed, resetting filter banks"
        );
        state.bank.resize(channel_count, k_coefficients, phases);
    }

    state
}

/// Copy each input channel to the matching output channel
///
/// Extra inputs, outputs, channels or frames on either side are left alone.
fn copy_through(inputs: &[&[&[f32]]], outputs: &mut [&mut [&mut [f32]]]) {
    for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
        for (source, destination) in input.iter().zip(output.iter_mut()) {
            let frames = source.len().min(destination.len());
            destination[..frames].copy_from_slice(&source[..frames]);
        }
    }
}
