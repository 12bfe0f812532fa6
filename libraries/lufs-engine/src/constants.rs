//! Fixed algorithm constants (ITU-R BS.1770-5 / EBU Tech 3341 / Tech 3342)

/// Momentary loudness window length (400 ms)
pub const MOMENTARY_WINDOW_SEC: f64 = 0.4;

/// Short-term loudness window length (3 s)
pub const SHORT_TERM_WINDOW_SEC: f64 = 3.0;

/// Default hop between momentary loudness history entries (100 ms, 75% overlap)
pub const MOMENTARY_HOP_INTERVAL_SEC: f64 = 0.1;

/// Default hop between short-term loudness history entries
pub const SHORT_TERM_HOP_INTERVAL_SEC: f64 = 1.0;

/// Default snapshot cadence
pub const DEFAULT_SNAPSHOT_INTERVAL_SEC: f64 = 0.01;

/// Integrated loudness absolute gate (LUFS)
pub const LUFS_ABSOLUTE_THRESHOLD: f64 = -70.0;

/// Integrated loudness relative gate offset (LU below the absolute-gated loudness)
pub const LUFS_RELATIVE_THRESHOLD_FACTOR: f64 = -10.0;

/// Loudness range absolute gate (LUFS)
pub const LRA_ABSOLUTE_THRESHOLD: f64 = -70.0;

/// Loudness range relative gate offset (LU)
pub const LRA_RELATIVE_THRESHOLD_FACTOR: f64 = -20.0;

/// Lower percentile of the gated short-term distribution
pub const LOUDNESS_RANGE_LOWER_PERCENTILE: f64 = 0.10;

/// Upper percentile of the gated short-term distribution
pub const LOUDNESS_RANGE_UPPER_PERCENTILE: f64 = 0.95;

/// Upper bound on the entries of one bounded loudness history
///
/// 2^24 entries is about 19 days of momentary history at the default hop.
pub const MAX_HISTORY_ENTRIES: usize = 1 << 24;

/// Headroom applied ahead of the oversampling filters (dB)
pub const ATTENUATION_DB: f64 = 12.0;

/// Offset between mean-square energy in dB and LUFS
pub const LOUDNESS_OFFSET: f64 = -0.691;

/// Smallest energy fed into the logarithm
pub const ENERGY_FLOOR: f64 = f64::EPSILON;

/// Sample rate at and above which 2x oversampling replaces 4x
pub const HIGH_RATE_THRESHOLD_HZ: f64 = 96_000.0;

/// Frames per block when the engine drives itself over a complete buffer
pub const RENDER_QUANTUM_FRAMES: usize = 128;
