//! Stateful filters used by the weighting and true-peak stages
//!
//! Both filters own their delay state exclusively; it is cleared only by an
//! explicit `reset()`.

mod biquad;
mod fir;

pub use biquad::{BiquadCoefficients, BiquadFilter};
pub use fir::PolyphaseFirFilter;
