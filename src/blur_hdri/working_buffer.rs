//! Dual-precision conversion between float HDR samples and the bounded
//! 8-bit working buffer the reference blur operates on.
//!
//! The float → 8-bit direction clamps to `[0, 1]` first, so HDR highlights
//! above 1.0 are lost. Callers that need them use
//! [`WorkingPrecision::NativeFloat`](crate::WorkingPrecision::NativeFloat).

const WORKING_MAX: f32 = u8::MAX as f32;

/// Quantizes one linear float sample into the 8-bit working range.
///
/// NaN maps to 0.
#[inline]
pub fn to_working_sample(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * WORKING_MAX).round() as u8
}

/// Expands one 8-bit working sample back to linear float in `[0, 1]`.
#[inline]
pub fn from_working_sample(value: u8) -> f32 {
    f32::from(value) / WORKING_MAX
}

/// Quantizes a whole float buffer.
pub fn to_working(samples: &[f32]) -> Vec<u8> {
    samples.iter().copied().map(to_working_sample).collect()
}

/// Expands a whole 8-bit working buffer.
pub fn from_working(samples: &[u8]) -> Vec<f32> {
    samples.iter().copied().map(from_working_sample).collect()
}
