//! Test-signal generation and 8-bit sample conversion.
//!
//! Front ends such as the HackRF deliver interleaved signed 8-bit I/Q. These
//! helpers produce the same layout from floating-point signals so recorded
//! captures, synthetic tones and WAV files all feed the flowgraph identically.

use std::f64::consts::TAU;

/// Quantize a sample in `[-1.0, 1.0]` to a signed byte, clamping overload.
#[inline]
pub fn quantize(sample: f32) -> i8 {
    (sample.clamp(-1.0, 1.0) * 127.0).round() as i8
}

/// Quantize a whole buffer.
pub fn quantize_all(samples: &[f32]) -> Vec<i8> {
    samples.iter().map(|&s| quantize(s)).collect()
}

/// Complex tone at `freq` Hz (negative = below centre) as interleaved i8 I/Q.
///
/// Returns `2 * points` bytes.
pub fn iq_tone(sample_rate: f64, freq: f64, amplitude: f32, points: usize) -> Vec<i8> {
    let mut out = Vec::with_capacity(points * 2);
    let step = TAU * freq / sample_rate;
    for n in 0..points {
        let phase = step * n as f64;
        out.push(quantize(amplitude * phase.cos() as f32));
        out.push(quantize(amplitude * phase.sin() as f32));
    }
    out
}

/// Interleave separate real I and Q channels into i8 pairs.
///
/// The shorter channel decides the length.
pub fn interleave_iq(i: &[f32], q: &[f32]) -> Vec<i8> {
    i.iter()
        .zip(q)
        .flat_map(|(&a, &b)| [quantize(a), quantize(b)])
        .collect()
}
