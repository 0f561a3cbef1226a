//! Spectrum transform block.
//!
//! [`SpectrumTransform`] is the flowgraph's analysis block: one window of raw
//! 8-bit samples in, one magnitude per frequency bin out. The pipeline is
//!
//! ```text
//! i8 window ──► scale 1/128 ──► window fn ──► FFT ──► |X[k]| ──► (fft shift)
//! ```
//!
//! Two input layouts are supported:
//!
//! | Format | Window length | Output bins |
//! |---|---|---|
//! | [`SampleFormat::InterleavedIq`] | `2 * fft_size` (I, Q, I, Q, …) | `fft_size` |
//! | [`SampleFormat::Real`] | `fft_size` | `fft_size / 2 + 1` |
//!
//! Magnitudes are linear and non-negative. Convert with
//! [`magnitude_db`](crate::fft::magnitude_db) for display.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_analysis::{SpectrumConfig, SpectrumTransform};
//! use sdrflow_core::Transform;
//!
//! let config = SpectrumConfig { fft_size: 64, ..SpectrumConfig::default() };
//! let mut block = SpectrumTransform::new(config).unwrap();
//!
//! let window = vec![0i8; block.input_len()];
//! let bins = block.compute(&window).unwrap();
//! assert_eq!(bins.len(), 64);
//! assert!(bins.iter().all(|&m| m == 0.0));
//! ```

use crate::fft::{Fft, Window, fft_shift};
use rustfft::num_complex::Complex;
use sdrflow_core::{
    BlockId, BlockParameter, FlowError, ParamUnit, Result, Transform, check_magnitudes,
    check_window,
};
use serde::{Deserialize, Serialize};

/// Full-scale value of a signed 8-bit sample.
const I8_SCALE: f32 = 1.0 / 128.0;

/// Smallest supported FFT size.
pub const MIN_FFT_SIZE: usize = 64;
/// Largest supported FFT size.
pub const MAX_FFT_SIZE: usize = 65536;
/// Largest decimation factor reachable through the parameter table.
pub const MAX_DECIMATION: u32 = 1024;

/// Parameter indices of the spectrum block.
pub mod param {
    /// log2 of the FFT size.
    pub const FFT_ORDER: usize = 0;
    /// Window function, as an index into [`Window::ALL`](crate::Window::ALL).
    pub const WINDOW: usize = 1;
    /// Centre the DC bin (0 or 1).
    pub const FFT_SHIFT: usize = 2;
    /// Publish one of every N windows.
    pub const DECIMATION: usize = 3;
}

/// Layout of the raw sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Interleaved I/Q pairs, as produced by HackRF-class front ends.
    #[default]
    InterleavedIq,
    /// Real-valued samples.
    Real,
}

impl SampleFormat {
    /// Raw samples consumed per complex (or real) FFT input point.
    pub fn samples_per_point(self) -> usize {
        match self {
            SampleFormat::InterleavedIq => 2,
            SampleFormat::Real => 1,
        }
    }
}

/// Configuration of the spectrum block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// FFT size (power of two).
    pub fft_size: usize,
    /// Window function applied before the FFT.
    pub window: Window,
    /// Input sample layout.
    pub format: SampleFormat,
    /// Swap halves so DC sits in the middle (interleaved IQ only).
    pub fft_shift: bool,
    /// Publish one of every `decimation` computed windows.
    pub decimation: u32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            window: Window::Rectangular,
            format: SampleFormat::InterleavedIq,
            fft_shift: true,
            decimation: 1,
        }
    }
}

impl SpectrumConfig {
    /// Check size and decimation bounds.
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(FlowError::invalid_parameter(
                "fft_size",
                self.fft_size as f64,
                format!("must be a power of two in [{MIN_FFT_SIZE}, {MAX_FFT_SIZE}]"),
            ));
        }
        if !(1..=MAX_DECIMATION).contains(&self.decimation) {
            return Err(FlowError::invalid_parameter(
                "decimation",
                f64::from(self.decimation),
                format!("must be in [1, {MAX_DECIMATION}]"),
            ));
        }
        Ok(())
    }

    /// Raw samples consumed per window.
    pub fn window_len(&self) -> usize {
        self.fft_size * self.format.samples_per_point()
    }

    /// Magnitudes produced per window.
    pub fn bin_count(&self) -> usize {
        match self.format {
            SampleFormat::InterleavedIq => self.fft_size,
            SampleFormat::Real => self.fft_size / 2 + 1,
        }
    }

    /// Whether the DC bin is moved to the centre of the output.
    pub fn is_shifted(&self) -> bool {
        self.fft_shift && self.format == SampleFormat::InterleavedIq
    }

    /// Frequency offset of `bin` from the tuned centre, in Hz.
    ///
    /// For IQ input the range is `[-fs/2, fs/2)`; for real input `[0, fs/2]`.
    pub fn bin_offset_hz(&self, bin: usize, sample_rate: f64) -> f64 {
        let n = self.fft_size as f64;
        let width = sample_rate / n;
        match self.format {
            SampleFormat::Real => bin as f64 * width,
            SampleFormat::InterleavedIq => {
                let half = self.fft_size / 2;
                let signed = if self.fft_shift {
                    bin as f64 - half as f64
                } else if bin < half {
                    bin as f64
                } else {
                    bin as f64 - n
                };
                signed * width
            }
        }
    }

    /// Parameter table exposed to the control bridge, filled with current values.
    ///
    /// Entries sit at their [`param`] index. Fails if a current value lies
    /// off its grid (an unvalidated config), so positions never shift.
    pub fn parameters(&self) -> Result<Vec<BlockParameter>> {
        let order = self.fft_size.trailing_zeros() as f64;
        Ok(vec![
            BlockParameter::new(
                "fft_order",
                MIN_FFT_SIZE.trailing_zeros() as f64,
                MAX_FFT_SIZE.trailing_zeros() as f64,
                1.0,
                order,
            )?,
            BlockParameter::new(
                "window",
                0.0,
                (Window::ALL.len() - 1) as f64,
                1.0,
                self.window.index() as f64,
            )?
            .with_unit(ParamUnit::Choice),
            BlockParameter::new(
                "fft_shift",
                0.0,
                1.0,
                1.0,
                f64::from(u8::from(self.fft_shift)),
            )?
            .with_unit(ParamUnit::Toggle),
            BlockParameter::new(
                "decimation",
                1.0,
                MAX_DECIMATION as f64,
                1.0,
                f64::from(self.decimation),
            )?,
        ])
    }

    /// Return a copy with parameter `index` set to `value`.
    ///
    /// The value must lie on the parameter's grid; `self` is left untouched.
    pub fn with_param(&self, index: usize, value: f64) -> Result<SpectrumConfig> {
        let mut target = self
            .parameters()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| FlowError::UnknownParameter {
                block: BlockId::SPECTRUM,
                index,
            })?;
        let value = target.set_exact(value)?;

        let mut next = self.clone();
        match index {
            param::FFT_ORDER => next.fft_size = 1usize << (value as u32),
            param::WINDOW => {
                next.window = Window::from_index(value as usize).unwrap_or_default();
            }
            param::FFT_SHIFT => next.fft_shift = value >= 0.5,
            param::DECIMATION => next.decimation = value as u32,
            _ => {}
        }
        next.validate()?;
        Ok(next)
    }
}

/// Windowed-FFT magnitude block over 8-bit samples.
pub struct SpectrumTransform {
    config: SpectrumConfig,
    fft: Fft,
    coeffs: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumTransform {
    /// Plan the FFT and precompute window coefficients.
    pub fn new(config: SpectrumConfig) -> Result<Self> {
        config.validate()?;
        let n = config.fft_size;
        Ok(Self {
            fft: Fft::new(n),
            coeffs: config.window.coefficients(n),
            scratch: vec![Complex::new(0.0, 0.0); n],
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    fn load(&mut self, window: &[i8]) {
        match self.config.format {
            SampleFormat::InterleavedIq => {
                for ((dst, pair), &w) in self
                    .scratch
                    .iter_mut()
                    .zip(window.chunks_exact(2))
                    .zip(&self.coeffs)
                {
                    let i = f32::from(pair[0]) * I8_SCALE;
                    let q = f32::from(pair[1]) * I8_SCALE;
                    *dst = Complex::new(i * w, q * w);
                }
            }
            SampleFormat::Real => {
                for ((dst, &s), &w) in self.scratch.iter_mut().zip(window).zip(&self.coeffs) {
                    *dst = Complex::new(f32::from(s) * I8_SCALE * w, 0.0);
                }
            }
        }
    }
}

impl Transform for SpectrumTransform {
    fn name(&self) -> &str {
        "spectrum"
    }

    fn input_len(&self) -> usize {
        self.config.window_len()
    }

    fn output_len(&self) -> usize {
        self.config.bin_count()
    }

    fn compute(&mut self, window: &[i8]) -> Result<Vec<f32>> {
        check_window(self.input_len(), window)?;
        self.load(window);
        self.fft.forward_complex(&mut self.scratch);

        let mut bins: Vec<f32> = self
            .scratch
            .iter()
            .take(self.config.bin_count())
            .map(|c| c.norm())
            .collect();
        if self.config.is_shifted() {
            fft_shift(&mut bins);
        }
        check_magnitudes(&bins)?;
        Ok(bins)
    }
}

/// A local maximum in a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Bin index.
    pub bin: usize,
    /// Linear magnitude.
    pub magnitude: f32,
}

/// Find up to `count` local maxima, strongest first.
///
/// Edge bins count as maxima when they exceed their single neighbour.
pub fn find_peaks(spectrum: &[f32], count: usize) -> Vec<Peak> {
    let n = spectrum.len();
    let mut peaks: Vec<Peak> = (0..n)
        .filter(|&i| {
            let m = spectrum[i];
            let left = i == 0 || m > spectrum[i - 1];
            let right = i + 1 == n || m >= spectrum[i + 1];
            m > 0.0 && left && right
        })
        .map(|bin| Peak {
            bin,
            magnitude: spectrum[bin],
        })
        .collect();

    peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    peaks.truncate(count);
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::iq_tone;

    fn small(format: SampleFormat) -> SpectrumConfig {
        SpectrumConfig {
            fft_size: 256,
            format,
            ..SpectrumConfig::default()
        }
    }

    #[test]
    fn default_matches_hackrf_pipeline() {
        let c = SpectrumConfig::default();
        assert_eq!(c.fft_size, 2048);
        assert_eq!(c.window_len(), 4096);
        assert_eq!(c.bin_count(), 2048);
        assert!(c.is_shifted());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        for size in [0, 32, 100, 131072] {
            let c = SpectrumConfig {
                fft_size: size,
                ..SpectrumConfig::default()
            };
            assert!(c.validate().is_err(), "size {size} accepted");
        }
        for decimation in [0, MAX_DECIMATION + 1] {
            let c = SpectrumConfig {
                decimation,
                ..SpectrumConfig::default()
            };
            assert!(c.validate().is_err(), "decimation {decimation} accepted");
        }
    }

    #[test]
    fn zero_window_gives_zero_magnitudes() {
        let mut t = SpectrumTransform::new(small(SampleFormat::InterleavedIq)).unwrap();
        let out = t.compute(&vec![0; 512]).unwrap();
        assert_eq!(out.len(), 256);
        assert!(out.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn real_format_is_one_sided() {
        let mut t = SpectrumTransform::new(small(SampleFormat::Real)).unwrap();
        assert_eq!(t.input_len(), 256);
        assert_eq!(t.output_len(), 129);
        assert_eq!(t.compute(&vec![64; 256]).unwrap().len(), 129);
    }

    #[test]
    fn malformed_window_is_reported() {
        let mut t = SpectrumTransform::new(small(SampleFormat::InterleavedIq)).unwrap();
        assert_eq!(
            t.compute(&[0; 10]),
            Err(FlowError::MalformedWindow {
                expected: 512,
                actual: 10
            })
        );
    }

    #[test]
    fn dc_lands_in_centre_when_shifted() {
        let mut t = SpectrumTransform::new(small(SampleFormat::InterleavedIq)).unwrap();
        let window: Vec<i8> = std::iter::repeat([64i8, 0]).take(256).flatten().collect();
        let out = t.compute(&window).unwrap();
        let peak = find_peaks(&out, 1)[0];
        assert_eq!(peak.bin, 128);
        assert!((peak.magnitude - 128.0).abs() < 1e-3);
    }

    #[test]
    fn tone_lands_on_expected_bin() {
        let config = small(SampleFormat::InterleavedIq);
        let sample_rate = 256_000.0;
        // 16 bins above DC at 1 kHz/bin.
        let window = iq_tone(sample_rate, 16_000.0, 0.9, 256);
        let mut t = SpectrumTransform::new(config.clone()).unwrap();
        let out = t.compute(&window).unwrap();

        let peak = find_peaks(&out, 1)[0];
        assert_eq!(peak.bin, 128 + 16);
        assert!((config.bin_offset_hz(peak.bin, sample_rate) - 16_000.0).abs() < 1e-6);
    }

    #[test]
    fn compute_is_repeatable() {
        let config = SpectrumConfig {
            window: Window::BlackmanHarris,
            ..small(SampleFormat::InterleavedIq)
        };
        let mut t = SpectrumTransform::new(config).unwrap();
        let a = iq_tone(1e6, 50e3, 0.5, 256);
        let b = iq_tone(1e6, -120e3, 0.7, 256);
        let first = t.compute(&a).unwrap();
        t.compute(&b).unwrap();
        assert_eq!(t.compute(&a).unwrap(), first);
    }

    #[test]
    fn unshifted_bin_offsets_wrap_negative() {
        let config = SpectrumConfig {
            fft_size: 8,
            fft_shift: false,
            ..SpectrumConfig::default()
        };
        assert_eq!(config.bin_offset_hz(1, 8.0), 1.0);
        assert_eq!(config.bin_offset_hz(7, 8.0), -1.0);
    }

    #[test]
    fn parameter_table_reflects_config() {
        let params = SpectrumConfig::default().parameters().unwrap();
        let ids: Vec<_> = params.iter().map(|p| p.id()).collect();
        assert_eq!(ids, ["fft_order", "window", "fft_shift", "decimation"]);
        assert_eq!(params[param::FFT_ORDER].value(), 11.0);
        assert_eq!(params[param::FFT_SHIFT].value(), 1.0);
    }

    #[test]
    fn parameter_table_never_shifts() {
        // every valid config yields all four entries at their fixed index
        let config = SpectrumConfig {
            fft_size: MAX_FFT_SIZE,
            window: Window::BlackmanHarris,
            fft_shift: false,
            decimation: MAX_DECIMATION,
            ..SpectrumConfig::default()
        };
        config.validate().unwrap();
        let params = config.parameters().unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(params[param::DECIMATION].id(), "decimation");
        assert_eq!(params[param::DECIMATION].value(), MAX_DECIMATION as f64);

        // an out-of-range value is an error, not a missing row
        let broken = SpectrumConfig {
            decimation: MAX_DECIMATION + 1,
            ..SpectrumConfig::default()
        };
        assert!(matches!(
            broken.parameters(),
            Err(FlowError::InvalidParameter { .. })
        ));
        assert!(broken.with_param(param::WINDOW, 1.0).is_err());
    }

    #[test]
    fn with_param_updates_copy() {
        let base = SpectrumConfig::default();
        let next = base.with_param(param::FFT_ORDER, 10.0).unwrap();
        assert_eq!(next.fft_size, 1024);
        assert_eq!(base.fft_size, 2048);

        let next = base.with_param(param::WINDOW, 1.0).unwrap();
        assert_eq!(next.window, Window::Hann);

        let next = base.with_param(param::DECIMATION, 4.0).unwrap();
        assert_eq!(next.decimation, 4);
    }

    #[test]
    fn with_param_rejects_off_grid_and_unknown() {
        let base = SpectrumConfig::default();
        assert!(matches!(
            base.with_param(param::FFT_ORDER, 20.0),
            Err(FlowError::InvalidParameter { .. })
        ));
        assert!(matches!(
            base.with_param(param::DECIMATION, 2.5),
            Err(FlowError::InvalidParameter { .. })
        ));
        assert!(matches!(
            base.with_param(9, 1.0),
            Err(FlowError::UnknownParameter { index: 9, .. })
        ));
    }

    #[test]
    fn peaks_sorted_strongest_first() {
        let spectrum = [0.0, 3.0, 1.0, 0.5, 5.0, 0.2, 2.0];
        let peaks = find_peaks(&spectrum, 2);
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].bin, 4);
        assert_eq!(peaks[1].bin, 1);
    }

    #[test]
    fn config_from_toml() {
        let c: SpectrumConfig = toml::from_str(
            r#"
            fft_size = 4096
            window = "blackman_harris"
            format = "real"
            "#,
        )
        .unwrap();
        assert_eq!(c.fft_size, 4096);
        assert_eq!(c.window, Window::BlackmanHarris);
        assert_eq!(c.format, SampleFormat::Real);
        assert!(c.fft_shift);
        assert_eq!(c.decimation, 1);
    }
}
