//! sdrflow analysis - spectrum blocks for 8-bit SDR sample streams
//!
//! This crate provides the DSP kernels the flowgraph drives:
//!
//! - [`fft`] - FFT wrapper, window functions, FFT shift, dB conversion
//! - [`spectrum`] - the [`SpectrumTransform`] block and its configuration
//! - [`signal`] - test tones and i8 sample conversion
//!
//! ## Example
//!
//! ```rust
//! use sdrflow_analysis::{SpectrumConfig, SpectrumTransform, find_peaks, signal::iq_tone};
//! use sdrflow_core::Transform;
//!
//! let config = SpectrumConfig { fft_size: 1024, ..SpectrumConfig::default() };
//! let mut block = SpectrumTransform::new(config.clone()).unwrap();
//!
//! // 100 kHz above centre at 2 Msps
//! let window = iq_tone(2e6, 100e3, 0.8, 1024);
//! let bins = block.compute(&window).unwrap();
//!
//! let peak = find_peaks(&bins, 1)[0];
//! let offset = config.bin_offset_hz(peak.bin, 2e6);
//! assert!((offset - 100e3).abs() < 2e6 / 1024.0);
//! ```

pub mod fft;
pub mod signal;
pub mod spectrum;

pub use fft::{Fft, Window, fft_shift, magnitude_db};
pub use spectrum::{
    MAX_DECIMATION, MAX_FFT_SIZE, MIN_FFT_SIZE, Peak, SampleFormat, SpectrumConfig,
    SpectrumTransform, find_peaks,
};
