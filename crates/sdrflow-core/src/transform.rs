//! The transform-block contract.
//!
//! A [`Transform`] turns one fixed-length window of signed 8-bit samples into
//! an ordered sequence of `f32` values (for the spectrum block: one magnitude
//! per frequency bin). The scheduler only ever talks to this trait, so DSP
//! kernels stay black boxes behind it.
//!
//! ## Contract
//!
//! - `compute` is deterministic: the same window produces the same output.
//!   Scratch buffers may be reused between calls, but no result may depend
//!   on a previous window.
//! - `window.len()` must equal [`input_len`](Transform::input_len). A
//!   mismatch is reported as [`FlowError::MalformedWindow`] rather than a
//!   panic, so the scheduler can drop that window and continue.
//! - The returned vector has exactly [`output_len`](Transform::output_len)
//!   entries.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_core::{Transform, Result, check_window};
//!
//! /// Absolute value of each sample.
//! struct Rectify { len: usize }
//!
//! impl Transform for Rectify {
//!     fn name(&self) -> &str { "rectify" }
//!     fn input_len(&self) -> usize { self.len }
//!     fn output_len(&self) -> usize { self.len }
//!     fn compute(&mut self, window: &[i8]) -> Result<Vec<f32>> {
//!         check_window(self.len, window)?;
//!         Ok(window.iter().map(|&s| f32::from(s).abs()).collect())
//!     }
//! }
//!
//! let mut t = Rectify { len: 3 };
//! assert_eq!(t.compute(&[-1, 2, -3]).unwrap(), vec![1.0, 2.0, 3.0]);
//! assert!(t.compute(&[1]).is_err());
//! ```

use crate::error::{FlowError, Result};

/// A pure computational unit fed by the scheduler one window at a time.
pub trait Transform: Send {
    /// Short human-readable name for logs.
    fn name(&self) -> &str;

    /// Exact number of samples consumed per invocation.
    fn input_len(&self) -> usize;

    /// Number of values produced per invocation.
    fn output_len(&self) -> usize;

    /// Compute the output for one window.
    fn compute(&mut self, window: &[i8]) -> Result<Vec<f32>>;
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn compute(&mut self, window: &[i8]) -> Result<Vec<f32>> {
        (**self).compute(window)
    }
}

/// Verify a window length against the declared input size.
#[inline]
pub fn check_window(expected: usize, window: &[i8]) -> Result<()> {
    if window.len() == expected {
        Ok(())
    } else {
        Err(FlowError::MalformedWindow {
            expected,
            actual: window.len(),
        })
    }
}

/// Verify that every output value is a finite, non-negative magnitude.
pub fn check_magnitudes(output: &[f32]) -> Result<()> {
    match output.iter().position(|m| !m.is_finite() || *m < 0.0) {
        None => Ok(()),
        Some(bin) => Err(FlowError::TransformFailure(format!(
            "bin {bin} holds invalid magnitude {}",
            output[bin]
        ))),
    }
}
