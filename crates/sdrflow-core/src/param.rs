//! Range- and step-constrained block parameters.
//!
//! A [`BlockParameter`] is the runtime value behind one host-side control
//! (slider, frequency picker, time picker). It carries its own range and step
//! grid and refuses any value that falls outside them, so the invariant
//!
//! ```text
//! min ≤ value ≤ max   and   (value - min) / step ∈ ℕ
//! ```
//!
//! holds for its whole lifetime.
//!
//! Values are `f64`: front-end frequencies reach 6 GHz with 1 Hz resolution,
//! which `f32` cannot represent.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_core::{BlockParameter, ParamUnit};
//!
//! // LNA gain: 0–40 dB in steps of 8
//! let mut lna = BlockParameter::new("lna", 0.0, 40.0, 8.0, 32.0)
//!     .unwrap()
//!     .with_unit(ParamUnit::Decibels);
//!
//! assert_eq!(lna.snap(21.0), 24.0);
//! assert_eq!(lna.set(17.0).unwrap(), 16.0);
//! assert!(lna.set(48.0).is_err());
//! ```

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Tolerance when checking whether a value lies on the step grid.
const GRID_EPSILON: f64 = 1e-9;

/// Unit used when formatting a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamUnit {
    /// Frequency in Hz.
    Hertz,
    /// Gain in dB.
    Decibels,
    /// Sample count.
    Samples,
    /// Rate in samples per second.
    SamplesPerSecond,
    /// Time in seconds.
    Seconds,
    /// Index into a fixed list of choices.
    Choice,
    /// On/off switch (0 or 1).
    Toggle,
    /// Unitless.
    #[default]
    None,
}

impl ParamUnit {
    /// Short suffix for display.
    pub fn suffix(self) -> &'static str {
        match self {
            ParamUnit::Hertz => "Hz",
            ParamUnit::Decibels => "dB",
            ParamUnit::Samples => "smp",
            ParamUnit::SamplesPerSecond => "S/s",
            ParamUnit::Seconds => "s",
            ParamUnit::Choice | ParamUnit::Toggle | ParamUnit::None => "",
        }
    }
}

/// A numeric parameter constrained to `[min, max]` on a `step` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockParameter {
    id: String,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    default: f64,
    #[serde(default)]
    unit: ParamUnit,
}

impl BlockParameter {
    /// Create a parameter; `value` is snapped onto the grid and becomes the default.
    ///
    /// Fails if the range is empty or inverted, the step is not strictly
    /// positive, any bound is non-finite, or `value` lies outside the range.
    pub fn new(id: impl Into<String>, min: f64, max: f64, step: f64, value: f64) -> Result<Self> {
        let id = id.into();
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(FlowError::invalid_parameter(id, value, "non-finite bounds"));
        }
        if min > max {
            return Err(FlowError::invalid_parameter(
                id,
                value,
                format!("min {min} exceeds max {max}"),
            ));
        }
        if step <= 0.0 {
            return Err(FlowError::invalid_parameter(
                id,
                value,
                format!("step {step} must be positive"),
            ));
        }

        let mut param = Self {
            id,
            value: min,
            min,
            max,
            step,
            default: min,
            unit: ParamUnit::None,
        };
        let snapped = param.set(value)?;
        param.default = snapped;
        Ok(param)
    }

    /// Set the display unit (builder style).
    pub fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Parameter key (e.g. a slider id or `"fft_order"`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current value; always on the grid and inside the range.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Grid spacing.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Value assigned at construction.
    #[inline]
    pub fn default_value(&self) -> f64 {
        self.default
    }

    /// Display unit.
    #[inline]
    pub fn unit(&self) -> ParamUnit {
        self.unit
    }

    /// Number of grid points in the range (at least 1).
    pub fn step_count(&self) -> u64 {
        ((self.max - self.min) / self.step + GRID_EPSILON).floor() as u64 + 1
    }

    /// Highest value reachable from `min` in whole steps.
    pub fn grid_max(&self) -> f64 {
        self.min + (self.step_count() - 1) as f64 * self.step
    }

    /// Nearest grid point to `value`, clamped into the range.
    pub fn snap(&self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        let max_steps = (self.step_count() - 1) as f64;
        self.min + steps.clamp(0.0, max_steps) * self.step
    }

    /// Whether `value` lies in range and on the grid.
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() || value < self.min - GRID_EPSILON || value > self.max + GRID_EPSILON
        {
            return false;
        }
        let steps = (value - self.min) / self.step;
        (steps - steps.round()).abs() <= GRID_EPSILON * steps.abs().max(1.0)
    }

    /// Set a new value, snapping it onto the grid.
    ///
    /// Values outside `[min, max]` (or non-finite) are rejected and the
    /// current value is kept. Returns the value actually stored.
    pub fn set(&mut self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(FlowError::invalid_parameter(
                self.id.clone(),
                value,
                "value is not finite",
            ));
        }
        if value < self.min || value > self.max {
            return Err(FlowError::invalid_parameter(
                self.id.clone(),
                value,
                format!("outside range [{}, {}]", self.min, self.max),
            ));
        }
        self.value = self.snap(value);
        Ok(self.value)
    }

    /// Set a value that must already lie on the grid.
    ///
    /// Used at block boundaries, where callers are expected to have snapped.
    pub fn set_exact(&mut self, value: f64) -> Result<f64> {
        if !self.accepts(value) {
            return Err(FlowError::invalid_parameter(
                self.id.clone(),
                value,
                format!(
                    "not on grid [{}, {}] step {}",
                    self.min, self.max, self.step
                ),
            ));
        }
        self.set(value)
    }

    /// Set a value, clamping out-of-range input instead of rejecting it.
    pub fn set_clamped(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            self.value = self.snap(value);
        }
        self.value
    }

    /// Restore the construction-time value.
    pub fn reset(&mut self) {
        self.value = self.default;
    }

    /// Map the current value to `[0, 1]` across the range.
    pub fn normalized(&self) -> f64 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }

    /// Format the current value with its unit suffix.
    pub fn format_value(&self) -> String {
        let suffix = self.unit.suffix();
        let decimals = if self.step.fract() == 0.0 { 0 } else { 3 };
        if suffix.is_empty() {
            format!("{:.*}", decimals, self.value)
        } else {
            format!("{:.*} {}", decimals, self.value, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snaps_initial_value() {
        let p = BlockParameter::new("vga", 0.0, 62.0, 2.0, 13.0).unwrap();
        assert_eq!(p.value(), 14.0);
        assert_eq!(p.default_value(), 14.0);
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(BlockParameter::new("x", 1.0, 0.0, 1.0, 0.5).is_err());
        assert!(BlockParameter::new("x", 0.0, 1.0, 0.0, 0.5).is_err());
        assert!(BlockParameter::new("x", 0.0, 1.0, -1.0, 0.5).is_err());
        assert!(BlockParameter::new("x", 0.0, f64::INFINITY, 1.0, 0.5).is_err());
        assert!(BlockParameter::new("x", 0.0, 1.0, 0.5, 2.0).is_err());
    }

    #[test]
    fn max_off_grid_snaps_down() {
        // 0..10 step 3 → grid {0, 3, 6, 9}
        let mut p = BlockParameter::new("x", 0.0, 10.0, 3.0, 0.0).unwrap();
        assert_eq!(p.step_count(), 4);
        assert_eq!(p.grid_max(), 9.0);
        assert_eq!(p.set(10.0).unwrap(), 9.0);
        assert!(!p.accepts(10.0));
        assert!(p.accepts(9.0));
    }

    #[test]
    fn set_rejects_out_of_range_and_keeps_value() {
        let mut p = BlockParameter::new("lna", 0.0, 40.0, 8.0, 32.0).unwrap();
        let err = p.set(41.0).unwrap_err();
        assert!(matches!(err, FlowError::InvalidParameter { .. }));
        assert!(p.set(f64::NAN).is_err());
        assert_eq!(p.value(), 32.0);
    }

    #[test]
    fn exact_set_requires_grid_point() {
        let mut p = BlockParameter::new("vga", 0.0, 62.0, 2.0, 14.0).unwrap();
        assert_eq!(p.set_exact(20.0).unwrap(), 20.0);
        assert!(p.set_exact(21.0).is_err());
        assert!(p.set_exact(64.0).is_err());
        assert_eq!(p.value(), 20.0);
    }

    #[test]
    fn clamped_set() {
        let mut p = BlockParameter::new("amp", 0.0, 1.0, 1.0, 0.0).unwrap();
        assert_eq!(p.set_clamped(7.0), 1.0);
        assert_eq!(p.set_clamped(-3.0), 0.0);
        assert_eq!(p.set_clamped(f64::NAN), 0.0);
    }

    #[test]
    fn large_frequency_grid_is_exact() {
        let mut p = BlockParameter::new("freq", 1e6, 6e9, 1.0, 2.48e9).unwrap();
        assert_eq!(p.set(2_400_000_123.4).unwrap(), 2_400_000_123.0);
        assert!(p.accepts(5_999_999_999.0));
    }

    #[test]
    fn normalized_and_reset() {
        let mut p = BlockParameter::new("x", 0.0, 100.0, 1.0, 25.0).unwrap();
        assert!((p.normalized() - 0.25).abs() < 1e-12);
        p.set(80.0).unwrap();
        p.reset();
        assert_eq!(p.value(), 25.0);
    }

    #[test]
    fn format_with_unit() {
        let p = BlockParameter::new("vga", 0.0, 62.0, 2.0, 14.0)
            .unwrap()
            .with_unit(ParamUnit::Decibels);
        assert_eq!(p.format_value(), "14 dB");
    }
}
