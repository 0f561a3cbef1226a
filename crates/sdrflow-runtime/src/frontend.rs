//! Radio front-end settings block.
//!
//! The radio itself lives outside the flowgraph, but its tuning state is part
//! of what the control bridge adjusts. [`FrontendSettings`] holds those values
//! as [`BlockParameter`]s so they obey the same range/step rules as every
//! other block parameter.
//!
//! | Index | Id | Range | Step | Default |
//! |---|---|---|---|---|
//! | 0 | `freq` | 1 MHz – 6 GHz | 1 Hz | 2.48 GHz |
//! | 1 | `amp` | 0 – 1 | 1 | 1 |
//! | 2 | `lna` | 0 – 40 dB | 8 | 32 |
//! | 3 | `vga` | 0 – 62 dB | 2 | 14 |
//! | 4 | `sample_rate` | 1 – 20 Msps | 1 | 4 Msps |

use sdrflow_core::{BlockId, BlockParameter, FlowError, ParamUnit, Result};
use serde::{Deserialize, Serialize};

/// Parameter indices of the front-end block.
pub mod param {
    /// Centre frequency in Hz.
    pub const FREQ: usize = 0;
    /// RF amplifier on/off.
    pub const AMP: usize = 1;
    /// LNA gain in dB.
    pub const LNA: usize = 2;
    /// VGA gain in dB.
    pub const VGA: usize = 3;
    /// Sample rate in samples per second.
    pub const SAMPLE_RATE: usize = 4;
}

/// Plain front-end values as stored in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Centre frequency in Hz.
    pub freq: u64,
    /// RF amplifier (0 or 1).
    pub amp: u8,
    /// LNA gain, 0–40 in steps of 8.
    pub lna: u8,
    /// VGA gain, 0–62 in steps of 2.
    pub vga: u8,
    /// Sample rate in samples per second.
    pub sample_rate: u64,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            freq: 2_480_000_000,
            amp: 1,
            lna: 32,
            vga: 14,
            sample_rate: 4_000_000,
        }
    }
}

/// Validated front-end state.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontendSettings {
    params: Vec<BlockParameter>,
}

impl FrontendSettings {
    /// Build from plain values, rejecting anything off-range or off-grid.
    pub fn from_config(config: &FrontendConfig) -> Result<Self> {
        let mut params = vec![
            BlockParameter::new("freq", 1e6, 6e9, 1.0, 2.48e9)?.with_unit(ParamUnit::Hertz),
            BlockParameter::new("amp", 0.0, 1.0, 1.0, 1.0)?.with_unit(ParamUnit::Toggle),
            BlockParameter::new("lna", 0.0, 40.0, 8.0, 32.0)?.with_unit(ParamUnit::Decibels),
            BlockParameter::new("vga", 0.0, 62.0, 2.0, 14.0)?.with_unit(ParamUnit::Decibels),
            BlockParameter::new("sample_rate", 1e6, 20e6, 1.0, 4e6)?
                .with_unit(ParamUnit::SamplesPerSecond),
        ];
        let values = [
            config.freq as f64,
            f64::from(config.amp),
            f64::from(config.lna),
            f64::from(config.vga),
            config.sample_rate as f64,
        ];
        for (p, v) in params.iter_mut().zip(values) {
            p.set_exact(v)?;
        }
        Ok(Self { params })
    }

    /// Parameter table in index order.
    pub fn parameters(&self) -> &[BlockParameter] {
        &self.params
    }

    /// Set parameter `index`; the value must lie on its grid.
    pub fn set(&mut self, index: usize, value: f64) -> Result<f64> {
        let p = self
            .params
            .get_mut(index)
            .ok_or_else(|| FlowError::UnknownParameter {
                block: BlockId::FRONTEND,
                index,
            })?;
        p.set_exact(value)
    }

    fn get(&self, index: usize) -> f64 {
        self.params.get(index).map_or(0.0, BlockParameter::value)
    }

    /// Sample rate in samples per second.
    pub fn sample_rate(&self) -> f64 {
        self.get(param::SAMPLE_RATE)
    }

    /// Centre frequency in Hz.
    pub fn freq(&self) -> f64 {
        self.get(param::FREQ)
    }

    /// Back to plain values.
    pub fn to_config(&self) -> FrontendConfig {
        FrontendConfig {
            freq: self.get(param::FREQ) as u64,
            amp: self.get(param::AMP) as u8,
            lna: self.get(param::LNA) as u8,
            vga: self.get(param::VGA) as u8,
            sample_rate: self.get(param::SAMPLE_RATE) as u64,
        }
    }
}
