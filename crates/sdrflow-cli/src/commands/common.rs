//! Shared CLI helpers used across multiple commands.

use sdrflow_analysis::signal::quantize;
use sdrflow_runtime::FlowgraphConfig;
use std::path::Path;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Load a flowgraph configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FlowgraphConfig> {
    match path {
        Some(path) => Ok(FlowgraphConfig::load(path)?),
        None => Ok(FlowgraphConfig::default()),
    }
}

/// On-disk layout of an I/Q capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Raw interleaved signed bytes, as written by `hackrf_transfer`.
    Bin,
    /// Stereo WAV with I on the left channel and Q on the right.
    Wav,
}

impl CaptureFormat {
    /// Pick the format from the file extension (`.wav`, anything else is raw).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => CaptureFormat::Wav,
            _ => CaptureFormat::Bin,
        }
    }
}

/// Read a capture into interleaved i8 samples.
pub fn read_capture(path: &Path) -> anyhow::Result<Vec<i8>> {
    match CaptureFormat::from_path(path) {
        CaptureFormat::Bin => {
            let bytes = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
            Ok(bytes.into_iter().map(|b| b as i8).collect())
        }
        CaptureFormat::Wav => read_wav(path),
    }
}

fn read_wav(path: &Path) -> anyhow::Result<Vec<i8>> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 2 {
        anyhow::bail!(
            "{}: expected 2 channels (I/Q), found {}",
            path.display(),
            spec.channels
        );
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => reader.into_samples::<i8>().collect::<Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Int, bits) => {
            let scale = 1.0 / (1_i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| quantize(v as f32 * scale)))
                .collect::<Result<Vec<_>, _>>()?
        }
        (hound::SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .map(|s| s.map(quantize))
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(samples)
}

/// Write interleaved i8 samples in the format chosen by the extension.
pub fn write_capture(path: &Path, samples: &[i8], sample_rate: u32) -> anyhow::Result<()> {
    match CaptureFormat::from_path(path) {
        CaptureFormat::Bin => {
            let bytes: Vec<u8> = samples.iter().map(|&s| s as u8).collect();
            std::fs::write(path, bytes)
                .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))?;
        }
        CaptureFormat::Wav => {
            let spec = hound::WavSpec {
                channels: 2,
                sample_rate,
                bits_per_sample: 8,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::create(path, spec)?;
            for &s in samples {
                writer.write_sample(s)?;
            }
            writer.finalize()?;
        }
    }
    Ok(())
}
