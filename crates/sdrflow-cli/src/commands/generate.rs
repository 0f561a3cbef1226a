//! Test capture generation command.

use super::common::write_capture;
use clap::Args;
use sdrflow_analysis::signal::iq_tone;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output file (.bin raw i8 I/Q, .wav stereo 8-bit)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Tone offset from the centre frequency in Hz (negative = below)
    #[arg(long, default_value = "250000.0", allow_negative_numbers = true)]
    freq: f64,

    /// Sample rate in samples per second
    #[arg(long, default_value = "4000000")]
    sample_rate: u32,

    /// Duration in seconds
    #[arg(long, default_value = "0.01")]
    duration: f64,

    /// Amplitude (0-1)
    #[arg(long, default_value = "0.8")]
    amplitude: f32,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if args.sample_rate == 0 {
        anyhow::bail!("sample rate must be positive");
    }
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("duration must be a positive number of seconds");
    }
    let nyquist = f64::from(args.sample_rate) / 2.0;
    if args.freq.abs() > nyquist {
        anyhow::bail!(
            "tone offset {} Hz is outside +/-{} Hz at {} S/s",
            args.freq,
            nyquist,
            args.sample_rate
        );
    }

    let points = (args.duration * f64::from(args.sample_rate)).round() as usize;
    let samples = iq_tone(
        f64::from(args.sample_rate),
        args.freq,
        args.amplitude,
        points,
    );

    println!(
        "Generating {:.0} Hz tone, {} I/Q points at {} S/s...",
        args.freq, points, args.sample_rate
    );
    write_capture(&args.output, &samples, args.sample_rate)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
