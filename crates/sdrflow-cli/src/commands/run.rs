//! Stream a capture through a flowgraph and report the final spectrum.

use super::common::{load_config, parse_key_val, read_capture};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use sdrflow_analysis::signal::iq_tone;
use sdrflow_analysis::{SampleFormat, SpectrumConfig, Window, find_peaks, magnitude_db};
use sdrflow_control::{ControlBridge, NoEndpoints};
use sdrflow_core::{BlockId, FlowError, Snapshot};
use sdrflow_runtime::{Flowgraph, FlowgraphConfig, FlowgraphHandle, FlowgraphSummary, IngressGate};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Export format for the final spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One row per bin: index, absolute frequency, magnitude, dB
    Csv,
    /// Snapshot metadata plus the raw bins
    Json,
}

#[derive(Args)]
pub struct RunArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Capture to stream (.bin raw i8 I/Q, .wav stereo)
    #[arg(short, long, conflicts_with = "tone")]
    input: Option<PathBuf>,

    /// Synthesize a tone at this offset from centre (Hz) instead of reading a file
    #[arg(long, allow_negative_numbers = true)]
    tone: Option<f64>,

    /// Tone duration in seconds
    #[arg(long, default_value = "0.01")]
    duration: f64,

    /// Samples per push
    #[arg(long, default_value = "4096")]
    chunk: usize,

    /// FFT size (overrides the configuration)
    #[arg(long)]
    fft_size: Option<usize>,

    /// Window function (overrides the configuration)
    #[arg(long)]
    window: Option<Window>,

    /// Block parameter updates by id (e.g., "lna=16"), applied before streaming
    #[arg(long = "set", value_parser = parse_key_val, number_of_values = 1)]
    set: Vec<(String, String)>,

    /// Write the final spectrum here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export format (inferred from the output extension when omitted)
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Number of peaks to print
    #[arg(long, default_value = "5")]
    peaks: usize,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(size) = args.fft_size {
        config.transform.fft_size = size;
    }
    if let Some(window) = args.window {
        config.transform.window = window;
    }
    config.validate()?;

    let limit = max_chunk(config.buffer_capacity, config.transform.window_len());
    if args.chunk == 0 || args.chunk > limit {
        anyhow::bail!(
            "chunk size {} must be between 1 and {} (buffer capacity {} less a partial window)",
            args.chunk,
            limit,
            config.buffer_capacity
        );
    }

    let samples = load_samples(&args, &config)?;
    let export = match &args.output {
        Some(path) => Some((path.clone(), export_format(path, args.format)?)),
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (summary, snapshot, handle) = runtime.block_on(stream(&args, config, samples))?;

    report(&args, &handle, &summary, &snapshot);

    if let Some((path, format)) = export {
        if snapshot.generation() == 0 {
            anyhow::bail!("no spectrum to export: fewer samples than one window");
        }
        let frontend = handle.frontend();
        write_spectrum(
            &path,
            format,
            &snapshot,
            &handle.active_config(),
            frontend.freq(),
            frontend.sample_rate(),
        )?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}

fn load_samples(args: &RunArgs, config: &FlowgraphConfig) -> anyhow::Result<Vec<i8>> {
    if let Some(path) = &args.input {
        println!("Reading {}...", path.display());
        return read_capture(path);
    }
    let Some(freq) = args.tone else {
        anyhow::bail!("No input specified. Use --input or --tone");
    };
    let sample_rate = config.frontend.sample_rate as f64;
    let points = (args.duration * sample_rate).round() as usize;
    println!("Synthesizing {:.0} Hz tone, {} I/Q points...", freq, points);
    let tone = iq_tone(sample_rate, freq, 0.8, points);
    Ok(match config.transform.format {
        SampleFormat::InterleavedIq => tone,
        // real input: keep the in-phase rail only
        SampleFormat::Real => tone.into_iter().step_by(2).collect(),
    })
}

async fn stream(
    args: &RunArgs,
    config: FlowgraphConfig,
    samples: Vec<i8>,
) -> anyhow::Result<(FlowgraphSummary, Arc<Snapshot>, FlowgraphHandle)> {
    let (flowgraph, mut gate, handle) = Flowgraph::new(config)?;

    let bridge = ControlBridge::new(Arc::new(handle.clone()), Arc::new(NoEndpoints));
    for block in [BlockId::SPECTRUM, BlockId::FRONTEND] {
        bridge.add_block("", block, &handle.parameters(block)?)?;
    }
    for (id, raw) in &args.set {
        let value: f64 = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value '{}' for '{}'", raw, id))?;
        let applied = bridge.notify(id, value)?;
        tracing::info!(id = id.as_str(), value, applied, "parameter set");
    }

    let stopper = handle.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        stopper.stop();
    })?;

    let runner = tokio::spawn(flowgraph.run());

    println!(
        "Streaming {} samples in chunks of {}...",
        samples.len(),
        args.chunk
    );
    feed(&mut gate, &handle, &samples, args.chunk).await?;
    drain(&handle).await;

    handle.stop();
    let summary = runner.await?;
    Ok((summary, handle.snapshot(), handle))
}

/// Largest chunk that always fits beside a leftover partial window.
fn max_chunk(capacity: usize, window: usize) -> usize {
    capacity.saturating_sub(window.saturating_sub(1))
}

async fn feed(
    gate: &mut IngressGate,
    handle: &FlowgraphHandle,
    samples: &[i8],
    chunk: usize,
) -> anyhow::Result<()> {
    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    for piece in samples.chunks(chunk) {
        loop {
            match gate.push(piece).await {
                Ok(true) => break,
                Ok(false) => {
                    // nothing left for the scheduler to drain: retrying cannot succeed
                    let window = handle.spectrum_config().window_len() as u64;
                    if handle.stats().pending_samples() < window {
                        pb.abandon_with_message("stalled");
                        anyhow::bail!(
                            "chunk of {} samples cannot fit beside {} buffered samples (window {})",
                            piece.len(),
                            handle.stats().pending_samples(),
                            window
                        );
                    }
                    tokio::task::yield_now().await;
                }
                Err(FlowError::ShutdownInProgress) => {
                    pb.abandon_with_message("stopped");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
        pb.inc(piece.len() as u64);
    }

    pb.finish_with_message("done");
    Ok(())
}

/// Let the scheduler consume every complete window still buffered.
async fn drain(handle: &FlowgraphHandle) {
    loop {
        let window = handle.spectrum_config().window_len() as u64;
        if handle.is_stopping() || handle.stats().pending_samples() < window {
            return;
        }
        tokio::task::yield_now().await;
    }
}

fn report(args: &RunArgs, handle: &FlowgraphHandle, summary: &FlowgraphSummary, snapshot: &Snapshot) {
    let stats = &summary.stats;
    println!("\nStats:");
    println!(
        "  Pushes:  {} accepted, {} rejected",
        stats.pushes_accepted, stats.pushes_rejected
    );
    println!(
        "  Windows: {} computed, {} published, {} decimated, {} faults",
        stats.windows_computed, stats.windows_published, stats.windows_decimated, stats.faults
    );
    println!("  Left in buffer: {} samples", summary.discarded_samples);

    if snapshot.generation() == 0 {
        println!("\nNo spectrum computed (fewer samples than one window)");
        return;
    }

    let config = handle.active_config();
    let frontend = handle.frontend();
    println!(
        "\nSpectrum generation {} ({} bins, {} window):",
        snapshot.generation(),
        snapshot.len(),
        config.window
    );
    println!("  {:>6} {:>14} {:>10}", "bin", "offset (Hz)", "level (dB)");
    for peak in find_peaks(snapshot.bins(), args.peaks) {
        let db = magnitude_db(&[peak.magnitude])[0];
        println!(
            "  {:>6} {:>14.0} {:>10.1}",
            peak.bin,
            config.bin_offset_hz(peak.bin, frontend.sample_rate()),
            db
        );
    }
}

fn export_format(path: &Path, explicit: Option<ExportFormat>) -> anyhow::Result<ExportFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(ExportFormat::Csv),
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ExportFormat::Json),
        _ => anyhow::bail!(
            "cannot infer export format from '{}'; use --format",
            path.display()
        ),
    }
}

#[derive(serde::Serialize)]
struct SpectrumExport<'a> {
    generation: u64,
    center_freq: f64,
    sample_rate: f64,
    config: &'a SpectrumConfig,
    bins: &'a [f32],
}

fn write_spectrum(
    path: &Path,
    format: ExportFormat,
    snapshot: &Snapshot,
    config: &SpectrumConfig,
    center_freq: f64,
    sample_rate: f64,
) -> anyhow::Result<()> {
    let body = match format {
        ExportFormat::Csv => {
            let mut out = String::from("bin,freq_hz,magnitude,db\n");
            let db = magnitude_db(snapshot.bins());
            for (bin, (&m, d)) in snapshot.bins().iter().zip(db).enumerate() {
                let freq = center_freq + config.bin_offset_hz(bin, sample_rate);
                out.push_str(&format!("{bin},{freq:.1},{m},{d:.2}\n"));
            }
            out
        }
        ExportFormat::Json => serde_json::to_string_pretty(&SpectrumExport {
            generation: snapshot.generation(),
            center_freq,
            sample_rate,
            config,
            bins: snapshot.bins(),
        })?,
    };
    std::fs::write(path, body)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_limit_leaves_room_for_partial_window() {
        assert_eq!(max_chunk(65536, 4096), 61441);
        assert_eq!(max_chunk(1024, 1), 1024);
        assert_eq!(max_chunk(128, 512), 0);
    }

    #[test]
    fn export_format_from_extension() {
        assert_eq!(
            export_format(Path::new("out.csv"), None).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(
            export_format(Path::new("out.JSON"), None).unwrap(),
            ExportFormat::Json
        );
        assert_eq!(
            export_format(Path::new("out.txt"), Some(ExportFormat::Json)).unwrap(),
            ExportFormat::Json
        );
        assert!(export_format(Path::new("out.txt"), None).is_err());
    }

    #[test]
    fn csv_export_has_one_row_per_bin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        let (store, mut publisher) = sdrflow_core::SnapshotStore::new();
        publisher.publish(vec![0.0, 1.0, 0.5, 0.25]);
        let config = SpectrumConfig {
            fft_size: 4,
            ..SpectrumConfig::default()
        };

        write_spectrum(&path, ExportFormat::Csv, &store.read(), &config, 100e6, 4e6).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "bin,freq_hz,magnitude,db");
        // shifted IQ: bin 0 sits at -fs/2
        assert!(lines[1].starts_with("0,98000000.0,0,"));
        assert!(lines[2].starts_with("1,99000000.0,1,0.00"));
    }

    #[test]
    fn json_export_carries_bins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let (store, mut publisher) = sdrflow_core::SnapshotStore::new();
        publisher.publish(vec![2.0, 3.0]);

        write_spectrum(
            &path,
            ExportFormat::Json,
            &store.read(),
            &SpectrumConfig::default(),
            2.48e9,
            4e6,
        )
        .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["generation"], 1);
        assert_eq!(value["bins"].as_array().unwrap().len(), 2);
        assert_eq!(value["config"]["window"], "rectangular");
    }
}
