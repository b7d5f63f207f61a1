mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, OutputMode, RunConfig};
use log::info;
use sinegen::{RawSink, SampleSink, SignalEngine, StopHandle, WavSink, sinks};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let run = Args::parse().into_run()?;
    log_summary(&run);

    let stop = StopHandle::new();
    let stop_for_ctrlc = stop.clone();
    ctrlc::set_handler(move || {
        info!("interrupted, shutting down");
        stop_for_ctrlc.stop();
    })
    .context("failed to install Ctrl+C handler")?;

    let mut sink = open_sink(&run)?;
    let engine = SignalEngine::new(&run.request).with_stop(stop);
    let frames = sinks::run(engine, &mut sink)?;

    let seconds = frames as f64 / run.request.sample_rate() as f64;
    match &run.output {
        Some(path) => info!("saved {frames} frames ({seconds:.2} s) to {}", path.display()),
        None => info!("played {frames} frames ({seconds:.2} s)"),
    }
    Ok(())
}

/// Picks the sink once for the whole run.
fn open_sink(run: &RunConfig) -> Result<Box<dyn SampleSink>> {
    let channels = run.request.channel_count() as u16;
    let sample_rate = run.request.sample_rate();
    match (run.mode, &run.output) {
        (OutputMode::Wav, Some(path)) => {
            let sink = WavSink::create(path, channels, sample_rate, run.depth)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(sink))
        }
        (OutputMode::Bin, Some(path)) => {
            let sink = RawSink::create(path, channels, run.depth)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(sink))
        }
        (OutputMode::Stream, _) => open_stream(channels, sample_rate),
        (_, None) => anyhow::bail!("file output selected without a path"),
    }
}

#[cfg(feature = "stream")]
fn open_stream(channels: u16, sample_rate: u32) -> Result<Box<dyn SampleSink>> {
    let sink = sinegen::StreamSink::open(channels, sample_rate)
        .context("failed to open audio output")?;
    info!("press Ctrl+C to stop");
    Ok(Box::new(sink))
}

#[cfg(not(feature = "stream"))]
fn open_stream(_channels: u16, _sample_rate: u32) -> Result<Box<dyn SampleSink>> {
    anyhow::bail!("live output needs the `stream` feature; use `--mode wav` or `--mode bin`")
}

fn log_summary(run: &RunConfig) {
    let request = &run.request;
    let frequencies: Vec<f64> = request.channels().iter().map(|c| c.frequency()).collect();
    info!("Sample rate: {} Hz", request.sample_rate());
    info!("Channels:    {}", request.channel_count());
    info!("Frequencies: {frequencies:?} Hz");
    info!("Volume:      {}", request.volume());
    if run.mode != OutputMode::Stream {
        info!("Bits:        {}", run.depth.bits());
    }
    match request.duration() {
        Some(samples) => info!(
            "Duration:    {:.2} s",
            samples as f64 / request.sample_rate() as f64
        ),
        None => info!("Duration:    until interrupted"),
    }
    if let Some(glitch) = request.glitch() {
        info!(
            "Glitches:    {}, {} samples per burst",
            glitch.kind().name(),
            glitch.burst_length()
        );
        let (min, max) = glitch.interval().bounds_seconds();
        if min < max {
            info!("Interval:    random {min:.1} s - {max:.1} s");
        } else {
            info!("Interval:    fixed {min:.1} s");
        }
    }
}
