//! Live playback through the default output device.

use super::{FrameAligner, SampleSink, check_channels};
use crate::core::Frame;
use crate::error::SinkError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

/// Frames per block handed to the audio callback.
pub const BLOCK_FRAMES: usize = 1024;
/// Blocks that may wait for the device before `write_frame` blocks.
const QUEUE_BLOCKS: usize = 4;
/// Longest wait for the device to take a block or play out the queue.
pub const DEVICE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared between the producer and the audio callback.
#[derive(Debug, Default)]
struct Shared {
    /// Blocks sent but not yet fully played
    pending: AtomicUsize,
    failed: AtomicBool,
    /// Silent samples output because the queue ran dry
    underruns: AtomicU64,
}

/// Callback side of the block queue.
///
/// Hands out queued samples in order, releases each block from the pending
/// count as soon as its last sample is played, and fills with silence when
/// nothing is queued. Never logs or blocks.
struct BlockPlayer {
    receiver: Receiver<Vec<f32>>,
    shared: Arc<Shared>,
    current: Vec<f32>,
    position: usize,
    holding: bool,
    started: bool,
}

impl BlockPlayer {
    fn new(receiver: Receiver<Vec<f32>>, shared: Arc<Shared>) -> Self {
        Self {
            receiver,
            shared,
            current: Vec::new(),
            position: 0,
            holding: false,
            started: false,
        }
    }

    fn fill<T>(&mut self, data: &mut [T])
    where
        T: Sample + FromSample<f32>,
    {
        for slot in data.iter_mut() {
            *slot = match self.next_sample() {
                Some(sample) => T::from_sample(sample),
                None => T::EQUILIBRIUM,
            };
        }
    }

    fn next_sample(&mut self) -> Option<f32> {
        while self.position >= self.current.len() {
            self.release();
            match self.receiver.try_recv() {
                Ok(block) => {
                    self.current = block;
                    self.position = 0;
                    self.holding = true;
                    self.started = true;
                }
                Err(TryRecvError::Empty) => {
                    // Silence before the first block is startup, not an underrun
                    if self.started {
                        self.shared.underruns.fetch_add(1, Ordering::Relaxed);
                    }
                    return None;
                }
                // A closed channel is the normal end of a run
                Err(TryRecvError::Disconnected) => return None,
            }
        }

        let sample = self.current[self.position];
        self.position += 1;
        if self.position == self.current.len() {
            self.release();
        }
        Some(sample)
    }

    fn release(&mut self) {
        if self.holding {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
            self.holding = false;
        }
        self.current.clear();
        self.position = 0;
    }
}

/// Queues `block` for the callback, waiting at most `timeout` for room.
fn send_block_within(
    sender: &SyncSender<Vec<f32>>,
    shared: &Shared,
    block: Vec<f32>,
    timeout: Duration,
) -> Result<(), SinkError> {
    let deadline = Instant::now() + timeout;
    shared.pending.fetch_add(1, Ordering::SeqCst);
    let mut block = block;
    loop {
        let err = match sender.try_send(block) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(returned)) => {
                if shared.failed.load(Ordering::SeqCst) {
                    SinkError::Disconnected
                } else if Instant::now() >= deadline {
                    SinkError::Stalled
                } else {
                    block = returned;
                    thread::sleep(POLL_INTERVAL);
                    continue;
                }
            }
            Err(TrySendError::Disconnected(_)) => SinkError::Disconnected,
        };
        shared.pending.fetch_sub(1, Ordering::SeqCst);
        return Err(err);
    }
}

/// Waits until every sent block has played.
///
/// Returns `Ok(false)` if `timeout` passes first, and an error if the device
/// reported a failure.
fn wait_for_drain(shared: &Shared, timeout: Duration) -> Result<bool, SinkError> {
    let deadline = Instant::now() + timeout;
    while shared.pending.load(Ordering::SeqCst) > 0 {
        if shared.failed.load(Ordering::SeqCst) {
            return Err(SinkError::Disconnected);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(true)
}

/// Plays frames on the default output device.
///
/// Frames are grouped into blocks of [`BLOCK_FRAMES`] and sent over a
/// bounded channel; `write_frame` blocks while the device is
/// [`QUEUE_BLOCKS`] blocks behind, and gives up with
/// [`SinkError::Stalled`] after [`DEVICE_TIMEOUT`]. The callback outputs
/// silence when it runs dry.
pub struct StreamSink {
    _stream: cpal::Stream,
    sender: Option<SyncSender<Vec<f32>>>,
    shared: Arc<Shared>,
    aligner: FrameAligner,
    rows: Vec<f64>,
    block: Vec<f32>,
    channels: usize,
    reported_underruns: u64,
}

impl StreamSink {
    /// Opens the default output device at the given channel count and rate.
    pub fn open(channels: u16, sample_rate: u32) -> Result<Self, SinkError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SinkError::NoDevice)?;
        let format = device.default_output_config()?.sample_format();
        let config = StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (sender, receiver) = mpsc::sync_channel(QUEUE_BLOCKS);
        let shared = Arc::new(Shared::default());
        let player = BlockPlayer::new(receiver, shared.clone());

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, player, shared.clone())?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, player, shared.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, player, shared.clone())?,
            other => return Err(SinkError::UnsupportedFormat(other)),
        };
        stream.play()?;
        info!(
            "streaming to {} ({channels} ch, {sample_rate} Hz, {format})",
            device.name().unwrap_or_else(|_| "unknown device".into())
        );

        let channels = channels as usize;
        Ok(Self {
            _stream: stream,
            sender: Some(sender),
            shared,
            aligner: FrameAligner::new(channels),
            rows: Vec::new(),
            block: Vec::with_capacity(BLOCK_FRAMES * channels),
            channels,
            reported_underruns: 0,
        })
    }

    fn send_block(&mut self) -> Result<(), SinkError> {
        if self.block.is_empty() {
            return Ok(());
        }
        let sender = self.sender.as_ref().ok_or(SinkError::Finished)?;
        let fresh = Vec::with_capacity(BLOCK_FRAMES * self.channels);
        let block = std::mem::replace(&mut self.block, fresh);
        send_block_within(sender, &self.shared, block, DEVICE_TIMEOUT)?;
        self.report_underruns();
        Ok(())
    }

    fn report_underruns(&mut self) {
        let underruns = self.shared.underruns.load(Ordering::Relaxed);
        if underruns > self.reported_underruns {
            warn!(
                "output underrun ({} samples of silence, {underruns} so far)",
                underruns - self.reported_underruns
            );
            self.reported_underruns = underruns;
        }
    }

    fn check_device(&self) -> Result<(), SinkError> {
        if self.shared.failed.load(Ordering::SeqCst) {
            return Err(SinkError::Disconnected);
        }
        Ok(())
    }
}

impl SampleSink for StreamSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.check_device()?;
        check_channels(self.channels, frame)?;
        self.aligner.push(frame, &mut self.rows);
        self.block.extend(self.rows.drain(..).map(|s| s as f32));
        if self.block.len() >= BLOCK_FRAMES * self.channels {
            self.send_block()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.aligner.flush(&mut self.rows);
        self.block.extend(self.rows.drain(..).map(|s| s as f32));
        self.send_block()?;
        self.sender = None;

        // Let queued audio play out
        if wait_for_drain(&self.shared, DEVICE_TIMEOUT)? {
            debug!("live stream drained");
        } else {
            warn!(
                "audio output did not drain within {} s, stopping anyway",
                DEVICE_TIMEOUT.as_secs()
            );
        }
        self.report_underruns();
        Ok(())
    }
}

/// Builds an output stream that plays blocks through `player`.
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut player: BlockPlayer,
    shared: Arc<Shared>,
) -> Result<cpal::Stream, SinkError>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| player.fill(data),
        move |err| {
            error!("audio stream error: {err}");
            shared.failed.store(true, Ordering::SeqCst);
        },
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> (SyncSender<Vec<f32>>, Arc<Shared>, BlockPlayer) {
        let (sender, receiver) = mpsc::sync_channel(QUEUE_BLOCKS);
        let shared = Arc::new(Shared::default());
        let player = BlockPlayer::new(receiver, shared.clone());
        (sender, shared, player)
    }

    #[test]
    fn test_blocks_play_in_order_and_release_pending() {
        let (sender, shared, mut player) = player();
        let timeout = Duration::from_millis(50);
        send_block_within(&sender, &shared, vec![0.1, 0.2], timeout).unwrap();
        send_block_within(&sender, &shared, vec![0.3], timeout).unwrap();
        assert_eq!(shared.pending.load(Ordering::SeqCst), 2);

        let mut out = [0.0_f32; 2];
        player.fill(&mut out);
        assert_eq!(out, [0.1, 0.2]);
        assert_eq!(shared.pending.load(Ordering::SeqCst), 1);

        let mut out = [9.0_f32; 1];
        player.fill(&mut out);
        assert_eq!(out, [0.3]);
        assert_eq!(shared.pending.load(Ordering::SeqCst), 0);
        assert!(wait_for_drain(&shared, timeout).unwrap());
    }

    #[test]
    fn test_underrun_outputs_silence_and_is_counted() {
        let (sender, shared, mut player) = player();

        // Nothing queued yet: silence, but not an underrun
        let mut out = [1_i16; 4];
        player.fill(&mut out);
        assert_eq!(out, [0; 4]);
        assert_eq!(shared.underruns.load(Ordering::Relaxed), 0);

        send_block_within(&sender, &shared, vec![0.5], Duration::from_millis(50)).unwrap();
        let mut out = [7.0_f32; 3];
        player.fill(&mut out);
        assert_eq!(out, [0.5, 0.0, 0.0]);
        assert_eq!(shared.underruns.load(Ordering::Relaxed), 2);

        // Closing the queue ends the run quietly
        drop(sender);
        let mut out = [7.0_f32; 2];
        player.fill(&mut out);
        assert_eq!(out, [0.0, 0.0]);
        assert_eq!(shared.underruns.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_drain_gives_up_when_device_stops_playing() {
        let (sender, shared, _player) = player();
        send_block_within(&sender, &shared, vec![0.0; 8], Duration::from_millis(50)).unwrap();
        drop(sender);

        let started = Instant::now();
        assert!(!wait_for_drain(&shared, Duration::from_millis(30)).unwrap());
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(shared.pending.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drain_reports_device_failure() {
        let (sender, shared, _player) = player();
        send_block_within(&sender, &shared, vec![0.0], Duration::from_millis(50)).unwrap();
        shared.failed.store(true, Ordering::SeqCst);
        assert!(matches!(
            wait_for_drain(&shared, Duration::from_secs(1)),
            Err(SinkError::Disconnected)
        ));
    }

    #[test]
    fn test_send_stalls_when_queue_never_empties() {
        let (sender, shared, _player) = player();
        let timeout = Duration::from_millis(30);
        for _ in 0..QUEUE_BLOCKS {
            send_block_within(&sender, &shared, vec![0.0], timeout).unwrap();
        }
        assert!(matches!(
            send_block_within(&sender, &shared, vec![0.0], timeout),
            Err(SinkError::Stalled)
        ));
        assert_eq!(shared.pending.load(Ordering::SeqCst), QUEUE_BLOCKS);
    }

    #[test]
    fn test_send_fails_once_player_is_gone() {
        let (sender, shared, player) = player();
        drop(player);
        assert!(matches!(
            send_block_within(&sender, &shared, vec![0.0], Duration::from_millis(30)),
            Err(SinkError::Disconnected)
        ));
        assert_eq!(shared.pending.load(Ordering::SeqCst), 0);
    }
}
