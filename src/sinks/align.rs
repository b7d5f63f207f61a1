//! Realigns frames whose channels were shortened by skip glitches.

use crate::core::Frame;
use log::warn;
use std::collections::VecDeque;

/// Channel lag, in samples, at which the aligner first warns. Each further
/// warning waits for the lag to double.
pub const LAG_WARN_SAMPLES: usize = 4096;

/// Per-channel FIFO that turns frames with skipped slots into complete,
/// interleaved rows.
///
/// A skipped sample shortens only its own channel, so later samples of that
/// channel move up. Rows are released as soon as every channel has a sample
/// queued; with shared glitch timing that is always immediately.
///
/// With independent glitch timing the channels skip different amounts, and
/// the difference is never made up: on an unbounded run the queue of the
/// least-skipped channel keeps growing and the channels drift apart.
#[derive(Debug, Clone)]
pub struct FrameAligner {
    queues: Vec<VecDeque<f64>>,
    warn_at: usize,
}

impl FrameAligner {
    pub fn new(channels: usize) -> Self {
        Self {
            queues: vec![VecDeque::new(); channels],
            warn_at: LAG_WARN_SAMPLES,
        }
    }

    pub fn channels(&self) -> usize {
        self.queues.len()
    }

    /// Queues a frame and appends every row that became complete to `out`,
    /// interleaved in channel order.
    ///
    /// Returns the number of rows appended. The frame must have exactly
    /// `channels()` slots.
    pub fn push(&mut self, frame: &Frame, out: &mut Vec<f64>) -> usize {
        debug_assert_eq!(frame.channels(), self.queues.len());

        // Fast path: nothing pending and nothing skipped
        if frame.is_complete() && self.queues.iter().all(VecDeque::is_empty) {
            out.extend(frame.samples().iter().flatten());
            return 1;
        }

        for (channel, sample) in frame.emitted() {
            self.queues[channel].push_back(sample);
        }
        let rows = self.drain_complete(out);

        let lag = self.lag();
        if lag >= self.warn_at {
            warn!("channels have drifted {lag} samples apart through independent skips");
            self.warn_at = self.warn_at.saturating_mul(2);
        }
        rows
    }

    /// Emits the leftover partial rows, padding short channels with silence.
    pub fn flush(&mut self, out: &mut Vec<f64>) -> usize {
        let rows = self.queues.iter().map(VecDeque::len).max().unwrap_or(0);
        for _ in 0..rows {
            for queue in &mut self.queues {
                out.push(queue.pop_front().unwrap_or(0.0));
            }
        }
        rows
    }

    /// Number of samples waiting for the other channels to catch up.
    pub fn pending(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// How far the most-behind channel trails the one furthest ahead, in
    /// samples.
    pub fn lag(&self) -> usize {
        let longest = self.queues.iter().map(VecDeque::len).max().unwrap_or(0);
        let shortest = self.queues.iter().map(VecDeque::len).min().unwrap_or(0);
        longest - shortest
    }

    fn drain_complete(&mut self, out: &mut Vec<f64>) -> usize {
        let rows = self.queues.iter().map(VecDeque::len).min().unwrap_or(0);
        for _ in 0..rows {
            for queue in &mut self.queues {
                if let Some(sample) = queue.pop_front() {
                    out.push(sample);
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_frames_pass_straight_through() {
        let mut aligner = FrameAligner::new(2);
        let mut out = Vec::new();
        assert_eq!(aligner.push(&Frame::new(0, vec![Some(0.1), Some(0.2)]), &mut out), 1);
        assert_eq!(out, vec![0.1, 0.2]);
    }

    #[test]
    fn test_fully_skipped_frame_emits_nothing() {
        let mut aligner = FrameAligner::new(2);
        let mut out = Vec::new();
        assert_eq!(aligner.push(&Frame::new(0, vec![None, None]), &mut out), 0);
        assert!(out.is_empty());
        assert_eq!(aligner.pending(), 0);
    }

    #[test]
    fn test_one_channel_skip_shifts_that_channel() {
        let mut aligner = FrameAligner::new(2);
        let mut out = Vec::new();
        aligner.push(&Frame::new(0, vec![Some(1.0), None]), &mut out);
        assert!(out.is_empty());
        assert_eq!(aligner.pending(), 1);
        aligner.push(&Frame::new(1, vec![Some(2.0), Some(20.0)]), &mut out);
        aligner.push(&Frame::new(2, vec![Some(3.0), Some(30.0)]), &mut out);
        assert_eq!(out, vec![1.0, 20.0, 2.0, 30.0]);

        assert_eq!(aligner.flush(&mut out), 1);
        assert_eq!(out, vec![1.0, 20.0, 2.0, 30.0, 3.0, 0.0]);
        assert_eq!(aligner.pending(), 0);
    }

    #[test]
    fn test_lag_grows_with_one_sided_skips() {
        let mut aligner = FrameAligner::new(2);
        let mut out = Vec::new();
        for tick in 0..(LAG_WARN_SAMPLES as u64 + 10) {
            aligner.push(&Frame::new(tick, vec![Some(0.5), None]), &mut out);
        }
        assert!(out.is_empty());
        assert_eq!(aligner.lag(), LAG_WARN_SAMPLES + 10);
        assert_eq!(aligner.pending(), LAG_WARN_SAMPLES + 10);
        // Warned once; the next warning waits for twice the lag
        assert_eq!(aligner.warn_at, 2 * LAG_WARN_SAMPLES);

        // Complete frames do not shrink the gap
        aligner.push(&Frame::new(0, vec![Some(0.1), Some(0.2)]), &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(aligner.lag(), LAG_WARN_SAMPLES + 10);
    }
}
