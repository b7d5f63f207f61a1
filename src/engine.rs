//! Frame production: oscillators and glitch injection driven in lockstep.

use crate::core::{Frame, Signal};
use crate::glitch::{GlitchInjector, GlitchScheduler, GlitchSync};
use crate::request::StreamRequest;
use crate::synthesis::SineOscillator;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::iter::FusedIterator;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable flag that stops a running engine from another thread or a
/// signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. The engine yields no further frames.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How glitches reach the channels of a frame.
#[derive(Debug, Clone)]
enum GlitchPath<R: Rng> {
    Clean,
    /// One schedule; its effect is applied to every channel of the tick
    Shared(GlitchInjector<R>),
    /// One schedule per channel, index-aligned with the oscillators
    PerChannel(Vec<GlitchInjector<R>>),
}

/// Produces frames for a [`StreamRequest`].
///
/// The engine is an iterator: each call to `next()` advances every channel's
/// oscillator exactly once and runs the result through the glitch path. It is
/// finite when the request carries a duration and unbounded otherwise, and it
/// is consumed by iteration, so a new run needs a new engine.
///
/// # Examples
///
/// ```
/// use sinegen::{SignalEngine, StreamRequest};
///
/// let request = StreamRequest::new(48000, &[440.0, 660.0], 0.5)
///     .unwrap()
///     .with_duration(480);
/// let frames: Vec<_> = SignalEngine::new(&request).collect();
/// assert_eq!(frames.len(), 480);
/// assert!(frames.iter().all(|f| f.channels() == 2));
/// ```
#[derive(Debug, Clone)]
pub struct SignalEngine<R: Rng = StdRng> {
    oscillators: Vec<SineOscillator>,
    glitch: GlitchPath<R>,
    tick: u64,
    remaining: Option<u64>,
    stop: Option<StopHandle>,
    finished: bool,
}

impl SignalEngine<StdRng> {
    /// Creates an engine for `request`.
    ///
    /// Random intervals use the request's seed when it has one and system
    /// entropy otherwise.
    pub fn new(request: &StreamRequest) -> Self {
        let rng = match request.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(request, rng)
    }
}

impl<R: Rng + SeedableRng> SignalEngine<R> {
    /// Creates an engine whose glitch schedules draw from `rng`.
    ///
    /// With independent sync every channel gets its own generator seeded
    /// from `rng`, in channel order.
    pub fn with_rng(request: &StreamRequest, mut rng: R) -> Self {
        let sample_rate = request.sample_rate();
        let oscillators = request
            .channels()
            .iter()
            .map(|spec| SineOscillator::from_spec(spec, request.volume()))
            .collect::<Vec<_>>();

        let glitch = match request.glitch().filter(|g| g.is_active()) {
            None => GlitchPath::Clean,
            Some(config) => match config.sync() {
                GlitchSync::Shared => {
                    let scheduler = GlitchScheduler::with_rng(config.interval(), sample_rate, rng);
                    GlitchPath::Shared(GlitchInjector::new(
                        config.kind(),
                        config.burst_length(),
                        scheduler,
                    ))
                }
                GlitchSync::Independent => GlitchPath::PerChannel(
                    (0..oscillators.len())
                        .map(|_| {
                            let channel_rng = R::seed_from_u64(rng.next_u64());
                            let scheduler = GlitchScheduler::with_rng(
                                config.interval(),
                                sample_rate,
                                channel_rng,
                            );
                            GlitchInjector::new(config.kind(), config.burst_length(), scheduler)
                        })
                        .collect(),
                ),
            },
        };

        Self {
            oscillators,
            glitch,
            tick: 0,
            remaining: request.duration(),
            stop: None,
            finished: false,
        }
    }
}

impl<R: Rng> SignalEngine<R> {
    /// Stops yielding frames once `handle` is triggered.
    pub fn with_stop(mut self, handle: StopHandle) -> Self {
        self.stop = Some(handle);
        self
    }

    /// Rebinds the run length: `Some(n)` yields at most `n` more frames,
    /// `None` runs until stopped.
    pub fn produce(mut self, limit: Option<u64>) -> Self {
        self.remaining = limit;
        self
    }

    pub fn channel_count(&self) -> usize {
        self.oscillators.len()
    }

    /// Number of ticks produced so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(StopHandle::is_stopped)
    }

    /// Computes one tick for every channel. Every oscillator advances
    /// whether or not its sample survives the glitch path.
    fn render_tick(&mut self) -> Frame {
        let samples: Vec<Option<f64>> = match &mut self.glitch {
            GlitchPath::Clean => self
                .oscillators
                .iter_mut()
                .map(|osc| Some(osc.next_sample()))
                .collect(),
            GlitchPath::Shared(injector) => {
                let effect = injector.advance();
                self.oscillators
                    .iter_mut()
                    .map(|osc| {
                        let raw = osc.next_sample();
                        match effect {
                            Some(kind) => kind.apply(raw),
                            None => Some(raw),
                        }
                    })
                    .collect()
            }
            GlitchPath::PerChannel(injectors) => self
                .oscillators
                .iter_mut()
                .zip(injectors.iter_mut())
                .map(|(osc, injector)| injector.process(osc.next_sample()))
                .collect(),
        };

        let frame = Frame::new(self.tick, samples);
        self.tick += 1;
        frame
    }
}

impl<R: Rng> Iterator for SignalEngine<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished || self.remaining == Some(0) || self.stop_requested() {
            self.finished = true;
            return None;
        }

        let frame = self.render_tick();

        // A stop that lands mid-tick discards the frame
        if self.stop_requested() {
            self.finished = true;
            return None;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        match self.remaining {
            Some(n) if self.stop.is_none() => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                (n, Some(n))
            }
            Some(n) => (0, usize::try_from(n).ok()),
            None => (0, None),
        }
    }
}

impl<R: Rng> FusedIterator for SignalEngine<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glitch::{GlitchConfig, GlitchKind, IntervalPolicy};

    fn request(duration: u64) -> StreamRequest {
        StreamRequest::new(8000, &[1000.0, 500.0], 1.0)
            .unwrap()
            .with_duration(duration)
    }

    #[test]
    fn test_finite_run_length() {
        let engine = SignalEngine::new(&request(100));
        assert_eq!(engine.size_hint(), (100, Some(100)));
        let frames: Vec<Frame> = engine.collect();
        assert_eq!(frames.len(), 100);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.tick(), i as u64);
            assert!(frame.is_complete());
        }
    }

    #[test]
    fn test_unbounded_run() {
        let request = StreamRequest::new(8000, &[440.0], 1.0).unwrap();
        let engine = SignalEngine::new(&request);
        assert_eq!(engine.size_hint(), (0, None));
        assert_eq!(engine.take(10_000).count(), 10_000);
    }

    #[test]
    fn test_produce_overrides_duration() {
        let engine = SignalEngine::new(&request(100)).produce(Some(5));
        assert_eq!(engine.count(), 5);
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let stop = StopHandle::new();
        let mut engine = SignalEngine::new(&request(1000)).with_stop(stop.clone());
        assert!(engine.next().is_some());
        assert!(engine.next().is_some());
        stop.stop();
        assert!(engine.next().is_none());
        assert!(engine.next().is_none());
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn test_shared_sync_hits_all_channels_together() {
        let glitch = GlitchConfig::new(GlitchKind::Skip, 3, IntervalPolicy::fixed(0.001)).unwrap();
        let request = request(40).with_glitch(glitch).unwrap();
        let mut skipped_frames = 0;
        for frame in SignalEngine::new(&request) {
            let skipped = frame.samples().iter().filter(|s| s.is_none()).count();
            assert!(skipped == 0 || skipped == 2, "tick {} split burst", frame.tick());
            if skipped == 2 {
                skipped_frames += 1;
            }
        }
        // 8 clean + 3 skipped per cycle over 40 ticks
        assert_eq!(skipped_frames, 9);
    }

    #[test]
    fn test_independent_sync_is_reproducible() {
        let glitch = GlitchConfig::new(GlitchKind::Skip, 2, IntervalPolicy::random(0.001, 0.005))
            .unwrap()
            .with_sync(GlitchSync::Independent);
        let request = request(2000).with_glitch(glitch).unwrap().with_seed(11);
        let a: Vec<Frame> = SignalEngine::new(&request).collect();
        let b: Vec<Frame> = SignalEngine::new(&request).collect();
        assert_eq!(a, b);
    }
}
