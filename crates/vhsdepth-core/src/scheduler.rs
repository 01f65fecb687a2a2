//! Cooperative render-loop scheduler.
//!
//! The scheduler owns the loop's lifecycle and its time accumulator. The host
//! supplies a [`FramePacer`] that turns "request the next frame" into whatever
//! its display clock offers (a window redraw request, a test counter). Each
//! delivered frame is handed back through [`Scheduler::tick`], so the loop can
//! be driven deterministically without a display.

/// Handle to a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// The host's frame-pacing primitive.
pub trait FramePacer {
    /// Asks the host to deliver one more frame.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraws a pending request. Hosts that cannot cancel may ignore this;
    /// the scheduler drops frames that arrive while stopped.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Per-tick data passed to the render callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Accumulated time in seconds, advanced once per tick.
    pub time: f32,
    /// Ticks since the scheduler was created.
    pub frame: u64,
}

/// Nominal time step per tick, about one 60 Hz frame.
pub const DEFAULT_TIME_STEP: f32 = 0.016;

#[derive(Debug, Clone)]
pub struct Scheduler {
    time_step: f32,
    time: f32,
    frame: u64,
    running: bool,
    pending: Option<FrameToken>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl Scheduler {
    #[must_use]
    pub fn new(time_step: f32) -> Self {
        Self {
            time_step,
            time: 0.0,
            frame: 0,
            running: false,
            pending: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Starts the loop. A no-op returning false if it is already running.
    pub fn start(&mut self, pacer: &mut impl FramePacer) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.pending = Some(pacer.request_frame());
        log::info!("render loop started");
        true
    }

    /// Stops the loop and cancels the pending frame request.
    pub fn stop(&mut self, pacer: &mut impl FramePacer) {
        if let Some(token) = self.pending.take() {
            pacer.cancel_frame(token);
        }
        if self.running {
            self.running = false;
            log::info!("render loop stopped");
        }
    }

    /// Runs one frame: advances time, calls `render`, then requests the next frame.
    ///
    /// Returns `None` without calling `render` when the loop is stopped.
    pub fn tick<R>(
        &mut self,
        pacer: &mut impl FramePacer,
        render: impl FnOnce(FrameTick) -> R,
    ) -> Option<R> {
        if !self.running {
            return None;
        }
        self.pending = None;
        self.time += self.time_step;
        self.frame += 1;
        let out = render(FrameTick {
            time: self.time,
            frame: self.frame,
        });
        if self.running {
            self.pending = Some(pacer.request_frame());
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingPacer {
        next: u64,
        requested: Vec<FrameToken>,
        cancelled: Vec<FrameToken>,
    }

    impl FramePacer for CountingPacer {
        fn request_frame(&mut self) -> FrameToken {
            self.next += 1;
            let token = FrameToken(self.next);
            self.requested.push(token);
            token
        }

        fn cancel_frame(&mut self, token: FrameToken) {
            self.cancelled.push(token);
        }
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut pacer = CountingPacer::default();
        let mut scheduler = Scheduler::default();
        assert!(scheduler.start(&mut pacer));
        assert!(!scheduler.start(&mut pacer));
        assert_eq!(pacer.requested.len(), 1);

        scheduler.tick(&mut pacer, |_| ());
        assert!((scheduler.time() - DEFAULT_TIME_STEP).abs() < 1e-7);
        assert_eq!(scheduler.frame(), 1);
    }

    #[test]
    fn test_stop_cancels_pending() {
        let mut pacer = CountingPacer::default();
        let mut scheduler = Scheduler::default();
        scheduler.start(&mut pacer);
        scheduler.stop(&mut pacer);
        assert_eq!(pacer.cancelled, vec![FrameToken(1)]);
        assert_eq!(scheduler.pending(), None);
        assert_eq!(scheduler.tick(&mut pacer, |_| 7), None);
        assert_eq!(scheduler.time(), 0.0);
    }

    #[test]
    fn test_tick_requests_next_frame() {
        let mut pacer = CountingPacer::default();
        let mut scheduler = Scheduler::new(0.5);
        scheduler.start(&mut pacer);
        let times: Vec<f32> = (0..3)
            .filter_map(|_| scheduler.tick(&mut pacer, |tick| tick.time))
            .collect();
        assert_eq!(times, vec![0.5, 1.0, 1.5]);
        assert_eq!(pacer.requested.len(), 4);
        assert_eq!(scheduler.pending(), Some(FrameToken(4)));
    }

    #[test]
    fn test_restart_resumes_time() {
        let mut pacer = CountingPacer::default();
        let mut scheduler = Scheduler::new(1.0);
        scheduler.start(&mut pacer);
        scheduler.tick(&mut pacer, |_| ());
        scheduler.stop(&mut pacer);
        scheduler.start(&mut pacer);
        scheduler.tick(&mut pacer, |_| ());
        assert_eq!(scheduler.time(), 2.0);
    }
}
