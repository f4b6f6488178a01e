//! Paint-synchronised ticking with explicit start and stop.
//!
//! Each frame is requested ahead of time with a [`FrameRequest`]. When the frame is due the host
//! hands the request back with [`FrameLoop::fire`], which only succeeds if the loop is still
//! running and the request hasn't been superseded or cancelled. So a frame that fires after
//! [`FrameLoop::stop`] always observes the stopped state and does nothing.

/// The number of microseconds in a second.
pub const ONE_MICROSECOND: u64 = 1_000_000;

/// The frame rate used when none is configured.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Whether frames are being produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoopState {
    /// No frames are scheduled.
    #[default]
    Stopped,
    /// A frame is always scheduled.
    Running,
}

/// A handle to a single scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(u64);

/// The frame scheduler.
#[derive(Debug)]
pub struct FrameLoop {
    /// Current state.
    state: LoopState,
    /// The frame that will run next, if any.
    pending: Option<FrameRequest>,
    /// ID for the next request.
    next_id: u64,
    /// Time between frames.
    frame_interval: std::time::Duration,
    /// The time at which the previous frame was due.
    last_frame_tick: tokio::time::Instant,
}

impl FrameLoop {
    /// Instantiate in the stopped state.
    #[must_use]
    pub fn new(frame_rate: u32) -> Self {
        Self {
            state: LoopState::Stopped,
            pending: None,
            next_id: 0,
            frame_interval: Self::interval_for(frame_rate),
            last_frame_tick: tokio::time::Instant::now(),
        }
    }

    /// The time between frames at the given rate. A rate of 0 is treated as 1.
    fn interval_for(frame_rate: u32) -> std::time::Duration {
        let target = ONE_MICROSECOND.wrapping_div(u64::from(frame_rate.max(1)));
        std::time::Duration::from_micros(target)
    }

    /// Change the frame rate. Takes effect from the next frame.
    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        self.frame_interval = Self::interval_for(frame_rate);
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Is the loop producing frames?
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running)
    }

    /// The frame that will run next, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Start producing frames. Starting an already running loop changes nothing.
    pub fn start(&mut self) -> Option<FrameRequest> {
        if self.is_running() {
            return self.pending;
        }

        tracing::debug!("Starting frame loop");
        self.state = LoopState::Running;
        self.last_frame_tick = tokio::time::Instant::now();
        self.schedule()
    }

    /// Stop producing frames and cancel any frame that's already scheduled.
    pub fn stop(&mut self) {
        if let Some(cancelled) = self.pending.take() {
            tracing::trace!("Cancelling scheduled frame {cancelled:?}");
        }
        if self.is_running() {
            tracing::debug!("Stopping frame loop");
        }
        self.state = LoopState::Stopped;
    }

    /// Schedule the following frame. Does nothing when stopped.
    pub fn schedule(&mut self) -> Option<FrameRequest> {
        if !self.is_running() {
            return None;
        }

        let request = FrameRequest(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(request);
        Some(request)
    }

    /// Claim a due frame. Returns whether the frame may run, which is only the case when the
    /// loop is running and the request is the one currently scheduled.
    pub fn fire(&mut self, request: FrameRequest) -> bool {
        if !self.is_running() || self.pending != Some(request) {
            tracing::trace!("Ignoring stale frame {request:?}");
            return false;
        }

        self.pending = None;
        true
    }

    /// Sleep until the scheduled frame is due. Never returns whilst the loop is stopped, which
    /// makes it safe to use in a `tokio::select!`.
    pub async fn next_frame(&mut self) -> FrameRequest {
        let Some(request) = self.pending.filter(|_| self.is_running()) else {
            return std::future::pending().await;
        };

        if let Some(wait) = self.frame_interval.checked_sub(self.last_frame_tick.elapsed()) {
            tokio::time::sleep(wait).await;
        }
        self.last_frame_tick = tokio::time::Instant::now();
        request
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_stopped() {
        let mut frame_loop = FrameLoop::default();
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert_eq!(frame_loop.schedule(), None);
    }

    #[test]
    fn runs_one_frame_per_request() {
        let mut frame_loop = FrameLoop::default();
        let request = frame_loop.start().unwrap();
        assert!(frame_loop.is_running());
        assert!(frame_loop.fire(request));
        assert!(!frame_loop.fire(request));

        let next = frame_loop.schedule().unwrap();
        assert_ne!(next, request);
        assert!(frame_loop.fire(next));
    }

    #[test]
    fn starting_twice_keeps_the_pending_frame() {
        let mut frame_loop = FrameLoop::default();
        let request = frame_loop.start();
        assert_eq!(frame_loop.start(), request);
    }

    #[test]
    fn frame_after_stop_is_a_no_op() {
        let mut frame_loop = FrameLoop::default();
        let request = frame_loop.start().unwrap();
        frame_loop.stop();
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert_eq!(frame_loop.pending(), None);
        assert!(!frame_loop.fire(request));
    }

    #[test]
    fn restart_invalidates_old_requests() {
        let mut frame_loop = FrameLoop::default();
        let old = frame_loop.start().unwrap();
        frame_loop.stop();
        let new = frame_loop.start().unwrap();
        assert!(!frame_loop.fire(old));
        assert!(frame_loop.fire(new));
    }

    #[tokio::test]
    async fn next_frame_yields_the_pending_request() {
        let mut frame_loop = FrameLoop::new(1000);
        let request = frame_loop.start().unwrap();
        let due = frame_loop.next_frame().await;
        assert_eq!(due, request);
    }

    #[tokio::test]
    async fn next_frame_never_arrives_when_stopped() {
        let mut frame_loop = FrameLoop::new(1000);
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            frame_loop.next_frame(),
        )
        .await;
        assert!(result.is_err());
    }
}
