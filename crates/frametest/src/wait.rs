//! Wait Mechanisms
//!
//! The [`Poller`] drives a [`Condition`] to satisfaction by cooperative
//! suspension: it checks the condition, and if it does not hold, yields to the
//! host for `poll_interval_frames` frames while accumulating the host's
//! unscaled delta time. Once the accumulated time exceeds the timeout the wait
//! fails with a message built from [`Condition::describe`] and the call site
//! that issued the wait.
//!
//! Elapsed time comes from the host's frame clock rather than the wall clock
//! of the test process, so pausing or slowing down gameplay time has no
//! effect on timeouts, and tests driven by a fixed-step host are deterministic.

use crate::condition::Condition;
use crate::host::HostHandle;
use crate::result::{FrameTestError, FrameTestResult};
use crate::scheduler::next_frame;
use std::panic::Location;
use std::time::Duration;
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default time budget for a wait (2 seconds)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default polling cadence (every 10 host frames)
pub const DEFAULT_POLL_INTERVAL_FRAMES: u32 = 10;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Time budget
    pub timeout: Duration,
    /// Host frames between two polls
    pub poll_interval_frames: u32,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval_frames: DEFAULT_POLL_INTERVAL_FRAMES,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling cadence; zero is treated as one frame
    #[must_use]
    pub const fn with_poll_interval_frames(mut self, frames: u32) -> Self {
        self.poll_interval_frames = frames;
        self
    }

    /// Frames between polls, at least one
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.poll_interval_frames.max(1)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq)]
pub struct WaitResult {
    /// Host time accumulated while waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub polls: u32,
    /// Host frames spent suspended
    pub frames: u64,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLER
// =============================================================================

/// Drives a condition to satisfaction on the host's frame cadence
#[derive(Debug, Clone, Copy, Default)]
pub struct Poller {
    options: WaitOptions,
}

impl Poller {
    /// Create a poller with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait until `condition` holds.
    ///
    /// `origin` is the call site reported on timeout.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` once the accumulated host time exceeds the budget.
    pub async fn wait_for(
        &self,
        host: &HostHandle,
        condition: &Condition,
        origin: &'static Location<'static>,
    ) -> FrameTestResult<WaitResult> {
        let interval = self.options.interval();
        let mut elapsed = Duration::ZERO;
        let mut polls = 0_u32;
        let mut frames = 0_u64;

        loop {
            polls += 1;
            if host.read(|h| condition.satisfied(h)) {
                debug!(
                    %condition,
                    polls,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "wait satisfied"
                );
                return Ok(WaitResult {
                    elapsed,
                    polls,
                    frames,
                    waited_for: condition.to_string(),
                });
            }

            if elapsed > self.options.timeout {
                let description = host.read(|h| condition.describe(h));
                warn!(%origin, %description, "wait timed out");
                return Err(FrameTestError::Timeout {
                    description,
                    timeout: self.options.timeout,
                    origin: origin.to_string(),
                });
            }

            for _ in 0..interval {
                elapsed += frame_delta(host);
                frames += 1;
                next_frame().await;
            }
        }
    }
}

/// Unscaled delta of the current frame; negative or non-finite values count as zero
fn frame_delta(host: &HostHandle) -> Duration {
    let seconds = host.read(|h| h.unscaled_delta_time());
    Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
}

// =============================================================================
// TESTS
// =============================================================================
