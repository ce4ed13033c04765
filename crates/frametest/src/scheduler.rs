//! Frame-Driven Cooperative Scheduler
//!
//! Test code is written as ordinary `async` functions. The host's per-frame
//! update loop calls [`FrameScheduler::tick`] once per frame, which polls the
//! single active unit of work until its next suspension point. The only
//! suspension primitive the engine itself uses is [`next_frame`], which parks
//! the task until the following tick.
//!
//! ```text
//!  host frame N          host frame N+1         host frame N+2
//!  ┌──────────┐          ┌──────────┐           ┌──────────┐
//!  │ update   │          │ update   │           │ update   │
//!  │ tick() ──┼─► poll   │ tick() ──┼─► poll    │ tick() ──┼─► Completed
//!  └──────────┘  │       └──────────┘  │        └──────────┘
//!                └ next_frame() Pending └ next_frame() Pending
//! ```
//!
//! There is exactly one task at a time, so no two phases ever interleave.

use crate::result::{FrameTestError, FrameTestResult};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future that completes on the next scheduler tick
#[derive(Debug, Default)]
#[must_use = "futures do nothing unless awaited"]
pub struct NextFrame {
    yielded: bool,
}

impl Future for NextFrame {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Suspend the current unit of work until the next host frame
pub fn next_frame() -> NextFrame {
    NextFrame::default()
}

/// Suspend for `count` host frames
pub async fn skip_frames(count: u32) {
    for _ in 0..count {
        next_frame().await;
    }
}

/// Result of driving the scheduler for one frame
#[derive(Debug, PartialEq, Eq)]
pub enum TickStatus<T> {
    /// Nothing is scheduled
    Idle,
    /// The task suspended and will resume next frame
    Suspended,
    /// The task ran to completion this frame
    Completed(T),
}

/// Single-task executor driven by the host's frame loop
pub struct FrameScheduler<T> {
    task: Option<LocalBoxFuture<'static, T>>,
    frame: u64,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            task: None,
            frame: 0,
        }
    }
}

impl<T> std::fmt::Debug for FrameScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("busy", &self.task.is_some())
            .field("frame", &self.frame)
            .finish()
    }
}

impl<T: 'static> FrameScheduler<T> {
    /// Create an idle scheduler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a unit of work. It does not run until the next [`tick`](Self::tick).
    ///
    /// # Errors
    ///
    /// Returns `SchedulerBusy` if a task is already active.
    pub fn spawn<F>(&mut self, task: F) -> FrameTestResult<()>
    where
        F: Future<Output = T> + 'static,
    {
        if self.task.is_some() {
            return Err(FrameTestError::SchedulerBusy);
        }
        self.task = Some(task.boxed_local());
        Ok(())
    }

    /// Whether no task is scheduled
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.task.is_none()
    }

    /// Number of ticks that polled a task
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Resume the active task until its next suspension point
    pub fn tick(&mut self) -> TickStatus<T> {
        let Some(task) = self.task.as_mut() else {
            return TickStatus::Idle;
        };
        self.frame += 1;
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        match task.as_mut().poll(&mut cx) {
            Poll::Pending => TickStatus::Suspended,
            Poll::Ready(output) => {
                self.task = None;
                TickStatus::Completed(output)
            }
        }
    }

    /// Drive the active task for at most `max_frames` frames, calling
    /// `on_frame` with the frame index before each tick (the host's update).
    ///
    /// Returns `None` if nothing was scheduled or the task is still suspended
    /// after `max_frames` frames; in the latter case it stays scheduled.
    pub fn run_until_complete<U>(&mut self, max_frames: u64, mut on_frame: U) -> Option<T>
    where
        U: FnMut(u64),
    {
        for frame in 0..max_frames {
            if self.is_idle() {
                return None;
            }
            on_frame(frame);
            if let TickStatus::Completed(output) = self.tick() {
                return Some(output);
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_idle_scheduler() {
        let mut sched: FrameScheduler<()> = FrameScheduler::new();
        assert!(sched.is_idle());
        assert_eq!(sched.tick(), TickStatus::Idle);
        assert_eq!(sched.frame(), 0);
    }

    #[test]
    fn test_task_without_suspension_completes_first_tick() {
        let mut sched = FrameScheduler::new();
        sched.spawn(async { 7 }).unwrap();
        assert_eq!(sched.tick(), TickStatus::Completed(7));
        assert!(sched.is_idle());
    }

    #[test]
    fn test_next_frame_suspends_exactly_one_tick() {
        let mut sched = FrameScheduler::new();
        sched
            .spawn(async {
                next_frame().await;
                next_frame().await;
                "done"
            })
            .unwrap();
        assert_eq!(sched.tick(), TickStatus::Suspended);
        assert_eq!(sched.tick(), TickStatus::Suspended);
        assert_eq!(sched.tick(), TickStatus::Completed("done"));
        assert_eq!(sched.frame(), 3);
    }

    #[test]
    fn test_skip_frames() {
        let mut sched = FrameScheduler::new();
        sched.spawn(skip_frames(4)).unwrap();
        let mut ticks = 0;
        while sched.tick() == TickStatus::Suspended {
            ticks += 1;
        }
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_spawn_while_busy_fails() {
        let mut sched = FrameScheduler::new();
        sched.spawn(next_frame()).unwrap();
        let err = sched.spawn(next_frame()).unwrap_err();
        assert!(matches!(err, FrameTestError::SchedulerBusy));
    }

    #[test]
    fn test_run_until_complete_calls_host_update_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let task_log = Rc::clone(&log);
        let mut sched = FrameScheduler::new();
        sched
            .spawn(async move {
                task_log.borrow_mut().push("task start".to_string());
                next_frame().await;
                task_log.borrow_mut().push("task end".to_string());
            })
            .unwrap();

        let result = sched.run_until_complete(10, |frame| {
            log.borrow_mut().push(format!("update {frame}"));
        });
        assert!(result.is_some());
        assert_eq!(
            *log.borrow(),
            vec!["update 0", "task start", "update 1", "task end"]
        );
    }

    #[test]
    fn test_run_until_complete_gives_up_after_budget() {
        let mut sched = FrameScheduler::new();
        sched.spawn(skip_frames(100)).unwrap();
        assert!(sched.run_until_complete(5, |_| {}).is_none());
        assert!(!sched.is_idle());
        assert_eq!(sched.frame(), 5);
    }
}
