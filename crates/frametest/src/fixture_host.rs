//! Fixture Host
//!
//! Owns the scheduler that drives runs and the lifetime of the fixture
//! instance inside each run. A run creates a fresh fixture, waits the
//! configured start delay, executes the lifecycle and drops the fixture before
//! the report is handed back. Nothing carries over from one run to the next.

use crate::actions::TestContext;
use crate::config::{EngineConfig, LifecycleConfig};
use crate::fixture::UiFixture;
use crate::host::HostHandle;
use crate::lifecycle::{LifecycleRunner, RunReport};
use crate::result::{FrameTestError, FrameTestResult};
use crate::scheduler::{skip_frames, FrameScheduler, TickStatus};
use std::future::Future;
use tracing::debug;

/// Drives fixture runs on the host's frame loop
#[derive(Debug)]
pub struct FixtureHost {
    ctx: TestContext,
    lifecycle: LifecycleConfig,
    scheduler: FrameScheduler<RunReport>,
}

impl FixtureHost {
    /// Host over `host` using the wait and lifecycle settings of `config`
    #[must_use]
    pub fn new(host: HostHandle, config: &EngineConfig) -> Self {
        Self {
            ctx: TestContext::new(host, config.wait_options()),
            lifecycle: config.lifecycle,
            scheduler: FrameScheduler::new(),
        }
    }

    /// Context handed to fixture methods
    #[must_use]
    pub const fn context(&self) -> &TestContext {
        &self.ctx
    }

    /// Schedule a run of `test` on a fresh `F`. Nothing executes until the
    /// next [`tick`](Self::tick).
    ///
    /// # Errors
    ///
    /// Returns `UnknownTest` if `F` has no such test and `SchedulerBusy` if a
    /// run is already active.
    pub fn start<F: UiFixture>(&mut self, test: &str) -> FrameTestResult<()> {
        let run = Self::run::<F>(self.ctx.clone(), self.lifecycle, test)?;
        self.scheduler.spawn(run)
    }

    /// Build the future of one complete run without scheduling it
    ///
    /// # Errors
    ///
    /// Returns `UnknownTest` if `F` has no such test.
    pub fn run<F: UiFixture>(
        ctx: TestContext,
        lifecycle: LifecycleConfig,
        test: &str,
    ) -> FrameTestResult<impl Future<Output = RunReport> + 'static> {
        let runner = LifecycleRunner::<F>::new(lifecycle.teardown);
        if F::methods().find_test(test).is_none() {
            return Err(FrameTestError::UnknownTest {
                fixture: F::name().to_owned(),
                test: test.to_owned(),
            });
        }
        let test = test.to_owned();
        Ok(async move {
            let mut fixture = F::default();
            debug!(fixture = F::name(), delay = lifecycle.start_delay_frames, "fixture created");
            skip_frames(lifecycle.start_delay_frames).await;
            let report = runner.run(&mut fixture, &ctx, &test).await;
            drop(fixture);
            debug!(fixture = F::name(), "fixture retired");
            report
        })
    }

    /// Advance the active run by one frame; call once per host update
    pub fn tick(&mut self) -> TickStatus<RunReport> {
        self.scheduler.tick()
    }

    /// Whether no run is active
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Frames driven so far
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.scheduler.frame()
    }

    /// Drive the active run to completion, calling `update` as the host's
    /// per-frame update before every tick
    pub fn run_until_complete<U>(&mut self, max_frames: u64, update: U) -> Option<RunReport>
    where
        U: FnMut(u64),
    {
        self.scheduler.run_until_complete(max_frames, update)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixture::MethodTable;
    use crate::host::Capability;
    use crate::mock::MockHost;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    thread_local! {
        static LIVE: Cell<i32> = const { Cell::new(0) };
        static CREATED: Cell<i32> = const { Cell::new(0) };
    }

    struct Counter {
        presses: u32,
    }

    impl Default for Counter {
        fn default() -> Self {
            LIVE.with(|c| c.set(c.get() + 1));
            CREATED.with(|c| c.set(c.get() + 1));
            Self { presses: 0 }
        }
    }

    impl Drop for Counter {
        fn drop(&mut self) {
            LIVE.with(|c| c.set(c.get() - 1));
        }
    }

    impl Counter {
        async fn press_twice(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
            assert_eq!(self.presses, 0, "fixture state leaked between runs");
            ctx.press("Add").await?;
            self.presses += 1;
            ctx.press("Add").await?;
            self.presses += 1;
            ctx.assert_label("Score", "2").await
        }
    }

    impl UiFixture for Counter {
        fn name() -> &'static str {
            "Counter"
        }

        fn methods() -> MethodTable<Self> {
            MethodTable::<Self>::new()
                .test("press_twice", |f, ctx| Box::pin(f.press_twice(ctx)))
        }
    }

    fn counter_scene() -> Rc<RefCell<MockHost>> {
        let mut host = MockHost::new("Menu");
        let add = host.spawn("Add");
        host.add_capability(add, Capability::Clickable);
        let score = host.spawn("Score");
        host.set_text(score, "0");
        host.on_event("Add", crate::host::EventKind::Click, move |h, _| {
            let n: u32 = crate::host::UiHost::text(h, score)
                .and_then(|t| t.parse().ok())
                .unwrap_or(0);
            h.set_text(score, &(n + 1).to_string());
        });
        Rc::new(RefCell::new(host))
    }

    #[test]
    fn test_run_creates_and_retires_fixture() {
        let mock = counter_scene();
        let mut host =
            FixtureHost::new(HostHandle::new(Rc::clone(&mock)), &EngineConfig::default());
        host.start::<Counter>("press_twice").unwrap();
        assert_eq!(LIVE.with(Cell::get), 0, "fixture created before the first tick");

        assert!(matches!(host.tick(), TickStatus::Suspended));
        assert_eq!(LIVE.with(Cell::get), 1);

        let report = host
            .run_until_complete(1_000, |_| mock.borrow_mut().advance_frame())
            .unwrap();
        assert!(report.passed(), "{:?}", report.failure);
        assert_eq!(LIVE.with(Cell::get), 0);
        assert!(host.is_idle());
    }

    #[test]
    fn test_runs_are_isolated() {
        CREATED.with(|c| c.set(0));
        for _ in 0..2 {
            let mock = counter_scene();
            let mut host =
                FixtureHost::new(HostHandle::new(Rc::clone(&mock)), &EngineConfig::default());
            host.start::<Counter>("press_twice").unwrap();
            let report = host
                .run_until_complete(1_000, |_| mock.borrow_mut().advance_frame())
                .unwrap();
            assert!(report.passed());
        }
        assert_eq!(CREATED.with(Cell::get), 2);
    }

    #[test]
    fn test_unknown_test_is_rejected_up_front() {
        let mock = counter_scene();
        let mut host = FixtureHost::new(HostHandle::new(mock), &EngineConfig::default());
        let err = host.start::<Counter>("missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Fixture 'Counter' has no test named 'missing'"
        );
        assert!(host.is_idle());
    }

    #[test]
    fn test_second_start_while_running_is_busy() {
        let mock = counter_scene();
        let mut host = FixtureHost::new(HostHandle::new(mock), &EngineConfig::default());
        host.start::<Counter>("press_twice").unwrap();
        let err = host.start::<Counter>("press_twice").unwrap_err();
        assert!(matches!(err, FrameTestError::SchedulerBusy));
    }

    #[test]
    fn test_start_delay_is_honored() {
        let mock = counter_scene();
        let mut config = EngineConfig::default();
        config.lifecycle.start_delay_frames = 5;
        let mut host = FixtureHost::new(HostHandle::new(Rc::clone(&mock)), &config);
        host.start::<Counter>("press_twice").unwrap();
        for _ in 0..5 {
            assert!(matches!(host.tick(), TickStatus::Suspended));
        }
        assert!(mock.borrow().injected_events().is_empty());
        host.tick();
        assert_eq!(mock.borrow().clicks_on("Add"), 1);
    }
}
