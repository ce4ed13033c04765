//! Frametest: Frame-Driven UI Test Orchestration
//!
//! Frametest drives end-to-end UI tests inside an application that advances
//! in discrete frames (a game engine, an immediate-mode UI, a simulation).
//! Test methods are `async` functions; every wait is a cooperative poll that
//! suspends on the host's frame loop until a condition holds or a timeout
//! measured in host time runs out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       FRAMETEST Architecture                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌───────────┐   ┌────────┐  │
//! │  │ FixtureHost │──►│ Lifecycle   │──►│ Test      │──►│ Poller │  │
//! │  │ (one run)   │   │ Runner      │   │ Context   │   │        │  │
//! │  └──────┬──────┘   └─────────────┘   └─────┬─────┘   └───┬────┘  │
//! │         │ tick() per frame                 │ inject      │ check │
//! │         ▼                                  ▼             ▼       │
//! │  ┌─────────────────────────────────────────────────────────────┐ │
//! │  │                 UiHost (application adapter)                │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use frametest::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct MenuTests;
//!
//! impl MenuTests {
//!     async fn press_play(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
//!         ctx.press("Play").await?;
//!         ctx.assert_label("Status", "Playing").await
//!     }
//! }
//!
//! impl UiFixture for MenuTests {
//!     fn name() -> &'static str {
//!         "MenuTests"
//!     }
//!
//!     fn methods() -> MethodTable<Self> {
//!         MethodTable::<Self>::new()
//!             .test("press_play", |f, ctx| Box::pin(f.press_play(ctx)))
//!     }
//! }
//!
//! let mut mock = MockHost::new("Menu");
//! let play = mock.spawn("Play");
//! mock.add_capability(play, Capability::Clickable);
//! let status = mock.spawn("Status");
//! mock.set_text(status, "Idle");
//! mock.on_event("Play", EventKind::Click, move |h, _| h.set_text(status, "Playing"));
//!
//! let mock = Rc::new(RefCell::new(mock));
//! let mut host = FixtureHost::new(HostHandle::new(Rc::clone(&mock)), &EngineConfig::default());
//! host.start::<MenuTests>("press_play").unwrap();
//! let report = host
//!     .run_until_complete(1_000, |_| mock.borrow_mut().advance_frame())
//!     .unwrap();
//! assert!(report.passed());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod actions;
mod condition;
pub mod config;
mod fixture;
mod fixture_host;
mod host;
mod lifecycle;
pub mod logging;
pub mod mock;
mod result;
mod scheduler;
mod wait;

pub use actions::TestContext;
pub use condition::{Condition, ConditionCheck};
pub use config::{EngineConfig, LifecycleConfig, WaitConfig};
pub use fixture::{Method, MethodKind, MethodTable, StepFn, StepFuture, UiFixture};
pub use fixture_host::FixtureHost;
pub use host::{
    scene_name_from_path, Capability, Direction, EventKind, HostHandle, ObjectHandle, UiEvent,
    UiHost, Vec2,
};
pub use lifecycle::{
    LifecycleRunner, PhaseOutcome, PhaseRecord, RunPhase, RunReport, TeardownPolicy,
};
pub use mock::{InjectedEvent, MockHost};
pub use result::{FrameTestError, FrameTestResult};
pub use scheduler::{next_frame, skip_frames, FrameScheduler, NextFrame, TickStatus};
pub use wait::{
    Poller, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_FRAMES, DEFAULT_WAIT_TIMEOUT,
};

/// Everything a fixture author needs
pub mod prelude {
    pub use super::actions::*;
    pub use super::condition::*;
    pub use super::config::{EngineConfig, LifecycleConfig, WaitConfig};
    pub use super::fixture::*;
    pub use super::fixture_host::*;
    pub use super::host::*;
    pub use super::lifecycle::*;
    pub use super::mock::{InjectedEvent, MockHost};
    pub use super::result::*;
    pub use super::scheduler::*;
    pub use super::wait::*;
}
