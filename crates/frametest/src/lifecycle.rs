//! Test Lifecycle Runner
//!
//! Runs one test of a fixture as the sequence
//!
//! ```text
//! Created → RunningSetup(0..n) → RunningTest → RunningTeardown(0..m) → Done
//! ```
//!
//! Every phase is awaited in place, so the waits a step issues suspend the
//! whole run on the host's frame loop without changing their timing. Phases
//! never overlap.
//!
//! What happens after a failure depends on the [`TeardownPolicy`]. With
//! [`TeardownPolicy::Always`] the remaining setups and the test are skipped
//! but every teardown is still attempted; the first failure is the reported
//! outcome. With [`TeardownPolicy::SkipOnFailure`] the run stops at the first
//! failure and nothing else executes.

use crate::actions::TestContext;
use crate::fixture::{Method, MethodKind, MethodTable, UiFixture};
use crate::result::{FrameTestError, FrameTestResult};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::str::FromStr;
use tracing::{debug, info, warn};

// =============================================================================
// PHASES AND POLICY
// =============================================================================

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Fixture exists, nothing has run yet
    #[default]
    Created,
    /// Running the setup at this index
    RunningSetup(usize),
    /// Running the test body
    RunningTest,
    /// Running the teardown at this index
    RunningTeardown(usize),
    /// Run finished
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::RunningSetup(i) => write!(f, "setup[{i}]"),
            Self::RunningTest => f.write_str("test"),
            Self::RunningTeardown(i) => write!(f, "teardown[{i}]"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Whether teardowns run after a failed setup or test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownPolicy {
    /// Attempt every teardown; the first failure stays the outcome
    #[default]
    Always,
    /// Stop the run at the first failure
    SkipOnFailure,
}

impl TeardownPolicy {
    /// Config spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::SkipOnFailure => "skip-on-failure",
        }
    }
}

impl fmt::Display for TeardownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeardownPolicy {
    type Err = FrameTestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "always" => Ok(Self::Always),
            "skip-on-failure" => Ok(Self::SkipOnFailure),
            other => Err(FrameTestError::config(format!(
                "unknown teardown policy '{other}' (expected 'always' or 'skip-on-failure')"
            ))),
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Outcome of one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PhaseOutcome {
    /// Completed without error
    Passed,
    /// Returned an error
    Failed {
        /// Error message
        message: String,
    },
    /// Not executed because of an earlier failure
    Skipped,
}

impl PhaseOutcome {
    /// Whether the phase completed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// One executed (or skipped) phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    /// Lifecycle role
    pub kind: MethodKind,
    /// Method name
    pub name: String,
    /// Outcome
    pub outcome: PhaseOutcome,
    /// Host frames the phase spent suspended
    pub frames: u64,
}

/// Record of one run of one test
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Fixture name
    pub fixture: String,
    /// Test name
    pub test: String,
    /// Policy in effect
    pub policy: TeardownPolicy,
    /// Phases in execution order
    pub phases: Vec<PhaseRecord>,
    /// Message of the failure that decided the outcome
    pub failure: Option<String>,
    #[serde(skip)]
    error: Option<FrameTestError>,
}

impl RunReport {
    fn new(fixture: &str, test: &str, policy: TeardownPolicy) -> Self {
        Self {
            fixture: fixture.to_owned(),
            test: test.to_owned(),
            policy,
            phases: Vec::new(),
            failure: None,
            error: None,
        }
    }

    /// Whether the run completed without failure
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.error.is_none()
    }

    /// The failure that decided the outcome
    #[must_use]
    pub const fn error(&self) -> Option<&FrameTestError> {
        self.error.as_ref()
    }

    /// Total frames spent suspended across all phases
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.phases.iter().map(|p| p.frames).sum()
    }

    /// Names of the phases that actually ran, in order
    #[must_use]
    pub fn executed(&self) -> Vec<&str> {
        self.phases
            .iter()
            .filter(|p| p.outcome != PhaseOutcome::Skipped)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Convert into the deciding error, if any
    ///
    /// # Errors
    ///
    /// Returns the first failure of the run.
    pub fn into_result(self) -> FrameTestResult<()> {
        self.error.map_or(Ok(()), Err)
    }

    fn skip(&mut self, method: &Method<impl Sized>) {
        self.phases.push(PhaseRecord {
            kind: method.kind,
            name: method.name.to_owned(),
            outcome: PhaseOutcome::Skipped,
            frames: 0,
        });
    }

    fn record(&mut self, method: &Method<impl Sized>, frames: u64, result: FrameTestResult<()>) {
        let outcome = match result {
            Ok(()) => PhaseOutcome::Passed,
            Err(err) => {
                let message = err.to_string();
                if self.error.is_none() {
                    self.failure = Some(message.clone());
                    self.error = Some(err);
                } else {
                    warn!(
                        phase = method.name,
                        error = %message,
                        "additional failure after the first"
                    );
                }
                PhaseOutcome::Failed { message }
            }
        };
        self.phases.push(PhaseRecord {
            kind: method.kind,
            name: method.name.to_owned(),
            outcome,
            frames,
        });
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Executes one test of a fixture with its setups and teardowns
#[derive(Debug)]
pub struct LifecycleRunner<F> {
    table: MethodTable<F>,
    policy: TeardownPolicy,
    phase: Rc<Cell<RunPhase>>,
}

impl<F: UiFixture> LifecycleRunner<F> {
    /// Runner over the fixture's registered methods
    #[must_use]
    pub fn new(policy: TeardownPolicy) -> Self {
        Self::with_table(F::methods(), policy)
    }

    /// Runner over an explicit table
    #[must_use]
    pub fn with_table(table: MethodTable<F>, policy: TeardownPolicy) -> Self {
        Self {
            table,
            policy,
            phase: Rc::new(Cell::new(RunPhase::Created)),
        }
    }

    /// Shared view of the current phase, readable while the run is suspended
    #[must_use]
    pub fn phase(&self) -> Rc<Cell<RunPhase>> {
        Rc::clone(&self.phase)
    }

    /// Policy in effect
    #[must_use]
    pub const fn policy(&self) -> TeardownPolicy {
        self.policy
    }

    /// Run `test` against `fixture`.
    ///
    /// An unknown test name is reported as an `UnknownTest` failure; setups
    /// and teardowns do not run in that case.
    pub async fn run(&self, fixture: &mut F, ctx: &TestContext, test: &str) -> RunReport {
        let mut report = RunReport::new(F::name(), test, self.policy);
        let Some(body) = self.table.find_test(test).copied() else {
            report.error = Some(FrameTestError::UnknownTest {
                fixture: F::name().to_owned(),
                test: test.to_owned(),
            });
            report.failure = report.error.as_ref().map(ToString::to_string);
            self.enter(RunPhase::Done);
            return report;
        };
        info!(fixture = F::name(), test, policy = %self.policy, "Run started");

        for (index, setup) in self.table.setups().enumerate() {
            if report.passed() {
                self.enter(RunPhase::RunningSetup(index));
                self.step(setup, fixture, ctx, &mut report).await;
            } else {
                report.skip(setup);
            }
        }

        if report.passed() {
            self.enter(RunPhase::RunningTest);
            self.step(&body, fixture, ctx, &mut report).await;
        } else {
            report.skip(&body);
        }

        for (index, teardown) in self.table.teardowns().enumerate() {
            let run_it = match self.policy {
                TeardownPolicy::Always => true,
                TeardownPolicy::SkipOnFailure => report.passed(),
            };
            if run_it {
                self.enter(RunPhase::RunningTeardown(index));
                self.step(teardown, fixture, ctx, &mut report).await;
            } else {
                report.skip(teardown);
            }
        }

        self.enter(RunPhase::Done);
        match &report.failure {
            None => info!(fixture = F::name(), test, "Run passed"),
            Some(failure) => warn!(fixture = F::name(), test, %failure, "Run failed"),
        }
        report
    }

    fn enter(&self, phase: RunPhase) {
        debug!(from = %self.phase.get(), to = %phase, "phase transition");
        self.phase.set(phase);
    }

    async fn step(
        &self,
        method: &Method<F>,
        fixture: &mut F,
        ctx: &TestContext,
        report: &mut RunReport,
    ) {
        let (result, frames) = count_frames((method.step)(fixture, ctx)).await;
        if let Err(err) = &result {
            warn!(kind = %method.kind, method = method.name, error = %err, "phase failed");
        }
        report.record(method, frames, result);
    }
}

/// Await `future`, counting the frames it spends suspended
async fn count_frames<T>(future: impl Future<Output = T>) -> (T, u64) {
    let mut future = std::pin::pin!(future);
    let mut frames = 0_u64;
    let output = futures::future::poll_fn(|cx| {
        let poll = future.as_mut().poll(cx);
        if poll.is_pending() {
            frames += 1;
        }
        poll
    })
    .await;
    (output, frames)
}

// =============================================================================
// TESTS
// =============================================================================
