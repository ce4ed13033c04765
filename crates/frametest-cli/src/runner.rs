//! Executes selected fixture tests against fresh demo hosts

use crate::demo::{demo_host, registry, FixtureEntry};
use crate::error::{CliError, CliResult};
use frametest::{EngineConfig, FixtureHost, HostHandle, RunReport};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Test runner over the bundled fixtures
#[derive(Debug, Clone)]
pub struct TestRunner {
    engine: EngineConfig,
    fps: u32,
    max_frames: u64,
}

impl TestRunner {
    /// Create a runner
    #[must_use]
    pub const fn new(engine: EngineConfig, fps: u32, max_frames: u64) -> Self {
        Self {
            engine,
            fps,
            max_frames,
        }
    }

    /// Resolve a fixture/test selection into `(fixture, test)` pairs
    pub fn select(
        fixture: Option<&str>,
        test: Option<&str>,
    ) -> CliResult<Vec<(FixtureEntry, &'static str)>> {
        let registry = registry();
        let entries: Vec<FixtureEntry> = match fixture {
            None => registry.into_values().collect(),
            Some(name) => vec![registry.get(name).cloned().ok_or_else(|| {
                CliError::invalid_argument(format!("unknown fixture '{name}'"))
            })?],
        };

        let mut selected = Vec::new();
        for entry in entries {
            let tests: Vec<&'static str> = match test {
                None => entry.tests.clone(),
                Some(name) => vec![entry.tests.iter().copied().find(|t| *t == name).ok_or_else(
                    || {
                        CliError::invalid_argument(format!(
                            "fixture '{}' has no test '{name}'",
                            entry.name
                        ))
                    },
                )?],
            };
            selected.extend(tests.into_iter().map(|t| (entry.clone(), t)));
        }
        Ok(selected)
    }

    /// Run one test on a fresh demo host until it finishes
    pub fn run(&self, entry: &FixtureEntry, test: &str) -> CliResult<RunReport> {
        let mock = Rc::new(RefCell::new(demo_host(self.fps)));
        let mut host = FixtureHost::new(HostHandle::new(Rc::clone(&mock)), &self.engine);
        (entry.start)(&mut host, test)?;
        info!(fixture = entry.name, test, fps = self.fps, "Running");

        host.run_until_complete(self.max_frames, |_| mock.borrow_mut().advance_frame())
            .ok_or_else(|| {
                CliError::test_execution(format!(
                    "{}::{test} did not finish within {} frames",
                    entry.name, self.max_frames
                ))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use frametest::{FrameTestError, PhaseOutcome, TeardownPolicy};

    fn runner() -> TestRunner {
        TestRunner::new(EngineConfig::default(), 60, 100_000)
    }

    fn run(fixture: &str, test: &str) -> RunReport {
        let selection = TestRunner::select(Some(fixture), Some(test)).unwrap();
        let (entry, test) = &selection[0];
        runner().run(entry, test).unwrap()
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_select_everything() {
            let all = TestRunner::select(None, None).unwrap();
            assert_eq!(all.len(), 7);
            assert_eq!(all[0].0.name, "Level");
        }

        #[test]
        fn test_select_unknown_fixture() {
            let err = TestRunner::select(Some("Nope"), None).unwrap_err();
            assert!(err.to_string().contains("unknown fixture 'Nope'"));
        }

        #[test]
        fn test_select_unknown_test() {
            let err = TestRunner::select(Some("Menu"), Some("fly")).unwrap_err();
            assert!(err.to_string().contains("has no test 'fly'"));
        }
    }

    mod demo_run_tests {
        use super::*;

        #[test]
        fn test_add_score_passes() {
            let report = run("Menu", "add_score");
            assert!(report.passed(), "{:?}", report.failure);
            assert_eq!(report.executed(), vec!["open_menu", "add_score", "reset"]);
        }

        #[test]
        fn test_joystick_passes() {
            assert!(run("Menu", "joystick").passed());
        }

        #[test]
        fn test_open_door_passes() {
            assert!(run("Menu", "open_door").passed());
        }

        #[test]
        fn test_level_tests_pass() {
            for test in ["enemy_spawns", "exit_to_menu", "reload_by_path"] {
                let report = run("Level", test);
                assert!(report.passed(), "{test}: {:?}", report.failure);
            }
        }

        #[test]
        fn test_wrong_score_reports_mismatch_and_still_resets() {
            let report = run("Menu", "wrong_score");
            let failure = report.failure.clone().unwrap();
            assert!(failure.contains("text expected: 99"));
            assert!(failure.contains("actual: 0"));
            assert!(matches!(
                report.error(),
                Some(FrameTestError::AssertionFailed { .. })
            ));
            assert_eq!(report.phases.last().unwrap().outcome, PhaseOutcome::Passed);
        }

        #[test]
        fn test_skip_policy_skips_reset() {
            let mut engine = EngineConfig::default();
            engine.lifecycle.teardown = TeardownPolicy::SkipOnFailure;
            let selection = TestRunner::select(Some("Menu"), Some("wrong_score")).unwrap();
            let report = TestRunner::new(engine, 60, 100_000)
                .run(&selection[0].0, selection[0].1)
                .unwrap();
            assert_eq!(report.phases.last().unwrap().outcome, PhaseOutcome::Skipped);
        }

        #[test]
        fn test_frame_budget_exhausted() {
            let selection = TestRunner::select(Some("Level"), Some("enemy_spawns")).unwrap();
            let err = TestRunner::new(EngineConfig::default(), 60, 5)
                .run(&selection[0].0, selection[0].1)
                .unwrap_err();
            assert!(matches!(err, CliError::TestExecution { .. }));
        }
    }
}
