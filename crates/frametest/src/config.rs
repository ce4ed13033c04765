//! Engine configuration.
//!
//! Defaults match the built-in constants; a YAML file can override any of
//! them, and environment variables override the file:
//!
//! | Variable                       | Field                           |
//! |--------------------------------|---------------------------------|
//! | `FRAMETEST_TIMEOUT_SECS`       | `wait.timeout_secs`             |
//! | `FRAMETEST_POLL_FRAMES`        | `wait.poll_interval_frames`     |
//! | `FRAMETEST_TEARDOWN`           | `lifecycle.teardown`            |
//! | `FRAMETEST_START_DELAY_FRAMES` | `lifecycle.start_delay_frames`  |
//!
//! ```yaml
//! wait:
//!   timeout_secs: 5.0
//!   poll_interval_frames: 2
//! lifecycle:
//!   teardown: skip-on-failure
//! ```

use crate::lifecycle::TeardownPolicy;
use crate::result::{FrameTestError, FrameTestResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_FRAMES, DEFAULT_WAIT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding `wait.timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "FRAMETEST_TIMEOUT_SECS";
/// Environment variable overriding `wait.poll_interval_frames`
pub const ENV_POLL_FRAMES: &str = "FRAMETEST_POLL_FRAMES";
/// Environment variable overriding `lifecycle.teardown`
pub const ENV_TEARDOWN: &str = "FRAMETEST_TEARDOWN";
/// Environment variable overriding `lifecycle.start_delay_frames`
pub const ENV_START_DELAY_FRAMES: &str = "FRAMETEST_START_DELAY_FRAMES";

/// Default wait settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitConfig {
    /// Time budget per wait, in seconds
    pub timeout_secs: f64,
    /// Host frames between two polls
    pub poll_interval_frames: u32,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_WAIT_TIMEOUT.as_secs_f64(),
            poll_interval_frames: DEFAULT_POLL_INTERVAL_FRAMES,
        }
    }
}

/// Run lifecycle settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Whether teardowns run after a failure
    pub teardown: TeardownPolicy,
    /// Frames between fixture creation and the first setup
    pub start_delay_frames: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            teardown: TeardownPolicy::default(),
            start_delay_frames: 1,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Wait defaults
    pub wait: WaitConfig,
    /// Lifecycle settings
    pub lifecycle: LifecycleConfig,
}

impl EngineConfig {
    /// Parse and validate a YAML document
    ///
    /// # Errors
    ///
    /// Returns `Yaml` for malformed input and `Config` for invalid values.
    pub fn from_yaml(yaml: &str) -> FrameTestResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as [`from_yaml`](Self::from_yaml).
    pub fn load(path: &Path) -> FrameTestResult<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading engine config");
        Self::from_yaml(&text)
    }

    /// Apply overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns `Config` if a variable is set to an unparsable or invalid value.
    pub fn with_env_overrides(self) -> FrameTestResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns `Config` if a variable is set to an unparsable or invalid value.
    pub fn with_overrides<L>(mut self, lookup: L) -> FrameTestResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.wait.timeout_secs = parse_var(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_POLL_FRAMES) {
            self.wait.poll_interval_frames = parse_var(ENV_POLL_FRAMES, &value)?;
        }
        if let Some(value) = lookup(ENV_TEARDOWN) {
            self.lifecycle.teardown = value.parse()?;
        }
        if let Some(value) = lookup(ENV_START_DELAY_FRAMES) {
            self.lifecycle.start_delay_frames = parse_var(ENV_START_DELAY_FRAMES, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `Config` if the timeout is not a positive finite number of
    /// seconds or the poll interval is zero.
    pub fn validate(&self) -> FrameTestResult<()> {
        let timeout = self.wait.timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(FrameTestError::config(format!(
                "wait.timeout_secs must be a positive number, got {timeout}"
            )));
        }
        if Duration::try_from_secs_f64(timeout).is_err() {
            return Err(FrameTestError::config(format!(
                "wait.timeout_secs is out of range: {timeout}"
            )));
        }
        if self.wait.poll_interval_frames == 0 {
            return Err(FrameTestError::config(
                "wait.poll_interval_frames must be at least 1",
            ));
        }
        Ok(())
    }

    /// Wait options derived from the `wait` section
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        let timeout =
            Duration::try_from_secs_f64(self.wait.timeout_secs).unwrap_or(DEFAULT_WAIT_TIMEOUT);
        WaitOptions::new()
            .with_timeout(timeout)
            .with_poll_interval_frames(self.wait.poll_interval_frames)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns `Yaml` if serialization fails.
    pub fn to_yaml(&self) -> FrameTestResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> FrameTestResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FrameTestError::config(format!("{key} has an invalid value: '{value}'")))
}
