//! Result and error types for frametest.

use std::time::Duration;
use thiserror::Error;

/// Result type for frametest operations
pub type FrameTestResult<T> = Result<T, FrameTestError>;

/// Errors that can occur while driving a UI test
#[derive(Debug, Error)]
pub enum FrameTestError {
    /// A poll exceeded its time budget
    #[error("Operation timed out after {:.2}s: {description}\n  waited at {origin}", timeout.as_secs_f32())]
    Timeout {
        /// Description of the condition at the moment of the timeout
        description: String,
        /// Configured time budget
        timeout: Duration,
        /// Call site that issued the wait
        origin: String,
    },

    /// A required object or capability was absent
    #[error("{what} not found: {name}")]
    NotFound {
        /// Kind of thing that was looked up
        what: String,
        /// Name or handle that was looked up
        name: String,
    },

    /// A label assertion never held
    #[error("Assertion failed: {message}\n  asserted at {origin}")]
    AssertionFailed {
        /// Mismatch detail
        message: String,
        /// Call site of the assertion
        origin: String,
    },

    /// The requested test method is not registered on the fixture
    #[error("Fixture '{fixture}' has no test named '{test}'")]
    UnknownTest {
        /// Fixture name
        fixture: String,
        /// Requested test name
        test: String,
    },

    /// A run was started while another one is still active
    #[error("Scheduler already drives an active run")]
    SchedulerBusy,

    /// Invalid engine configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FrameTestError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from a poll running out of time
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
