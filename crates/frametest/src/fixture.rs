//! Fixture registration.
//!
//! A fixture is a plain struct whose async methods are the setup, test and
//! teardown steps of a run. Each fixture type lists its methods explicitly in
//! a [`MethodTable`]; the table order is the order the lifecycle runner uses.
//!
//! The table must be built as `MethodTable::<Self>::new()` so the step
//! closures see the concrete fixture type.
//!
//! ```
//! use frametest::{FrameTestResult, MethodKind, MethodTable, TestContext, UiFixture};
//!
//! #[derive(Default)]
//! struct MenuTests { presses: u32 }
//!
//! impl MenuTests {
//!     async fn open_menu(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
//!         ctx.load_scene("Menu").await
//!     }
//!     async fn press_play(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
//!         ctx.press("Play").await?;
//!         self.presses += 1;
//!         ctx.assert_label("Status", "Playing").await
//!     }
//! }
//!
//! impl UiFixture for MenuTests {
//!     fn name() -> &'static str { "MenuTests" }
//!     fn methods() -> MethodTable<Self> {
//!         MethodTable::<Self>::new()
//!             .setup("open_menu", |f, ctx| Box::pin(f.open_menu(ctx)))
//!             .test("press_play", |f, ctx| Box::pin(f.press_play(ctx)))
//!     }
//! }
//!
//! let table = MenuTests::methods();
//! assert_eq!(table.test_names(), vec!["press_play"]);
//! assert_eq!(table.of_kind(MethodKind::Setup).count(), 1);
//! ```

use crate::actions::TestContext;
use crate::result::FrameTestResult;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use std::fmt;

/// Future returned by one fixture step
pub type StepFuture<'a> = LocalBoxFuture<'a, FrameTestResult<()>>;

/// One fixture step: borrows the fixture and the context for its whole run
pub type StepFn<F> = for<'a> fn(&'a mut F, &'a TestContext) -> StepFuture<'a>;

/// Role of a method in the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Runs before the test
    Setup,
    /// Test body
    Test,
    /// Runs after the test
    Teardown,
}

impl MethodKind {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Test => "test",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered fixture method
pub struct Method<F> {
    /// Lifecycle role
    pub kind: MethodKind,
    /// Method name, used in logs and reports
    pub name: &'static str,
    /// Entry point
    pub step: StepFn<F>,
}

impl<F> Clone for Method<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for Method<F> {}

impl<F> fmt::Debug for Method<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered registration table for one fixture type
pub struct MethodTable<F> {
    methods: Vec<Method<F>>,
}

impl<F> Default for MethodTable<F> {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
        }
    }
}

impl<F> Clone for MethodTable<F> {
    fn clone(&self) -> Self {
        Self {
            methods: self.methods.clone(),
        }
    }
}

impl<F> fmt::Debug for MethodTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.methods).finish()
    }
}

impl<F> MethodTable<F> {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, kind: MethodKind, name: &'static str, step: StepFn<F>) -> Self {
        self.methods.push(Method { kind, name, step });
        self
    }

    /// Register a setup method
    #[must_use]
    pub fn setup(self, name: &'static str, step: StepFn<F>) -> Self {
        self.with(MethodKind::Setup, name, step)
    }

    /// Register a test method
    #[must_use]
    pub fn test(self, name: &'static str, step: StepFn<F>) -> Self {
        self.with(MethodKind::Test, name, step)
    }

    /// Register a teardown method
    #[must_use]
    pub fn teardown(self, name: &'static str, step: StepFn<F>) -> Self {
        self.with(MethodKind::Teardown, name, step)
    }

    /// Methods of one kind, in registration order
    pub fn of_kind(&self, kind: MethodKind) -> impl Iterator<Item = &Method<F>> {
        self.methods.iter().filter(move |m| m.kind == kind)
    }

    /// Setup methods in registration order
    pub fn setups(&self) -> impl Iterator<Item = &Method<F>> {
        self.of_kind(MethodKind::Setup)
    }

    /// Teardown methods in registration order
    pub fn teardowns(&self) -> impl Iterator<Item = &Method<F>> {
        self.of_kind(MethodKind::Teardown)
    }

    /// Look up a test method by name
    #[must_use]
    pub fn find_test(&self, name: &str) -> Option<&Method<F>> {
        self.of_kind(MethodKind::Test).find(|m| m.name == name)
    }

    /// Names of all registered tests
    #[must_use]
    pub fn test_names(&self) -> Vec<&'static str> {
        self.of_kind(MethodKind::Test).map(|m| m.name).collect()
    }

    /// Number of registered methods
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// A fixture type: constructed fresh for every run
pub trait UiFixture: Default + 'static {
    /// Fixture name used in logs, reports and the CLI
    fn name() -> &'static str;

    /// Ordered setup/test/teardown methods
    fn methods() -> MethodTable<Self>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        log: Vec<&'static str>,
    }

    impl Sample {
        async fn first(&mut self, _ctx: &TestContext) -> FrameTestResult<()> {
            self.log.push("first");
            Ok(())
        }

        async fn body(&mut self, _ctx: &TestContext) -> FrameTestResult<()> {
            self.log.push("body");
            Ok(())
        }
    }

    impl UiFixture for Sample {
        fn name() -> &'static str {
            "Sample"
        }

        fn methods() -> MethodTable<Self> {
            MethodTable::<Self>::new()
                .setup("first", |f, ctx| Box::pin(f.first(ctx)))
                .test("body", |f, ctx| Box::pin(f.body(ctx)))
                .test("other", |f, ctx| Box::pin(f.body(ctx)))
                .teardown("cleanup", |f, ctx| Box::pin(f.first(ctx)))
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let table = Sample::methods();
        assert_eq!(table.len(), 4);
        let setups: Vec<_> = table.setups().map(|m| m.name).collect();
        assert_eq!(setups, vec!["first"]);
        assert_eq!(table.test_names(), vec!["body", "other"]);
        let teardowns: Vec<_> = table.teardowns().map(|m| m.name).collect();
        assert_eq!(teardowns, vec!["cleanup"]);
    }

    #[test]
    fn test_find_test() {
        let table = Sample::methods();
        assert_eq!(table.find_test("other").unwrap().kind, MethodKind::Test);
        assert!(table.find_test("first").is_none());
        assert!(table.find_test("missing").is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MethodKind::Setup.to_string(), "setup");
        assert_eq!(
            serde_json::to_string(&MethodKind::Teardown).unwrap(),
            "\"teardown\""
        );
    }

    #[test]
    fn test_empty_table() {
        let table: MethodTable<Sample> = MethodTable::new();
        assert!(table.is_empty());
        assert!(format!("{table:?}").starts_with('['));
    }
}
