//! Action Library
//!
//! [`TestContext`] is what a fixture's setup, test and teardown methods receive.
//! Every interaction follows the same template:
//!
//! 1. resolve the target by name (waiting for it to exist and be active),
//! 2. wait until it carries the capability the action needs,
//! 3. inject exactly one event,
//! 4. yield one frame so the host can react before the action returns.
//!
//! All waits record the call site of the public method that issued them, so a
//! timeout points at the line in the test rather than at engine internals.
//!
//! ```ignore
//! async fn start_game(&mut self, ctx: &TestContext) -> FrameTestResult<()> {
//!     ctx.load_scene("Menu").await?;
//!     ctx.press("Play").await?;
//!     ctx.assert_label("Status", "Ready").await
//! }
//! ```

use crate::condition::Condition;
use crate::host::{scene_name_from_path, Direction, HostHandle, ObjectHandle, UiEvent, Vec2};
use crate::result::{FrameTestError, FrameTestResult};
use crate::scheduler::next_frame;
use crate::wait::{Poller, WaitOptions, WaitResult};
use std::future::Future;
use std::panic::Location;
use tracing::{debug, info};

/// Handle through which test methods observe and drive the host
#[derive(Debug, Clone)]
pub struct TestContext {
    host: HostHandle,
    options: WaitOptions,
}

impl TestContext {
    /// Create a context over a host with the given default wait options
    #[must_use]
    pub const fn new(host: HostHandle, options: WaitOptions) -> Self {
        Self { host, options }
    }

    /// Same host, different wait options for the actions issued through the copy
    #[must_use]
    pub fn with_options(&self, options: WaitOptions) -> Self {
        Self {
            host: self.host.clone(),
            options,
        }
    }

    /// Host handle
    #[must_use]
    pub const fn host(&self) -> &HostHandle {
        &self.host
    }

    /// Default wait options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    fn poller(&self) -> Poller {
        Poller::new(self.options)
    }

    // =========================================================================
    // Waits
    // =========================================================================

    /// Wait until `condition` holds
    #[track_caller]
    pub fn wait_for(
        &self,
        condition: Condition,
    ) -> impl Future<Output = FrameTestResult<WaitResult>> + '_ {
        let origin = Location::caller();
        async move { self.poller().wait_for(&self.host, &condition, origin).await }
    }

    /// Wait until an ad hoc predicate returns true
    #[track_caller]
    pub fn wait_until<F>(
        &self,
        label: impl Into<String>,
        predicate: F,
    ) -> impl Future<Output = FrameTestResult<WaitResult>> + '_
    where
        F: Fn() -> bool + 'static,
    {
        let origin = Location::caller();
        let condition = Condition::custom(label, predicate);
        async move { self.poller().wait_for(&self.host, &condition, origin).await }
    }

    /// Wait until the named object exists and is active, returning its handle
    #[track_caller]
    pub fn wait_for_object(
        &self,
        name: &str,
    ) -> impl Future<Output = FrameTestResult<ObjectHandle>> + '_ {
        let origin = Location::caller();
        let name = name.to_owned();
        async move { self.resolve(&name, origin).await }
    }

    /// Wait until the named object is missing or inactive
    #[track_caller]
    pub fn wait_for_object_gone(
        &self,
        name: &str,
    ) -> impl Future<Output = FrameTestResult<WaitResult>> + '_ {
        let origin = Location::caller();
        let condition = Condition::object_disappeared(name);
        async move { self.poller().wait_for(&self.host, &condition, origin).await }
    }

    async fn resolve(
        &self,
        name: &str,
        origin: &'static Location<'static>,
    ) -> FrameTestResult<ObjectHandle> {
        let condition = Condition::object_appeared(name);
        self.poller().wait_for(&self.host, &condition, origin).await?;
        self.lookup(name)
    }

    // =========================================================================
    // Unconditional lookups
    // =========================================================================

    /// Look up an object right now, without waiting
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no object has that name.
    pub fn find(&self, name: &str) -> FrameTestResult<ObjectHandle> {
        self.lookup(name)
    }

    /// Read a label's text right now, without waiting
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object or its text component is missing.
    pub fn text_of(&self, name: &str) -> FrameTestResult<String> {
        let handle = self.lookup(name)?;
        self.host
            .read(|h| h.text(handle))
            .ok_or_else(|| FrameTestError::not_found("Text component", name))
    }

    fn lookup(&self, name: &str) -> FrameTestResult<ObjectHandle> {
        self.host
            .read(|h| h.find_by_name(name))
            .ok_or_else(|| FrameTestError::not_found("Object", name))
    }

    // =========================================================================
    // Press
    // =========================================================================

    /// Wait for the named button to appear and become clickable, then click it
    #[track_caller]
    pub fn press(&self, name: &str) -> impl Future<Output = FrameTestResult<()>> + '_ {
        let origin = Location::caller();
        let name = name.to_owned();
        async move {
            let target = self.resolve(&name, origin).await?;
            self.press_at(target, origin).await
        }
    }

    /// Wait for an already resolved target to become clickable, then click it
    #[track_caller]
    pub fn press_handle(
        &self,
        target: ObjectHandle,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        let origin = Location::caller();
        async move { self.press_at(target, origin).await }
    }

    async fn press_at(
        &self,
        target: ObjectHandle,
        origin: &'static Location<'static>,
    ) -> FrameTestResult<()> {
        let ready = Condition::button_accessible(target);
        self.poller().wait_for(&self.host, &ready, origin).await?;
        info!(object = %self.host.label(target), "Button pressed");
        self.inject(target, UiEvent::click()).await
    }

    // =========================================================================
    // Directional pointer actions
    // =========================================================================

    /// Pointer-down on the named directional control
    #[track_caller]
    pub fn pointer_down(
        &self,
        name: &str,
        direction: Direction,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        self.pointer_by_name(name, direction, UiEvent::pointer_down(), Location::caller())
    }

    /// Pointer-up on the named directional control
    #[track_caller]
    pub fn pointer_up(
        &self,
        name: &str,
        direction: Direction,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        self.pointer_by_name(name, direction, UiEvent::pointer_up(), Location::caller())
    }

    /// Drag the named directional control to `position`
    #[track_caller]
    pub fn pointer_drag(
        &self,
        name: &str,
        direction: Direction,
        position: Vec2,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        self.pointer_by_name(name, direction, UiEvent::drag(position), Location::caller())
    }

    /// Pointer-down on an already resolved control
    #[track_caller]
    pub fn pointer_down_handle(
        &self,
        target: ObjectHandle,
        direction: Direction,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        self.pointer_at(target, direction, UiEvent::pointer_down(), Location::caller())
    }

    /// Pointer-up on an already resolved control
    #[track_caller]
    pub fn pointer_up_handle(
        &self,
        target: ObjectHandle,
        direction: Direction,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        self.pointer_at(target, direction, UiEvent::pointer_up(), Location::caller())
    }

    /// Drag an already resolved control to `position`
    #[track_caller]
    pub fn pointer_drag_handle(
        &self,
        target: ObjectHandle,
        direction: Direction,
        position: Vec2,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        self.pointer_at(target, direction, UiEvent::drag(position), Location::caller())
    }

    fn pointer_by_name(
        &self,
        name: &str,
        direction: Direction,
        event: UiEvent,
        origin: &'static Location<'static>,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        let name = name.to_owned();
        async move {
            let target = self.resolve(&name, origin).await?;
            self.pointer_at(target, direction, event, origin).await
        }
    }

    async fn pointer_at(
        &self,
        target: ObjectHandle,
        direction: Direction,
        event: UiEvent,
        origin: &'static Location<'static>,
    ) -> FrameTestResult<()> {
        let ready = Condition::pointer_accessible(target, direction);
        self.poller().wait_for(&self.host, &ready, origin).await?;
        match event.position {
            Some(Vec2 { x, y }) => {
                info!(object = %self.host.label(target), %direction, x, y, "PointerDrag");
            }
            None => {
                info!(
                    object = %self.host.label(target),
                    %direction,
                    kind = %event.kind,
                    "Pointer event"
                );
            }
        }
        self.inject(target, event).await
    }

    /// Deliver one event, then give the host one frame to react
    async fn inject(&self, target: ObjectHandle, event: UiEvent) -> FrameTestResult<()> {
        self.host.write(|h| h.inject_event(target, &event))?;
        next_frame().await;
        Ok(())
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Wait until the named label shows `expected`.
    ///
    /// Fails with `AssertionFailed` carrying the specific mismatch if the
    /// label never gets there within the timeout.
    #[track_caller]
    pub fn assert_label(
        &self,
        name: &str,
        expected: &str,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        let origin = Location::caller();
        let condition = Condition::label_text(name, expected);
        async move {
            match self.poller().wait_for(&self.host, &condition, origin).await {
                Ok(_) => Ok(()),
                Err(FrameTestError::Timeout { description, .. }) => {
                    Err(FrameTestError::AssertionFailed {
                        message: description,
                        origin: origin.to_string(),
                    })
                }
                Err(other) => Err(other),
            }
        }
    }

    // =========================================================================
    // Scenes
    // =========================================================================

    /// Start loading a scene and wait until it is the active one
    #[track_caller]
    pub fn load_scene(&self, name: &str) -> impl Future<Output = FrameTestResult<()>> + '_ {
        let origin = Location::caller();
        let name = name.to_owned();
        async move {
            self.host.write(|h| h.load_scene(&name));
            self.await_scene(&name, &name, origin).await
        }
    }

    /// Load a scene by asset path; waits for the scene named after the file stem
    #[track_caller]
    pub fn load_scene_by_path(
        &self,
        path: &str,
    ) -> impl Future<Output = FrameTestResult<()>> + '_ {
        let origin = Location::caller();
        let path = path.to_owned();
        async move {
            let scene = scene_name_from_path(&path)
                .ok_or_else(|| FrameTestError::not_found("Scene", path.as_str()))?
                .to_owned();
            self.host.write(|h| h.load_scene_path(&path));
            self.await_scene(&path, &scene, origin).await
        }
    }

    async fn await_scene(
        &self,
        request: &str,
        scene: &str,
        origin: &'static Location<'static>,
    ) -> FrameTestResult<()> {
        info!(scene = request, "Loading scene");
        let loaded = Condition::scene_loaded(scene);
        let result = self.poller().wait_for(&self.host, &loaded, origin).await?;
        debug!(scene, frames = result.frames, "Scene active");
        Ok(())
    }

    /// Yield a single frame without waiting on anything
    pub async fn settle(&self) {
        next_frame().await;
    }
}
