//! In-memory UI host for exercising tests without a real application.
//!
//! [`MockHost`] keeps a flat list of named objects with an active flag,
//! optional text, capabilities and playing animation clips. It advances on a
//! fixed frame delta, applies timed mutations registered with
//! [`MockHost::schedule`], simulates scene-load latency and records every
//! injected event so tests can assert on what the engine delivered.

use crate::host::{scene_name_from_path, Capability, EventKind, ObjectHandle, UiEvent, UiHost};
use crate::result::{FrameTestError, FrameTestResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Default fixed frame delta (60 fps)
pub const DEFAULT_DELTA_TIME: f32 = 1.0 / 60.0;

type Mutation = Box<dyn FnOnce(&mut MockHost)>;
type Handler = Rc<dyn Fn(&mut MockHost, &UiEvent)>;
type SceneBuilder = Rc<dyn Fn(&mut MockHost)>;

#[derive(Debug, Clone, Default)]
struct MockObject {
    name: String,
    active: bool,
    text: Option<String>,
    capabilities: Vec<Capability>,
    playing: BTreeSet<String>,
}

/// Event the engine delivered to the mock
#[derive(Debug, Clone, PartialEq)]
pub struct InjectedEvent {
    /// Frame the event arrived in
    pub frame: u64,
    /// Host time at delivery, in seconds
    pub time: f32,
    /// Target handle
    pub target: ObjectHandle,
    /// Target name at delivery
    pub target_name: String,
    /// The event
    pub event: UiEvent,
}

#[derive(Debug, Clone)]
struct PendingLoad {
    scene: String,
    frames_left: u32,
}

/// Scriptable in-memory [`UiHost`]
pub struct MockHost {
    objects: BTreeMap<u64, MockObject>,
    next_id: u64,
    scene: String,
    pending_load: Option<PendingLoad>,
    scene_load_frames: u32,
    scenes: HashMap<String, SceneBuilder>,
    delta_time: f32,
    time_scale: f32,
    elapsed: f32,
    scaled_elapsed: f32,
    frame: u64,
    scheduled: Vec<(f32, Mutation)>,
    handlers: Vec<(String, EventKind, Handler)>,
    events: Vec<InjectedEvent>,
    scene_paths: Vec<String>,
}

impl MockHost {
    /// Create an empty host with `scene` active
    #[must_use]
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            scene: scene.into(),
            pending_load: None,
            scene_load_frames: 1,
            scenes: HashMap::new(),
            delta_time: DEFAULT_DELTA_TIME,
            time_scale: 1.0,
            elapsed: 0.0,
            scaled_elapsed: 0.0,
            frame: 0,
            scheduled: Vec::new(),
            handlers: Vec::new(),
            events: Vec::new(),
            scene_paths: Vec::new(),
        }
    }

    /// Use a fixed frame delta, in seconds
    #[must_use]
    pub const fn with_delta_time(mut self, seconds: f32) -> Self {
        self.delta_time = seconds;
        self
    }

    /// Register what a scene contains once loaded
    #[must_use]
    pub fn with_scene<F>(mut self, name: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&mut Self) + 'static,
    {
        self.scenes.insert(name.into(), Rc::new(builder));
        self
    }

    /// Frames a scene transition takes before the new scene becomes active
    pub fn set_scene_load_frames(&mut self, frames: u32) {
        self.scene_load_frames = frames;
    }

    /// Scale applied to game time; unscaled delta is unaffected
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Create an active object with no text and no capabilities
    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(
            id,
            MockObject {
                name: name.into(),
                active: true,
                ..MockObject::default()
            },
        );
        ObjectHandle::new(id)
    }

    /// Destroy an object; its handle becomes dead
    pub fn despawn(&mut self, handle: ObjectHandle) {
        self.objects.remove(&handle.id());
    }

    /// Toggle the active flag
    pub fn set_active(&mut self, handle: ObjectHandle, active: bool) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.active = active;
        }
    }

    /// Attach or replace a text component
    pub fn set_text(&mut self, handle: ObjectHandle, text: &str) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.text = Some(text.to_owned());
        }
    }

    /// Attach a capability
    pub fn add_capability(&mut self, handle: ObjectHandle, capability: Capability) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            if !obj.capabilities.contains(&capability) {
                obj.capabilities.push(capability);
            }
        }
    }

    /// Detach a capability
    pub fn remove_capability(&mut self, handle: ObjectHandle, capability: &Capability) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.capabilities.retain(|c| c != capability);
        }
    }

    /// Start playing an animation clip on the object
    pub fn play_animation(&mut self, handle: ObjectHandle, clip: &str) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.playing.insert(clip.to_owned());
        }
    }

    /// Stop an animation clip
    pub fn stop_animation(&mut self, handle: ObjectHandle, clip: &str) {
        if let Some(obj) = self.objects.get_mut(&handle.id()) {
            obj.playing.remove(clip);
        }
    }

    /// Number of live objects
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Run `mutation` on the first frame whose host time reaches `at_secs`
    pub fn schedule<F>(&mut self, at_secs: f32, mutation: F)
    where
        F: FnOnce(&mut Self) + 'static,
    {
        self.scheduled.push((at_secs, Box::new(mutation)));
    }

    /// React to events of `kind` delivered to objects named `name`
    pub fn on_event<F>(&mut self, name: impl Into<String>, kind: EventKind, handler: F)
    where
        F: Fn(&mut Self, &UiEvent) + 'static,
    {
        self.handlers.push((name.into(), kind, Rc::new(handler)));
    }

    /// One host update: advance the clock, progress a pending scene load and
    /// apply scheduled mutations that are due
    pub fn advance_frame(&mut self) {
        self.frame += 1;
        self.elapsed += self.delta_time;
        self.scaled_elapsed += self.delta_time * self.time_scale;

        if let Some(pending) = self.pending_load.as_mut() {
            pending.frames_left = pending.frames_left.saturating_sub(1);
            if pending.frames_left == 0 {
                if let Some(done) = self.pending_load.take() {
                    self.activate_scene(done.scene);
                }
            }
        }

        let now = self.elapsed;
        let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.scheduled = later;
        for (_, mutation) in due {
            mutation(self);
        }
    }

    fn activate_scene(&mut self, scene: String) {
        debug!(from = %self.scene, to = %scene, "mock scene activated");
        self.objects.clear();
        self.scene = scene;
        if let Some(builder) = self.scenes.get(&self.scene).cloned() {
            builder(self);
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Host time in seconds, unaffected by time scale
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Game time in seconds, affected by time scale
    #[must_use]
    pub const fn scaled_elapsed(&self) -> f32 {
        self.scaled_elapsed
    }

    /// Frames advanced so far
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Every event delivered so far, in order
    #[must_use]
    pub fn injected_events(&self) -> &[InjectedEvent] {
        &self.events
    }

    /// Asset paths passed to path-based scene loads, in order
    #[must_use]
    pub fn loaded_scene_paths(&self) -> &[String] {
        &self.scene_paths
    }

    /// Number of clicks delivered to objects with this name
    #[must_use]
    pub fn clicks_on(&self, name: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.target_name == name && e.event.kind == EventKind::Click)
            .count()
    }

    fn find_where(&self, pred: impl Fn(&MockObject) -> bool) -> Option<ObjectHandle> {
        let mut inactive = None;
        for (id, obj) in &self.objects {
            if !pred(obj) {
                continue;
            }
            if obj.active {
                return Some(ObjectHandle::new(*id));
            }
            inactive.get_or_insert(ObjectHandle::new(*id));
        }
        inactive
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new("Main")
    }
}

impl UiHost for MockHost {
    fn find_by_name(&self, name: &str) -> Option<ObjectHandle> {
        self.find_where(|obj| obj.name == name)
    }

    fn find_with_capability(&self, capability: &Capability) -> Option<ObjectHandle> {
        self.find_where(|obj| obj.capabilities.contains(capability))
    }

    fn exists(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle.id())
    }

    fn is_active(&self, handle: ObjectHandle) -> bool {
        self.objects.get(&handle.id()).is_some_and(|obj| obj.active)
    }

    fn object_name(&self, handle: ObjectHandle) -> Option<String> {
        self.objects.get(&handle.id()).map(|obj| obj.name.clone())
    }

    fn text(&self, handle: ObjectHandle) -> Option<String> {
        self.objects.get(&handle.id()).and_then(|obj| obj.text.clone())
    }

    fn has_capability(&self, handle: ObjectHandle, capability: &Capability) -> bool {
        self.objects
            .get(&handle.id())
            .is_some_and(|obj| obj.capabilities.contains(capability))
    }

    fn is_animation_playing(&self, handle: ObjectHandle, clip: &str) -> bool {
        self.objects
            .get(&handle.id())
            .is_some_and(|obj| obj.playing.contains(clip))
    }

    fn inject_event(&mut self, target: ObjectHandle, event: &UiEvent) -> FrameTestResult<()> {
        let name = self
            .object_name(target)
            .ok_or_else(|| FrameTestError::not_found("Object", target.to_string()))?;
        self.events.push(InjectedEvent {
            frame: self.frame,
            time: self.elapsed,
            target,
            target_name: name.clone(),
            event: *event,
        });

        let handlers: Vec<Handler> = self
            .handlers
            .iter()
            .filter(|(n, kind, _)| *n == name && *kind == event.kind)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(self, event);
        }
        Ok(())
    }

    fn load_scene(&mut self, name: &str) {
        let scene = name.to_owned();
        if self.scene_load_frames == 0 {
            self.pending_load = None;
            self.activate_scene(scene);
        } else {
            self.pending_load = Some(PendingLoad {
                scene,
                frames_left: self.scene_load_frames,
            });
        }
    }

    fn load_scene_path(&mut self, path: &str) {
        self.scene_paths.push(path.to_owned());
        let name = scene_name_from_path(path).unwrap_or(path).to_owned();
        self.load_scene(&name);
    }

    fn active_scene_name(&self) -> String {
        self.scene.clone()
    }

    fn unscaled_delta_time(&self) -> f32 {
        self.delta_time
    }
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHost")
            .field("scene", &self.scene)
            .field("objects", &self.objects)
            .field("pending_load", &self.pending_load)
            .field("frame", &self.frame)
            .field("elapsed", &self.elapsed)
            .field("scheduled", &self.scheduled.len())
            .field("handlers", &self.handlers.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}
