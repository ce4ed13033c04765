//! Host Abstraction
//!
//! The engine never touches a widget tree, scene graph or input system
//! directly. Everything it observes or mutates goes through [`UiHost`], so the
//! same tests can run against a real application adapter or the in-memory
//! [`MockHost`](crate::mock::MockHost).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  UiHost (trait)                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  lookup      find_by_name / find_with_capability / is_active │
//! │  probing     text / has_capability / is_animation_playing    │
//! │  injection   inject_event (down, up, click, drag)            │
//! │  scenes      load_scene / active_scene_name                  │
//! │  clock       unscaled_delta_time                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::result::FrameTestResult;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Scene name for an asset path: its file stem
#[must_use]
pub fn scene_name_from_path(path: &str) -> Option<&str> {
    Path::new(path).file_stem().and_then(|stem| stem.to_str())
}

/// Opaque handle to a live object in the host's UI tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// Wrap a host-specific identifier
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw identifier
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two directional input controls an action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Primary control (left stick)
    #[default]
    Primary,
    /// Secondary control (right stick)
    Secondary,
}

impl Direction {
    /// Short tag used in capability names and log lines
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attached behavior a target must carry for an action to be valid
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Accepts click events
    Clickable,
    /// Directional input control for one side
    DirectionalInput(Direction),
    /// Host-specific component, matched by name
    Named(String),
}

impl Capability {
    /// Directional input capability for the given side
    #[must_use]
    pub const fn directional(direction: Direction) -> Self {
        Self::DirectionalInput(direction)
    }

    /// Host-specific capability
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clickable => f.write_str("clickable"),
            Self::DirectionalInput(dir) => write!(f, "directional-input-{dir}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A 2-D screen position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Vec2 {
    /// Create a new position
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Kind of synthetic pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Pointer pressed on the target
    PointerDown,
    /// Pointer released on the target
    PointerUp,
    /// Full click
    Click,
    /// Drag to a position
    Drag,
}

impl EventKind {
    /// Event name used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "pointer_down",
            Self::PointerUp => "pointer_up",
            Self::Click => "click",
            Self::Drag => "drag",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A synthetic event delivered to one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    /// Event kind
    pub kind: EventKind,
    /// Pointer position (drag only)
    pub position: Option<Vec2>,
}

impl UiEvent {
    /// Click event
    #[must_use]
    pub const fn click() -> Self {
        Self {
            kind: EventKind::Click,
            position: None,
        }
    }

    /// Pointer-down event
    #[must_use]
    pub const fn pointer_down() -> Self {
        Self {
            kind: EventKind::PointerDown,
            position: None,
        }
    }

    /// Pointer-up event
    #[must_use]
    pub const fn pointer_up() -> Self {
        Self {
            kind: EventKind::PointerUp,
            position: None,
        }
    }

    /// Drag event carrying the pointer position
    #[must_use]
    pub const fn drag(position: Vec2) -> Self {
        Self {
            kind: EventKind::Drag,
            position: Some(position),
        }
    }
}

/// Collaborator contract the engine needs from the application under test.
///
/// Query methods must be pure reads of the current frame's state; the engine
/// calls them repeatedly while polling.
pub trait UiHost {
    /// Look up an object by name
    fn find_by_name(&self, name: &str) -> Option<ObjectHandle>;

    /// Look up any object that carries `capability`
    fn find_with_capability(&self, capability: &Capability) -> Option<ObjectHandle>;

    /// Whether the handle still refers to a live object
    fn exists(&self, handle: ObjectHandle) -> bool;

    /// Whether the object is active in the hierarchy (false for dead handles)
    fn is_active(&self, handle: ObjectHandle) -> bool;

    /// Name of the object, if it still exists
    fn object_name(&self, handle: ObjectHandle) -> Option<String>;

    /// Text of a text-bearing object (`None` without a text component)
    fn text(&self, handle: ObjectHandle) -> Option<String>;

    /// Whether the object carries the capability
    fn has_capability(&self, handle: ObjectHandle, capability: &Capability) -> bool;

    /// Whether the named animation clip is playing on the object
    fn is_animation_playing(&self, handle: ObjectHandle, clip: &str) -> bool;

    /// Deliver one synthetic event to the target, synchronously
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the target no longer exists.
    fn inject_event(&mut self, target: ObjectHandle, event: &UiEvent) -> FrameTestResult<()>;

    /// Begin a scene transition
    fn load_scene(&mut self, name: &str);

    /// Begin a scene transition from an asset path
    ///
    /// Defaults to loading the scene named after the path's file stem.
    fn load_scene_path(&mut self, path: &str) {
        let name = scene_name_from_path(path).unwrap_or(path).to_owned();
        self.load_scene(&name);
    }

    /// Name of the currently active scene
    fn active_scene_name(&self) -> String;

    /// Duration of the last frame in seconds, unaffected by time scaling
    fn unscaled_delta_time(&self) -> f32;
}

/// Shared, single-threaded access to the host.
///
/// Borrows are scoped to the closure passed to [`read`](Self::read) or
/// [`write`](Self::write) and never span a suspension point.
#[derive(Clone)]
pub struct HostHandle {
    inner: Rc<RefCell<dyn UiHost>>,
}

impl HostHandle {
    /// Wrap a shared host
    #[must_use]
    pub fn new<H: UiHost + 'static>(host: Rc<RefCell<H>>) -> Self {
        Self { inner: host }
    }

    /// Run a read-only query against the host
    pub fn read<R>(&self, f: impl FnOnce(&dyn UiHost) -> R) -> R {
        f(&*self.inner.borrow())
    }

    /// Run a mutating operation against the host
    pub fn write<R>(&self, f: impl FnOnce(&mut dyn UiHost) -> R) -> R {
        f(&mut *self.inner.borrow_mut())
    }

    /// Display name for a handle, falling back to the raw id
    #[must_use]
    pub fn label(&self, handle: ObjectHandle) -> String {
        self.read(|h| h.object_name(handle))
            .unwrap_or_else(|| handle.to_string())
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostHandle")
            .field("active_scene", &self.read(|h| h.active_scene_name()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_display() {
        assert_eq!(Capability::Clickable.to_string(), "clickable");
        assert_eq!(
            Capability::directional(Direction::Primary).to_string(),
            "directional-input-primary"
        );
        assert_eq!(
            Capability::directional(Direction::Secondary).to_string(),
            "directional-input-secondary"
        );
        assert_eq!(Capability::named("Slider").to_string(), "Slider");
    }

    #[test]
    fn test_event_constructors() {
        assert_eq!(UiEvent::click().kind, EventKind::Click);
        assert!(UiEvent::pointer_down().position.is_none());
        let drag = UiEvent::drag(Vec2::new(3.0, -4.0));
        assert_eq!(drag.kind, EventKind::Drag);
        assert_eq!(drag.position, Some(Vec2::new(3.0, -4.0)));
    }

    #[test]
    fn test_direction_default_and_serde() {
        assert_eq!(Direction::default(), Direction::Primary);
        let json = serde_json::to_string(&Direction::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(ObjectHandle::new(7).to_string(), "#7");
        assert_eq!(ObjectHandle::new(7).id(), 7);
    }

    #[test]
    fn test_scene_name_from_path() {
        assert_eq!(scene_name_from_path("Assets/Scenes/Menu.scene"), Some("Menu"));
        assert_eq!(scene_name_from_path("Level1"), Some("Level1"));
        assert_eq!(scene_name_from_path(""), None);
    }

    /// Adapter written against the trait alone: one always-active "Knob"
    /// that carries every capability and plays every clip.
    mod adapter_tests {
        use super::*;
        use crate::condition::{Condition, ConditionCheck};

        const KNOB: ObjectHandle = ObjectHandle::new(1);

        #[derive(Default)]
        struct KnobHost {
            loaded: Vec<String>,
        }

        impl UiHost for KnobHost {
            fn find_by_name(&self, name: &str) -> Option<ObjectHandle> {
                (name == "Knob").then_some(KNOB)
            }

            fn find_with_capability(&self, _capability: &Capability) -> Option<ObjectHandle> {
                Some(KNOB)
            }

            fn exists(&self, handle: ObjectHandle) -> bool {
                handle == KNOB
            }

            fn is_active(&self, handle: ObjectHandle) -> bool {
                handle == KNOB
            }

            fn object_name(&self, handle: ObjectHandle) -> Option<String> {
                (handle == KNOB).then(|| "Knob".to_string())
            }

            fn text(&self, _handle: ObjectHandle) -> Option<String> {
                None
            }

            fn has_capability(&self, handle: ObjectHandle, _capability: &Capability) -> bool {
                handle == KNOB
            }

            fn is_animation_playing(&self, handle: ObjectHandle, _clip: &str) -> bool {
                handle == KNOB
            }

            fn inject_event(
                &mut self,
                _target: ObjectHandle,
                _event: &UiEvent,
            ) -> FrameTestResult<()> {
                Ok(())
            }

            fn load_scene(&mut self, name: &str) {
                self.loaded.push(name.to_string());
            }

            fn active_scene_name(&self) -> String {
                self.loaded.last().cloned().unwrap_or_default()
            }

            fn unscaled_delta_time(&self) -> f32 {
                1.0 / 60.0
            }
        }

        #[test]
        fn test_capability_disappeared_fails_while_carried() {
            let host = KnobHost::default();
            let gone = Condition::capability_disappeared(Capability::named("Slider"));
            assert!(!gone.satisfied(&host));
            assert!(matches!(
                gone.check(&host),
                ConditionCheck::Fail(reason) if reason.contains("still carries")
            ));
            assert!(Condition::capability_appeared(Capability::named("Slider")).satisfied(&host));
        }

        #[test]
        fn test_animation_query_reaches_adapter() {
            let host = KnobHost::default();
            assert!(Condition::animation_playing("Knob", "Spin").satisfied(&host));
            assert!(!Condition::animation_playing("Lever", "Spin").satisfied(&host));
        }

        #[test]
        fn test_default_path_loader_uses_file_stem() {
            let mut host = KnobHost::default();
            host.load_scene_path("Assets/Scenes/Level2.scene");
            assert_eq!(host.loaded, ["Level2"]);
        }
    }
}
