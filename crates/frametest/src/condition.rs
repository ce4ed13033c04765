//! Wait Conditions
//!
//! A [`Condition`] is a stateless predicate over host-observable state. Each
//! variant knows how to explain *why* it is not yet satisfied, so a timeout
//! reports "Label object Score is inactive" rather than just restating what
//! was waited for.
//!
//! Conditions are built fresh for every wait and only ever read the host.

use crate::host::{Capability, Direction, ObjectHandle, UiHost};
use std::fmt;
use std::rc::Rc;

/// Outcome of evaluating a condition once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionCheck {
    /// Condition holds
    Pass,
    /// Condition does not hold, with the specific reason
    Fail(String),
}

impl ConditionCheck {
    /// Check if the result is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if the result is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Polymorphic predicate with diagnostic text
#[derive(Clone)]
pub enum Condition {
    /// Named object exists and is active (or, with `expected = false`, is gone)
    ObjectPresence {
        /// Object name
        name: String,
        /// Whether the object is expected to be present
        expected: bool,
    },
    /// Named label exists, is active and shows `expected`
    LabelTextEquals {
        /// Label object name
        name: String,
        /// Expected text
        expected: String,
    },
    /// The active scene has the given name
    SceneIsActive {
        /// Scene name
        name: String,
    },
    /// Target exists and carries the capability the next action needs:
    /// clickable without a direction, directional input for that side otherwise
    ControlAccessible {
        /// Target object
        target: ObjectHandle,
        /// Direction tag for pointer actions
        direction: Option<Direction>,
    },
    /// Some active object carrying the capability exists (or none does)
    CapabilityPresence {
        /// Capability to look for
        capability: Capability,
        /// Whether such an object is expected to be present
        expected: bool,
    },
    /// Named object is playing an animation clip
    AnimationPlaying {
        /// Object name
        name: String,
        /// Clip name
        clip: String,
    },
    /// Ad hoc boolean check
    Custom {
        /// Label used in diagnostics
        label: String,
        /// Predicate
        predicate: Rc<dyn Fn() -> bool>,
    },
}

impl Condition {
    /// Named object exists and is active
    #[must_use]
    pub fn object_appeared(name: impl Into<String>) -> Self {
        Self::ObjectPresence {
            name: name.into(),
            expected: true,
        }
    }

    /// Named object is missing or inactive
    #[must_use]
    pub fn object_disappeared(name: impl Into<String>) -> Self {
        Self::ObjectPresence {
            name: name.into(),
            expected: false,
        }
    }

    /// Label shows the expected text
    #[must_use]
    pub fn label_text(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::LabelTextEquals {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Scene is the active one
    #[must_use]
    pub fn scene_loaded(name: impl Into<String>) -> Self {
        Self::SceneIsActive { name: name.into() }
    }

    /// Target accepts clicks
    #[must_use]
    pub const fn button_accessible(target: ObjectHandle) -> Self {
        Self::ControlAccessible {
            target,
            direction: None,
        }
    }

    /// Target is a directional input control for `direction`
    #[must_use]
    pub const fn pointer_accessible(target: ObjectHandle, direction: Direction) -> Self {
        Self::ControlAccessible {
            target,
            direction: Some(direction),
        }
    }

    /// Some active object with the capability exists
    #[must_use]
    pub const fn capability_appeared(capability: Capability) -> Self {
        Self::CapabilityPresence {
            capability,
            expected: true,
        }
    }

    /// No active object with the capability exists
    #[must_use]
    pub const fn capability_disappeared(capability: Capability) -> Self {
        Self::CapabilityPresence {
            capability,
            expected: false,
        }
    }

    /// Named object is playing `clip`
    #[must_use]
    pub fn animation_playing(name: impl Into<String>, clip: impl Into<String>) -> Self {
        Self::AnimationPlaying {
            name: name.into(),
            clip: clip.into(),
        }
    }

    /// Wrap an arbitrary predicate
    #[must_use]
    pub fn custom<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Self::Custom {
            label: label.into(),
            predicate: Rc::new(predicate),
        }
    }

    /// Capability an accessibility check requires
    #[must_use]
    pub const fn required_capability(direction: Option<Direction>) -> Capability {
        match direction {
            None => Capability::Clickable,
            Some(dir) => Capability::DirectionalInput(dir),
        }
    }

    /// Evaluate once against the host's current state
    #[must_use]
    pub fn check(&self, host: &dyn UiHost) -> ConditionCheck {
        match self {
            Self::ObjectPresence { name, expected } => {
                let active = host
                    .find_by_name(name)
                    .is_some_and(|handle| host.is_active(handle));
                match (active, *expected) {
                    (true, true) | (false, false) => ConditionCheck::Pass,
                    (false, true) => {
                        let reason = if host.find_by_name(name).is_some() {
                            "is inactive"
                        } else {
                            "does not exist"
                        };
                        ConditionCheck::Fail(format!("ObjectAppeared({name}): object {reason}"))
                    }
                    (true, false) => ConditionCheck::Fail(format!(
                        "ObjectDisappeared({name}): object is still active"
                    )),
                }
            }
            Self::LabelTextEquals { name, expected } => {
                let Some(handle) = host.find_by_name(name) else {
                    return ConditionCheck::Fail(format!("Label object {name} does not exist"));
                };
                if !host.is_active(handle) {
                    return ConditionCheck::Fail(format!("Label object {name} is inactive"));
                }
                match host.text(handle) {
                    None => {
                        ConditionCheck::Fail(format!("Label object {name} has no text attached"))
                    }
                    Some(actual) if actual == *expected => ConditionCheck::Pass,
                    Some(actual) => ConditionCheck::Fail(format!(
                        "Label {name}\n text expected: {expected},\n actual: {actual}"
                    )),
                }
            }
            Self::SceneIsActive { name } => {
                let active = host.active_scene_name();
                if active == *name {
                    ConditionCheck::Pass
                } else {
                    ConditionCheck::Fail(format!(
                        "SceneLoaded({name}): active scene is '{active}'"
                    ))
                }
            }
            Self::ControlAccessible { target, direction } => {
                if !host.exists(*target) {
                    return ConditionCheck::Fail(format!("Control {target} not found"));
                }
                let capability = Self::required_capability(*direction);
                if host.has_capability(*target, &capability) {
                    ConditionCheck::Pass
                } else {
                    let name = host
                        .object_name(*target)
                        .unwrap_or_else(|| target.to_string());
                    ConditionCheck::Fail(format!(
                        "Object {name} does not have a {capability} capability attached"
                    ))
                }
            }
            Self::CapabilityPresence {
                capability,
                expected,
            } => {
                let active = host
                    .find_with_capability(capability)
                    .is_some_and(|handle| host.is_active(handle));
                match (active, *expected) {
                    (true, true) | (false, false) => ConditionCheck::Pass,
                    (false, true) => ConditionCheck::Fail(format!(
                        "ObjectAppeared<{capability}>: no active object carries it"
                    )),
                    (true, false) => ConditionCheck::Fail(format!(
                        "ObjectDisappeared<{capability}>: an active object still carries it"
                    )),
                }
            }
            Self::AnimationPlaying { name, clip } => {
                let Some(handle) = host.find_by_name(name) else {
                    return ConditionCheck::Fail(format!(
                        "AnimationPlaying({name}, {clip}): object does not exist"
                    ));
                };
                if host.is_animation_playing(handle, clip) {
                    ConditionCheck::Pass
                } else {
                    ConditionCheck::Fail(format!(
                        "AnimationPlaying({name}, {clip}): clip is not playing"
                    ))
                }
            }
            Self::Custom { label, predicate } => {
                if predicate() {
                    ConditionCheck::Pass
                } else {
                    ConditionCheck::Fail(format!("BoolCondition({label}) is false"))
                }
            }
        }
    }

    /// Whether the condition holds right now
    #[must_use]
    pub fn satisfied(&self, host: &dyn UiHost) -> bool {
        self.check(host).is_pass()
    }

    /// Explain the current state: the failure reason while unsatisfied,
    /// a plain statement of the condition once it holds
    #[must_use]
    pub fn describe(&self, host: &dyn UiHost) -> String {
        match self.check(host) {
            ConditionCheck::Pass => self.to_string(),
            ConditionCheck::Fail(reason) => reason,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectPresence {
                name,
                expected: true,
            } => write!(f, "ObjectAppeared({name})"),
            Self::ObjectPresence {
                name,
                expected: false,
            } => write!(f, "ObjectDisappeared({name})"),
            Self::LabelTextEquals { name, expected } => {
                write!(f, "LabelTextAppeared({name}, '{expected}')")
            }
            Self::SceneIsActive { name } => write!(f, "SceneLoaded({name})"),
            Self::ControlAccessible { target, direction } => {
                write!(f, "{target} is {}", Self::required_capability(*direction))
            }
            Self::CapabilityPresence {
                capability,
                expected: true,
            } => write!(f, "ObjectAppeared<{capability}>"),
            Self::CapabilityPresence {
                capability,
                expected: false,
            } => write!(f, "ObjectDisappeared<{capability}>"),
            Self::AnimationPlaying { name, clip } => write!(f, "AnimationPlaying({name}, {clip})"),
            Self::Custom { label, .. } => write!(f, "BoolCondition({label})"),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { label, .. } => f
                .debug_struct("Custom")
                .field("label", label)
                .finish_non_exhaustive(),
            other => write!(f, "Condition({other})"),
        }
    }
}
