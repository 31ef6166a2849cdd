// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bindings between tracks and the objects they animate.
//!
//! A track reads the live state of its target when a key is captured and
//! writes interpolated state back on every evaluation. Both directions go
//! through the traits here so tracks stay independent of the scene.

use crate::keyframe::{CameraPose, Transform};
use std::cell::Cell;
use std::time::Duration;

/// Source and sink of an object's transform
pub trait TransformBinding {
    /// Current transform, or `None` when unavailable
    fn read_transform(&self) -> Option<Transform>;
    /// Assign an interpolated transform
    fn write_transform(&self, transform: &Transform);
}

/// Source and sink of the camera pose
pub trait PoseBinding {
    /// Current pose, or `None` when no camera is active
    fn read_pose(&self) -> Option<CameraPose>;
    /// Move the camera to `pose` over `transition`
    fn apply_pose(&self, pose: &CameraPose, transition: Duration);
}

/// Scene object with a transform
#[derive(Debug)]
pub struct SceneObject {
    /// Display name
    pub name: String,
    transform: Cell<Transform>,
}

impl SceneObject {
    /// Create an object at the given transform
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform: Cell::new(transform),
        }
    }

    /// Current transform
    pub fn transform(&self) -> Transform {
        self.transform.get()
    }

    /// Place the object, as a gizmo drag would
    pub fn set_transform(&self, transform: Transform) {
        self.transform.set(transform);
    }
}

impl TransformBinding for SceneObject {
    fn read_transform(&self) -> Option<Transform> {
        Some(self.transform.get())
    }

    fn write_transform(&self, transform: &Transform) {
        self.transform.set(*transform);
    }
}

/// Viewport camera
#[derive(Debug, Default)]
pub struct Camera {
    pose: Cell<Option<CameraPose>>,
    last_transition: Cell<Option<Duration>>,
}

impl Camera {
    /// Create a camera at `pose`
    pub fn new(pose: CameraPose) -> Self {
        Self {
            pose: Cell::new(Some(pose)),
            last_transition: Cell::new(None),
        }
    }

    /// Camera with no pose yet (nothing rendered)
    pub fn detached() -> Self {
        Self::default()
    }

    /// Current pose
    pub fn pose(&self) -> Option<CameraPose> {
        self.pose.get()
    }

    /// Place the camera directly, as orbit controls would
    pub fn set_pose(&self, pose: CameraPose) {
        self.pose.set(Some(pose));
    }

    /// Transition used by the most recent `apply_pose`
    pub fn last_transition(&self) -> Option<Duration> {
        self.last_transition.get()
    }
}

impl PoseBinding for Camera {
    fn read_pose(&self) -> Option<CameraPose> {
        self.pose.get()
    }

    fn apply_pose(&self, pose: &CameraPose, transition: Duration) {
        // Headless camera: transitions land immediately
        self.pose.set(Some(*pose));
        self.last_transition.set(Some(transition));
    }
}
