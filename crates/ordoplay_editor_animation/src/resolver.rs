// SPDX-License-Identifier: MIT OR Apache-2.0
//! Active track resolution from the editor selection.

use crate::binding::SceneObject;
use crate::pose::PoseTrack;
use crate::timeline::TimelineSource;
use crate::track::{SharedTrack, TransformTrack};
use std::cell::RefCell;
use std::rc::Rc;

/// Something that may carry an animation track
pub trait Animatable {
    /// The track driving this object, if it has one
    fn track(&self) -> Option<SharedTrack>;
}

/// Scene object paired with its transform track
pub struct AnimatedObject {
    object: Rc<SceneObject>,
    track: Rc<RefCell<TransformTrack>>,
}

impl AnimatedObject {
    /// Wrap `object` with a fresh transform track
    pub fn new(object: Rc<SceneObject>, timeline: Rc<dyn TimelineSource>) -> Self {
        let track = TransformTrack::new(object.name.clone(), object.clone(), timeline);
        Self {
            object,
            track: Rc::new(RefCell::new(track)),
        }
    }

    /// The animated object
    pub fn object(&self) -> &Rc<SceneObject> {
        &self.object
    }

    /// Concrete transform track
    pub fn transform_track(&self) -> &Rc<RefCell<TransformTrack>> {
        &self.track
    }
}

impl Animatable for AnimatedObject {
    fn track(&self) -> Option<SharedTrack> {
        Some(self.track.clone())
    }
}

/// Current editor selection
#[derive(Clone, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    Nothing,
    /// The viewport camera
    Camera,
    /// An object exposing the track capability
    Object(Rc<dyn Animatable>),
    /// Anything else (lights, helpers, ...)
    Other,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::Camera => write!(f, "Camera"),
            Self::Object(_) => write!(f, "Object"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Selection queries the resolver needs
pub trait SelectionSource {
    /// Check if the camera is selected
    fn is_camera_selected(&self) -> bool;
    /// The selected animatable, if the selection has one
    fn selected_animatable(&self) -> Option<Rc<dyn Animatable>>;
}

/// Mutable selection holder
#[derive(Debug, Default)]
pub struct SceneSelection {
    current: RefCell<Selection>,
}

impl SceneSelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection
    pub fn select(&self, selection: Selection) {
        *self.current.borrow_mut() = selection;
    }

    /// Clear the selection
    pub fn clear(&self) {
        self.select(Selection::Nothing);
    }

    /// Current selection
    pub fn current(&self) -> Selection {
        self.current.borrow().clone()
    }
}

impl SelectionSource for SceneSelection {
    fn is_camera_selected(&self) -> bool {
        matches!(*self.current.borrow(), Selection::Camera)
    }

    fn selected_animatable(&self) -> Option<Rc<dyn Animatable>> {
        match &*self.current.borrow() {
            Selection::Object(animatable) => Some(animatable.clone()),
            _ => None,
        }
    }
}

/// Picks the track the timeline drives
pub struct TrackResolver {
    camera_track: Rc<RefCell<PoseTrack>>,
    selection: Rc<dyn SelectionSource>,
}

impl TrackResolver {
    /// Create a resolver over the camera's pose track and a selection
    pub fn new(camera_track: Rc<RefCell<PoseTrack>>, selection: Rc<dyn SelectionSource>) -> Self {
        Self {
            camera_track,
            selection,
        }
    }

    /// The camera's singleton pose track
    pub fn camera_track(&self) -> &Rc<RefCell<PoseTrack>> {
        &self.camera_track
    }

    /// Track for the current selection: the camera track when the camera is
    /// selected, otherwise the selection's own track, otherwise none
    pub fn active_track(&self) -> Option<SharedTrack> {
        if self.selection.is_camera_selected() {
            let track: SharedTrack = self.camera_track.clone();
            return Some(track);
        }
        self.selection.selected_animatable()?.track()
    }
}
