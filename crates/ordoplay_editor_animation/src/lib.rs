// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe animation for OrdoPlay Editor.
//!
//! This crate animates scene objects and the viewport camera along a looping,
//! frame-indexed timeline:
//! - Transform tracks (position, rotation, scale)
//! - Camera pose tracks (position, look-at target)
//! - Active track resolution from the editor selection
//! - Timeline dispatch and looping playback
//!
//! ## Architecture
//!
//! The animation system is built on:
//! - Insertion-ordered keyframe stores with unique frames
//! - Periodic cardinal splines for position, scale and camera channels
//! - Loop-aware bracketing plus slerp for rotation
//! - Injected timeline and observer collaborators instead of a global event bus

pub mod binding;
pub mod bracket;
pub mod bridge;
pub mod error;
pub mod event;
pub mod keyframe;
pub mod pose;
pub mod resolver;
pub mod spline;
pub mod store;
pub mod timeline;
pub mod track;

pub use binding::{Camera, PoseBinding, SceneObject, TransformBinding};
pub use bracket::{bracket, Bracket};
pub use bridge::TimelineBridge;
pub use error::{AnimationError, Result};
pub use event::{
    EventLog, ObserverList, PendingEvents, TrackEvent, TrackObserver, TracingObserver,
};
pub use keyframe::{
    CameraPose, Interpolation, Keyframe, PoseKeyframe, PoseValue, Transform, TransformKeyframe,
    IDENTITY_ROTATION,
};
pub use pose::{PoseRecord, PoseTrack};
pub use resolver::{
    AnimatedObject, Animatable, SceneSelection, Selection, SelectionSource, TrackResolver,
};
pub use spline::{PeriodicSpline, SplineError};
pub use store::{KeyframeStore, StoreMove, StoreWrite};
pub use timeline::{
    Playback, PlaybackState, Timeline, TimelineSettings, TimelineSource, DEFAULT_SMOOTHNESS,
};
pub use track::{
    edit_track, AnimationTrack, BuildStamp, SharedTrack, TrackKind, TransformTrack,
};
