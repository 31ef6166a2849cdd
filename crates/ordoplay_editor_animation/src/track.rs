// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions.
//!
//! A track owns a [`KeyframeStore`] and the interpolation state derived from
//! it. Structural edits rebuild that state immediately; timeline changes
//! (duration, smoothness) are detected by comparing against the
//! [`BuildStamp`] the state was fitted for, so a stale track rebuilds before
//! its next evaluation.
//!
//! Edits never call observers directly. Events are buffered on the track and
//! handed out by [`AnimationTrack::take_events`]; [`edit_track`] delivers them
//! after the track's borrow is released.

use crate::binding::TransformBinding;
use crate::bracket::bracket;
use crate::event::{ObserverList, PendingEvents, TrackEvent, TrackObserver};
use crate::keyframe::{Interpolation, Transform, TransformKeyframe};
use crate::spline::{PeriodicSpline, SplineError};
use crate::store::{KeyframeStore, StoreWrite};
use crate::timeline::TimelineSource;
use std::cell::RefCell;
use std::rc::Rc;

/// Type of track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Object position, rotation, scale
    Transform,
    /// Camera position and look-at target
    CameraPose,
}

/// Operations the timeline performs on whichever track it drives
pub trait AnimationTrack {
    /// Track type
    fn kind(&self) -> TrackKind;

    /// Capture the bound target's current state at `frame`
    fn add_key(&mut self, frame: u32);

    /// Delete the keyframe at `frame`, if any
    fn remove_key(&mut self, frame: u32);

    /// Move the keyframe at `from` to `to`, replacing any keyframe already there
    fn move_key(&mut self, from: u32, to: u32);

    /// Remove every keyframe
    fn clear(&mut self);

    /// Keyframe frames in store (insertion) order
    fn keys(&self) -> Vec<u32>;

    /// Keyframe count
    fn key_count(&self) -> usize;

    /// Check if a keyframe exists at `frame`
    fn has_key(&self, frame: u32) -> bool;

    /// Sample the track at `frame` and apply the result to the bound target
    fn evaluate(&mut self, frame: f32);

    /// Refit interpolation state against the current timeline
    fn rebuild(&mut self);

    /// React to a duration or smoothness change
    fn timeline_changed(&mut self);

    /// Attach an observer
    fn subscribe(&mut self, observer: Rc<dyn TrackObserver>);

    /// Hand out the events buffered since the last call
    fn take_events(&mut self) -> PendingEvents;
}

/// Track handle shared between the scene and the timeline
pub type SharedTrack = Rc<RefCell<dyn AnimationTrack>>;

/// Run `edit` on a shared track, then deliver its events with the borrow released
pub fn edit_track<R>(track: &SharedTrack, edit: impl FnOnce(&mut dyn AnimationTrack) -> R) -> R {
    let (result, pending) = {
        let mut track = track.borrow_mut();
        let result = edit(&mut *track);
        (result, track.take_events())
    };
    pending.deliver();
    result
}

/// Timeline parameters interpolation state was fitted against
#[derive(Debug, Clone, Copy)]
pub struct BuildStamp {
    /// Loop length in frames
    pub duration: u32,
    /// Spline smoothness
    pub smoothness: f32,
}

impl BuildStamp {
    /// Snapshot the timeline's current parameters
    pub fn current(timeline: &dyn TimelineSource) -> Self {
        Self {
            duration: timeline.duration(),
            smoothness: timeline.smoothness(),
        }
    }
}

// Bitwise on smoothness so a NaN stamp still matches itself
impl PartialEq for BuildStamp {
    fn eq(&self, other: &Self) -> bool {
        self.duration == other.duration && self.smoothness.to_bits() == other.smoothness.to_bits()
    }
}

impl Eq for BuildStamp {}

/// Keyframe lifecycle shared by every track type
pub(crate) struct TrackCore<V> {
    pub(crate) name: String,
    pub(crate) timeline: Rc<dyn TimelineSource>,
    pub(crate) observers: ObserverList,
    pending: Vec<TrackEvent>,
    pub(crate) store: KeyframeStore<V>,
    pub(crate) built_for: Option<BuildStamp>,
}

impl<V> TrackCore<V> {
    pub(crate) fn new(name: String, timeline: Rc<dyn TimelineSource>) -> Self {
        Self {
            name,
            timeline,
            observers: ObserverList::new(),
            pending: Vec::new(),
            store: KeyframeStore::new(),
            built_for: None,
        }
    }

    pub(crate) fn upsert(&mut self, frame: u32, value: V) -> TrackEvent {
        match self.store.upsert(frame, value) {
            StoreWrite::Inserted => TrackEvent::KeyAdded(frame),
            StoreWrite::Updated => TrackEvent::KeyUpdated(frame),
        }
    }

    pub(crate) fn remove(&mut self, frame: u32) -> Option<TrackEvent> {
        self.store.remove(frame)?;
        Some(TrackEvent::KeyRemoved(frame))
    }

    pub(crate) fn move_key(&mut self, from: u32, to: u32) -> Option<TrackEvent> {
        let moved = self.store.move_frame(from, to)?;
        if moved.replaced {
            tracing::debug!(track = %self.name, "Keyframe at {} replaced by move from {}", to, from);
        }
        Some(TrackEvent::KeyMoved { from, to })
    }

    pub(crate) fn clear(&mut self) -> TrackEvent {
        self.store.clear();
        TrackEvent::KeysCleared
    }

    /// Buffer `event` for delivery; dropped when nobody is listening
    pub(crate) fn emit(&mut self, event: TrackEvent) {
        if !self.observers.is_empty() {
            self.pending.push(event);
        }
    }

    pub(crate) fn take_events(&mut self) -> PendingEvents {
        PendingEvents::new(self.observers.clone(), std::mem::take(&mut self.pending))
    }

    pub(crate) fn stamp(&self) -> BuildStamp {
        BuildStamp::current(self.timeline.as_ref())
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.built_for != Some(self.stamp())
    }

    /// Active frames in chronological order
    pub(crate) fn active_frames(&self) -> Vec<u32> {
        self.store
            .active_sorted(self.stamp().duration)
            .iter()
            .map(|k| k.frame)
            .collect()
    }
}

impl<V> std::fmt::Debug for TrackCore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackCore")
            .field("name", &self.name)
            .field("keys", &self.store.frames())
            .field("pending", &self.pending.len())
            .field("built_for", &self.built_for)
            .finish()
    }
}

/// Fitted transform channels
#[derive(Debug)]
struct TransformInterpolation {
    position: PeriodicSpline,
    scale: PeriodicSpline,
    /// Chronological active frames
    frames: Vec<u32>,
    /// Rotations matching `frames`
    rotations: Vec<[f32; 4]>,
    period: f32,
}

impl TransformInterpolation {
    fn fit(keys: &[&TransformKeyframe], stamp: BuildStamp) -> Result<Option<Self>, SplineError> {
        if keys.len() < 2 {
            return Ok(None);
        }

        let period = stamp.duration as f32;
        let times: Vec<f32> = keys.iter().map(|k| k.frame as f32).collect();
        let positions = keys.iter().flat_map(|k| k.value.position).collect();
        let scales = keys.iter().flat_map(|k| k.value.scale).collect();

        Ok(Some(Self {
            position: PeriodicSpline::new(times.clone(), positions, 3, period, stamp.smoothness)?,
            scale: PeriodicSpline::new(times, scales, 3, period, stamp.smoothness)?,
            frames: keys.iter().map(|k| k.frame).collect(),
            rotations: keys.iter().map(|k| k.value.rotation).collect(),
            period,
        }))
    }

    fn sample(&self, frame: f32) -> Transform {
        let frame = frame.rem_euclid(self.period);

        let mut position = [0.0; 3];
        let mut scale = [0.0; 3];
        self.position.evaluate(frame, &mut position);
        self.scale.evaluate(frame, &mut scale);

        let rotation = match bracket(&self.frames, frame, self.period) {
            Some(b) => Interpolation::slerp(self.rotations[b.prev], self.rotations[b.next], b.t),
            None => crate::keyframe::IDENTITY_ROTATION,
        };

        Transform::new(position, rotation, scale)
    }
}

/// Position/rotation/scale track bound to a scene object
pub struct TransformTrack {
    core: TrackCore<Transform>,
    binding: Rc<dyn TransformBinding>,
    interpolation: Option<TransformInterpolation>,
}

impl TransformTrack {
    /// Create a transform track for `binding`
    pub fn new(
        name: impl Into<String>,
        binding: Rc<dyn TransformBinding>,
        timeline: Rc<dyn TimelineSource>,
    ) -> Self {
        Self {
            core: TrackCore::new(name.into(), timeline),
            binding,
            interpolation: None,
        }
    }

    /// Track name
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Get keyframe at frame (if exists)
    pub fn keyframe(&self, frame: u32) -> Option<&TransformKeyframe> {
        self.core.store.get(frame)
    }

    /// Keyframes in store order
    pub fn keyframes(&self) -> impl Iterator<Item = &TransformKeyframe> {
        self.core.store.iter()
    }

    /// Whether enough active keyframes exist to produce motion
    pub fn is_animating(&self) -> bool {
        self.interpolation.is_some()
    }

    /// Sample the track without applying it
    pub fn sample(&mut self, frame: f32) -> Option<Transform> {
        if self.core.is_stale() {
            self.rebuild();
        }
        self.interpolation.as_ref().map(|i| i.sample(frame))
    }
}

impl AnimationTrack for TransformTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Transform
    }

    fn add_key(&mut self, frame: u32) {
        let Some(mut transform) = self.binding.read_transform() else {
            tracing::debug!(track = %self.core.name, "No transform available, key at {} skipped", frame);
            return;
        };
        transform.rotation = Interpolation::normalize_quat(transform.rotation);

        let event = self.core.upsert(frame, transform);
        self.rebuild();
        self.core.emit(event);
    }

    fn remove_key(&mut self, frame: u32) {
        if let Some(event) = self.core.remove(frame) {
            self.rebuild();
            self.core.emit(event);
        }
    }

    fn move_key(&mut self, from: u32, to: u32) {
        if let Some(event) = self.core.move_key(from, to) {
            self.rebuild();
            self.core.emit(event);
        }
    }

    fn clear(&mut self) {
        let event = self.core.clear();
        self.rebuild();
        self.core.emit(event);
    }

    fn keys(&self) -> Vec<u32> {
        self.core.store.frames()
    }

    fn key_count(&self) -> usize {
        self.core.store.len()
    }

    fn has_key(&self, frame: u32) -> bool {
        self.core.store.contains(frame)
    }

    fn evaluate(&mut self, frame: f32) {
        if let Some(transform) = self.sample(frame) {
            self.binding.write_transform(&transform);
        }
    }

    fn rebuild(&mut self) {
        let stamp = self.core.stamp();
        let active = self.core.store.active_sorted(stamp.duration);

        self.interpolation = match TransformInterpolation::fit(&active, stamp) {
            Ok(fitted) => fitted,
            Err(e) => {
                tracing::warn!(track = %self.core.name, "Failed to fit transform track: {}", e);
                None
            }
        };
        self.core.built_for = Some(stamp);

        tracing::trace!(
            track = %self.core.name,
            active = active.len(),
            duration = stamp.duration,
            "Rebuilt transform track"
        );
    }

    fn timeline_changed(&mut self) {
        self.rebuild();
        let event = TrackEvent::KeysChanged(self.core.active_frames());
        self.core.emit(event);
    }

    fn subscribe(&mut self, observer: Rc<dyn TrackObserver>) {
        self.core.observers.subscribe(observer);
    }

    fn take_events(&mut self) -> PendingEvents {
        self.core.take_events()
    }
}

impl std::fmt::Debug for TransformTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformTrack")
            .field("core", &self.core)
            .field("animating", &self.interpolation.is_some())
            .finish()
    }
}
