// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline-to-track dispatch.
//!
//! The bridge is the only thing the timeline UI talks to. It owns the
//! timeline parameters, resolves the active track on every call, and
//! re-evaluates it whenever the cursor or loop parameters move. With no active
//! track every editing call is a no-op. Track events reach observers only
//! after the track's borrow is released.

use crate::resolver::TrackResolver;
use crate::timeline::{Playback, Timeline, TimelineSettings, TimelineSource};
use crate::track::{edit_track, SharedTrack};
use std::rc::Rc;

/// Forwards timeline changes and key edits to the active track
pub struct TimelineBridge {
    timeline: Rc<Timeline>,
    resolver: TrackResolver,
    playback: Playback,
}

impl TimelineBridge {
    /// Create a bridge over a shared timeline
    pub fn new(timeline: Rc<Timeline>, resolver: TrackResolver) -> Self {
        Self {
            timeline,
            resolver,
            playback: Playback::default(),
        }
    }

    /// Create a bridge with playback speed taken from `settings`
    pub fn with_settings(
        timeline: Rc<Timeline>,
        resolver: TrackResolver,
        settings: &TimelineSettings,
    ) -> Self {
        Self {
            timeline,
            resolver,
            playback: Playback::new(settings.speed),
        }
    }

    /// Shared timeline
    pub fn timeline(&self) -> &Rc<Timeline> {
        &self.timeline
    }

    /// Track resolver
    pub fn resolver(&self) -> &TrackResolver {
        &self.resolver
    }

    /// Playback clock
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Track the timeline currently drives
    pub fn active_track(&self) -> Option<SharedTrack> {
        self.resolver.active_track()
    }

    /// Keyframes of the active track in store order
    pub fn keys(&self) -> Vec<u32> {
        self.active_track()
            .map(|track| track.borrow().keys())
            .unwrap_or_default()
    }

    /// Capture a key on the active track, at the cursor when `frame` is `None`
    pub fn add_key(&self, frame: Option<u32>) {
        let frame = frame.unwrap_or_else(|| self.timeline.cursor_frame());
        if let Some(track) = self.active_track() {
            tracing::debug!(kind = ?track.borrow().kind(), "Adding key at frame {}", frame);
            edit_track(&track, |track| track.add_key(frame));
        }
    }

    /// Remove a key from the active track, at the cursor when `frame` is `None`
    pub fn remove_key(&self, frame: Option<u32>) {
        let frame = frame.unwrap_or_else(|| self.timeline.cursor_frame());
        if let Some(track) = self.active_track() {
            tracing::debug!(kind = ?track.borrow().kind(), "Removing key at frame {}", frame);
            edit_track(&track, |track| track.remove_key(frame));
        }
    }

    /// Move a key on the active track
    pub fn move_key(&self, from: u32, to: u32) {
        if let Some(track) = self.active_track() {
            tracing::debug!("Moving key from frame {} to {}", from, to);
            edit_track(&track, |track| track.move_key(from, to));
        }
    }

    /// Remove every key from the active track
    pub fn clear_keys(&self) {
        if let Some(track) = self.active_track() {
            edit_track(&track, |track| track.clear());
        }
    }

    /// Move the cursor and evaluate
    pub fn set_cursor(&self, frame: f32) {
        self.timeline.set_cursor(frame);
        self.refresh();
    }

    /// Change the loop length, refit the active track and evaluate
    pub fn set_duration(&self, duration: u32) {
        if duration == self.timeline.duration() {
            return;
        }
        tracing::debug!("Timeline duration {} -> {}", self.timeline.duration(), duration);
        self.timeline.set_duration(duration);
        self.timeline_changed();
    }

    /// Change spline smoothness, refit the active track and evaluate
    pub fn set_smoothness(&self, smoothness: f32) {
        let previous = self.timeline.smoothness();
        self.timeline.set_smoothness(smoothness);
        if self.timeline.smoothness() != previous {
            self.timeline_changed();
        }
    }

    /// Evaluate the active track at the cursor
    pub fn refresh(&self) {
        if let Some(track) = self.active_track() {
            track.borrow_mut().evaluate(self.timeline.cursor());
        }
    }

    /// Advance playback by `delta_seconds` and evaluate
    pub fn tick(&mut self, delta_seconds: f32) {
        if self.playback.update(delta_seconds, &self.timeline).is_some() {
            self.refresh();
        }
    }

    /// Start playback
    pub fn play(&mut self) {
        self.playback.play();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.playback.pause();
    }

    /// Stop playback, rewind and evaluate the first frame
    pub fn stop(&mut self) {
        self.playback.stop(&self.timeline);
        self.refresh();
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        self.playback.toggle();
    }

    /// Drop all camera keys for a fresh scene
    pub fn reset_scene(&mut self) {
        self.playback.stop(&self.timeline);
        let camera_track: SharedTrack = self.resolver.camera_track().clone();
        edit_track(&camera_track, |track| track.clear());
    }

    fn timeline_changed(&self) {
        if let Some(track) = self.active_track() {
            let cursor = self.timeline.cursor();
            edit_track(&track, |track| {
                track.timeline_changed();
                track.evaluate(cursor);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Camera, SceneObject};
    use crate::event::{EventLog, TrackEvent, TrackObserver};
    use crate::track::AnimationTrack;
    use std::rc::Weak;
    use crate::keyframe::{CameraPose, Interpolation, Transform};
    use crate::pose::PoseTrack;
    use crate::resolver::{AnimatedObject, SceneSelection, Selection};
    use std::cell::RefCell;

    struct Fixture {
        bridge: TimelineBridge,
        selection: Rc<SceneSelection>,
        camera: Rc<Camera>,
        cube: Rc<AnimatedObject>,
    }

    fn fixture(duration: u32) -> Fixture {
        let settings = TimelineSettings {
            duration,
            frame_rate: 10.0,
            ..TimelineSettings::default()
        };
        let timeline = Rc::new(Timeline::new(&settings));
        let camera = Rc::new(Camera::new(CameraPose::new([0.0, 0.0, 10.0], [0.0; 3])));
        let camera_track = Rc::new(RefCell::new(PoseTrack::new(camera.clone(), timeline.clone())));
        let selection = Rc::new(SceneSelection::new());
        let resolver = TrackResolver::new(camera_track, selection.clone());

        let object = Rc::new(SceneObject::new("Cube", Transform::default()));
        let cube = Rc::new(AnimatedObject::new(object, timeline.clone()));

        Fixture {
            bridge: TimelineBridge::with_settings(timeline, resolver, &settings),
            selection,
            camera,
            cube,
        }
    }

    #[test]
    fn test_no_active_track_degrades_to_noops() {
        let f = fixture(100);
        assert!(f.bridge.keys().is_empty());
        f.bridge.add_key(Some(3));
        f.bridge.remove_key(None);
        f.bridge.move_key(3, 4);
        f.bridge.set_cursor(20.0);
        assert!(f.bridge.keys().is_empty());
        assert!(f.bridge.resolver().camera_track().borrow().keys().is_empty());
    }

    #[test]
    fn test_add_key_defaults_to_cursor() {
        let f = fixture(100);
        f.selection.select(Selection::Camera);

        f.bridge.set_cursor(42.6);
        f.bridge.add_key(None);
        f.bridge.add_key(Some(7));
        assert_eq!(f.bridge.keys(), vec![42, 7]);

        f.bridge.set_cursor(7.0);
        f.bridge.remove_key(None);
        assert_eq!(f.bridge.keys(), vec![42]);
    }

    #[test]
    fn test_edits_follow_selection() {
        let f = fixture(100);
        f.selection.select(Selection::Object(f.cube.clone()));
        f.bridge.add_key(Some(0));
        f.bridge.add_key(Some(50));
        f.bridge.move_key(50, 60);

        f.selection.select(Selection::Camera);
        assert!(f.bridge.keys().is_empty());
        f.bridge.add_key(Some(10));

        f.selection.select(Selection::Object(f.cube.clone()));
        assert_eq!(f.bridge.keys(), vec![0, 60]);
        assert_eq!(f.bridge.resolver().camera_track().borrow().keys(), vec![10]);
    }

    #[test]
    fn test_cursor_drives_object() {
        let f = fixture(100);
        let object = f.cube.object().clone();
        f.selection.select(Selection::Object(f.cube.clone()));

        f.bridge.add_key(Some(0));
        object.set_transform(Transform::new(
            [4.0, 0.0, 0.0],
            Interpolation::quat_from_axis_angle([0.0, 0.0, 1.0], 1.0),
            [1.0, 1.0, 1.0],
        ));
        f.bridge.add_key(Some(50));

        f.bridge.set_cursor(0.0);
        assert_eq!(object.transform().position, [0.0, 0.0, 0.0]);
        f.bridge.set_cursor(50.0);
        assert_eq!(object.transform().position, [4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_duration_change_refilters_active_track() {
        let f = fixture(100);
        f.selection.select(Selection::Camera);
        let log = Rc::new(EventLog::new());
        f.bridge
            .resolver()
            .camera_track()
            .borrow_mut()
            .subscribe(log.clone());

        f.bridge.add_key(Some(0));
        f.camera.set_pose(CameraPose::new([5.0, 0.0, 0.0], [0.0; 3]));
        f.bridge.add_key(Some(80));
        log.take();

        f.bridge.set_duration(50);
        assert_eq!(log.take(), vec![TrackEvent::KeysChanged(vec![0])]);
        f.bridge.set_duration(50);
        assert!(log.take().is_empty());

        f.bridge.set_smoothness(0.1);
        assert_eq!(log.take(), vec![TrackEvent::KeysChanged(vec![0])]);
    }

    /// Reads the bridge's keys every time it hears from a track
    struct KeyReader {
        bridge: Weak<TimelineBridge>,
        seen: RefCell<Vec<Vec<u32>>>,
    }

    impl TrackObserver for KeyReader {
        fn on_track_event(&self, _event: &TrackEvent) {
            if let Some(bridge) = self.bridge.upgrade() {
                self.seen.borrow_mut().push(bridge.keys());
            }
        }
    }

    #[test]
    fn test_observer_can_read_back_during_edits() {
        let f = fixture(100);
        f.selection.select(Selection::Camera);
        let bridge = Rc::new(f.bridge);
        let reader = Rc::new(KeyReader {
            bridge: Rc::downgrade(&bridge),
            seen: RefCell::new(Vec::new()),
        });
        bridge
            .resolver()
            .camera_track()
            .borrow_mut()
            .subscribe(reader.clone());

        bridge.add_key(Some(3));
        bridge.add_key(Some(40));
        bridge.move_key(3, 10);
        bridge.set_duration(30);
        bridge.remove_key(Some(40));
        bridge.clear_keys();

        assert_eq!(
            *reader.seen.borrow(),
            vec![
                vec![3],
                vec![3, 40],
                vec![10, 40],
                vec![10, 40],
                vec![10],
                vec![],
            ]
        );
    }

    #[test]
    fn test_nan_smoothness_keeps_motion_finite() {
        let f = fixture(300);
        let object = f.cube.object().clone();
        f.selection.select(Selection::Object(f.cube.clone()));
        for (frame, x) in [(0, 0.0), (100, 6.0), (200, -3.0)] {
            object.set_transform(Transform::from_position([x, 1.0, 0.0]));
            f.bridge.add_key(Some(frame));
        }
        f.bridge.set_cursor(50.0);
        let before = object.transform().position;

        f.bridge.set_smoothness(f32::NAN);
        f.bridge.set_cursor(50.0);
        let position = object.transform().position;
        assert!(position.iter().all(|v| v.is_finite()));
        assert_eq!(position, before);
    }

    #[test]
    fn test_tick_advances_and_evaluates() {
        let mut f = fixture(100);
        f.selection.select(Selection::Camera);
        f.bridge.add_key(Some(0));
        f.camera.set_pose(CameraPose::new([0.0, 0.0, -10.0], [0.0; 3]));
        f.bridge.add_key(Some(50));

        f.bridge.tick(1.0);
        assert_eq!(f.bridge.timeline().cursor(), 0.0);

        f.bridge.play();
        // 10 fps for 5 seconds lands on the second key
        f.bridge.tick(5.0);
        assert!((f.bridge.timeline().cursor() - 50.0).abs() < 1e-4);
        let pose = f.camera.pose().unwrap();
        assert!((pose.position[2] + 10.0).abs() < 1e-3);

        f.bridge.stop();
        assert_eq!(f.bridge.timeline().cursor(), 0.0);
        assert_eq!(f.camera.pose().map(|p| p.position), Some([0.0, 0.0, 10.0]));
    }

    #[test]
    fn test_reset_scene_clears_camera_track() {
        let mut f = fixture(100);
        f.selection.select(Selection::Camera);
        f.bridge.add_key(Some(0));
        f.bridge.add_key(Some(20));
        f.bridge.reset_scene();
        assert!(f.bridge.keys().is_empty());
    }
}
