// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera pose track.
//!
//! Position and look-at target are fitted together as one six-channel
//! periodic spline. There is no orientation channel; the camera derives its
//! orientation from the target.

use crate::binding::PoseBinding;
use crate::error::Result;
use crate::event::{PendingEvents, TrackEvent, TrackObserver};
use crate::keyframe::{CameraPose, PoseKeyframe, PoseValue};
use crate::spline::{PeriodicSpline, SplineError};
use crate::timeline::TimelineSource;
use crate::track::{AnimationTrack, BuildStamp, TrackCore, TrackKind};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

/// Channels per pose sample: position xyz, target xyz
const POSE_STRIDE: usize = 6;

/// Persisted pose keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// Display label
    pub name: String,
    /// Timeline frame; absent in files written before frames were stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
    /// Eye position
    pub position: [f32; 3],
    /// Look-at target
    pub target: [f32; 3],
}

impl PoseRecord {
    /// Serialize a record list to JSON
    pub fn list_to_json(records: &[PoseRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    /// Deserialize a record list from JSON
    pub fn list_from_json(source: &str) -> Result<Vec<PoseRecord>> {
        Ok(serde_json::from_str(source)?)
    }

    /// Serialize a record list to RON
    pub fn list_to_ron(records: &[PoseRecord]) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            records,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Deserialize a record list from RON
    pub fn list_from_ron(source: &str) -> Result<Vec<PoseRecord>> {
        Ok(ron::from_str(source)?)
    }
}

/// Fitted pose channels
#[derive(Debug)]
struct PoseInterpolation {
    spline: PeriodicSpline,
}

impl PoseInterpolation {
    fn fit(keys: &[&PoseKeyframe], stamp: BuildStamp) -> std::result::Result<Option<Self>, SplineError> {
        if keys.len() < 2 {
            return Ok(None);
        }

        let times = keys.iter().map(|k| k.frame as f32).collect();
        let values = keys
            .iter()
            .flat_map(|k| k.value.pose.position.into_iter().chain(k.value.pose.target))
            .collect();

        let spline = PeriodicSpline::new(
            times,
            values,
            POSE_STRIDE,
            stamp.duration as f32,
            stamp.smoothness,
        )?;
        Ok(Some(Self { spline }))
    }

    fn sample(&self, frame: f32) -> CameraPose {
        let mut out = [0.0; POSE_STRIDE];
        self.spline.evaluate(frame, &mut out);
        CameraPose::new([out[0], out[1], out[2]], [out[3], out[4], out[5]])
    }
}

/// Camera position/target track
pub struct PoseTrack {
    core: TrackCore<PoseValue>,
    binding: Rc<dyn PoseBinding>,
    interpolation: Option<PoseInterpolation>,
}

impl PoseTrack {
    /// Create a pose track for `binding`
    pub fn new(binding: Rc<dyn PoseBinding>, timeline: Rc<dyn TimelineSource>) -> Self {
        Self {
            core: TrackCore::new("Camera".to_string(), timeline),
            binding,
            interpolation: None,
        }
    }

    /// Get keyframe at frame (if exists)
    pub fn keyframe(&self, frame: u32) -> Option<&PoseKeyframe> {
        self.core.store.get(frame)
    }

    /// Keyframes in store order
    pub fn keyframes(&self) -> impl Iterator<Item = &PoseKeyframe> {
        self.core.store.iter()
    }

    /// Whether enough active keyframes exist to produce motion
    pub fn is_animating(&self) -> bool {
        self.interpolation.is_some()
    }

    /// Sample the track without applying it
    pub fn sample(&mut self, frame: f32) -> Option<CameraPose> {
        if self.core.is_stale() {
            self.rebuild();
        }
        self.interpolation.as_ref().map(|i| i.sample(frame))
    }

    /// All stored keyframes in store order, including inactive ones
    pub fn export(&self) -> Vec<PoseRecord> {
        self.core
            .store
            .iter()
            .map(|k| PoseRecord {
                name: k.value.name.clone(),
                frame: Some(k.frame),
                position: k.value.pose.position,
                target: k.value.pose.target,
            })
            .collect()
    }

    /// Replace every keyframe with `records`.
    ///
    /// Records without a frame are placed at `index * frame_rate`. A later
    /// record at an already used frame overwrites the earlier one.
    pub fn import(&mut self, records: Vec<PoseRecord>) {
        let frame_rate = self.core.timeline.frame_rate();
        self.core.store.clear();

        for (index, record) in records.into_iter().enumerate() {
            let frame = record
                .frame
                .unwrap_or_else(|| (index as f32 * frame_rate).round() as u32);
            let value = PoseValue {
                name: record.name,
                pose: CameraPose::new(record.position, record.target),
            };
            self.core.store.upsert(frame, value);
        }

        self.rebuild();
        tracing::debug!("Loaded {} camera keyframes", self.core.store.len());
        let event = TrackEvent::KeysLoaded(self.core.store.frames());
        self.core.emit(event);
    }
}

impl AnimationTrack for PoseTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::CameraPose
    }

    fn add_key(&mut self, frame: u32) {
        let Some(pose) = self.binding.read_pose() else {
            tracing::debug!("No camera pose available, key at {} skipped", frame);
            return;
        };

        let name = self
            .core
            .store
            .get(frame)
            .map(|k| k.value.name.clone())
            .unwrap_or_else(|| format!("Pose {frame}"));

        let event = self.core.upsert(frame, PoseValue { name, pose });
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
        if let Some(pose) = self.sample(frame) {
            self.binding.apply_pose(&pose, Duration::ZERO);
        }
    }

    fn rebuild(&mut self) {
        let stamp = self.core.stamp();
        let active = self.core.store.active_sorted(stamp.duration);

        self.interpolation = match PoseInterpolation::fit(&active, stamp) {
            Ok(fitted) => fitted,
            Err(e) => {
                tracing::warn!("Failed to fit camera track: {}", e);
                None
            }
        };
        self.core.built_for = Some(stamp);

        tracing::trace!(
            active = active.len(),
            duration = stamp.duration,
            "Rebuilt camera track"
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

impl std::fmt::Debug for PoseTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseTrack")
            .field("core", &self.core)
            .field("animating", &self.interpolation.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Camera;
    use crate::event::EventLog;
    use crate::timeline::{Timeline, TimelineSettings};

    fn setup(duration: u32) -> (PoseTrack, Rc<Camera>, Rc<Timeline>) {
        let timeline = Rc::new(Timeline::new(&TimelineSettings {
            duration,
            frame_rate: 30.0,
            ..TimelineSettings::default()
        }));
        let camera = Rc::new(Camera::new(CameraPose::default()));
        let track = PoseTrack::new(camera.clone(), timeline.clone());
        (track, camera, timeline)
    }

    fn key_at(track: &mut PoseTrack, camera: &Camera, frame: u32, position: [f32; 3], target: [f32; 3]) {
        camera.set_pose(CameraPose::new(position, target));
        track.add_key(frame);
    }

    #[test]
    fn test_evaluate_applies_instantly() {
        let (mut track, camera, _) = setup(120);
        key_at(&mut track, &camera, 0, [0.0, 2.0, 10.0], [0.0, 0.0, 0.0]);
        key_at(&mut track, &camera, 60, [10.0, 2.0, 0.0], [1.0, 0.0, 0.0]);

        track.evaluate(60.0);
        let pose = camera.pose().unwrap();
        assert_eq!(pose.position, [10.0, 2.0, 0.0]);
        assert_eq!(pose.target, [1.0, 0.0, 0.0]);
        assert_eq!(camera.last_transition(), Some(Duration::ZERO));
    }

    #[test]
    fn test_detached_camera_adds_nothing() {
        let timeline = Rc::new(Timeline::default());
        let camera = Rc::new(Camera::detached());
        let mut track = PoseTrack::new(camera, timeline);
        track.add_key(0);
        assert!(track.keys().is_empty());
    }

    #[test]
    fn test_single_active_key_does_not_move_camera() {
        let (mut track, camera, _) = setup(100);
        key_at(&mut track, &camera, 0, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]);
        key_at(&mut track, &camera, 100, [9.0, 9.0, 9.0], [0.0, 0.0, 0.0]);
        camera.set_pose(CameraPose::new([5.0, 5.0, 5.0], [0.0, 0.0, 0.0]));

        track.evaluate(20.0);
        assert!(!track.is_animating());
        assert_eq!(camera.last_transition(), None);
        assert_eq!(camera.pose().map(|p| p.position), Some([5.0, 5.0, 5.0]));
    }

    #[test]
    fn test_overwrite_keeps_name() {
        let (mut track, camera, _) = setup(100);
        key_at(&mut track, &camera, 10, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        key_at(&mut track, &camera, 10, [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        let keyframe = track.keyframe(10).unwrap();
        assert_eq!(keyframe.value.name, "Pose 10");
        assert_eq!(keyframe.value.pose.position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let (mut track, camera, _) = setup(100);
        key_at(&mut track, &camera, 40, [1.5, 2.0, -3.25], [0.0, 1.0, 0.0]);
        key_at(&mut track, &camera, 0, [0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
        key_at(&mut track, &camera, 250, [7.0, 7.0, 7.0], [1.0, 1.0, 1.0]);

        let json = PoseRecord::list_to_json(&track.export()).unwrap();
        let records = PoseRecord::list_from_json(&json).unwrap();

        let (mut restored, _, _) = setup(100);
        let log = Rc::new(EventLog::new());
        restored.subscribe(log.clone());
        restored.import(records);
        restored.take_events().deliver();

        assert_eq!(restored.export(), track.export());
        assert_eq!(restored.keys(), vec![40, 0, 250]);
        assert_eq!(log.take(), vec![TrackEvent::KeysLoaded(vec![40, 0, 250])]);
        assert_eq!(restored.sample(20.0), track.sample(20.0));
    }

    #[test]
    fn test_import_backfills_legacy_frames() {
        let (mut track, _, _) = setup(300);
        let legacy = r#"[
            {"name": "Start", "position": [0, 0, 10], "target": [0, 0, 0]},
            {"name": "Side", "position": [10, 0, 0], "target": [0, 0, 0]},
            {"name": "Top", "frame": 200, "position": [0, 10, 0], "target": [0, 0, 0]}
        ]"#;
        track.import(PoseRecord::list_from_json(legacy).unwrap());

        assert_eq!(track.keys(), vec![0, 30, 200]);
        assert_eq!(track.keyframe(30).map(|k| k.value.name.as_str()), Some("Side"));
        assert!(track.is_animating());
    }

    #[test]
    fn test_ron_roundtrip() {
        let records = vec![PoseRecord {
            name: "Wide".to_string(),
            frame: Some(12),
            position: [1.0, 2.0, 3.0],
            target: [0.0, 0.5, 0.0],
        }];
        let ron_str = PoseRecord::list_to_ron(&records).unwrap();
        assert_eq!(PoseRecord::list_from_ron(&ron_str).unwrap(), records);
    }

    #[test]
    fn test_import_replaces_existing_keys() {
        let (mut track, camera, _) = setup(100);
        key_at(&mut track, &camera, 5, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        track.import(Vec::new());
        assert!(track.keys().is_empty());
        assert!(!track.is_animating());
    }
}
