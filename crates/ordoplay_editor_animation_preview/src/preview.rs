// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo scene: an orbiting cube and a dolly camera.

use ordoplay_editor_animation::{
    AnimatedObject, AnimationTrack, Camera, CameraPose, Interpolation, PoseRecord, PoseTrack,
    SceneObject, SceneSelection, Selection, TimelineBridge, TimelineSettings, TimelineSource,
    Timeline, TracingObserver, TrackResolver, Transform,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Keys per authored loop
const KEY_COUNT: u32 = 4;

/// Scene wired to a timeline bridge
pub struct PreviewScene {
    bridge: TimelineBridge,
    selection: Rc<SceneSelection>,
    camera: Rc<Camera>,
    cube: Rc<AnimatedObject>,
    frame_rate: f32,
}

impl PreviewScene {
    /// Build the scene for `settings`
    pub fn new(settings: &TimelineSettings) -> Self {
        let timeline = Rc::new(Timeline::new(settings));

        let camera = Rc::new(Camera::new(CameraPose::new([0.0, 2.0, 12.0], [0.0; 3])));
        let mut camera_track = PoseTrack::new(camera.clone(), timeline.clone());
        camera_track.subscribe(Rc::new(TracingObserver::new("Camera")));

        let object = Rc::new(SceneObject::new("Cube", Transform::default()));
        let cube = Rc::new(AnimatedObject::new(object, timeline.clone()));
        cube.transform_track()
            .borrow_mut()
            .subscribe(Rc::new(TracingObserver::new("Cube")));

        let selection = Rc::new(SceneSelection::new());
        let resolver = TrackResolver::new(Rc::new(RefCell::new(camera_track)), selection.clone());

        Self {
            bridge: TimelineBridge::with_settings(timeline, resolver, settings),
            selection,
            camera,
            cube,
            frame_rate: settings.frame_rate,
        }
    }

    /// Author a square orbit for the cube and a dolly for the camera
    pub fn author(&self) {
        let duration = self.bridge.timeline().duration();
        let step = (duration / KEY_COUNT).max(1);

        self.selection.select(Selection::Object(self.cube.clone()));
        let object = self.cube.object();
        for i in 0..KEY_COUNT {
            let angle = i as f32 * std::f32::consts::FRAC_PI_2;
            object.set_transform(Transform::new(
                [4.0 * angle.cos(), 0.0, 4.0 * angle.sin()],
                Interpolation::quat_from_axis_angle([0.0, 1.0, 0.0], -angle),
                [1.0 + 0.25 * i as f32, 1.0, 1.0],
            ));
            self.bridge.add_key(Some(i * step));
        }

        self.selection.select(Selection::Camera);
        for i in 0..KEY_COUNT / 2 {
            let distance = if i % 2 == 0 { 12.0 } else { 6.0 };
            self.camera
                .set_pose(CameraPose::new([0.0, 2.0, distance], [0.0; 3]));
            self.bridge.add_key(Some(i * step * 2));
        }
    }

    /// Play one full loop, logging a sample every `log_every` frames
    pub fn play_loop(&mut self, log_every: u32) {
        let duration = self.bridge.timeline().duration();
        let delta = 1.0 / self.frame_rate;

        self.bridge.play();
        for frame in 0..duration {
            for selection in [Selection::Object(self.cube.clone()), Selection::Camera] {
                self.selection.select(selection);
                self.bridge.refresh();
            }

            if frame % log_every.max(1) == 0 {
                let transform = self.cube.object().transform();
                tracing::info!(
                    frame,
                    position = ?transform.position,
                    scale = ?transform.scale,
                    camera = ?self.camera.pose(),
                    "Sampled"
                );
            }
            self.bridge.tick(delta);
        }
        self.bridge.stop();
    }

    /// Camera keys in the persisted layout
    pub fn export_camera(&self) -> Vec<PoseRecord> {
        self.bridge.resolver().camera_track().borrow().export()
    }
}
