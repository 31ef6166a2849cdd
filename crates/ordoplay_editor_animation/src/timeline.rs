// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline parameters and playback.
//!
//! Tracks read the timeline through [`TimelineSource`]; they never own it.
//! [`Timeline`] is the editor-side implementation, shared by `Rc` between the
//! bridge and every track, with interior mutability for its scalar fields.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::Path;

/// Smoothness used when none, or an unusable one, is configured
pub const DEFAULT_SMOOTHNESS: f32 = 0.5;

/// Read-only view of the timeline parameters a track depends on
pub trait TimelineSource {
    /// Loop length in frames
    fn duration(&self) -> u32;
    /// Current cursor position in frames
    fn cursor(&self) -> f32;
    /// Spline smoothness in `[0, 1]`
    fn smoothness(&self) -> f32;
    /// Frames per second
    fn frame_rate(&self) -> f32;

    /// Current cursor as a whole frame
    fn cursor_frame(&self) -> u32 {
        self.cursor().max(0.0).floor() as u32
    }
}

/// Persisted timeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Loop length in frames
    pub duration: u32,
    /// Frames per second
    pub frame_rate: f32,
    /// Spline smoothness in `[0, 1]`
    pub smoothness: f32,
    /// Playback speed multiplier
    pub speed: f32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            duration: 300,
            frame_rate: 30.0,
            smoothness: DEFAULT_SMOOTHNESS,
            speed: 1.0,
        }
    }
}

impl TimelineSettings {
    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Deserialize from RON
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&source)?;
        tracing::debug!("Loaded timeline settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

fn clamp_smoothness(smoothness: f32) -> Option<f32> {
    smoothness.is_finite().then(|| smoothness.clamp(0.0, 1.0))
}

/// Editor timeline state
#[derive(Debug)]
pub struct Timeline {
    duration: Cell<u32>,
    cursor: Cell<f32>,
    smoothness: Cell<f32>,
    frame_rate: Cell<f32>,
}

impl Timeline {
    /// Create a timeline from settings, cursor at frame 0
    pub fn new(settings: &TimelineSettings) -> Self {
        Self {
            duration: Cell::new(settings.duration),
            cursor: Cell::new(0.0),
            smoothness: Cell::new(
                clamp_smoothness(settings.smoothness).unwrap_or(DEFAULT_SMOOTHNESS),
            ),
            frame_rate: Cell::new(settings.frame_rate),
        }
    }

    /// Set the loop length
    pub fn set_duration(&self, duration: u32) {
        self.duration.set(duration);
    }

    /// Move the cursor
    pub fn set_cursor(&self, frame: f32) {
        self.cursor.set(frame.max(0.0));
    }

    /// Set spline smoothness, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_smoothness(&self, smoothness: f32) {
        match clamp_smoothness(smoothness) {
            Some(smoothness) => self.smoothness.set(smoothness),
            None => tracing::warn!("Ignoring non-finite smoothness {}", smoothness),
        }
    }

    /// Set frames per second
    pub fn set_frame_rate(&self, frame_rate: f32) {
        self.frame_rate.set(frame_rate);
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(&TimelineSettings::default())
    }
}

impl TimelineSource for Timeline {
    fn duration(&self) -> u32 {
        self.duration.get()
    }

    fn cursor(&self) -> f32 {
        self.cursor.get()
    }

    fn smoothness(&self) -> f32 {
        self.smoothness.get()
    }

    fn frame_rate(&self) -> f32 {
        self.frame_rate.get()
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped at the loop start
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// Looping playback clock that drives the timeline cursor
#[derive(Debug, Clone)]
pub struct Playback {
    /// Playback state
    pub state: PlaybackState,
    /// Playback speed multiplier
    pub speed: f32,
}

impl Playback {
    /// Create a stopped playback clock
    pub fn new(speed: f32) -> Self {
        Self {
            state: PlaybackState::Stopped,
            speed,
        }
    }

    /// Advance the cursor by `delta_seconds`, wrapping at the loop end.
    ///
    /// Returns the new cursor when playing.
    pub fn update(&mut self, delta_seconds: f32, timeline: &Timeline) -> Option<f32> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        let duration = timeline.duration() as f32;
        let mut cursor = timeline.cursor() + delta_seconds * timeline.frame_rate() * self.speed;
        if duration > 0.0 {
            cursor = cursor.rem_euclid(duration);
        }
        timeline.set_cursor(cursor);
        Some(timeline.cursor())
    }

    /// Play from current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop and rewind to the loop start
    pub fn stop(&mut self, timeline: &Timeline) {
        self.state = PlaybackState::Stopped;
        timeline.set_cursor(0.0);
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(1.0)
    }
}
