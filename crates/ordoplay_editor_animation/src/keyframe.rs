// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions and interpolation helpers.

use serde::{Deserialize, Serialize};

/// Identity quaternion (x, y, z, w)
pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// A keyframe in a track: a timeline frame plus a captured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<V> {
    /// Timeline frame
    pub frame: u32,
    /// Value captured at this frame
    pub value: V,
}

impl<V> Keyframe<V> {
    /// Create a new keyframe
    pub fn new(frame: u32, value: V) -> Self {
        Self { frame, value }
    }
}

/// Object transform snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Rotation as a unit quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    /// Scale
    pub scale: [f32; 3],
}

impl Transform {
    /// Create a transform from its parts
    pub fn new(position: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Translation-only transform
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: IDENTITY_ROTATION,
            scale: [1.0, 1.0, 1.0],
        }
    }
}

/// Camera placement: eye position and the point it looks at
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    /// Eye position
    pub position: [f32; 3],
    /// Look-at target
    pub target: [f32; 3],
}

impl CameraPose {
    /// Create a camera pose
    pub fn new(position: [f32; 3], target: [f32; 3]) -> Self {
        Self { position, target }
    }
}

/// Value stored by a pose keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseValue {
    /// Display label
    pub name: String,
    /// Captured camera pose
    pub pose: CameraPose,
}

/// Keyframe of a transform track
pub type TransformKeyframe = Keyframe<Transform>;

/// Keyframe of a camera pose track
pub type PoseKeyframe = Keyframe<PoseValue>;

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Hermite spline interpolation
    pub fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
    }

    /// Interpolate Vec4
    pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
            Self::lerp(a[3], b[3], t),
        ]
    }

    /// Four-component dot product
    pub fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
    }

    /// Normalize a quaternion, leaving a zero quaternion untouched
    pub fn normalize_quat(q: [f32; 4]) -> [f32; 4] {
        let len = Self::dot4(q, q).sqrt();
        if len <= f32::EPSILON {
            return q;
        }
        [q[0] / len, q[1] / len, q[2] / len, q[3] / len]
    }

    /// Spherical linear interpolation for quaternions along the shortest arc
    pub fn slerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let mut dot = Self::dot4(a, b);

        // Handle opposite hemispheres
        let mut b = b;
        if dot < 0.0 {
            b = [-b[0], -b[1], -b[2], -b[3]];
            dot = -dot;
        }

        // Use lerp for very close quaternions
        if dot > 0.9995 {
            return Self::normalize_quat(Self::lerp_vec4(a, b, t));
        }

        let theta_0 = dot.acos();
        let sin_theta_0 = theta_0.sin();

        let s0 = ((1.0 - t) * theta_0).sin() / sin_theta_0;
        let s1 = (t * theta_0).sin() / sin_theta_0;

        [
            a[0] * s0 + b[0] * s1,
            a[1] * s0 + b[1] * s1,
            a[2] * s0 + b[2] * s1,
            a[3] * s0 + b[3] * s1,
        ]
    }

    /// Quaternion for a rotation of `angle` radians about the unit `axis`
    pub fn quat_from_axis_angle(axis: [f32; 3], angle: f32) -> [f32; 4] {
        let (s, c) = (angle * 0.5).sin_cos();
        [axis[0] * s, axis[1] * s, axis[2] * s, c]
    }
}
