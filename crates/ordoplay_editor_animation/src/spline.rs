// SPDX-License-Identifier: MIT OR Apache-2.0
//! Periodic cardinal spline.
//!
//! Samples are interleaved: `stride` values per sample time. The curve loops
//! with the given period, so the segment after the last sample runs into the
//! first sample shifted by one period. Tangents are cardinal, scaled by the
//! smoothness factor: 0 gives flat tangents at every sample, 1 gives
//! Catmull-Rom tangents.

use crate::keyframe::Interpolation;
use thiserror::Error;

/// Spline construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    /// Not enough samples to span a curve
    #[error("Periodic spline needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    /// Stride of zero
    #[error("Spline stride must be non-zero")]
    ZeroStride,

    /// Value buffer does not match `times.len() * stride`
    #[error("Expected {expected} spline values, got {actual}")]
    ValueCountMismatch {
        /// Expected value count
        expected: usize,
        /// Provided value count
        actual: usize,
    },

    /// Period is not a positive finite number
    #[error("Invalid loop period: {0}")]
    InvalidPeriod(f32),

    /// Sample times are not strictly increasing
    #[error("Sample times must be strictly increasing")]
    UnorderedTimes,

    /// Smoothness is NaN or infinite
    #[error("Invalid spline smoothness: {0}")]
    InvalidSmoothness(f32),

    /// A sample time lies outside `[0, period)`
    #[error("Sample time {time} lies outside the loop period {period}")]
    SampleOutsidePeriod {
        /// Offending time
        time: f32,
        /// Loop period
        period: f32,
    },
}

/// Closed cubic Hermite curve over a looping frame range
#[derive(Debug, Clone)]
pub struct PeriodicSpline {
    times: Vec<f32>,
    values: Vec<f32>,
    /// Per-frame derivatives, same layout as `values`
    tangents: Vec<f32>,
    stride: usize,
    period: f32,
}

impl PeriodicSpline {
    /// Fit a spline through the given samples
    pub fn new(
        times: Vec<f32>,
        values: Vec<f32>,
        stride: usize,
        period: f32,
        smoothness: f32,
    ) -> Result<Self, SplineError> {
        if stride == 0 {
            return Err(SplineError::ZeroStride);
        }
        let n = times.len();
        if n < 2 {
            return Err(SplineError::TooFewSamples(n));
        }
        if values.len() != n * stride {
            return Err(SplineError::ValueCountMismatch {
                expected: n * stride,
                actual: values.len(),
            });
        }
        if !period.is_finite() || period <= 0.0 {
            return Err(SplineError::InvalidPeriod(period));
        }
        if !smoothness.is_finite() {
            return Err(SplineError::InvalidSmoothness(smoothness));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SplineError::UnorderedTimes);
        }
        for time in [times[0], times[n - 1]] {
            if !(0.0..period).contains(&time) {
                return Err(SplineError::SampleOutsidePeriod { time, period });
            }
        }

        let smoothness = smoothness.clamp(0.0, 1.0);
        let mut tangents = vec![0.0; values.len()];
        for i in 0..n {
            let (prev, prev_time) = if i == 0 {
                (n - 1, times[n - 1] - period)
            } else {
                (i - 1, times[i - 1])
            };
            let (next, next_time) = if i == n - 1 {
                (0, times[0] + period)
            } else {
                (i + 1, times[i + 1])
            };
            let span = next_time - prev_time;
            for c in 0..stride {
                let delta = values[next * stride + c] - values[prev * stride + c];
                tangents[i * stride + c] = smoothness * delta / span;
            }
        }

        Ok(Self {
            times,
            values,
            tangents,
            stride,
            period,
        })
    }

    /// Values per sample
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Loop period in frames
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Evaluate the curve at `frame`, writing `stride` values into `out`
    pub fn evaluate(&self, frame: f32, out: &mut [f32]) {
        debug_assert!(out.len() >= self.stride);

        let n = self.times.len();
        let x = frame.rem_euclid(self.period);

        let (i0, i1, start, end) = match self.times.iter().rposition(|&t| t <= x) {
            Some(i) if i + 1 < n => (i, i + 1, self.times[i], self.times[i + 1]),
            Some(i) => (i, 0, self.times[i], self.times[0] + self.period),
            None => (n - 1, 0, self.times[n - 1] - self.period, self.times[0]),
        };

        let span = end - start;
        let t = ((x - start) / span).clamp(0.0, 1.0);
        let s = self.stride;
        for (c, slot) in out.iter_mut().take(s).enumerate() {
            *slot = Interpolation::hermite(
                self.values[i0 * s + c],
                self.tangents[i0 * s + c] * span,
                self.values[i1 * s + c],
                self.tangents[i1 * s + c] * span,
                t,
            );
        }
    }
}
