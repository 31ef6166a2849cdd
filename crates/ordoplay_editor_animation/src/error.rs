// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for fallible animation boundaries.
//!
//! Editing and evaluation never fail; only codecs, settings files and spline
//! construction report errors.

use crate::spline::SplineError;
use thiserror::Error;

/// Animation errors
#[derive(Debug, Error)]
pub enum AnimationError {
    /// Spline could not be fitted
    #[error("Spline error: {0}")]
    Spline(#[from] SplineError),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON decoding failed
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON encoding failed
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// File access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
