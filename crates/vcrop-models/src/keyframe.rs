//! Keyframe schema and crop-data file I/O.
//!
//! The focus-coordinate oracle produces an ordered array of keyframes, each
//! a timestamped crop-position instruction. The array is persisted as a JSON
//! crop-data file between generation and consumption, so the pipeline can
//! re-load it without re-running the oracle.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::CropGeometry;

/// One timestamped crop-position instruction.
///
/// Coordinates are absolute pixels in the source frame, origin top-left.
/// The oracle contract fixes `y1 = 0`, `y2 = source height`, and
/// `x2 - x1 = crop width`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropKeyframe {
    /// Moment this crop position takes effect, `MM:SS.mmm`.
    pub timestamp: String,
    /// Oracle's explanation of the chosen position.
    pub reason: String,
    /// Left edge of the crop box.
    pub x1: i64,
    /// Top edge (always 0 per contract).
    pub y1: i64,
    /// Right edge of the crop box.
    pub x2: i64,
    /// Bottom edge (source height per contract).
    pub y2: i64,
}

impl CropKeyframe {
    /// Check this keyframe against the oracle's output contract.
    ///
    /// A violation is a failure of the generation step, not of the
    /// pipeline; offsets that are merely out of horizontal range are NOT
    /// a violation (they get clamped downstream).
    pub fn check_schema(&self, geometry: &CropGeometry) -> Result<(), KeyframeError> {
        if self.y1 != 0 {
            return Err(KeyframeError::schema(format!(
                "y1 must be 0, got {}",
                self.y1
            )));
        }
        if self.y2 != geometry.crop_height as i64 {
            return Err(KeyframeError::schema(format!(
                "y2 must equal the frame height {}, got {}",
                geometry.crop_height, self.y2
            )));
        }
        let box_width = self.x2 - self.x1;
        if box_width != self.geometry_box_width(geometry) {
            return Err(KeyframeError::schema(format!(
                "crop box width {} does not match target width {}",
                box_width,
                self.geometry_box_width(geometry)
            )));
        }
        Ok(())
    }

    fn geometry_box_width(&self, geometry: &CropGeometry) -> i64 {
        geometry.target_width as i64
    }
}

/// Load a crop-data file (JSON array of keyframes).
pub fn load_crop_data(path: impl AsRef<Path>) -> Result<Vec<CropKeyframe>, KeyframeError> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|source| KeyframeError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let frames: Vec<CropKeyframe> = serde_json::from_slice(&raw)?;
    Ok(frames)
}

/// Persist keyframes as a crop-data file.
pub fn save_crop_data(
    frames: &[CropKeyframe],
    path: impl AsRef<Path>,
) -> Result<(), KeyframeError> {
    let path = path.as_ref();
    let json = serde_json::to_vec_pretty(frames)?;
    std::fs::write(path, json).map_err(|source| KeyframeError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Errors loading, saving, or validating keyframes.
#[derive(Debug, Error)]
pub enum KeyframeError {
    #[error("Failed to read crop data file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write crop data file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid crop data JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keyframe violates oracle schema: {0}")]
    Schema(String),
}

impl KeyframeError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }
}
