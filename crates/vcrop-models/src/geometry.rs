//! Crop geometry resolution.
//!
//! Computes the 9:16 crop window for a landscape source and clamps
//! keyframe offsets against the source bounds. All encode dimensions are
//! floored to even pixel counts (H.264 rejects odd dimensions), and both
//! execution backends consume the same resolved geometry so their outputs
//! match.

use tracing::warn;

/// Target aspect ratio numerator (width).
pub const TARGET_ASPECT_NUM: u32 = 9;
/// Target aspect ratio denominator (height).
pub const TARGET_ASPECT_DEN: u32 = 16;

/// Assumed source dimensions when the input cannot be probed.
///
/// These match the defaults the focus-coordinate oracle assumes when it is
/// not told the real resolution.
pub const FALLBACK_SOURCE_WIDTH: u32 = 1920;
/// See [`FALLBACK_SOURCE_WIDTH`].
pub const FALLBACK_SOURCE_HEIGHT: u32 = 1080;

/// Resolved crop window geometry for one source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    /// Raw 9:16 target width, `floor(height * 9/16)` (607 for 1080p).
    pub target_width: u32,
    /// Encode width: `target_width` floored to even.
    pub crop_width: u32,
    /// Encode height: source height floored to even.
    pub crop_height: u32,
    /// Largest valid horizontal offset, `max(0, width - crop_width)`.
    pub max_offset: u32,
    /// True when the source resolution was unknown and the fallback
    /// dimensions were assumed. Callers must surface this.
    pub defaults_used: bool,
}

impl CropGeometry {
    /// Resolve the crop window for a known source resolution.
    pub fn resolve(source_width: u32, source_height: u32) -> Self {
        let target_width = source_height * TARGET_ASPECT_NUM / TARGET_ASPECT_DEN;
        let crop_width = floor_even(target_width);
        let crop_height = floor_even(source_height);
        Self {
            target_width,
            crop_width,
            crop_height,
            max_offset: source_width.saturating_sub(crop_width),
            defaults_used: false,
        }
    }

    /// Resolve with the fallback source dimensions, flagged as defaulted.
    pub fn fallback() -> Self {
        Self {
            defaults_used: true,
            ..Self::resolve(FALLBACK_SOURCE_WIDTH, FALLBACK_SOURCE_HEIGHT)
        }
    }

    /// Clamp a keyframe's horizontal offset into `[0, max_offset]`.
    ///
    /// Out-of-range offsets are advisory-input noise from the oracle and
    /// never fail the pipeline; the clamp is logged.
    pub fn clamp_x(&self, x: i64) -> u32 {
        let clamped = x.clamp(0, self.max_offset as i64) as u32;
        if clamped as i64 != x {
            warn!(
                requested = x,
                clamped,
                max_offset = self.max_offset,
                "Crop offset out of bounds, clamped"
            );
        }
        clamped
    }
}

/// Floor to the nearest even integer.
fn floor_even(v: u32) -> u32 {
    v / 2 * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_1080p() {
        let geo = CropGeometry::resolve(1920, 1080);
        assert_eq!(geo.target_width, 607);
        assert_eq!(geo.crop_width, 606);
        assert_eq!(geo.crop_height, 1080);
        assert_eq!(geo.max_offset, 1920 - 606);
        assert!(!geo.defaults_used);
    }

    #[test]
    fn test_resolved_dimensions_always_even() {
        for (w, h) in [(1920, 1080), (1280, 720), (3840, 2160), (854, 481), (640, 357)] {
            let geo = CropGeometry::resolve(w, h);
            assert_eq!(geo.crop_width % 2, 0, "{}x{}", w, h);
            assert_eq!(geo.crop_height % 2, 0, "{}x{}", w, h);
        }
    }

    #[test]
    fn test_narrow_source_clamps_to_zero_offset() {
        // Source narrower than the crop window: max_offset saturates at 0.
        let geo = CropGeometry::resolve(500, 1080);
        assert_eq!(geo.max_offset, 0);
        assert_eq!(geo.clamp_x(250), 0);
    }

    #[test]
    fn test_clamp_x_bounds() {
        let geo = CropGeometry::resolve(1920, 1080);
        assert_eq!(geo.clamp_x(-50), 0);
        assert_eq!(geo.clamp_x(0), 0);
        assert_eq!(geo.clamp_x(500), 500);
        assert_eq!(geo.clamp_x(1314), 1314);
        assert_eq!(geo.clamp_x(5000), 1314);
    }

    #[test]
    fn test_fallback_is_flagged() {
        let geo = CropGeometry::fallback();
        assert!(geo.defaults_used);
        assert_eq!(geo.crop_width, 606);
        assert_eq!(geo.crop_height, 1080);
    }
}
