//! Segment planning.
//!
//! Turns the ordered keyframe list into concrete segment specifications.
//! Segment *i* runs from its keyframe's timestamp to the next keyframe's
//! timestamp; the final segment is open-ended and the backend extends it to
//! the source's natural end. Keyframe order is preserved, never sorted.

use thiserror::Error;

use crate::geometry::CropGeometry;
use crate::keyframe::CropKeyframe;
use crate::timestamp::{parse_timestamp, TimestampError};

/// One contiguous time slice of the source sharing a single crop window.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSpec {
    /// Position in the plan; also the concatenation order.
    pub index: usize,
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds; `None` for the open-ended final segment.
    pub end: Option<f64>,
    /// Clamped horizontal crop offset.
    pub crop_x: u32,
    /// Even-aligned crop width.
    pub crop_width: u32,
    /// Even-aligned crop height.
    pub crop_height: u32,
}

impl SegmentSpec {
    /// Segment duration, when bounded.
    pub fn duration(&self) -> Option<f64> {
        self.end.map(|end| end - self.start)
    }

    /// True for the final segment, which runs to end-of-stream.
    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}

/// Derive the segment plan from a keyframe list.
///
/// Fails before any encode work if the list is empty or the timestamps are
/// not strictly increasing (a non-monotonic list would otherwise turn into
/// a negative-duration encode request).
pub fn plan_segments(
    keyframes: &[CropKeyframe],
    geometry: &CropGeometry,
) -> Result<Vec<SegmentSpec>, PlanError> {
    if keyframes.is_empty() {
        return Err(PlanError::EmptyKeyframes);
    }

    let starts: Vec<f64> = keyframes
        .iter()
        .map(|kf| parse_timestamp(&kf.timestamp))
        .collect::<Result<_, _>>()?;

    for (i, pair) in starts.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(PlanError::NonMonotonicTimestamp {
                index: i + 1,
                prev: pair[0],
                next: pair[1],
            });
        }
    }

    let segments = keyframes
        .iter()
        .enumerate()
        .map(|(i, kf)| SegmentSpec {
            index: i,
            start: starts[i],
            end: starts.get(i + 1).copied(),
            crop_x: geometry.clamp_x(kf.x1),
            crop_width: geometry.crop_width,
            crop_height: geometry.crop_height,
        })
        .collect();

    Ok(segments)
}

/// Errors deriving a segment plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No keyframes to plan from")]
    EmptyKeyframes,

    #[error("Keyframe {index} timestamp {next}s is not after previous {prev}s")]
    NonMonotonicTimestamp { index: usize, prev: f64, next: f64 },

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ts: &str, x1: i64) -> CropKeyframe {
        CropKeyframe {
            timestamp: ts.to_string(),
            reason: "test".to_string(),
            x1,
            y1: 0,
            x2: x1 + 607,
            y2: 1080,
        }
    }

    fn geo() -> CropGeometry {
        CropGeometry::resolve(1920, 1080)
    }

    #[test]
    fn test_plan_two_segments() {
        let frames = vec![frame("00:00.000", 0), frame("00:04.000", 500)];
        let plan = plan_segments(&frames, &geo()).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].start, 0.0);
        assert_eq!(plan[0].end, Some(4.0));
        assert_eq!(plan[0].crop_x, 0);
        assert_eq!(plan[1].start, 4.0);
        assert_eq!(plan[1].end, None);
        assert!(plan[1].is_open_ended());
        assert_eq!(plan[1].crop_x, 500);
        assert_eq!(plan[1].crop_width, 606);
        assert_eq!(plan[1].crop_height, 1080);
    }

    #[test]
    fn test_plan_segments_are_contiguous() {
        let frames = vec![
            frame("00:00.000", 0),
            frame("00:03.500", 100),
            frame("00:07.250", 200),
            frame("00:10.000", 300),
        ];
        let plan = plan_segments(&frames, &geo()).unwrap();

        assert_eq!(plan.len(), frames.len());
        for pair in plan.windows(2) {
            assert_eq!(pair[0].end, Some(pair[1].start));
        }
        assert!(plan.last().unwrap().is_open_ended());
    }

    #[test]
    fn test_plan_empty_keyframes() {
        assert!(matches!(
            plan_segments(&[], &geo()),
            Err(PlanError::EmptyKeyframes)
        ));
    }

    #[test]
    fn test_plan_non_monotonic() {
        let frames = vec![frame("00:05.000", 0), frame("00:02.000", 100)];
        let err = plan_segments(&frames, &geo()).unwrap_err();
        assert!(matches!(
            err,
            PlanError::NonMonotonicTimestamp { index: 1, .. }
        ));
    }

    #[test]
    fn test_plan_duplicate_timestamps_rejected() {
        let frames = vec![frame("00:05.000", 0), frame("00:05.000", 100)];
        assert!(matches!(
            plan_segments(&frames, &geo()),
            Err(PlanError::NonMonotonicTimestamp { .. })
        ));
    }

    #[test]
    fn test_plan_malformed_timestamp() {
        let frames = vec![frame("5.0", 0)];
        assert!(matches!(
            plan_segments(&frames, &geo()),
            Err(PlanError::Timestamp(_))
        ));
    }

    #[test]
    fn test_plan_clamps_offsets() {
        let frames = vec![frame("00:00.000", -20), frame("00:04.000", 9000)];
        let plan = plan_segments(&frames, &geo()).unwrap();
        assert_eq!(plan[0].crop_x, 0);
        assert_eq!(plan[1].crop_x, 1920 - 606);
    }
}
