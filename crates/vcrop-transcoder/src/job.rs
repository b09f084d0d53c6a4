//! Typed transcoding job requests and responses.
//!
//! Job payloads are built through validating builders so a malformed
//! request (odd output dimensions, negative crop margins, empty edit
//! list) is rejected before it ever reaches the wire.

use serde::{Deserialize, Serialize};

use crate::error::{TranscoderError, TranscoderResult};

/// H.264 output bitrate for segment and concat jobs.
const VIDEO_BITRATE_BPS: u64 = 2_500_000;
/// Output frame rate.
const FRAME_RATE: f64 = 30.0;
/// AAC output bitrate.
const AUDIO_BITRATE_BPS: u64 = 128_000;
/// Well-known mux stream key; the service writes `<prefix>/<key>.mp4`.
pub const OUTPUT_STREAM_KEY: &str = "sd";

/// Format a seconds offset the way the job API expects (`"4.500s"`).
fn time_offset(seconds: f64) -> String {
    format!("{:.3}s", seconds)
}

/// A named input URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub key: String,
    pub uri: String,
}

/// One entry of the edit list: which input to cut, and the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAtom {
    pub key: String,
    pub inputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_offset: Option<String>,
}

/// Pixel margins removed from each edge before encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropMargins {
    pub top_pixels: u32,
    pub bottom_pixels: u32,
    pub left_pixels: u32,
    pub right_pixels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessingConfig {
    pub crop: CropMargins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct H264Settings {
    pub width_pixels: u32,
    pub height_pixels: u32,
    pub bitrate_bps: u64,
    pub frame_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStream {
    pub h264: H264Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStream {
    pub codec: String,
    pub bitrate_bps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementaryStream {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_stream: Option<VideoStream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream: Option<AudioStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuxStream {
    pub key: String,
    pub container: String,
    pub elementary_streams: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutput {
    pub uri: String,
}

/// Full job configuration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub inputs: Vec<JobInput>,
    pub edit_list: Vec<EditAtom>,
    pub elementary_streams: Vec<ElementaryStream>,
    pub mux_streams: Vec<MuxStream>,
    pub output: JobOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessing_config: Option<PreprocessingConfig>,
}

/// Job creation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub config: JobConfig,
}

impl JobRequest {
    /// Output prefix URI this job writes under.
    pub fn output_prefix(&self) -> &str {
        &self.config.output.uri
    }
}

/// Terminal and in-flight job states reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum JobState {
    #[serde(rename = "PROCESSING_STATE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobError {
    pub message: Option<String>,
}

/// Job resource returned by create/get.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub name: String,
    pub state: JobState,
    #[serde(default)]
    pub error: Option<JobError>,
}

fn standard_streams(width: u32, height: u32) -> (Vec<ElementaryStream>, Vec<MuxStream>) {
    let elementary = vec![
        ElementaryStream {
            key: "video-stream0".to_string(),
            video_stream: Some(VideoStream {
                h264: H264Settings {
                    width_pixels: width,
                    height_pixels: height,
                    bitrate_bps: VIDEO_BITRATE_BPS,
                    frame_rate: FRAME_RATE,
                },
            }),
            audio_stream: None,
        },
        ElementaryStream {
            key: "audio-stream0".to_string(),
            video_stream: None,
            audio_stream: Some(AudioStream {
                codec: "aac".to_string(),
                bitrate_bps: AUDIO_BITRATE_BPS,
            }),
        },
    ];
    let mux = vec![MuxStream {
        key: OUTPUT_STREAM_KEY.to_string(),
        container: "mp4".to_string(),
        elementary_streams: vec!["video-stream0".to_string(), "audio-stream0".to_string()],
    }];
    (elementary, mux)
}

fn require_even(name: &str, value: u32) -> TranscoderResult<()> {
    if value == 0 || value % 2 != 0 {
        return Err(TranscoderError::invalid_job(format!(
            "{} must be a positive even pixel count, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Builder for a single-segment crop+trim job.
#[derive(Debug, Clone)]
pub struct SegmentJobBuilder {
    input_uri: String,
    output_prefix: String,
    output_width: u32,
    output_height: u32,
    margins: Option<CropMargins>,
    start: f64,
    end: Option<f64>,
}

impl SegmentJobBuilder {
    pub fn new(input_uri: impl Into<String>, output_prefix: impl Into<String>) -> Self {
        Self {
            input_uri: input_uri.into(),
            output_prefix: output_prefix.into(),
            output_width: 0,
            output_height: 0,
            margins: None,
            start: 0.0,
            end: None,
        }
    }

    /// Output dimensions (must be even).
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// Crop margins in source pixels.
    pub fn crop_margins(mut self, left: u32, right: u32) -> Self {
        self.margins = Some(CropMargins {
            top_pixels: 0,
            bottom_pixels: 0,
            left_pixels: left,
            right_pixels: right,
        });
        self
    }

    /// Trim window; `end = None` runs to end-of-stream.
    pub fn window(mut self, start: f64, end: Option<f64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn build(self) -> TranscoderResult<JobRequest> {
        require_even("output width", self.output_width)?;
        require_even("output height", self.output_height)?;

        if self.start < 0.0 {
            return Err(TranscoderError::invalid_job(format!(
                "segment start must be non-negative, got {}",
                self.start
            )));
        }
        if let Some(end) = self.end {
            if end <= self.start {
                return Err(TranscoderError::invalid_job(format!(
                    "segment end {} must be after start {}",
                    end, self.start
                )));
            }
        }

        let (elementary_streams, mux_streams) = standard_streams(self.output_width, self.output_height);

        Ok(JobRequest {
            config: JobConfig {
                inputs: vec![JobInput {
                    key: "input0".to_string(),
                    uri: self.input_uri,
                }],
                edit_list: vec![EditAtom {
                    key: "atom0".to_string(),
                    inputs: vec!["input0".to_string()],
                    start_time_offset: Some(time_offset(self.start)),
                    end_time_offset: self.end.map(time_offset),
                }],
                elementary_streams,
                mux_streams,
                output: JobOutput {
                    uri: self.output_prefix,
                },
                preprocessing_config: self.margins.map(|crop| PreprocessingConfig { crop }),
            },
        })
    }
}

/// Builder for the final concatenation job: one input and one edit atom
/// per already-encoded segment, in plan order.
#[derive(Debug, Clone)]
pub struct ConcatJobBuilder {
    output_prefix: String,
    output_width: u32,
    output_height: u32,
    segment_uris: Vec<String>,
}

impl ConcatJobBuilder {
    pub fn new(output_prefix: impl Into<String>) -> Self {
        Self {
            output_prefix: output_prefix.into(),
            output_width: 0,
            output_height: 0,
            segment_uris: Vec::new(),
        }
    }

    /// Output dimensions (must be even).
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// Append a segment in plan order.
    pub fn add_segment(mut self, uri: impl Into<String>) -> Self {
        self.segment_uris.push(uri.into());
        self
    }

    pub fn build(self) -> TranscoderResult<JobRequest> {
        require_even("output width", self.output_width)?;
        require_even("output height", self.output_height)?;

        if self.segment_uris.is_empty() {
            return Err(TranscoderError::invalid_job(
                "concat job requires at least one segment input",
            ));
        }

        let inputs: Vec<JobInput> = self
            .segment_uris
            .iter()
            .enumerate()
            .map(|(i, uri)| JobInput {
                key: format!("input{}", i),
                uri: uri.clone(),
            })
            .collect();

        let edit_list: Vec<EditAtom> = (0..self.segment_uris.len())
            .map(|i| EditAtom {
                key: format!("atom{}", i),
                inputs: vec![format!("input{}", i)],
                start_time_offset: None,
                end_time_offset: None,
            })
            .collect();

        let (elementary_streams, mux_streams) = standard_streams(self.output_width, self.output_height);

        Ok(JobRequest {
            config: JobConfig {
                inputs,
                edit_list,
                elementary_streams,
                mux_streams,
                output: JobOutput {
                    uri: self.output_prefix,
                },
                preprocessing_config: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_job_builds_margins_and_window() {
        let req = SegmentJobBuilder::new("s3://b/src.mp4", "s3://b/run/seg_000/")
            .dimensions(606, 1080)
            .crop_margins(500, 814)
            .window(4.5, Some(10.0))
            .build()
            .unwrap();

        let cfg = &req.config;
        assert_eq!(cfg.inputs.len(), 1);
        let crop = &cfg.preprocessing_config.as_ref().unwrap().crop;
        assert_eq!(crop.left_pixels, 500);
        assert_eq!(crop.right_pixels, 814);
        assert_eq!(crop.top_pixels, 0);

        let atom = &cfg.edit_list[0];
        assert_eq!(atom.start_time_offset.as_deref(), Some("4.500s"));
        assert_eq!(atom.end_time_offset.as_deref(), Some("10.000s"));
    }

    #[test]
    fn test_open_ended_segment_omits_end_offset() {
        let req = SegmentJobBuilder::new("s3://b/src.mp4", "s3://b/run/seg_001/")
            .dimensions(606, 1080)
            .crop_margins(0, 1314)
            .window(10.0, None)
            .build()
            .unwrap();

        let atom = &req.config.edit_list[0];
        assert_eq!(atom.start_time_offset.as_deref(), Some("10.000s"));
        assert!(atom.end_time_offset.is_none());

        let json = serde_json::to_value(&req).unwrap();
        assert!(json["config"]["editList"][0].get("endTimeOffset").is_none());
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let err = SegmentJobBuilder::new("s3://b/src.mp4", "s3://b/out/")
            .dimensions(607, 1080)
            .window(0.0, None)
            .build()
            .unwrap_err();
        assert!(matches!(err, TranscoderError::InvalidJob(_)));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = SegmentJobBuilder::new("s3://b/src.mp4", "s3://b/out/")
            .dimensions(606, 1080)
            .window(10.0, Some(4.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, TranscoderError::InvalidJob(_)));
    }

    #[test]
    fn test_concat_job_preserves_segment_order() {
        let req = ConcatJobBuilder::new("s3://b/run/final/")
            .dimensions(606, 1080)
            .add_segment("s3://b/run/seg_000/sd.mp4")
            .add_segment("s3://b/run/seg_001/sd.mp4")
            .add_segment("s3://b/run/seg_002/sd.mp4")
            .build()
            .unwrap();

        let cfg = &req.config;
        assert_eq!(cfg.inputs.len(), 3);
        assert_eq!(cfg.edit_list.len(), 3);
        for (i, atom) in cfg.edit_list.iter().enumerate() {
            assert_eq!(atom.inputs, vec![format!("input{}", i)]);
            assert!(atom.start_time_offset.is_none());
        }
        assert!(cfg.preprocessing_config.is_none());
    }

    #[test]
    fn test_empty_concat_rejected() {
        let err = ConcatJobBuilder::new("s3://b/run/final/")
            .dimensions(606, 1080)
            .build()
            .unwrap_err();
        assert!(matches!(err, TranscoderError::InvalidJob(_)));
    }

    #[test]
    fn test_job_payload_is_camel_case() {
        let req = SegmentJobBuilder::new("s3://b/src.mp4", "s3://b/out/")
            .dimensions(606, 1080)
            .crop_margins(10, 20)
            .window(0.0, Some(1.0))
            .build()
            .unwrap();

        let json = serde_json::to_value(&req).unwrap();
        assert!(json["config"]["editList"].is_array());
        assert!(json["config"]["elementaryStreams"].is_array());
        assert!(json["config"]["preprocessingConfig"]["crop"]["leftPixels"].is_u64());
    }

    #[test]
    fn test_job_state_deserializes() {
        let job: Job = serde_json::from_str(
            r#"{"name": "projects/p/locations/r/jobs/abc", "state": "SUCCEEDED"}"#,
        )
        .unwrap();
        assert_eq!(job.state, JobState::Succeeded);
        assert!(job.state.is_terminal());

        let job: Job = serde_json::from_str(
            r#"{"name": "jobs/x", "state": "RUNNING"}"#,
        )
        .unwrap();
        assert!(!job.state.is_terminal());
    }
}
