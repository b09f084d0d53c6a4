//! Orchestrator tests against a scripted in-memory backend.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use vcrop_media::MediaError;
use vcrop_models::{load_crop_data, CropKeyframe, PlanError, SegmentSpec, SourceVideoInfo};
use vcrop_pipeline::{
    EncodeBackend, FocusOracle, Pipeline, PipelineError, PipelineResult, PipelineStep,
    SegmentArtifact,
};

/// Backend double that records calls and fails on demand.
#[derive(Default)]
struct ScriptedBackend {
    fail_at: Option<usize>,
    encoded: Mutex<Vec<usize>>,
    concatenated: Mutex<Option<Vec<SegmentArtifact>>>,
}

impl ScriptedBackend {
    fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    fn encoded_indices(&self) -> Vec<usize> {
        self.encoded.lock().unwrap().clone()
    }

    fn concat_input(&self) -> Option<Vec<SegmentArtifact>> {
        self.concatenated.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncodeBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn encode_segment(
        &self,
        _source: &Path,
        spec: &SegmentSpec,
    ) -> PipelineResult<SegmentArtifact> {
        self.encoded.lock().unwrap().push(spec.index);
        if self.fail_at == Some(spec.index) {
            return Err(PipelineError::Media(MediaError::encode_failed(
                spec.index,
                "scripted failure",
                Some(1),
            )));
        }
        Ok(SegmentArtifact::Local(PathBuf::from(format!(
            "segment_{:03}.mp4",
            spec.index
        ))))
    }

    async fn concatenate(
        &self,
        artifacts: &[SegmentArtifact],
        output: &Path,
    ) -> PipelineResult<()> {
        *self.concatenated.lock().unwrap() = Some(artifacts.to_vec());
        std::fs::write(output, b"joined")?;
        Ok(())
    }
}

struct StaticOracle {
    keyframes: Vec<CropKeyframe>,
}

#[async_trait]
impl FocusOracle for StaticOracle {
    async fn analyze(
        &self,
        _video: &Path,
        _width: u32,
        _height: u32,
    ) -> PipelineResult<Vec<CropKeyframe>> {
        Ok(self.keyframes.clone())
    }
}

fn keyframe(timestamp: &str, x1: i64) -> CropKeyframe {
    CropKeyframe {
        timestamp: timestamp.to_string(),
        reason: "speaker".to_string(),
        x1,
        y1: 0,
        x2: x1 + 607,
        y2: 1080,
    }
}

fn source_info() -> SourceVideoInfo {
    SourceVideoInfo {
        width: 1920,
        height: 1080,
        duration: 30.0,
        frame_rate: 30.0,
        video_codec: "h264".to_string(),
        audio_codec: Some("aac".to_string()),
        size_bytes: 1_000_000,
    }
}

fn make_input(dir: &Path) -> PathBuf {
    let input = dir.join("demo.mp4");
    std::fs::write(&input, b"not a real video").unwrap();
    input
}

#[tokio::test]
async fn segments_encode_in_plan_order_and_concat_preserves_it() {
    let dir = tempfile::tempdir().unwrap();
    let input = make_input(dir.path());
    let out_dir = dir.path().join("out");

    let backend = ScriptedBackend::default();
    let oracle = StaticOracle {
        keyframes: vec![
            keyframe("00:00.000", 0),
            keyframe("00:04.000", 500),
            keyframe("00:10.000", 1200),
        ],
    };

    let pipeline = Pipeline::new(&backend, &oracle);
    let report = pipeline
        .run_with_info(&input, source_info(), &out_dir)
        .await
        .unwrap();

    assert_eq!(report.segments, 3);
    assert_eq!(backend.encoded_indices(), vec![0, 1, 2]);

    let concat = backend.concat_input().expect("concat was called");
    assert_eq!(concat.len(), 3);
    assert_eq!(
        concat[0],
        SegmentArtifact::Local(PathBuf::from("segment_000.mp4"))
    );
    assert_eq!(
        concat[2],
        SegmentArtifact::Local(PathBuf::from("segment_002.mp4"))
    );
}

#[tokio::test]
async fn output_and_crop_data_follow_input_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = make_input(dir.path());
    let out_dir = dir.path().join("out");

    let backend = ScriptedBackend::default();
    let oracle = StaticOracle {
        keyframes: vec![keyframe("00:00.000", 100)],
    };

    let pipeline = Pipeline::new(&backend, &oracle);
    let report = pipeline
        .run_with_info(&input, source_info(), &out_dir)
        .await
        .unwrap();

    assert_eq!(report.output, out_dir.join("demo_vertical_crop.mp4"));
    assert!(report.output.exists());

    assert_eq!(report.crop_data, out_dir.join("demo_crop_data.json"));
    let reloaded = load_crop_data(&report.crop_data).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].x1, 100);
}

#[tokio::test]
async fn first_encode_failure_stops_remaining_segments() {
    let dir = tempfile::tempdir().unwrap();
    let input = make_input(dir.path());
    let out_dir = dir.path().join("out");

    let backend = ScriptedBackend::failing_at(1);
    let oracle = StaticOracle {
        keyframes: vec![
            keyframe("00:00.000", 0),
            keyframe("00:04.000", 500),
            keyframe("00:10.000", 1200),
        ],
    };

    let pipeline = Pipeline::new(&backend, &oracle);
    let err = pipeline
        .run_with_info(&input, source_info(), &out_dir)
        .await
        .unwrap_err();

    match err {
        PipelineError::Step { step, source } => {
            assert_eq!(step, PipelineStep::EncodeSegments);
            assert!(matches!(
                *source,
                PipelineError::Media(MediaError::EncodeFailed {
                    segment_index: 1,
                    ..
                })
            ));
        }
        other => panic!("unexpected error: {}", other),
    }

    // Segment 2 was never attempted, concat never issued.
    assert_eq!(backend.encoded_indices(), vec![0, 1]);
    assert!(backend.concat_input().is_none());
}

#[tokio::test]
async fn empty_keyframes_fail_before_any_encode() {
    let dir = tempfile::tempdir().unwrap();
    let input = make_input(dir.path());
    let out_dir = dir.path().join("out");

    let backend = ScriptedBackend::default();
    let oracle = StaticOracle { keyframes: vec![] };

    let pipeline = Pipeline::new(&backend, &oracle);
    let err = pipeline
        .run_with_info(&input, source_info(), &out_dir)
        .await
        .unwrap_err();

    match err {
        PipelineError::Step { step, source } => {
            assert_eq!(step, PipelineStep::Plan);
            assert!(matches!(*source, PipelineError::Plan(PlanError::EmptyKeyframes)));
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(backend.encoded_indices().is_empty());
}

#[tokio::test]
async fn out_of_schema_keyframe_is_a_plan_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = make_input(dir.path());
    let out_dir = dir.path().join("out");

    let backend = ScriptedBackend::default();
    let mut bad = keyframe("00:00.000", 100);
    bad.y1 = 50;
    let oracle = StaticOracle {
        keyframes: vec![bad],
    };

    let pipeline = Pipeline::new(&backend, &oracle);
    let err = pipeline
        .run_with_info(&input, source_info(), &out_dir)
        .await
        .unwrap_err();

    match err {
        PipelineError::Step { step, source } => {
            assert_eq!(step, PipelineStep::Plan);
            assert!(matches!(*source, PipelineError::Oracle(_)));
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(backend.encoded_indices().is_empty());
}

#[tokio::test]
async fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::default();
    let oracle = StaticOracle { keyframes: vec![] };

    let pipeline = Pipeline::new(&backend, &oracle);
    let err = pipeline
        .run(&dir.path().join("missing.mp4"), dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InputNotFound(_)));
}
