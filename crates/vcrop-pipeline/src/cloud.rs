//! Cloud encode backend over the remote transcoding service.
//!
//! The source is uploaded once per run; every segment job references the
//! cached blob URI. Segment jobs fan out concurrently up to a configured
//! limit, and the concat job is only submitted once all of them have
//! succeeded. Remote artifacts are left under the run prefix for external
//! garbage collection.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tokio::sync::{OnceCell, Semaphore};
use tracing::{info, warn};
use uuid::Uuid;

use vcrop_models::geometry::FALLBACK_SOURCE_WIDTH;
use vcrop_models::{CropGeometry, SegmentSpec, SourceVideoInfo};
use vcrop_storage::{split_blob_uri, BlobStore};
use vcrop_transcoder::{ConcatJobBuilder, SegmentJobBuilder, TranscoderClient};

use crate::backend::{EncodeBackend, SegmentArtifact};
use crate::error::{PipelineError, PipelineResult};

/// Per-run source staging state, set once by `prepare`.
#[derive(Debug, Clone)]
struct SourceContext {
    source_uri: String,
    source_width: u32,
    crop_width: u32,
    crop_height: u32,
}

/// Encodes segments as remote transcoding jobs.
pub struct CloudEncodeBackend {
    store: BlobStore,
    transcoder: TranscoderClient,
    run_prefix: String,
    source: OnceCell<SourceContext>,
    job_slots: Arc<Semaphore>,
}

impl CloudEncodeBackend {
    /// Create a backend with a fresh run prefix.
    pub fn new(store: BlobStore, transcoder: TranscoderClient, max_jobs: usize) -> Self {
        Self {
            store,
            transcoder,
            run_prefix: format!("runs/{}", Uuid::new_v4()),
            source: OnceCell::new(),
            job_slots: Arc::new(Semaphore::new(max_jobs.max(1))),
        }
    }

    /// Blob prefix this run's artifacts live under.
    pub fn run_prefix(&self) -> &str {
        &self.run_prefix
    }

    fn context(&self) -> PipelineResult<&SourceContext> {
        self.source
            .get()
            .ok_or_else(|| PipelineError::backend("cloud backend used before prepare"))
    }

    fn segment_output_prefix(&self, index: usize) -> String {
        format!(
            "s3://{}/{}/segments/segment_{:03}/",
            self.store.bucket(),
            self.run_prefix,
            index
        )
    }

    fn concat_output_prefix(&self) -> String {
        format!("s3://{}/{}/final/", self.store.bucket(), self.run_prefix)
    }
}

#[async_trait]
impl EncodeBackend for CloudEncodeBackend {
    fn name(&self) -> &'static str {
        "cloud"
    }

    async fn prepare(&self, source: &Path, info: &SourceVideoInfo) -> PipelineResult<()> {
        self.transcoder.ensure_capability().await?;
        self.store.ensure_bucket().await?;

        self.source
            .get_or_try_init(|| async {
                let key = format!("{}/source.mp4", self.run_prefix);
                let source_uri = self.store.upload_file(source, &key, "video/mp4").await?;

                let (geometry, source_width) = run_geometry(info);
                if geometry.defaults_used {
                    warn!(
                        assumed_width = source_width,
                        "Source resolution unknown, cloud jobs use fallback geometry"
                    );
                }

                info!(uri = %source_uri, "Source staged for cloud run");
                Ok::<_, PipelineError>(SourceContext {
                    source_uri,
                    source_width,
                    crop_width: geometry.crop_width,
                    crop_height: geometry.crop_height,
                })
            })
            .await?;

        Ok(())
    }

    async fn encode_segment(
        &self,
        _source: &Path,
        spec: &SegmentSpec,
    ) -> PipelineResult<SegmentArtifact> {
        let ctx = self.context()?;

        let (left_margin, right_margin) = crop_margins(ctx.source_width, spec);

        let request = SegmentJobBuilder::new(
            ctx.source_uri.clone(),
            self.segment_output_prefix(spec.index),
        )
        .dimensions(spec.crop_width, spec.crop_height)
        .crop_margins(left_margin, right_margin)
        .window(spec.start, spec.end)
        .build()?;

        let output = self.transcoder.run_job(&request).await?;
        Ok(SegmentArtifact::Remote(output))
    }

    async fn encode_segments(
        &self,
        source: &Path,
        specs: &[SegmentSpec],
    ) -> PipelineResult<Vec<SegmentArtifact>> {
        submit_ordered(&self.job_slots, specs, |spec| {
            self.encode_segment(source, spec)
        })
        .await
    }

    async fn concatenate(
        &self,
        artifacts: &[SegmentArtifact],
        output: &Path,
    ) -> PipelineResult<()> {
        let ctx = self.context()?;

        let mut builder = ConcatJobBuilder::new(self.concat_output_prefix())
            .dimensions(ctx.crop_width, ctx.crop_height);
        for artifact in artifacts {
            match artifact {
                SegmentArtifact::Remote(uri) => builder = builder.add_segment(uri.clone()),
                SegmentArtifact::Local(path) => {
                    return Err(PipelineError::backend(format!(
                        "cloud backend cannot concatenate local artifact {}",
                        path.display()
                    )));
                }
            }
        }

        let result_uri = self.transcoder.run_job(&builder.build()?).await?;

        let (_, key) = split_blob_uri(&result_uri)?;
        self.store.download_file(&key, output).await?;

        info!(output = %output.display(), "Cloud result downloaded");
        Ok(())
    }
}

/// Geometry and effective source width for one run. An unknown resolution
/// switches to the fallback geometry AND the fallback width, so the margin
/// arithmetic below matches what the planner clamped against.
fn run_geometry(info: &SourceVideoInfo) -> (CropGeometry, u32) {
    if info.width == 0 || info.height == 0 {
        (CropGeometry::fallback(), FALLBACK_SOURCE_WIDTH)
    } else {
        (CropGeometry::resolve(info.width, info.height), info.width)
    }
}

/// Left/right crop margins for a segment: `left = crop_x`,
/// `right = source_width - (crop_x + crop_width)`, top/bottom zero.
fn crop_margins(source_width: u32, spec: &SegmentSpec) -> (u32, u32) {
    let right = source_width.saturating_sub(spec.crop_x + spec.crop_width);
    (spec.crop_x, right)
}

/// Bounded concurrent submission: every segment's job future waits on a
/// semaphore slot, results come back in plan order regardless of
/// completion order, and the first failure drops the jobs still queued.
async fn submit_ordered<'a, T, F, Fut>(
    slots: &Arc<Semaphore>,
    specs: &'a [SegmentSpec],
    submit: F,
) -> PipelineResult<Vec<T>>
where
    F: Fn(&'a SegmentSpec) -> Fut,
    Fut: std::future::Future<Output = PipelineResult<T>> + 'a,
{
    let jobs = specs.iter().map(|spec| {
        let slots = Arc::clone(slots);
        let job = submit(spec);
        async move {
            let _permit = slots
                .acquire_owned()
                .await
                .map_err(|_| PipelineError::backend("job semaphore closed"))?;
            job.await
        }
    });

    try_join_all(jobs).await
}
