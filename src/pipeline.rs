use std::{path::PathBuf, sync::Arc};

use crate::{
    compose::frame::{FrameComposer, FrameCompositor},
    encode::{
        assemble::VideoAssembler,
        clip::{ClipEncoder, SegmentClip},
        engine::MediaEngine,
        ffmpeg::FfmpegEngine,
    },
    foundation::{
        config::PipelineConfig,
        error::{StoryError, StoryResult},
    },
    generate::{
        media::{Collaborators, MediaOptions, SegmentMediaGenerator},
        openai::OpenAiClient,
        retry::RetryPolicy,
    },
    job::workspace::{JobId, JobManager},
    story::model::{SegmentInput, segments_from_inputs},
};

/// Outcome of a successful render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    pub job_id: JobId,
    /// `<workspace base>/<job id>/output/output.mp4`
    pub output_path: PathBuf,
    /// Probed narration duration of every segment, in index order.
    pub segment_durations: Vec<f64>,
}

impl RenderReport {
    /// Expected length of the final video.
    pub fn total_duration_sec(&self) -> f64 {
        self.segment_durations.iter().sum()
    }
}

/// Segment list in, one video out.
///
/// Owns every collaborator it calls, so independent pipelines share no mutable state. Each
/// job gets its own workspace under the configured base directory.
pub struct StoryPipeline {
    jobs: JobManager,
    media: SegmentMediaGenerator,
    clips: ClipEncoder,
    assembler: VideoAssembler,
}

impl StoryPipeline {
    pub fn new(
        jobs: JobManager,
        media: SegmentMediaGenerator,
        clips: ClipEncoder,
        assembler: VideoAssembler,
    ) -> Self {
        Self {
            jobs,
            media,
            clips,
            assembler,
        }
    }

    /// Wire a pipeline from configuration and explicit collaborators.
    pub fn with_collaborators(
        cfg: &PipelineConfig,
        collab: Collaborators,
        composer: Box<dyn FrameComposer>,
        engine: Arc<dyn MediaEngine>,
    ) -> Self {
        let media = SegmentMediaGenerator::new(
            collab,
            composer,
            RetryPolicy::from_config(&cfg.retry),
            MediaOptions::from_config(&cfg.openai),
        );
        Self::new(
            JobManager::new(&cfg.workspace_root),
            media,
            ClipEncoder::new(engine.clone(), cfg.encode.fade_sec),
            VideoAssembler::new(engine),
        )
    }

    /// Production wiring: OpenAI-compatible HTTP services, the system font compositor and
    /// `ffmpeg`.
    pub fn from_config(cfg: &PipelineConfig) -> StoryResult<Self> {
        cfg.validate()?;
        let engine = FfmpegEngine::new(cfg.encode.clone());
        if !engine.is_available() {
            return Err(StoryError::encode(format!(
                "'{}' and '{}' are required but were not found",
                cfg.encode.ffmpeg_bin.display(),
                cfg.encode.ffprobe_bin.display()
            )));
        }
        let client = Arc::new(OpenAiClient::from_config(&cfg.openai)?);
        let compositor = FrameCompositor::new(cfg.frame.clone())?;
        Ok(Self::with_collaborators(
            cfg,
            Collaborators::openai(client),
            Box::new(compositor),
            Arc::new(engine),
        ))
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    /// Render and return the job id; the video is at
    /// `<workspace base>/<job id>/output/output.mp4`.
    pub fn render_video(&mut self, inputs: &[SegmentInput]) -> StoryResult<JobId> {
        Ok(self.render_video_report(inputs)?.job_id)
    }

    /// Render and report the output path and per-segment durations.
    ///
    /// Media for every segment is generated in index order, then every clip is encoded in
    /// index order, then the clips are assembled. The first error aborts the job and leaves
    /// the workspace as it is.
    #[tracing::instrument(skip(self, inputs), fields(segments = inputs.len()))]
    pub fn render_video_report(&mut self, inputs: &[SegmentInput]) -> StoryResult<RenderReport> {
        let segments = segments_from_inputs(inputs)?;
        let job = self.jobs.create_job(segments)?;
        let workspace = job.workspace();

        for segment in job.segments() {
            self.media.generate(segment, workspace)?;
        }

        let clips = job
            .segments()
            .iter()
            .map(|segment| self.clips.encode(workspace, segment.index()))
            .collect::<StoryResult<Vec<SegmentClip>>>()?;

        let output_path = self.assembler.assemble(workspace, &clips)?;
        let report = RenderReport {
            job_id: job.id().clone(),
            output_path,
            segment_durations: clips.iter().map(|c| c.duration_sec).collect(),
        };
        tracing::info!(
            job = %report.job_id,
            output = %report.output_path.display(),
            duration_sec = report.total_duration_sec(),
            "video rendered"
        );
        Ok(report)
    }
}
