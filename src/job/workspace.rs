use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::foundation::error::{StoryError, StoryResult};
use crate::story::model::Segment;

const FRAMES_DIR: &str = "frames";
const AUDIO_DIR: &str = "audio";
const OUTPUT_DIR: &str = "output";
const MANIFEST_FILE: &str = "input.txt";
const OUTPUT_FILE: &str = "output.mp4";

/// Opaque unique job identifier (a hyphenated UUID v4).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Parse an identifier previously returned by [`JobManager::create_job`].
    ///
    /// Only canonical UUIDs are accepted, so an id can never escape the workspace base.
    pub fn parse(raw: &str) -> StoryResult<Self> {
        let id = uuid::Uuid::parse_str(raw.trim())
            .map_err(|e| StoryError::malformed(format!("invalid job id '{raw}': {e}")))?;
        Ok(Self(id.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory tree owned by one job. All artifact paths are derived from here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join(FRAMES_DIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// `frames/<index>.png`
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.frames_dir().join(format!("{index}.png"))
    }

    /// `audio/<index>.mp3`
    pub fn audio_path(&self, index: u32) -> PathBuf {
        self.audio_dir().join(format!("{index}.mp3"))
    }

    /// File name of a segment clip, as referenced from the concat manifest.
    pub fn clip_file_name(index: u32) -> String {
        format!("segment_{index}.mp4")
    }

    /// `output/segment_<index>.mp4`
    pub fn clip_path(&self, index: u32) -> PathBuf {
        self.output_dir().join(Self::clip_file_name(index))
    }

    /// `output/input.txt`
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir().join(MANIFEST_FILE)
    }

    /// `output/output.mp4`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(OUTPUT_FILE)
    }
}

/// One end-to-end render request: identity, workspace and the ordered segments.
#[derive(Clone, Debug)]
pub struct Job {
    id: JobId,
    workspace: Workspace,
    segments: Vec<Segment>,
}

impl Job {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Segments in render order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Allocates jobs under a base directory.
#[derive(Clone, Debug)]
pub struct JobManager {
    base: PathBuf,
}

impl JobManager {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Allocate a fresh id and create `<base>/<id>/{frames,audio,output}`.
    ///
    /// Pre-existing directories are accepted; any other IO failure is a
    /// [`StoryError::Workspace`].
    #[tracing::instrument(skip(self, segments), fields(segments = segments.len()))]
    pub fn create_job(&self, segments: Vec<Segment>) -> StoryResult<Job> {
        if segments.is_empty() {
            return Err(StoryError::malformed("segment list must not be empty"));
        }

        std::fs::create_dir_all(&self.base).map_err(|e| {
            StoryError::workspace(format!(
                "create workspace base '{}': {e}",
                self.base.display()
            ))
        })?;

        let id = JobId::generate();
        let workspace = Workspace {
            root: self.base.join(id.as_str()),
        };
        create_dir_idempotent(workspace.root())?;
        create_dir_idempotent(&workspace.frames_dir())?;
        create_dir_idempotent(&workspace.audio_dir())?;
        create_dir_idempotent(&workspace.output_dir())?;

        tracing::info!(job = %id, root = %workspace.root().display(), "job workspace ready");
        Ok(Job {
            id,
            workspace,
            segments,
        })
    }

    /// Locate the workspace of an existing job. Never creates anything.
    pub fn open_workspace(&self, id: &JobId) -> StoryResult<Workspace> {
        let root = self.base.join(id.as_str());
        if !root.is_dir() {
            return Err(StoryError::workspace(format!(
                "no workspace for job {id} under '{}'",
                self.base.display()
            )));
        }
        Ok(Workspace { root })
    }
}

fn create_dir_idempotent(path: &Path) -> StoryResult<()> {
    match std::fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(StoryError::workspace(format!(
            "create directory '{}': {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/workspace.rs"]
mod tests;
